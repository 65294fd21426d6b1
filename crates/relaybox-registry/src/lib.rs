// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The file registry.
//!
//! Ties identifier issuance, the relay channel and the metadata store into
//! three request-level operations: register, resolve and retire. The registry
//! holds no durable state; the store is the only source of truth.

pub mod error;
pub mod format;
pub mod id;
pub mod registry;
pub mod sanitize;
pub mod side_effects;

pub use error::{RegistrationError, ResolveError, RetireError};
pub use format::format_file_size;
pub use id::{IdSource, TimestampIds};
pub use registry::{FileRegistry, RegistryOptions, UploadRequest, bounded};
pub use sanitize::sanitize_filename;
pub use side_effects::SideEffects;
