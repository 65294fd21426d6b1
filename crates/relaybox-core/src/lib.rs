// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for relaybox.
//!
//! Holds the workspace error type, the file registry domain types, and the
//! adapter traits implemented by the storage engine, the relay channel and
//! the side-service clients.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RelayboxError;
pub use types::{
    AdapterType, ChatTarget, FileRecord, FileSource, FileStats, FileType, HealthStatus,
    NewFileRecord, RelayRef, RelayUpload, UserProfile, UserSession,
};

pub use traits::{
    AnalysisInput, DriveMirror, FileAnalyzer, MetadataStore, Notifier, PluginAdapter, RelayChannel,
    UrlShortener,
};
