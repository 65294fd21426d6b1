// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command dispatcher for relaybox.
//!
//! Turns chat commands and file uploads into registry, shortener and
//! analyzer calls and produces plain-text replies. Nothing here knows about
//! a particular chat platform; adapters parse their own updates into a
//! [`Sender`] plus either command text or an
//! [`UploadRequest`](relaybox_registry::UploadRequest).

pub mod command;
pub mod dispatcher;
pub mod text;
pub mod url;

pub use command::Command;
pub use dispatcher::{Dispatcher, Sender};
