// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every relaybox adapter.
//!
//! Collaborators (store, relay, side services) report raw failures through
//! [`RelayboxError`]. Deciding whether a failure is fatal to a request is the
//! registry's job, not theirs.

use thiserror::Error;

/// The primary error type used across adapter traits.
#[derive(Debug, Error)]
pub enum RelayboxError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage engine errors (connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Relay channel errors (post or redelivery failed, download failed).
    #[error("relay error: {message}")]
    Relay {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Side-service errors (URL shortener, drive mirror, AI analyzer).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The store already holds a record with this file identifier.
    #[error("file id already taken: {0}")]
    DuplicateFileId(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayboxError {
    /// Shorthand for a relay error without an underlying source.
    pub fn relay(message: impl Into<String>) -> Self {
        Self::Relay {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true for timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
