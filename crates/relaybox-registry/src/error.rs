// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-level errors.
//!
//! Collaborators report raw [`RelayboxError`]s; the registry decides which of
//! them end a request and how, and these enums are the result.

use relaybox_core::RelayboxError;
use thiserror::Error;

use crate::format::format_file_size;

/// Why a file could not be registered.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("file is {size} bytes, limit is {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("filename {0:?} is empty after sanitization")]
    InvalidFilename(String),

    #[error("no free file id after {attempts} attempts")]
    IdentifierExhausted { attempts: u32 },

    /// The metadata store failed before anything was posted.
    #[error("metadata store unavailable: {0}")]
    Storage(#[source] RelayboxError),

    #[error("relay channel unavailable: {0}")]
    RelayUnavailable(#[source] RelayboxError),

    #[error("failed to persist file metadata: {0}")]
    PersistenceFailed(#[source] RelayboxError),
}

impl RegistrationError {
    /// Validation failures are the caller's fault and will fail again.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::FileTooLarge { .. } | Self::InvalidFilename(_))
    }

    /// Whether retrying the whole upload may succeed.
    pub fn is_transient(&self) -> bool {
        !self.is_validation()
    }

    /// Text suitable for the uploading user.
    pub fn user_message(&self) -> String {
        match self {
            Self::FileTooLarge { max, .. } => {
                format!("File too large. Maximum size: {}", format_file_size(*max))
            }
            Self::InvalidFilename(_) => {
                "That filename cannot be stored. Please rename the file.".to_string()
            }
            Self::IdentifierExhausted { .. } => {
                "Could not allocate a file ID. Please try again.".to_string()
            }
            Self::Storage(_) => {
                "Could not check file storage. Nothing was uploaded, please try again later."
                    .to_string()
            }
            Self::RelayUnavailable(_) => {
                "Storage is temporarily unavailable. Please try again later.".to_string()
            }
            Self::PersistenceFailed(_) => {
                "The file was received but could not be saved. Please try again.".to_string()
            }
        }
    }
}

/// Why a file could not be delivered.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("file {0} not found")]
    NotFound(String),

    #[error("redelivery failed: {0}")]
    DeliveryFailed(#[source] RelayboxError),

    #[error("metadata lookup failed: {0}")]
    Storage(#[source] RelayboxError),
}

impl ResolveError {
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "File not found or has been deleted.".to_string(),
            Self::DeliveryFailed(_) => "Could not send the file. Please try again.".to_string(),
            Self::Storage(_) => "Error retrieving file. Please try again later.".to_string(),
        }
    }
}

/// Why a file could not be retired.
#[derive(Debug, Error)]
pub enum RetireError {
    #[error("file {0} not found")]
    NotFound(String),

    #[error("soft delete failed: {0}")]
    Storage(#[source] RelayboxError),
}

impl RetireError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "File not found or already deleted.".to_string(),
            Self::Storage(_) => "Could not delete the file. Please try again later.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_not_transient() {
        let too_large = RegistrationError::FileTooLarge { size: 10, max: 5 };
        assert!(too_large.is_validation());
        assert!(!too_large.is_transient());
        assert!(!RegistrationError::InvalidFilename("..".into()).is_transient());

        let relay = RegistrationError::RelayUnavailable(RelayboxError::relay("down"));
        assert!(relay.is_transient());
    }

    #[test]
    fn too_large_message_names_the_limit() {
        let err = RegistrationError::FileTooLarge {
            size: 6 * 1024 * 1024 * 1024,
            max: 5 * 1024 * 1024 * 1024,
        };
        assert_eq!(err.user_message(), "File too large. Maximum size: 5.0 GB");
    }

    #[test]
    fn not_found_is_permanent() {
        assert!(!ResolveError::NotFound("X".into()).is_transient());
        assert!(!RetireError::NotFound("X".into()).is_transient());
        assert!(
            ResolveError::DeliveryFailed(RelayboxError::relay("blocked")).is_transient()
        );
    }

    #[test]
    fn store_failure_before_posting_is_not_reported_as_lost() {
        let err = RegistrationError::Storage(RelayboxError::Internal("locked".into()));
        assert!(err.is_transient());
        assert!(err.user_message().contains("Nothing was uploaded"));
        assert!(!err.user_message().contains("received"));
    }

    #[test]
    fn sources_are_preserved() {
        use std::error::Error;
        let err = RegistrationError::PersistenceFailed(RelayboxError::Internal("disk".into()));
        assert!(err.source().is_some());
    }
}
