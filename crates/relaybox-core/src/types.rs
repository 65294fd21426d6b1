// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the registry, the store and the adapters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Relay,
    Storage,
    Shortener,
    Mirror,
    Analyzer,
}

/// Kind of an uploaded file.
///
/// Stored as its lowercase name (`"document"`, `"photo"`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Document,
    Photo,
    Video,
    Audio,
    Other,
}

impl FileType {
    /// MIME type assumed when the platform does not report one.
    pub fn default_mime(&self) -> &'static str {
        match self {
            FileType::Photo => "image/jpeg",
            FileType::Video => "video/mp4",
            FileType::Audio => "audio/mpeg",
            FileType::Document | FileType::Other => "application/octet-stream",
        }
    }
}

/// Location of a stored file inside the relay channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelayRef {
    pub channel_id: i64,
    pub message_id: i32,
}

/// A chat the relay can deliver into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatTarget(pub i64);

/// Where the bytes of an incoming file come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// The relay platform already holds the bytes under this reference
    /// (a Telegram `file_id`, for instance).
    Remote(String),
    /// Raw bytes supplied by the caller.
    Inline(Vec<u8>),
}

/// A request to push one file into the relay channel.
#[derive(Debug, Clone)]
pub struct RelayUpload {
    pub source: FileSource,
    pub file_type: FileType,
    pub filename: String,
    pub caption: String,
}

/// Metadata for a file about to be persisted.
///
/// The store assigns `created_at`, a zero download count and the
/// not-deleted flag on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFileRecord {
    pub file_id: String,
    pub filename: String,
    pub file_size: u64,
    pub file_type: FileType,
    pub mime_type: Option<String>,
    pub relay_ref: RelayRef,
    pub owner_user_id: Option<i64>,
    pub is_private: bool,
}

/// One persisted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_id: String,
    pub filename: String,
    pub file_size: u64,
    pub file_type: FileType,
    pub mime_type: Option<String>,
    pub relay_ref: RelayRef,
    pub owner_user_id: Option<i64>,
    /// ISO 8601 timestamp set at insertion.
    pub created_at: String,
    pub download_count: u64,
    pub external_mirror_link: Option<String>,
    pub is_private: bool,
    pub is_deleted: bool,
}

/// Display fields for a chat user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserProfile {
    /// A profile carrying only the numeric id.
    pub fn anonymous(user_id: i64) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }
}

/// Per-user rolling counters.
///
/// `storage_used` is historical: it grows on upload and is never reduced
/// when a file is soft-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub last_activity: String,
    pub total_uploads: u64,
    pub total_downloads: u64,
    pub storage_used: u64,
}

/// Aggregate statistics over non-deleted files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub total_files: u64,
    pub total_size: u64,
    pub counts_by_type: BTreeMap<String, u64>,
}
