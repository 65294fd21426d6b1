// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metadata store trait: the store of record for files and user counters.

use async_trait::async_trait;

use crate::error::RelayboxError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{FileRecord, FileStats, NewFileRecord, UserProfile, UserSession};

/// Durable, transactional storage for [`FileRecord`]s and [`UserSession`]s.
///
/// Implementations must apply every multi-row change (file row plus the
/// owner's counters) atomically and must not cache reads.
#[async_trait]
pub trait MetadataStore: PluginAdapter {
    /// Opens the backend (migrations, connection).
    async fn initialize(&self) -> Result<(), RelayboxError>;

    /// Flushes pending writes and releases the connection.
    async fn close(&self) -> Result<(), RelayboxError>;

    /// Inserts a file and bumps the owner's upload counters in one transaction.
    ///
    /// Fails with [`RelayboxError::DuplicateFileId`] if the id is taken,
    /// including by a deleted record.
    async fn insert_file(&self, record: &NewFileRecord) -> Result<FileRecord, RelayboxError>;

    /// Whether any record, deleted or not, uses this id.
    async fn contains_file_id(&self, file_id: &str) -> Result<bool, RelayboxError>;

    /// Looks up an active file. Deleted and unknown ids both yield `None`.
    async fn get_file(&self, file_id: &str) -> Result<Option<FileRecord>, RelayboxError>;

    /// Administrative lookup that also returns deleted records.
    async fn get_file_admin(&self, file_id: &str) -> Result<Option<FileRecord>, RelayboxError>;

    /// Bumps the file's download count and the acting user's download total.
    ///
    /// Returns `false` (and changes nothing) if the id is unknown or deleted.
    async fn increment_download(
        &self,
        file_id: &str,
        user_id: Option<i64>,
    ) -> Result<bool, RelayboxError>;

    /// Marks a file deleted. Returns whether an active row was flipped.
    async fn soft_delete(&self, file_id: &str) -> Result<bool, RelayboxError>;

    /// A user's active files, newest first.
    async fn list_by_owner(
        &self,
        user_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<FileRecord>, RelayboxError>;

    /// Totals over active files.
    async fn aggregate_stats(&self) -> Result<FileStats, RelayboxError>;

    /// Attaches the mirror link once. Returns `false` if a link was already
    /// set or the file is unknown or deleted.
    async fn set_mirror_link(&self, file_id: &str, link: &str) -> Result<bool, RelayboxError>;

    /// Creates or refreshes a user's session row, keeping its counters.
    async fn touch_user(&self, profile: &UserProfile) -> Result<(), RelayboxError>;

    /// Reads a user's counters.
    async fn get_user_session(&self, user_id: i64) -> Result<Option<UserSession>, RelayboxError>;

    /// Records a shortened URL.
    async fn insert_shortened_url(
        &self,
        original_url: &str,
        short_url: &str,
        alias: Option<&str>,
        user_id: Option<i64>,
    ) -> Result<(), RelayboxError>;

    /// Records a question/answer pair sent to the language model.
    async fn log_ai_interaction(
        &self,
        user_id: i64,
        query: &str,
        response: &str,
        kind: &str,
    ) -> Result<(), RelayboxError>;
}
