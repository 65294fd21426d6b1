// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The registry orchestrator.
//!
//! `register_file` follows a fixed order: validate, sanitize, pick an unused
//! id, post to the relay, persist. The relay is never called for a request
//! that fails validation, and the store is never written for a request whose
//! relay post failed. A persistence failure after a successful post leaves an
//! orphaned relay message, which is logged at `error` for operators.

use std::sync::Arc;
use std::time::Duration;

use relaybox_config::RelayboxConfig;
use relaybox_core::types::{
    ChatTarget, FileRecord, FileSource, FileStats, FileType, NewFileRecord, RelayRef, RelayUpload,
};
use relaybox_core::{
    DriveMirror, FileAnalyzer, MetadataStore, Notifier, RelayChannel, RelayboxError,
};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{RegistrationError, ResolveError, RetireError};
use crate::id::{IdSource, TimestampIds};
use crate::sanitize::sanitize_filename;
use crate::side_effects::SideEffects;

/// Limits and timeouts the registry enforces.
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    pub max_file_size: u64,
    /// Total identifiers tried per registration, across pre-post probing and
    /// insert retries.
    pub id_attempts: u32,
    pub relay_timeout: Duration,
    pub store_timeout: Duration,
    pub side_effect_timeout: Duration,
}

impl RegistryOptions {
    pub fn from_config(config: &RelayboxConfig) -> Self {
        Self {
            max_file_size: config.files.max_file_size,
            id_attempts: config.registry.id_attempts.max(1),
            relay_timeout: Duration::from_secs(config.registry.relay_timeout_secs),
            store_timeout: Duration::from_secs(config.registry.store_timeout_secs),
            side_effect_timeout: Duration::from_secs(config.registry.side_effect_timeout_secs),
        }
    }
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self::from_config(&RelayboxConfig::default())
    }
}

/// A file to register, built once at the chat boundary.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Where the relay finds the bytes.
    pub source: FileSource,
    /// Name as declared by the sender, before sanitization.
    pub filename: String,
    /// Size as declared by the sender. Zero when the platform did not say.
    pub file_size: u64,
    pub file_type: FileType,
    pub mime_type: Option<String>,
    /// `None` for system uploads.
    pub owner_user_id: Option<i64>,
    pub is_private: bool,
    /// Chat that receives side-effect results (mirror link, analysis).
    pub reply_to: Option<ChatTarget>,
}

/// Runs `fut` with a deadline. Elapsing maps to [`RelayboxError::Timeout`].
pub async fn bounded<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, RelayboxError>>,
) -> Result<T, RelayboxError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| RelayboxError::Timeout { duration: limit })?
}

/// Stateless coordinator over the store, the relay and the side effects.
pub struct FileRegistry {
    store: Arc<dyn MetadataStore>,
    relay: Arc<dyn RelayChannel>,
    ids: Arc<dyn IdSource>,
    side_effects: SideEffects,
    options: RegistryOptions,
}

impl FileRegistry {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        relay: Arc<dyn RelayChannel>,
        options: RegistryOptions,
    ) -> Self {
        let side_effects = SideEffects::new(
            Arc::clone(&relay),
            Arc::clone(&store),
            options.side_effect_timeout,
        );
        Self {
            store,
            relay,
            ids: Arc::new(TimestampIds),
            side_effects,
            options,
        }
    }

    pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_mirror(mut self, mirror: Arc<dyn DriveMirror>) -> Self {
        self.side_effects.set_mirror(mirror);
        self
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn FileAnalyzer>) -> Self {
        self.side_effects.set_analyzer(analyzer);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.side_effects.set_notifier(notifier);
        self
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    pub fn side_effects(&self) -> &SideEffects {
        &self.side_effects
    }

    /// Stores a file in the relay channel and records it.
    #[instrument(
        skip(self, request),
        fields(
            filename = %request.filename,
            size = request.file_size,
            owner = ?request.owner_user_id
        )
    )]
    pub async fn register_file(
        &self,
        request: UploadRequest,
    ) -> Result<FileRecord, RegistrationError> {
        if request.file_size > self.options.max_file_size {
            debug!(max = self.options.max_file_size, "upload rejected: too large");
            return Err(RegistrationError::FileTooLarge {
                size: request.file_size,
                max: self.options.max_file_size,
            });
        }

        let filename = sanitize_filename(&request.filename)
            .ok_or_else(|| RegistrationError::InvalidFilename(request.filename.clone()))?;

        let (mut file_id, mut attempts) = self.unused_id().await?;

        let upload = RelayUpload {
            source: request.source.clone(),
            file_type: request.file_type,
            filename: filename.clone(),
            caption: relay_caption(&file_id, &filename, request.file_size, request.file_type),
        };
        let relay_ref = bounded(self.options.relay_timeout, self.relay.post(&upload))
            .await
            .map_err(|e| {
                warn!(file_id = %file_id, error = %e, "relay post failed");
                RegistrationError::RelayUnavailable(e)
            })?;

        let stored = loop {
            let record = NewFileRecord {
                file_id: file_id.clone(),
                filename: filename.clone(),
                file_size: request.file_size,
                file_type: request.file_type,
                mime_type: request.mime_type.clone(),
                relay_ref,
                owner_user_id: request.owner_user_id,
                is_private: request.is_private,
            };

            match bounded(self.options.store_timeout, self.store.insert_file(&record)).await {
                Ok(stored) => break stored,
                Err(RelayboxError::DuplicateFileId(taken)) => {
                    if attempts >= self.options.id_attempts {
                        log_orphan(relay_ref, "identifiers exhausted after relay post");
                        return Err(RegistrationError::IdentifierExhausted { attempts });
                    }
                    warn!(file_id = %taken, "file id taken at insert, retrying");
                    file_id = self.ids.next_id();
                    attempts += 1;
                }
                Err(e) => {
                    log_orphan(relay_ref, &format!("metadata insert failed: {e}"));
                    return Err(RegistrationError::PersistenceFailed(e));
                }
            }
        };

        info!(file_id = %stored.file_id, "file registered");
        self.side_effects
            .dispatch(&stored, request.source, request.reply_to);
        Ok(stored)
    }

    /// Draws identifiers until one is unused, within the attempt budget.
    async fn unused_id(&self) -> Result<(String, u32), RegistrationError> {
        for attempt in 1..=self.options.id_attempts {
            let candidate = self.ids.next_id();
            let taken = bounded(
                self.options.store_timeout,
                self.store.contains_file_id(&candidate),
            )
            .await
            .map_err(RegistrationError::Storage)?;
            if !taken {
                return Ok((candidate, attempt));
            }
            warn!(file_id = %candidate, attempt, "file id collision");
        }
        Err(RegistrationError::IdentifierExhausted {
            attempts: self.options.id_attempts,
        })
    }

    /// Re-delivers a stored file to `destination` and counts the download.
    ///
    /// Counters move only after the relay confirmed delivery. The returned
    /// record carries the updated count.
    #[instrument(skip(self))]
    pub async fn resolve_file(
        &self,
        file_id: &str,
        requesting_user_id: Option<i64>,
        destination: ChatTarget,
    ) -> Result<FileRecord, ResolveError> {
        let mut record = bounded(self.options.store_timeout, self.store.get_file(file_id))
            .await
            .map_err(ResolveError::Storage)?
            .ok_or_else(|| {
                debug!("file not found");
                ResolveError::NotFound(file_id.to_string())
            })?;

        bounded(
            self.options.relay_timeout,
            self.relay.redeliver(record.relay_ref, destination),
        )
        .await
        .map_err(|e| {
            warn!(error = %e, "redelivery failed");
            ResolveError::DeliveryFailed(e)
        })?;

        match bounded(
            self.options.store_timeout,
            self.store.increment_download(file_id, requesting_user_id),
        )
        .await
        {
            Ok(true) => record.download_count += 1,
            Ok(false) => warn!("file retired while being delivered, download not counted"),
            // Delivery already happened; the user has the file.
            Err(e) => error!(error = %e, "download delivered but not counted"),
        }
        Ok(record)
    }

    /// Soft-deletes a file. The relay message is left alone.
    #[instrument(skip(self))]
    pub async fn retire_file(&self, file_id: &str) -> Result<(), RetireError> {
        let flipped = bounded(self.options.store_timeout, self.store.soft_delete(file_id))
            .await
            .map_err(RetireError::Storage)?;
        if flipped {
            info!("file retired");
            Ok(())
        } else {
            debug!("nothing to retire");
            Err(RetireError::NotFound(file_id.to_string()))
        }
    }

    /// Reads an active file without delivering it.
    pub async fn lookup_file(&self, file_id: &str) -> Result<Option<FileRecord>, RelayboxError> {
        bounded(self.options.store_timeout, self.store.get_file(file_id)).await
    }

    pub async fn aggregate_stats(&self) -> Result<FileStats, RelayboxError> {
        bounded(self.options.store_timeout, self.store.aggregate_stats()).await
    }

    pub async fn list_by_owner(
        &self,
        user_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<FileRecord>, RelayboxError> {
        bounded(
            self.options.store_timeout,
            self.store.list_by_owner(user_id, limit, offset),
        )
        .await
    }
}

fn relay_caption(file_id: &str, filename: &str, size: u64, file_type: FileType) -> String {
    format!("File Storage\nID: {file_id}\nName: {filename}\nSize: {size} bytes\nType: {file_type}")
}

fn log_orphan(at: RelayRef, reason: &str) {
    error!(
        channel_id = at.channel_id,
        message_id = at.message_id,
        reason,
        "orphaned relay message: posted but not recorded"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_lists_file_facts() {
        let caption = relay_caption("12345678ABCDEF", "report.pdf", 1024, FileType::Document);
        assert!(caption.contains("ID: 12345678ABCDEF"));
        assert!(caption.contains("Name: report.pdf"));
        assert!(caption.contains("Size: 1024 bytes"));
        assert!(caption.contains("Type: document"));
    }

    #[test]
    fn options_follow_config() {
        let mut config = RelayboxConfig::default();
        config.files.max_file_size = 10;
        config.registry.id_attempts = 0;
        config.registry.relay_timeout_secs = 3;

        let options = RegistryOptions::from_config(&config);
        assert_eq!(options.max_file_size, 10);
        assert_eq!(options.id_attempts, 1);
        assert_eq!(options.relay_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn bounded_maps_elapsed_to_timeout() {
        let result: Result<(), _> = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(result.unwrap_err().is_timeout());
    }
}
