// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the MetadataStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use relaybox_config::model::StorageConfig;
use relaybox_core::types::{FileRecord, FileStats, NewFileRecord, UserProfile, UserSession};
use relaybox_core::{AdapterType, HealthStatus, MetadataStore, PluginAdapter, RelayboxError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed metadata store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened on the first call to
/// [`MetadataStore::initialize`]. Nothing is cached: every read goes to SQLite.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`MetadataStore::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, RelayboxError> {
        self.db.get().ok_or_else(|| RelayboxError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayboxError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RelayboxError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for SqliteStorage {
    async fn initialize(&self) -> Result<(), RelayboxError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| RelayboxError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), RelayboxError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- File operations ---

    async fn insert_file(&self, record: &NewFileRecord) -> Result<FileRecord, RelayboxError> {
        queries::files::insert_file(self.db()?, record).await
    }

    async fn contains_file_id(&self, file_id: &str) -> Result<bool, RelayboxError> {
        queries::files::contains_file_id(self.db()?, file_id).await
    }

    async fn get_file(&self, file_id: &str) -> Result<Option<FileRecord>, RelayboxError> {
        queries::files::get_file(self.db()?, file_id, false).await
    }

    async fn get_file_admin(&self, file_id: &str) -> Result<Option<FileRecord>, RelayboxError> {
        queries::files::get_file(self.db()?, file_id, true).await
    }

    async fn increment_download(
        &self,
        file_id: &str,
        user_id: Option<i64>,
    ) -> Result<bool, RelayboxError> {
        queries::files::increment_download(self.db()?, file_id, user_id).await
    }

    async fn soft_delete(&self, file_id: &str) -> Result<bool, RelayboxError> {
        queries::files::soft_delete(self.db()?, file_id).await
    }

    async fn list_by_owner(
        &self,
        user_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<FileRecord>, RelayboxError> {
        queries::files::list_by_owner(self.db()?, user_id, limit, offset).await
    }

    async fn aggregate_stats(&self) -> Result<FileStats, RelayboxError> {
        queries::files::aggregate_stats(self.db()?).await
    }

    async fn set_mirror_link(&self, file_id: &str, link: &str) -> Result<bool, RelayboxError> {
        queries::files::set_mirror_link(self.db()?, file_id, link).await
    }

    // --- User operations ---

    async fn touch_user(&self, profile: &UserProfile) -> Result<(), RelayboxError> {
        queries::users::touch_user(self.db()?, profile).await
    }

    async fn get_user_session(&self, user_id: i64) -> Result<Option<UserSession>, RelayboxError> {
        queries::users::get_user_session(self.db()?, user_id).await
    }

    // --- Side-service logs ---

    async fn insert_shortened_url(
        &self,
        original_url: &str,
        short_url: &str,
        alias: Option<&str>,
        user_id: Option<i64>,
    ) -> Result<(), RelayboxError> {
        queries::links::insert_shortened_url(self.db()?, original_url, short_url, alias, user_id)
            .await?;
        Ok(())
    }

    async fn log_ai_interaction(
        &self,
        user_id: i64,
        query: &str,
        response: &str,
        kind: &str,
    ) -> Result<(), RelayboxError> {
        queries::ai_log::log_interaction(self.db()?, user_id, query, response, kind).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use relaybox_core::types::{FileType, RelayRef};
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    fn record(file_id: &str, owner: Option<i64>) -> NewFileRecord {
        NewFileRecord {
            file_id: file_id.to_string(),
            filename: "report.pdf".to_string(),
            file_size: 1024,
            file_type: FileType::Document,
            mime_type: None,
            relay_ref: RelayRef {
                channel_id: -1,
                message_id: 1,
            },
            owner_user_id: owner,
            is_private: false,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn operations_before_initialize_fail() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("uninit.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert!(storage.get_file("X").await.is_err());
        assert!(storage.health_check().await.is_err());
        // Shutdown without a database is a no-op.
        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn double_initialize_fails() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("twice.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("persist.db");
        let path = db_path.to_str().unwrap();

        {
            let storage = SqliteStorage::new(make_config(path));
            storage.initialize().await.unwrap();
            storage.insert_file(&record("KEEP", Some(42))).await.unwrap();
            storage.close().await.unwrap();
        }

        let storage = SqliteStorage::new(make_config(path));
        storage.initialize().await.unwrap();
        let found = storage.get_file("KEEP").await.unwrap().unwrap();
        assert_eq!(found.filename, "report.pdf");
        let session = storage.get_user_session(42).await.unwrap().unwrap();
        assert_eq!(session.storage_used, 1024);
    }

    #[tokio::test]
    async fn concurrent_downloads_are_not_lost() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("concurrent.db");
        let storage = Arc::new(SqliteStorage::new(make_config(db_path.to_str().unwrap())));
        storage.initialize().await.unwrap();
        storage.insert_file(&record("HOT", Some(1))).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let storage = Arc::clone(&storage);
            handles.push(tokio::spawn(async move {
                storage.increment_download("HOT", Some(2)).await.unwrap()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        let found = storage.get_file("HOT").await.unwrap().unwrap();
        assert_eq!(found.download_count, 50);
        let session = storage.get_user_session(2).await.unwrap().unwrap();
        assert_eq!(session.total_downloads, 50);
    }

    #[tokio::test]
    async fn concurrent_uploads_by_one_user_reconcile() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("uploads.db");
        let storage = Arc::new(SqliteStorage::new(make_config(db_path.to_str().unwrap())));
        storage.initialize().await.unwrap();

        let mut handles = Vec::new();
        for i in 0..20 {
            let storage = Arc::clone(&storage);
            handles.push(tokio::spawn(async move {
                storage.insert_file(&record(&format!("U{i}"), Some(9))).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let session = storage.get_user_session(9).await.unwrap().unwrap();
        assert_eq!(session.total_uploads, 20);
        assert_eq!(session.storage_used, 20 * 1024);
        assert_eq!(storage.list_by_owner(9, 100, 0).await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn side_service_logs_are_written() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("logs.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        storage
            .insert_shortened_url("https://a.example", "https://gpl.ink/a", Some("a"), Some(1))
            .await
            .unwrap();
        storage
            .log_ai_interaction(1, "what?", "that", "chat")
            .await
            .unwrap();
    }
}
