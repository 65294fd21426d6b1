// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the registry and the command dispatcher over a
//! temp SQLite database and mock collaborators. The concrete mocks stay
//! reachable so tests can inject failures and inspect calls.

use std::sync::Arc;
use std::time::Duration;

use relaybox_bot::{Dispatcher, Sender};
use relaybox_config::model::StorageConfig;
use relaybox_core::types::{ChatTarget, FileSource, FileType, UserProfile};
use relaybox_core::{MetadataStore, RelayboxError};
use relaybox_registry::{FileRegistry, IdSource, RegistryOptions, UploadRequest};
use relaybox_storage::SqliteStorage;

use crate::mock_relay::{MockNotifier, MockRelay};
use crate::mock_services::{MockAnalyzer, MockMirror, MockShortener};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    options: RegistryOptions,
    ids: Option<Arc<dyn IdSource>>,
    mirror: Option<Arc<MockMirror>>,
    analyzer: Option<Arc<MockAnalyzer>>,
    shortener: Option<Arc<MockShortener>>,
    admins: Vec<i64>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            options: RegistryOptions {
                relay_timeout: Duration::from_secs(5),
                store_timeout: Duration::from_secs(5),
                side_effect_timeout: Duration::from_secs(5),
                ..RegistryOptions::default()
            },
            ids: None,
            mirror: None,
            analyzer: None,
            shortener: None,
            admins: Vec::new(),
        }
    }

    pub fn with_max_file_size(mut self, max: u64) -> Self {
        self.options.max_file_size = max;
        self
    }

    pub fn with_id_attempts(mut self, attempts: u32) -> Self {
        self.options.id_attempts = attempts;
        self
    }

    pub fn with_relay_timeout(mut self, timeout: Duration) -> Self {
        self.options.relay_timeout = timeout;
        self
    }

    /// Replace the timestamp id source.
    pub fn with_ids(mut self, ids: impl IdSource) -> Self {
        self.ids = Some(Arc::new(ids));
        self
    }

    pub fn with_mirror(mut self, mirror: MockMirror) -> Self {
        self.mirror = Some(Arc::new(mirror));
        self
    }

    pub fn with_analyzer(mut self, analyzer: MockAnalyzer) -> Self {
        self.analyzer = Some(Arc::new(analyzer));
        self
    }

    pub fn with_shortener(mut self, shortener: MockShortener) -> Self {
        self.shortener = Some(Arc::new(shortener));
        self
    }

    pub fn with_admins(mut self, admins: Vec<i64>) -> Self {
        self.admins = admins;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, RelayboxError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| RelayboxError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;
        let store: Arc<dyn MetadataStore> = Arc::new(storage);

        let relay = Arc::new(MockRelay::default());
        let notifier = Arc::new(MockNotifier::new());

        let mut registry = FileRegistry::new(Arc::clone(&store), relay.clone(), self.options)
            .with_notifier(notifier.clone());
        if let Some(ids) = self.ids {
            registry = registry.with_id_source(ids);
        }
        if let Some(mirror) = &self.mirror {
            registry = registry.with_mirror(mirror.clone());
        }
        if let Some(analyzer) = &self.analyzer {
            registry = registry.with_analyzer(analyzer.clone());
        }
        let registry = Arc::new(registry);

        let mut dispatcher =
            Dispatcher::new(Arc::clone(&registry), Arc::clone(&store)).with_admins(self.admins);
        if let Some(shortener) = &self.shortener {
            dispatcher = dispatcher.with_shortener(shortener.clone());
        }
        if let Some(analyzer) = &self.analyzer {
            dispatcher = dispatcher.with_analyzer(analyzer.clone());
        }

        Ok(TestHarness {
            store,
            relay,
            notifier,
            mirror: self.mirror,
            analyzer: self.analyzer,
            shortener: self.shortener,
            registry,
            dispatcher,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock collaborators and temp storage.
pub struct TestHarness {
    /// SQLite store (temp DB, cleaned up on drop).
    pub store: Arc<dyn MetadataStore>,
    pub relay: Arc<MockRelay>,
    /// Receives side-effect notifications.
    pub notifier: Arc<MockNotifier>,
    pub mirror: Option<Arc<MockMirror>>,
    pub analyzer: Option<Arc<MockAnalyzer>>,
    pub shortener: Option<Arc<MockShortener>>,
    pub registry: Arc<FileRegistry>,
    pub dispatcher: Dispatcher,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A sender chatting privately with the bot (chat id equals user id).
    pub fn sender(&self, user_id: i64) -> Sender {
        Sender {
            chat: ChatTarget(user_id),
            profile: UserProfile {
                user_id,
                username: Some(format!("user{user_id}")),
                first_name: Some("Test".to_string()),
                last_name: None,
            },
        }
    }

    /// A document upload owned by `user_id` with inline bytes.
    pub fn upload(&self, user_id: i64, filename: &str, size: u64) -> UploadRequest {
        UploadRequest {
            source: FileSource::Inline(vec![0x25; size.min(4096) as usize]),
            filename: filename.to_string(),
            file_size: size,
            file_type: FileType::Document,
            mime_type: Some("application/pdf".to_string()),
            owner_user_id: Some(user_id),
            is_private: false,
            reply_to: Some(ChatTarget(user_id)),
        }
    }

    /// Waits for every background side effect spawned so far.
    pub async fn settle(&self) {
        self.registry.side_effects().drain().await;
    }
}
