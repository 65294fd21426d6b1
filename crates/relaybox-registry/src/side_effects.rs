// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort work run after a registration has been returned.
//!
//! Each upload gets one background task on a [`TaskTracker`]. The task pulls
//! the bytes from the relay, then mirrors and analyzes the file concurrently.
//! Nothing here can change the outcome of the registration; failures are
//! logged at `warn` and dropped.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use relaybox_core::types::{ChatTarget, FileRecord, FileSource, FileType};
use relaybox_core::{
    AnalysisInput, DriveMirror, FileAnalyzer, MetadataStore, Notifier, RelayChannel,
};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::registry::bounded;

/// Interaction kind recorded for automatic file analysis.
pub const ANALYSIS_KIND: &str = "file_analysis";

/// Dispatcher for post-registration side effects.
#[derive(Clone)]
pub struct SideEffects {
    relay: Arc<dyn RelayChannel>,
    store: Arc<dyn MetadataStore>,
    mirror: Option<Arc<dyn DriveMirror>>,
    analyzer: Option<Arc<dyn FileAnalyzer>>,
    notifier: Option<Arc<dyn Notifier>>,
    tracker: TaskTracker,
    timeout: Duration,
}

impl SideEffects {
    pub fn new(
        relay: Arc<dyn RelayChannel>,
        store: Arc<dyn MetadataStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            relay,
            store,
            mirror: None,
            analyzer: None,
            notifier: None,
            tracker: TaskTracker::new(),
            timeout,
        }
    }

    pub fn set_mirror(&mut self, mirror: Arc<dyn DriveMirror>) {
        self.mirror = Some(mirror);
    }

    pub fn set_analyzer(&mut self, analyzer: Arc<dyn FileAnalyzer>) {
        self.analyzer = Some(analyzer);
    }

    pub fn set_notifier(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifier = Some(notifier);
    }

    /// Tracker owning every spawned side-effect task.
    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    /// Spawns the side effects for a freshly registered file.
    ///
    /// Returns `false` when there was nothing to do.
    pub fn dispatch(
        &self,
        record: &FileRecord,
        source: FileSource,
        reply_to: Option<ChatTarget>,
    ) -> bool {
        let mirror = self.mirror.clone().filter(|m| m.is_configured());
        let analyzer = self
            .analyzer
            .clone()
            .filter(|a| a.is_configured())
            .filter(|_| matches!(record.file_type, FileType::Photo | FileType::Document));

        if mirror.is_none() && analyzer.is_none() {
            return false;
        }

        let job = Job {
            record: record.clone(),
            source,
            reply_to,
            relay: Arc::clone(&self.relay),
            store: Arc::clone(&self.store),
            mirror,
            analyzer,
            notifier: self.notifier.clone(),
            timeout: self.timeout,
        };
        self.tracker.spawn(job.run());
        true
    }

    /// Stops accepting work and waits for in-flight tasks.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

struct Job {
    record: FileRecord,
    source: FileSource,
    reply_to: Option<ChatTarget>,
    relay: Arc<dyn RelayChannel>,
    store: Arc<dyn MetadataStore>,
    mirror: Option<Arc<dyn DriveMirror>>,
    analyzer: Option<Arc<dyn FileAnalyzer>>,
    notifier: Option<Arc<dyn Notifier>>,
    timeout: Duration,
}

impl Job {
    async fn run(self) {
        let file_id = self.record.file_id.clone();
        let data = match bounded(self.timeout, self.relay.fetch(&self.source)).await {
            Ok(bytes) => Some(Bytes::from(bytes)),
            Err(e) => {
                warn!(file_id = %file_id, error = %e, "could not fetch file for side effects");
                None
            }
        };

        tokio::join!(self.mirror_file(data.clone()), self.analyze_file(data));
        debug!(file_id = %file_id, "side effects finished");
    }

    async fn mirror_file(&self, data: Option<Bytes>) {
        let (Some(mirror), Some(data)) = (&self.mirror, data) else {
            return;
        };
        let file_id = &self.record.file_id;
        let mime = self
            .record
            .mime_type
            .clone()
            .unwrap_or_else(|| self.record.file_type.default_mime().to_string());

        let link = match bounded(
            self.timeout,
            mirror.mirror(&self.record.filename, &mime, data),
        )
        .await
        {
            Ok(Some(link)) => link,
            Ok(None) => return,
            Err(e) => {
                warn!(file_id = %file_id, error = %e, "drive mirror failed");
                return;
            }
        };

        match bounded(self.timeout, self.store.set_mirror_link(file_id, &link)).await {
            Ok(true) => info!(file_id = %file_id, "file mirrored"),
            Ok(false) => debug!(file_id = %file_id, "mirror link not attached"),
            Err(e) => {
                warn!(file_id = %file_id, error = %e, "failed to record mirror link");
                return;
            }
        }
        self.notify(&format!("Drive backup for {file_id}: {link}")).await;
    }

    async fn analyze_file(&self, data: Option<Bytes>) {
        let Some(analyzer) = &self.analyzer else {
            return;
        };
        let file_id = &self.record.file_id;
        let input = AnalysisInput {
            filename: self.record.filename.clone(),
            file_type: self.record.file_type,
            mime_type: self
                .record
                .mime_type
                .clone()
                .unwrap_or_else(|| self.record.file_type.default_mime().to_string()),
            file_size: self.record.file_size,
            data,
        };

        let analysis = match bounded(self.timeout, analyzer.analyze(input)).await {
            Ok(Some(text)) => text,
            Ok(None) => return,
            Err(e) => {
                warn!(file_id = %file_id, error = %e, "file analysis failed");
                return;
            }
        };

        if let Some(user_id) = self.record.owner_user_id {
            let query = format!("analyze {}", self.record.filename);
            if let Err(e) = bounded(
                self.timeout,
                self.store
                    .log_ai_interaction(user_id, &query, &analysis, ANALYSIS_KIND),
            )
            .await
            {
                warn!(file_id = %file_id, error = %e, "failed to log analysis");
            }
        }
        self.notify(&format!("AI analysis of {}:\n\n{analysis}", self.record.filename))
            .await;
    }

    async fn notify(&self, text: &str) {
        let (Some(notifier), Some(chat)) = (&self.notifier, self.reply_to) else {
            return;
        };
        if let Err(e) = bounded(self.timeout, notifier.notify(chat, text)).await {
            warn!(chat = chat.0, error = %e, "side-effect notification failed");
        }
    }
}
