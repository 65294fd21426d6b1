// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock relay channel and notifier for deterministic testing.
//!
//! `MockRelay` keeps posted uploads in memory, hands out increasing message
//! ids, and counts every call so tests can assert that a collaborator was
//! (or was not) reached. Failures and hangs can be switched on per operation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use relaybox_core::types::{
    AdapterType, ChatTarget, FileSource, HealthStatus, RelayRef, RelayUpload,
};
use relaybox_core::{Notifier, PluginAdapter, RelayChannel, RelayboxError};

/// A mock relay channel.
pub struct MockRelay {
    channel_id: i64,
    next_message_id: AtomicI32,
    posts: Arc<Mutex<Vec<(RelayRef, RelayUpload)>>>,
    deliveries: Arc<Mutex<Vec<(RelayRef, ChatTarget)>>>,
    post_calls: AtomicUsize,
    redeliver_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    fail_post: AtomicBool,
    hang_post: AtomicBool,
    fail_redeliver: AtomicBool,
    fail_fetch: AtomicBool,
}

impl MockRelay {
    pub fn new(channel_id: i64) -> Self {
        Self {
            channel_id,
            next_message_id: AtomicI32::new(1),
            posts: Arc::new(Mutex::new(Vec::new())),
            deliveries: Arc::new(Mutex::new(Vec::new())),
            post_calls: AtomicUsize::new(0),
            redeliver_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            fail_post: AtomicBool::new(false),
            hang_post: AtomicBool::new(false),
            fail_redeliver: AtomicBool::new(false),
            fail_fetch: AtomicBool::new(false),
        }
    }

    /// Make every `post` fail.
    pub fn fail_posts(&self, fail: bool) {
        self.fail_post.store(fail, Ordering::SeqCst);
    }

    /// Make every `post` sleep far beyond any sane timeout.
    pub fn hang_posts(&self, hang: bool) {
        self.hang_post.store(hang, Ordering::SeqCst);
    }

    pub fn fail_redeliveries(&self, fail: bool) {
        self.fail_redeliver.store(fail, Ordering::SeqCst);
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn post_calls(&self) -> usize {
        self.post_calls.load(Ordering::SeqCst)
    }

    pub fn redeliver_calls(&self) -> usize {
        self.redeliver_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Uploads that landed in the channel, with their references.
    pub async fn posts(&self) -> Vec<(RelayRef, RelayUpload)> {
        self.posts.lock().await.clone()
    }

    /// Successful redeliveries, in order.
    pub async fn deliveries(&self) -> Vec<(RelayRef, ChatTarget)> {
        self.deliveries.lock().await.clone()
    }
}

impl Default for MockRelay {
    fn default() -> Self {
        Self::new(-1001234567890)
    }
}

#[async_trait]
impl PluginAdapter for MockRelay {
    fn name(&self) -> &str {
        "mock-relay"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Relay
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayboxError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RelayboxError> {
        Ok(())
    }
}

#[async_trait]
impl RelayChannel for MockRelay {
    async fn post(&self, upload: &RelayUpload) -> Result<RelayRef, RelayboxError> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_post.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_post.load(Ordering::SeqCst) {
            return Err(RelayboxError::relay("mock relay: post failed"));
        }

        let at = RelayRef {
            channel_id: self.channel_id,
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
        };
        self.posts.lock().await.push((at, upload.clone()));
        Ok(at)
    }

    async fn redeliver(&self, at: RelayRef, destination: ChatTarget) -> Result<(), RelayboxError> {
        self.redeliver_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_redeliver.load(Ordering::SeqCst) {
            return Err(RelayboxError::relay("mock relay: forward failed"));
        }
        let known = self.posts.lock().await.iter().any(|(r, _)| *r == at);
        if !known {
            return Err(RelayboxError::relay("mock relay: message not found"));
        }
        self.deliveries.lock().await.push((at, destination));
        Ok(())
    }

    async fn fetch(&self, source: &FileSource) -> Result<Vec<u8>, RelayboxError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(RelayboxError::relay("mock relay: download failed"));
        }
        match source {
            FileSource::Inline(bytes) => Ok(bytes.clone()),
            FileSource::Remote(handle) => Ok(format!("remote:{handle}").into_bytes()),
        }
    }
}

/// A notifier that records every message.
#[derive(Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<(ChatTarget, String)>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<(ChatTarget, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, chat: ChatTarget, text: &str) -> Result<(), RelayboxError> {
        self.sent.lock().await.push((chat, text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use relaybox_core::types::FileType;

    use super::*;

    fn upload() -> RelayUpload {
        RelayUpload {
            source: FileSource::Remote("tg-file".into()),
            file_type: FileType::Document,
            filename: "a.pdf".into(),
            caption: "caption".into(),
        }
    }

    #[tokio::test]
    async fn posts_get_increasing_message_ids() {
        let relay = MockRelay::new(-5);
        let first = relay.post(&upload()).await.unwrap();
        let second = relay.post(&upload()).await.unwrap();
        assert_eq!(first.channel_id, -5);
        assert_eq!(second.message_id, first.message_id + 1);
        assert_eq!(relay.post_calls(), 2);
    }

    #[tokio::test]
    async fn redeliver_requires_a_known_message() {
        let relay = MockRelay::default();
        let at = relay.post(&upload()).await.unwrap();
        relay.redeliver(at, ChatTarget(1)).await.unwrap();

        let unknown = RelayRef {
            channel_id: at.channel_id,
            message_id: 999,
        };
        assert!(relay.redeliver(unknown, ChatTarget(1)).await.is_err());
        assert_eq!(relay.deliveries().await, vec![(at, ChatTarget(1))]);
    }

    #[tokio::test]
    async fn injected_failures() {
        let relay = MockRelay::default();
        relay.fail_posts(true);
        assert!(relay.post(&upload()).await.is_err());
        assert!(relay.posts().await.is_empty());
    }
}
