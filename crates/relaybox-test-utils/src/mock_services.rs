// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Side-service doubles: drive mirror, analyzer and URL shortener.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use relaybox_core::types::{AdapterType, HealthStatus};
use relaybox_core::{
    AnalysisInput, DriveMirror, FileAnalyzer, PluginAdapter, RelayboxError, UrlShortener,
};

macro_rules! mock_adapter {
    ($ty:ty, $name:literal, $kind:expr) => {
        #[async_trait]
        impl PluginAdapter for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn version(&self) -> semver::Version {
                semver::Version::new(0, 1, 0)
            }

            fn adapter_type(&self) -> AdapterType {
                $kind
            }

            async fn health_check(&self) -> Result<HealthStatus, RelayboxError> {
                Ok(HealthStatus::Healthy)
            }

            async fn shutdown(&self) -> Result<(), RelayboxError> {
                Ok(())
            }
        }
    };
}

/// Drive mirror that returns `https://drive.test/<filename>`.
pub struct MockMirror {
    configured: bool,
    fail: AtomicBool,
    calls: AtomicUsize,
    received: Arc<Mutex<Vec<(String, Bytes)>>>,
}

impl MockMirror {
    pub fn new() -> Self {
        Self {
            configured: true,
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(filename, bytes)` for every mirrored file.
    pub async fn received(&self) -> Vec<(String, Bytes)> {
        self.received.lock().await.clone()
    }
}

impl Default for MockMirror {
    fn default() -> Self {
        Self::new()
    }
}

mock_adapter!(MockMirror, "mock-mirror", AdapterType::Mirror);

#[async_trait]
impl DriveMirror for MockMirror {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn mirror(
        &self,
        filename: &str,
        _mime_type: &str,
        data: Bytes,
    ) -> Result<Option<String>, RelayboxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RelayboxError::provider("mock mirror: upload failed"));
        }
        self.received
            .lock()
            .await
            .push((filename.to_string(), data));
        Ok(Some(format!("https://drive.test/{filename}")))
    }
}

/// Analyzer with canned answers.
pub struct MockAnalyzer {
    configured: bool,
    fail: AtomicBool,
    analyze_calls: AtomicUsize,
    inputs: Arc<Mutex<Vec<AnalysisInput>>>,
    chats: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self {
            configured: true,
            fail: AtomicBool::new(false),
            analyze_calls: AtomicUsize::new(0),
            inputs: Arc::new(Mutex::new(Vec::new())),
            chats: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    /// Every input passed to `analyze`, in call order.
    pub async fn inputs(&self) -> Vec<AnalysisInput> {
        self.inputs.lock().await.clone()
    }

    /// `(question, context)` for every chat call.
    pub async fn chats(&self) -> Vec<(String, Option<String>)> {
        self.chats.lock().await.clone()
    }
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

mock_adapter!(MockAnalyzer, "mock-analyzer", AdapterType::Analyzer);

#[async_trait]
impl FileAnalyzer for MockAnalyzer {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn analyze(&self, input: AnalysisInput) -> Result<Option<String>, RelayboxError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RelayboxError::provider("mock analyzer: model unavailable"));
        }
        let reply = format!(
            "{} is a {} of {} bytes",
            input.filename, input.file_type, input.file_size
        );
        self.inputs.lock().await.push(input);
        Ok(Some(reply))
    }

    async fn chat(
        &self,
        question: &str,
        context: Option<&str>,
    ) -> Result<Option<String>, RelayboxError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RelayboxError::provider("mock analyzer: model unavailable"));
        }
        self.chats
            .lock()
            .await
            .push((question.to_string(), context.map(str::to_string)));
        Ok(Some(format!("answer to: {question}")))
    }
}

/// Shortener that returns `https://short.test/<alias or n>`.
pub struct MockShortener {
    configured: bool,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockShortener {
    pub fn new() -> Self {
        Self {
            configured: true,
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockShortener {
    fn default() -> Self {
        Self::new()
    }
}

mock_adapter!(MockShortener, "mock-shortener", AdapterType::Shortener);

#[async_trait]
impl UrlShortener for MockShortener {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn shorten(
        &self,
        _url: &str,
        alias: Option<&str>,
    ) -> Result<Option<String>, RelayboxError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.configured {
            return Ok(None);
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(RelayboxError::provider("mock shortener: rejected"));
        }
        let slug = alias.map(str::to_string).unwrap_or_else(|| n.to_string());
        Ok(Some(format!("https://short.test/{slug}")))
    }
}
