// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hosted language-model trait for file analysis and questions.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::RelayboxError;
use crate::traits::adapter::PluginAdapter;
use crate::types::FileType;

/// What the analyzer gets to look at.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub filename: String,
    pub file_type: FileType,
    pub mime_type: String,
    pub file_size: u64,
    /// File contents, when available and small enough to send.
    pub data: Option<Bytes>,
}

/// Asks a hosted model about files or general questions.
#[async_trait]
pub trait FileAnalyzer: PluginAdapter {
    fn is_configured(&self) -> bool;

    /// Produces a short description of an uploaded file.
    ///
    /// Returns `Ok(None)` when unconfigured or the model had nothing to say.
    async fn analyze(&self, input: AnalysisInput) -> Result<Option<String>, RelayboxError>;

    /// Answers a free-form question, optionally grounded in `context`.
    async fn chat(
        &self,
        question: &str,
        context: Option<&str>,
    ) -> Result<Option<String>, RelayboxError>;
}
