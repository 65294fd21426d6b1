// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini file analyzer and chat client.
//!
//! Talks to the `generateContent` endpoint of the Generative Language API.
//! Small images, PDFs and text files are sent inline as base64; anything
//! else is described to the model by its metadata.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use relaybox_config::model::GeminiConfig;
use relaybox_core::types::{AdapterType, FileType, HealthStatus};
use relaybox_core::{AnalysisInput, FileAnalyzer, PluginAdapter, RelayboxError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Largest file sent to the model as inline data.
pub const MAX_INLINE_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Inline { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if it has any.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Whether a file of this MIME type can be handed to the model as-is.
fn is_inline_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
        || mime_type.starts_with("text/")
        || mime_type == "application/pdf"
}

fn extension(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("unknown")
}

fn analysis_prompt(input: &AnalysisInput, inline: bool) -> String {
    if input.file_type == FileType::Photo || input.mime_type.starts_with("image/") {
        let mut prompt = format!(
            "Analyze the image named '{}'. Describe:\n\
             1. What you see in the image\n\
             2. Key objects, people or elements\n\
             3. Possible use cases\n\
             4. Any text visible in the image",
            input.filename
        );
        if !inline {
            prompt.push_str("\n\nThe image itself is not attached; answer from its name and type.");
        }
        prompt
    } else {
        format!(
            "This is a {} document named '{}' ({} bytes, {}). Provide insights about:\n\
             1. Likely content type and purpose\n\
             2. Common use cases for this file type\n\
             3. Recommended handling or processing\n\
             4. File format characteristics",
            extension(&input.filename),
            input.filename,
            input.file_size,
            input.mime_type
        )
    }
}

fn chat_prompt(question: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("Context: {context}\n\nUser question: {question}"),
        None => question.to_string(),
    }
}

/// HTTP client for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, RelayboxError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| RelayboxError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn generate(
        &self,
        api_key: &str,
        parts: Vec<Part>,
    ) -> Result<Option<String>, RelayboxError> {
        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RelayboxError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, model = %self.model, "Gemini response received");

        if !status.is_success() {
            return Err(RelayboxError::provider(format!(
                "Gemini API returned {status}: {body}"
            )));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| RelayboxError::Provider {
                message: format!("failed to parse Gemini response: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(parsed.into_text())
    }
}

#[async_trait]
impl PluginAdapter for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Analyzer
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayboxError> {
        if self.is_configured() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded("Gemini API key not configured".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), RelayboxError> {
        Ok(())
    }
}

#[async_trait]
impl FileAnalyzer for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn analyze(&self, input: AnalysisInput) -> Result<Option<String>, RelayboxError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        let inline_data = input
            .data
            .as_ref()
            .filter(|data| data.len() <= MAX_INLINE_BYTES && is_inline_mime(&input.mime_type))
            .map(|data| InlineData {
                mime_type: input.mime_type.clone(),
                data: BASE64.encode(data),
            });

        let mut parts = vec![Part::Text {
            text: analysis_prompt(&input, inline_data.is_some()),
        }];
        let inline = inline_data.is_some();
        if let Some(inline_data) = inline_data {
            parts.push(Part::Inline { inline_data });
        }

        let answer = self.generate(api_key, parts).await?;
        info!(filename = %input.filename, inline, "file analyzed");
        Ok(answer)
    }

    async fn chat(
        &self,
        question: &str,
        context: Option<&str>,
    ) -> Result<Option<String>, RelayboxError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };
        let parts = vec![Part::Text {
            text: chat_prompt(question, context),
        }];
        self.generate(api_key, parts).await
    }
}
