// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GPLinks URL shortener.
//!
//! Implements [`UrlShortener`] with one `POST {base}/shorten` call. An
//! unconfigured client answers `Ok(None)` without touching the network.

use std::time::Duration;

use async_trait::async_trait;
use relaybox_config::model::GplinksConfig;
use relaybox_core::types::{AdapterType, HealthStatus};
use relaybox_core::{PluginAdapter, RelayboxError, UrlShortener};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct ShortenRequest<'a> {
    url: &'a str,
    domain: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    alias: Option<&'a str>,
}

/// The API has answered with each of these field names over time.
#[derive(Debug, Default, Deserialize)]
struct ShortenResponse {
    #[serde(rename = "shortenedUrl")]
    shortened_url: Option<String>,
    short_url: Option<String>,
    url: Option<String>,
}

impl ShortenResponse {
    fn into_link(self) -> Option<String> {
        self.shortened_url
            .or(self.short_url)
            .or(self.url)
            .filter(|s| !s.is_empty())
    }
}

/// HTTP client for the GPLinks API.
#[derive(Debug, Clone)]
pub struct GplinksShortener {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    domain: String,
}

impl GplinksShortener {
    pub fn new(config: &GplinksConfig) -> Result<Self, RelayboxError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RelayboxError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            domain: config.domain.clone(),
        })
    }
}

#[async_trait]
impl PluginAdapter for GplinksShortener {
    fn name(&self) -> &str {
        "gplinks"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Shortener
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayboxError> {
        if self.is_configured() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded("GPLinks API key not configured".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), RelayboxError> {
        Ok(())
    }
}

#[async_trait]
impl UrlShortener for GplinksShortener {
    fn is_configured(&self) -> bool {
        self.api_key.is_some() && !self.base_url.is_empty()
    }

    async fn shorten(
        &self,
        url: &str,
        alias: Option<&str>,
    ) -> Result<Option<String>, RelayboxError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("GPLinks not configured");
            return Ok(None);
        };

        let body = ShortenRequest {
            url,
            domain: &self.domain,
            alias,
        };
        let response = self
            .client
            .post(format!("{}/shorten", self.base_url))
            .bearer_auth(api_key)
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayboxError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        debug!(status = %status, "GPLinks response received");

        match status.as_u16() {
            200..=299 => {
                let parsed: ShortenResponse =
                    serde_json::from_str(&text).map_err(|e| RelayboxError::Provider {
                        message: format!("failed to parse GPLinks response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                match parsed.into_link() {
                    Some(link) => {
                        info!(short = %link, "URL shortened");
                        Ok(Some(link))
                    }
                    None => Err(RelayboxError::provider(
                        "GPLinks response carried no shortened URL",
                    )),
                }
            }
            401 => Err(RelayboxError::provider("GPLinks authentication failed")),
            422 => {
                warn!(body = %text, "GPLinks rejected the request");
                Err(RelayboxError::provider(format!(
                    "GPLinks validation error: {text}"
                )))
            }
            _ => Err(RelayboxError::provider(format!(
                "GPLinks API returned {status}: {text}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn shortener(base_url: &str, key: Option<&str>) -> GplinksShortener {
        GplinksShortener::new(&GplinksConfig {
            api_key: key.map(str::to_string),
            base_url: base_url.to_string(),
            ..GplinksConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn unconfigured_returns_none() {
        let client = shortener("http://127.0.0.1:9", None);
        assert!(!client.is_configured());
        assert_eq!(client.shorten("https://example.com", None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_key_counts_as_unconfigured() {
        let client = shortener("http://127.0.0.1:9", Some(""));
        assert!(!client.is_configured());
    }

    #[tokio::test]
    async fn sends_bearer_key_domain_and_alias() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/shorten"))
            .and(header("authorization", "Bearer secret"))
            .and(body_json(serde_json::json!({
                "url": "https://example.com/long",
                "domain": "gplinks.com",
                "alias": "mine",
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "shortenedUrl": "https://gplinks.co/mine"
                })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = shortener(&server.uri(), Some("secret"));
        let link = client
            .shorten("https://example.com/long", Some("mine"))
            .await
            .unwrap();
        assert_eq!(link.as_deref(), Some("https://gplinks.co/mine"));
    }

    #[tokio::test]
    async fn alias_is_omitted_when_absent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/shorten"))
            .and(body_json(serde_json::json!({
                "url": "https://example.com",
                "domain": "gplinks.com",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "short_url": "https://gplinks.co/x1" })),
            )
            .mount(&server)
            .await;

        let client = shortener(&server.uri(), Some("k"));
        let link = client.shorten("https://example.com", None).await.unwrap();
        assert_eq!(link.as_deref(), Some("https://gplinks.co/x1"));
    }

    #[tokio::test]
    async fn falls_back_to_url_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "url": "https://gplinks.co/y2" })),
            )
            .mount(&server)
            .await;

        let client = shortener(&server.uri(), Some("k"));
        let link = client.shorten("https://example.com", None).await.unwrap();
        assert_eq!(link.as_deref(), Some("https://gplinks.co/y2"));
    }

    #[tokio::test]
    async fn missing_link_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = shortener(&server.uri(), Some("k"));
        assert!(client.shorten("https://example.com", None).await.is_err());
    }

    #[tokio::test]
    async fn auth_and_validation_failures_are_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer bad"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer good"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(serde_json::json!({ "errors": { "alias": "taken" } })),
            )
            .mount(&server)
            .await;

        let err = shortener(&server.uri(), Some("bad"))
            .shorten("https://example.com", None)
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("authentication"), "got: {err}");

        let err = shortener(&server.uri(), Some("good"))
            .shorten("https://example.com", Some("dup"))
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("taken"), "got: {err}");
    }

    #[tokio::test]
    async fn server_error_is_reported_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = shortener(&server.uri(), Some("k"))
            .shorten("https://example.com", None)
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("503"), "got: {err}");
    }
}
