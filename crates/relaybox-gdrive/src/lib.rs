// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Drive mirror.
//!
//! Implements [`DriveMirror`] with the Drive v3 REST API. The file is
//! created with its name and parent folder first, then its content is
//! uploaded into that id, then it is shared as "anyone with the link can
//! view". Authentication uses a pre-issued OAuth access token.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use relaybox_config::model::GdriveConfig;
use relaybox_core::types::{AdapterType, HealthStatus};
use relaybox_core::{DriveMirror, PluginAdapter, RelayboxError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Base URL for the Google APIs.
const API_BASE_URL: &str = "https://www.googleapis.com";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata<'a> {
    name: &'a str,
    mime_type: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parents: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct Permission {
    role: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Public read access for anyone holding the link.
const ANYONE_READER: Permission = Permission {
    role: "reader",
    kind: "anyone",
};

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    #[serde(rename = "webViewLink")]
    web_view_link: Option<String>,
}

fn public_link(drive_id: &str) -> String {
    format!("https://drive.google.com/file/d/{drive_id}/view")
}

/// HTTP client for Google Drive uploads.
#[derive(Debug, Clone)]
pub struct DriveClient {
    client: reqwest::Client,
    access_token: Option<String>,
    folder_id: Option<String>,
    base_url: String,
}

impl DriveClient {
    pub fn new(config: &GdriveConfig) -> Result<Self, RelayboxError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| RelayboxError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            folder_id: config.folder_id.clone().filter(|f| !f.is_empty()),
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Creates an empty file already placed in the configured folder.
    async fn create_metadata(
        &self,
        token: &str,
        filename: &str,
        mime_type: &str,
    ) -> Result<DriveFile, RelayboxError> {
        let metadata = FileMetadata {
            name: filename,
            mime_type,
            parents: self.folder_id.as_deref().into_iter().collect(),
        };

        let response = self
            .client
            .post(format!(
                "{}/drive/v3/files?fields=id,webViewLink",
                self.base_url
            ))
            .bearer_auth(token)
            .json(&metadata)
            .send()
            .await
            .map_err(request_failed)?;

        read_json(response, "file create").await
    }

    async fn upload_content(
        &self,
        token: &str,
        drive_id: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<(), RelayboxError> {
        let response = self
            .client
            .patch(format!(
                "{}/upload/drive/v3/files/{drive_id}?uploadType=media",
                self.base_url
            ))
            .bearer_auth(token)
            .header("content-type", mime_type)
            .body(data)
            .send()
            .await
            .map_err(request_failed)?;

        let _: DriveFile = read_json(response, "media upload").await?;
        Ok(())
    }

    async fn share_publicly(&self, token: &str, drive_id: &str) -> Result<(), RelayboxError> {
        let response = self
            .client
            .post(format!(
                "{}/drive/v3/files/{drive_id}/permissions",
                self.base_url
            ))
            .bearer_auth(token)
            .json(&ANYONE_READER)
            .send()
            .await
            .map_err(request_failed)?;

        check_status(response, "permission create").await.map(drop)
    }

    /// Removes a file whose content never arrived.
    async fn discard(&self, token: &str, drive_id: &str) {
        let result = self
            .client
            .delete(format!("{}/drive/v3/files/{drive_id}", self.base_url))
            .bearer_auth(token)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {
                debug!(drive_id, "empty Drive file removed");
            }
            Ok(response) => {
                warn!(drive_id, status = %response.status(), "could not remove empty Drive file");
            }
            Err(e) => warn!(drive_id, error = %e, "could not remove empty Drive file"),
        }
    }
}

fn request_failed(e: reqwest::Error) -> RelayboxError {
    RelayboxError::Provider {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

async fn check_status(response: reqwest::Response, step: &str) -> Result<String, RelayboxError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!(status = %status, step, "Drive response received");

    if !status.is_success() {
        return Err(RelayboxError::provider(format!(
            "Drive {step} returned {status}: {body}"
        )));
    }
    Ok(body)
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    step: &str,
) -> Result<T, RelayboxError> {
    let body = check_status(response, step).await?;
    serde_json::from_str(&body).map_err(|e| RelayboxError::Provider {
        message: format!("failed to parse Drive {step} response: {e}"),
        source: Some(Box::new(e)),
    })
}

#[async_trait]
impl PluginAdapter for DriveClient {
    fn name(&self) -> &str {
        "gdrive"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Mirror
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayboxError> {
        if self.is_configured() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded("Drive access token not configured".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), RelayboxError> {
        Ok(())
    }
}

#[async_trait]
impl DriveMirror for DriveClient {
    fn is_configured(&self) -> bool {
        self.access_token.is_some()
    }

    async fn mirror(
        &self,
        filename: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<Option<String>, RelayboxError> {
        let Some(token) = self.access_token.as_deref() else {
            return Ok(None);
        };

        let size = data.len();
        let created = self.create_metadata(token, filename, mime_type).await?;
        if let Err(e) = self.upload_content(token, &created.id, mime_type, data).await {
            self.discard(token, &created.id).await;
            return Err(e);
        }

        // A private file still has a link its owner can open.
        let link = match self.share_publicly(token, &created.id).await {
            Ok(()) => public_link(&created.id),
            Err(e) => {
                warn!(drive_id = %created.id, error = %e, "could not make Drive file public");
                created
                    .web_view_link
                    .unwrap_or_else(|| public_link(&created.id))
            }
        };
        info!(drive_id = %created.id, size, "file uploaded to Drive");
        Ok(Some(link))
    }
}
