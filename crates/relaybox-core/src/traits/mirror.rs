// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cloud-drive mirror trait.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::RelayboxError;
use crate::traits::adapter::PluginAdapter;

/// Copies uploaded files into a cloud-drive account.
#[async_trait]
pub trait DriveMirror: PluginAdapter {
    fn is_configured(&self) -> bool;

    /// Uploads the bytes and returns a shareable link.
    ///
    /// Returns `Ok(None)` when the mirror is unconfigured.
    async fn mirror(
        &self,
        filename: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<Option<String>, RelayboxError>;
}
