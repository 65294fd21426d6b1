// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relay channel trait: the chat-platform channel used as blob storage.

use async_trait::async_trait;

use crate::error::RelayboxError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatTarget, FileSource, RelayRef, RelayUpload};

/// Durable blob storage backed by a chat channel.
///
/// Size limits of the underlying transport are enforced by callers before
/// anything reaches this trait.
#[async_trait]
pub trait RelayChannel: PluginAdapter {
    /// Posts a file into the storage channel and returns where it landed.
    async fn post(&self, upload: &RelayUpload) -> Result<RelayRef, RelayboxError>;

    /// Re-delivers a stored message into the destination chat.
    async fn redeliver(&self, at: RelayRef, destination: ChatTarget) -> Result<(), RelayboxError>;

    /// Downloads the bytes behind a file source.
    async fn fetch(&self, source: &FileSource) -> Result<Vec<u8>, RelayboxError>;
}
