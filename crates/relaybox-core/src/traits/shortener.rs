// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! URL shortener trait.

use async_trait::async_trait;

use crate::error::RelayboxError;
use crate::traits::adapter::PluginAdapter;

/// A third-party URL shortening service.
#[async_trait]
pub trait UrlShortener: PluginAdapter {
    /// Whether credentials are present. An unconfigured shortener is
    /// silently unavailable rather than an error.
    fn is_configured(&self) -> bool;

    /// Shortens `url`, optionally under a custom alias.
    ///
    /// Returns `Ok(None)` when the service is unconfigured.
    async fn shorten(&self, url: &str, alias: Option<&str>)
    -> Result<Option<String>, RelayboxError>;
}
