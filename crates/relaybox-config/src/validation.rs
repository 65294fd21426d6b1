// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::RelayboxConfig;

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first.
pub fn validate_config(config: &RelayboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.files.max_file_size == 0 {
        fail("files.max_file_size must be greater than zero".to_string());
    }

    if config.files.storage_channel_id == 0 {
        fail("files.storage_channel_id must be a valid chat id".to_string());
    }

    if config.registry.id_attempts == 0 {
        fail("registry.id_attempts must be at least 1".to_string());
    }

    for (key, value) in [
        ("registry.relay_timeout_secs", config.registry.relay_timeout_secs),
        ("registry.store_timeout_secs", config.registry.store_timeout_secs),
        (
            "registry.side_effect_timeout_secs",
            config.registry.side_effect_timeout_secs,
        ),
        (
            "telegram.request_timeout_secs",
            config.telegram.request_timeout_secs,
        ),
    ] {
        if value == 0 {
            fail(format!("{key} must be greater than zero"));
        }
    }

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if let Some(token) = &config.telegram.bot_token
        && token.trim().is_empty()
    {
        fail("telegram.bot_token must not be empty when set".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
