// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading.
//!
//! Merge order, later wins: compiled defaults, `/etc/relaybox/relaybox.toml`,
//! `~/.config/relaybox/relaybox.toml`, `./relaybox.toml`, `RELAYBOX_*` env vars.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RelayboxConfig;

/// Config sections that env var names can address.
const SECTIONS: &[&str] = &[
    "agent", "telegram", "storage", "files", "registry", "gplinks", "gdrive", "gemini", "server",
];

/// TOML files consulted by [`load_config`], lowest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/relaybox/relaybox.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("relaybox/relaybox.toml"));
    }
    paths.push(PathBuf::from("relaybox.toml"));
    paths
}

/// Builds the full figment (exposed for diagnostics).
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(RelayboxConfig::default()));
    for path in search_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Load configuration from the standard hierarchy.
pub fn load_config() -> Result<RelayboxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<RelayboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelayboxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RelayboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelayboxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Maps `RELAYBOX_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `RELAYBOX_TELEGRAM_BOT_TOKEN` is `telegram.bot_token`, not
/// `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("RELAYBOX_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
