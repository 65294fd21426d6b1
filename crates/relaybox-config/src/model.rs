// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a typo in a key fails
//! at startup instead of silently falling back to a default.

use serde::{Deserialize, Serialize};

/// Top-level relaybox configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayboxConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Metadata database settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Upload limits and the relay channel.
    #[serde(default)]
    pub files: FilesConfig,

    /// File registry tuning.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// URL shortener credentials.
    #[serde(default)]
    pub gplinks: GplinksConfig,

    /// Cloud-drive mirror credentials.
    #[serde(default)]
    pub gdrive: GdriveConfig,

    /// Language model credentials.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// HTTP health/stats endpoint.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Process identity and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "relaybox".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token. Required by `relaybox serve`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// User ids allowed to delete any file, not only their own.
    #[serde(default)]
    pub admin_users: Vec<i64>,

    /// Upper bound on one Bot API request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            admin_users: Vec::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Metadata database settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journaling.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("relaybox").join("files.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("storage/files.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Upload limits and the relay channel.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    /// Largest accepted upload, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Chat id of the channel used as blob storage.
    #[serde(default = "default_storage_channel_id")]
    pub storage_channel_id: i64,

    /// Extensions advertised as supported. Advisory only.
    #[serde(default = "default_allowed_file_types")]
    pub allowed_file_types: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            storage_channel_id: default_storage_channel_id(),
            allowed_file_types: default_allowed_file_types(),
        }
    }
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024 * 1024
}

fn default_storage_channel_id() -> i64 {
    -1001234567890
}

fn default_allowed_file_types() -> Vec<String> {
    [
        // documents
        "pdf", "doc", "docx", "txt", "rtf", "odt",
        // images
        "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg",
        // video
        "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm",
        // audio
        "mp3", "wav", "flac", "aac", "ogg", "wma",
        // archives
        "zip", "rar", "7z", "tar", "gz",
        // applications
        "exe", "msi", "deb", "rpm", "dmg", "pkg",
        // data
        "json", "xml", "csv", "xlsx", "xls", "ppt", "pptx",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// File registry tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// How many identifiers to try before giving up on a registration.
    #[serde(default = "default_id_attempts")]
    pub id_attempts: u32,

    #[serde(default = "default_relay_timeout_secs")]
    pub relay_timeout_secs: u64,

    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,

    /// Budget for each background side effect (mirror, analysis).
    #[serde(default = "default_side_effect_timeout_secs")]
    pub side_effect_timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            id_attempts: default_id_attempts(),
            relay_timeout_secs: default_relay_timeout_secs(),
            store_timeout_secs: default_store_timeout_secs(),
            side_effect_timeout_secs: default_side_effect_timeout_secs(),
        }
    }
}

fn default_id_attempts() -> u32 {
    5
}

fn default_relay_timeout_secs() -> u64 {
    30
}

fn default_store_timeout_secs() -> u64 {
    10
}

fn default_side_effect_timeout_secs() -> u64 {
    120
}

/// URL shortener credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GplinksConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_gplinks_base_url")]
    pub base_url: String,

    /// Domain requested for generated links.
    #[serde(default = "default_gplinks_domain")]
    pub domain: String,
}

impl Default for GplinksConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gplinks_base_url(),
            domain: default_gplinks_domain(),
        }
    }
}

fn default_gplinks_base_url() -> String {
    "https://gplinks.co/api/v1".to_string()
}

fn default_gplinks_domain() -> String {
    "gplinks.com".to_string()
}

/// Cloud-drive mirror credentials.
///
/// The mirror needs a pre-issued OAuth access token; obtaining one is out of
/// scope. Client id and secret are kept so operators can record which OAuth
/// client the token belongs to.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GdriveConfig {
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,

    /// Parent folder for mirrored files. `None` uploads to the drive root.
    #[serde(default)]
    pub folder_id: Option<String>,
}

/// Language model credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// HTTP health/stats endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    5000
}
