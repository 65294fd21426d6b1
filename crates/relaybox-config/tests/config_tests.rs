// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for configuration loading.

use figment::Jail;
use relaybox_config::diagnostic::ConfigError;
use relaybox_config::model::RelayboxConfig;
use relaybox_config::{load_and_validate_str, load_config_from_path, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[agent]
name = "files-bot"
log_level = "debug"

[telegram]
bot_token = "123:ABC"
admin_users = [1, 2]

[storage]
database_path = "/tmp/relaybox.db"
wal_mode = false

[files]
max_file_size = 1048576
storage_channel_id = -100555
allowed_file_types = ["pdf"]

[registry]
id_attempts = 3
relay_timeout_secs = 5

[gplinks]
api_key = "gp-key"

[gdrive]
access_token = "ya29.token"
folder_id = "folder-1"

[gemini]
api_key = "gm-key"
model = "gemini-2.0-flash"

[server]
enabled = true
port = 8080
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "files-bot");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.admin_users, vec![1, 2]);
    assert_eq!(config.storage.database_path, "/tmp/relaybox.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.files.max_file_size, 1_048_576);
    assert_eq!(config.files.storage_channel_id, -100555);
    assert_eq!(config.files.allowed_file_types, vec!["pdf"]);
    assert_eq!(config.registry.id_attempts, 3);
    assert_eq!(config.registry.relay_timeout_secs, 5);
    // untouched keys keep defaults
    assert_eq!(config.registry.store_timeout_secs, 10);
    assert_eq!(config.gplinks.api_key.as_deref(), Some("gp-key"));
    assert_eq!(config.gplinks.base_url, "https://gplinks.co/api/v1");
    assert_eq!(config.gdrive.folder_id.as_deref(), Some("folder-1"));
    assert_eq!(config.gemini.model, "gemini-2.0-flash");
    assert!(config.server.enabled);
    assert_eq!(config.server.port, 8080);
}

#[test]
fn defaults_match_original_limits() {
    let config = RelayboxConfig::default();
    assert_eq!(config.files.max_file_size, 5 * 1024 * 1024 * 1024);
    assert_eq!(config.files.storage_channel_id, -1001234567890);
    assert!(config.files.allowed_file_types.contains(&"pdf".to_string()));
    assert_eq!(config.registry.id_attempts, 5);
    assert_eq!(config.gemini.model, "gemini-2.5-flash");
    assert!(!config.server.enabled);
}

#[test]
fn unknown_key_is_rejected_with_suggestion() {
    let toml = r#"
[files]
max_fil_size = 10
"#;
    let errors = load_and_validate_str(toml).expect_err("unknown key must fail");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { suggestion, .. } => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("max_file_size"));
}

#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[files]
max_file_size = "big"
"#;
    let errors = load_and_validate_str(toml).expect_err("wrong type must fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. }))
    );
}

#[test]
fn validation_runs_after_deserialization() {
    let toml = r#"
[registry]
id_attempts = 0
"#;
    let errors = load_and_validate_str(toml).expect_err("zero attempts must fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(
                e,
                ConfigError::Validation { message } if message.contains("id_attempts")
            ))
    );
}

#[test]
fn env_vars_override_file_values() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "relaybox.toml",
            r#"
[telegram]
bot_token = "from-file"

[files]
max_file_size = 100
"#,
        )?;
        jail.set_env("RELAYBOX_TELEGRAM_BOT_TOKEN", "from-env");
        jail.set_env("RELAYBOX_FILES_STORAGE_CHANNEL_ID", "-100777");

        let config = load_config_from_path(std::path::Path::new("relaybox.toml"))?;
        assert_eq!(config.telegram.bot_token.as_deref(), Some("from-env"));
        assert_eq!(config.files.max_file_size, 100);
        assert_eq!(config.files.storage_channel_id, -100777);
        Ok(())
    });
}
