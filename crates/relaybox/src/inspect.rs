// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `relaybox stats` and `relaybox files` command implementations.
//!
//! Both open the database directly, print JSON to stdout and exit. They do
//! not need a bot token.

use relaybox_bot::dispatcher::PAGE_SIZE;
use relaybox_config::RelayboxConfig;
use relaybox_core::{MetadataStore, RelayboxError};
use relaybox_storage::SqliteStorage;

async fn open_store(config: &RelayboxConfig) -> Result<SqliteStorage, RelayboxError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(storage)
}

fn to_json(value: &serde_json::Value) -> Result<String, RelayboxError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| RelayboxError::Internal(format!("failed to encode JSON: {e}")))
}

/// Aggregate statistics over active files.
pub async fn stats_json(store: &dyn MetadataStore) -> Result<serde_json::Value, RelayboxError> {
    let stats = store.aggregate_stats().await?;
    Ok(serde_json::json!({
        "total_files": stats.total_files,
        "total_size": stats.total_size,
        "counts_by_type": stats.counts_by_type,
    }))
}

/// One page of a user's active files, newest first.
pub async fn files_json(
    store: &dyn MetadataStore,
    user_id: i64,
    page: u32,
) -> Result<serde_json::Value, RelayboxError> {
    let page = page.max(1);
    let offset = (page - 1).saturating_mul(PAGE_SIZE);
    let files = store.list_by_owner(user_id, PAGE_SIZE, offset).await?;
    let session = store.get_user_session(user_id).await?;

    Ok(serde_json::json!({
        "user_id": user_id,
        "page": page,
        "files": files,
        "session": session,
    }))
}

/// Runs `relaybox stats`.
pub async fn run_stats(config: &RelayboxConfig) -> Result<(), RelayboxError> {
    let store = open_store(config).await?;
    let value = stats_json(&store).await;
    store.close().await?;
    println!("{}", to_json(&value?)?);
    Ok(())
}

/// Runs `relaybox files --user <id>`.
pub async fn run_files(
    config: &RelayboxConfig,
    user_id: i64,
    page: u32,
) -> Result<(), RelayboxError> {
    let store = open_store(config).await?;
    let value = files_json(&store, user_id, page).await;
    store.close().await?;
    println!("{}", to_json(&value?)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaybox_config::model::StorageConfig;
    use relaybox_core::types::{FileType, NewFileRecord, RelayRef};

    async fn temp_store() -> (SqliteStorage, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("inspect.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        (storage, dir)
    }

    fn record(
        file_id: &str,
        owner: i64,
        size: u64,
        file_type: FileType,
        message_id: i32,
    ) -> NewFileRecord {
        NewFileRecord {
            file_id: file_id.into(),
            filename: format!("{file_id}.bin"),
            file_size: size,
            file_type,
            mime_type: None,
            relay_ref: RelayRef {
                channel_id: -100,
                message_id,
            },
            owner_user_id: Some(owner),
            is_private: false,
        }
    }

    #[tokio::test]
    async fn stats_reflect_active_files() {
        let (store, _dir) = temp_store().await;
        store.insert_file(&record("11111111AAAAAA", 1, 100, FileType::Document, 1)).await.unwrap();
        store.insert_file(&record("22222222BBBBBB", 1, 50, FileType::Photo, 2)).await.unwrap();
        store.insert_file(&record("33333333CCCCCC", 2, 25, FileType::Photo, 3)).await.unwrap();
        store.soft_delete("33333333CCCCCC").await.unwrap();

        let value = stats_json(&store).await.unwrap();
        assert_eq!(value["total_files"], 2);
        assert_eq!(value["total_size"], 150);
        assert_eq!(value["counts_by_type"]["photo"], 1);
        assert_eq!(value["counts_by_type"]["document"], 1);
    }

    #[tokio::test]
    async fn files_lists_only_the_owner() {
        let (store, _dir) = temp_store().await;
        store.insert_file(&record("11111111AAAAAA", 7, 10, FileType::Audio, 1)).await.unwrap();
        store.insert_file(&record("22222222BBBBBB", 8, 10, FileType::Audio, 2)).await.unwrap();

        let value = files_json(&store, 7, 0).await.unwrap();
        assert_eq!(value["page"], 1);
        let files = value["files"].as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["file_id"], "11111111AAAAAA");
        assert_eq!(value["session"]["total_uploads"], 1);
    }

    #[tokio::test]
    async fn files_for_unknown_user_is_empty() {
        let (store, _dir) = temp_store().await;
        let value = files_json(&store, 999, 3).await.unwrap();
        assert!(value["files"].as_array().unwrap().is_empty());
        assert!(value["session"].is_null());
    }
}
