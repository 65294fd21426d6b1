// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File record operations.
//!
//! Inserts and download increments update the owner's `user_sessions` row in
//! the same transaction as the `files` row.

use std::collections::BTreeMap;
use std::str::FromStr;

use relaybox_core::RelayboxError;
use relaybox_core::types::{FileRecord, FileStats, FileType, NewFileRecord, RelayRef};
use rusqlite::{Row, params};

use crate::database::Database;

const FILE_COLUMNS: &str = "file_id, filename, file_size, file_type, mime_type, channel_id, \
     message_id, user_id, created_at, download_count, mirror_link, is_private, is_deleted";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    let file_type: String = row.get(3)?;
    let file_type = FileType::from_str(&file_type).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let file_size: i64 = row.get(2)?;
    let download_count: i64 = row.get(9)?;

    Ok(FileRecord {
        file_id: row.get(0)?,
        filename: row.get(1)?,
        file_size: file_size.max(0) as u64,
        file_type,
        mime_type: row.get(4)?,
        relay_ref: RelayRef {
            channel_id: row.get(5)?,
            message_id: row.get(6)?,
        },
        owner_user_id: row.get(7)?,
        created_at: row.get(8)?,
        download_count: download_count.max(0) as u64,
        external_mirror_link: row.get(10)?,
        is_private: row.get(11)?,
        is_deleted: row.get(12)?,
    })
}

fn size_to_sql(size: u64) -> Result<i64, RelayboxError> {
    i64::try_from(size).map_err(|e| RelayboxError::Storage {
        source: Box::new(e),
    })
}

/// Inserts a file and bumps its owner's upload counters atomically.
///
/// Returns [`RelayboxError::DuplicateFileId`] if any row, deleted or not,
/// already uses the id. Nothing is written in that case.
pub async fn insert_file(
    db: &Database,
    record: &NewFileRecord,
) -> Result<FileRecord, RelayboxError> {
    let record = record.clone();
    let file_id = record.file_id.clone();
    let file_size = size_to_sql(record.file_size)?;

    let inserted = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let changed = tx.execute(
                "INSERT INTO files (file_id, filename, file_size, file_type, mime_type,
                                    channel_id, message_id, user_id, is_private)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(file_id) DO NOTHING",
                params![
                    record.file_id,
                    record.filename,
                    file_size,
                    record.file_type.to_string(),
                    record.mime_type,
                    record.relay_ref.channel_id,
                    record.relay_ref.message_id,
                    record.owner_user_id,
                    record.is_private,
                ],
            )?;
            if changed == 0 {
                // Dropping the transaction rolls it back.
                return Ok(None);
            }

            if let Some(user_id) = record.owner_user_id {
                tx.execute(
                    "INSERT INTO user_sessions (user_id, total_uploads, storage_used, last_activity)
                     VALUES (?1, 1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                     ON CONFLICT(user_id) DO UPDATE SET
                         total_uploads = total_uploads + 1,
                         storage_used = storage_used + excluded.storage_used,
                         last_activity = excluded.last_activity",
                    params![user_id, file_size],
                )?;
            }

            let stored = tx.query_row(
                &format!("SELECT {FILE_COLUMNS} FROM files WHERE file_id = ?1"),
                params![record.file_id],
                row_to_record,
            )?;
            tx.commit()?;
            Ok(Some(stored))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    inserted.ok_or(RelayboxError::DuplicateFileId(file_id))
}

/// Whether any row, including deleted ones, uses this id.
pub async fn contains_file_id(db: &Database, file_id: &str) -> Result<bool, RelayboxError> {
    let file_id = file_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM files WHERE file_id = ?1)",
                params![file_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Looks up a file by id. Deleted rows are only returned when
/// `include_deleted` is set.
pub async fn get_file(
    db: &Database,
    file_id: &str,
    include_deleted: bool,
) -> Result<Option<FileRecord>, RelayboxError> {
    let file_id = file_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FILE_COLUMNS} FROM files
                 WHERE file_id = ?1 AND (?2 OR is_deleted = 0)"
            ))?;
            let result = stmt.query_row(params![file_id, include_deleted], row_to_record);
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Bumps the download counter and the acting user's total in one transaction.
///
/// Returns `false` without touching either table if the file is unknown or
/// deleted.
pub async fn increment_download(
    db: &Database,
    file_id: &str,
    user_id: Option<i64>,
) -> Result<bool, RelayboxError> {
    let file_id = file_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE files SET download_count = download_count + 1
                 WHERE file_id = ?1 AND is_deleted = 0",
                params![file_id],
            )?;
            if changed == 0 {
                return Ok(false);
            }

            if let Some(user_id) = user_id {
                tx.execute(
                    "INSERT INTO user_sessions (user_id, total_downloads, last_activity)
                     VALUES (?1, 1, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                     ON CONFLICT(user_id) DO UPDATE SET
                         total_downloads = total_downloads + 1,
                         last_activity = excluded.last_activity",
                    params![user_id],
                )?;
            }
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flips `is_deleted`. Returns whether an active row was changed.
pub async fn soft_delete(db: &Database, file_id: &str) -> Result<bool, RelayboxError> {
    let file_id = file_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE files SET is_deleted = 1 WHERE file_id = ?1 AND is_deleted = 0",
                params![file_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// A user's active files, newest first.
pub async fn list_by_owner(
    db: &Database,
    user_id: i64,
    limit: u32,
    offset: u32,
) -> Result<Vec<FileRecord>, RelayboxError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FILE_COLUMNS} FROM files
                 WHERE user_id = ?1 AND is_deleted = 0
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt.query_map(params![user_id, limit, offset], row_to_record)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Totals over active files.
pub async fn aggregate_stats(db: &Database) -> Result<FileStats, RelayboxError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT file_type, COUNT(*), COALESCE(SUM(file_size), 0)
                 FROM files WHERE is_deleted = 0
                 GROUP BY file_type",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?;

            let mut stats = FileStats {
                total_files: 0,
                total_size: 0,
                counts_by_type: BTreeMap::new(),
            };
            for row in rows {
                let (file_type, count, size) = row?;
                let count = count.max(0) as u64;
                stats.total_files += count;
                stats.total_size += size.max(0) as u64;
                stats.counts_by_type.insert(file_type, count);
            }
            Ok(stats)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Sets the mirror link on an active file that has none yet.
pub async fn set_mirror_link(
    db: &Database,
    file_id: &str,
    link: &str,
) -> Result<bool, RelayboxError> {
    let file_id = file_id.to_string();
    let link = link.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE files SET mirror_link = ?2
                 WHERE file_id = ?1 AND is_deleted = 0 AND mirror_link IS NULL",
                params![file_id, link],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI32, Ordering};

    use super::*;
    use crate::queries::users;

    static NEXT_MESSAGE_ID: AtomicI32 = AtomicI32::new(1);

    fn new_record(file_id: &str, owner: Option<i64>, size: u64) -> NewFileRecord {
        NewFileRecord {
            file_id: file_id.to_string(),
            filename: format!("{file_id}.pdf"),
            file_size: size,
            file_type: FileType::Document,
            mime_type: Some("application/pdf".to_string()),
            relay_ref: RelayRef {
                channel_id: -100123,
                message_id: NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed),
            },
            owner_user_id: owner,
            is_private: false,
        }
    }

    #[tokio::test]
    async fn insert_then_get_roundtrip() {
        let db = Database::open_in_memory().await.unwrap();
        let stored = insert_file(&db, &new_record("A1", Some(42), 1024)).await.unwrap();

        assert_eq!(stored.file_id, "A1");
        assert_eq!(stored.download_count, 0);
        assert!(!stored.is_deleted);
        assert!(stored.external_mirror_link.is_none());
        assert!(!stored.created_at.is_empty());

        let fetched = get_file(&db, "A1", false).await.unwrap().unwrap();
        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn insert_updates_owner_counters() {
        let db = Database::open_in_memory().await.unwrap();
        insert_file(&db, &new_record("A1", Some(42), 1000)).await.unwrap();
        insert_file(&db, &new_record("A2", Some(42), 24)).await.unwrap();

        let session = users::get_user_session(&db, 42).await.unwrap().unwrap();
        assert_eq!(session.total_uploads, 2);
        assert_eq!(session.storage_used, 1024);
        assert_eq!(session.total_downloads, 0);
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected_without_side_effects() {
        let db = Database::open_in_memory().await.unwrap();
        insert_file(&db, &new_record("DUP", Some(1), 10)).await.unwrap();

        let err = insert_file(&db, &new_record("DUP", Some(1), 99)).await.unwrap_err();
        assert!(matches!(err, RelayboxError::DuplicateFileId(id) if id == "DUP"));

        let session = users::get_user_session(&db, 1).await.unwrap().unwrap();
        assert_eq!(session.total_uploads, 1);
        assert_eq!(session.storage_used, 10);
    }

    #[tokio::test]
    async fn relay_message_backs_only_one_file() {
        let db = Database::open_in_memory().await.unwrap();
        let first = new_record("REF1", Some(9), 10);
        insert_file(&db, &first).await.unwrap();

        let mut second = new_record("REF2", Some(9), 20);
        second.relay_ref = first.relay_ref;
        let err = insert_file(&db, &second).await.unwrap_err();
        assert!(!matches!(err, RelayboxError::DuplicateFileId(_)), "got: {err:?}");

        assert!(!contains_file_id(&db, "REF2").await.unwrap());
        let session = users::get_user_session(&db, 9).await.unwrap().unwrap();
        assert_eq!(session.total_uploads, 1);
        assert_eq!(session.storage_used, 10);
    }

    #[tokio::test]
    async fn deleted_ids_stay_reserved() {
        let db = Database::open_in_memory().await.unwrap();
        insert_file(&db, &new_record("GONE", None, 1)).await.unwrap();
        assert!(soft_delete(&db, "GONE").await.unwrap());

        assert!(contains_file_id(&db, "GONE").await.unwrap());
        let err = insert_file(&db, &new_record("GONE", None, 1)).await.unwrap_err();
        assert!(matches!(err, RelayboxError::DuplicateFileId(_)));
    }

    #[tokio::test]
    async fn system_upload_has_no_session() {
        let db = Database::open_in_memory().await.unwrap();
        let stored = insert_file(&db, &new_record("SYS", None, 5)).await.unwrap();
        assert!(stored.owner_user_id.is_none());
    }

    #[tokio::test]
    async fn deleted_files_are_hidden_except_from_admin_reads() {
        let db = Database::open_in_memory().await.unwrap();
        insert_file(&db, &new_record("X", Some(1), 1)).await.unwrap();

        assert!(soft_delete(&db, "X").await.unwrap());
        assert!(!soft_delete(&db, "X").await.unwrap());
        assert!(get_file(&db, "X", false).await.unwrap().is_none());

        let admin = get_file(&db, "X", true).await.unwrap().unwrap();
        assert!(admin.is_deleted);
    }

    #[tokio::test]
    async fn soft_delete_unknown_returns_false() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(!soft_delete(&db, "NOPE").await.unwrap());
    }

    #[tokio::test]
    async fn increment_download_updates_both_tables() {
        let db = Database::open_in_memory().await.unwrap();
        insert_file(&db, &new_record("D", Some(1), 1)).await.unwrap();

        assert!(increment_download(&db, "D", Some(2)).await.unwrap());
        assert!(increment_download(&db, "D", None).await.unwrap());

        let record = get_file(&db, "D", false).await.unwrap().unwrap();
        assert_eq!(record.download_count, 2);
        let downloader = users::get_user_session(&db, 2).await.unwrap().unwrap();
        assert_eq!(downloader.total_downloads, 1);
        assert_eq!(downloader.total_uploads, 0);
    }

    #[tokio::test]
    async fn increment_download_on_missing_or_deleted_is_noop() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(!increment_download(&db, "MISSING", Some(9)).await.unwrap());
        assert!(users::get_user_session(&db, 9).await.unwrap().is_none());

        insert_file(&db, &new_record("DEL", Some(1), 1)).await.unwrap();
        soft_delete(&db, "DEL").await.unwrap();
        assert!(!increment_download(&db, "DEL", Some(9)).await.unwrap());
        let record = get_file(&db, "DEL", true).await.unwrap().unwrap();
        assert_eq!(record.download_count, 0);
    }

    #[tokio::test]
    async fn list_by_owner_is_newest_first_and_paged() {
        let db = Database::open_in_memory().await.unwrap();
        for id in ["F1", "F2", "F3"] {
            insert_file(&db, &new_record(id, Some(5), 1)).await.unwrap();
        }
        insert_file(&db, &new_record("OTHER", Some(6), 1)).await.unwrap();
        soft_delete(&db, "F2").await.unwrap();

        let all = list_by_owner(&db, 5, 10, 0).await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.file_id.as_str()).collect();
        assert_eq!(ids, vec!["F3", "F1"]);

        let page = list_by_owner(&db, 5, 1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].file_id, "F1");
    }

    #[tokio::test]
    async fn aggregate_stats_excludes_deleted() {
        let db = Database::open_in_memory().await.unwrap();
        insert_file(&db, &new_record("S1", None, 100)).await.unwrap();
        let mut photo = new_record("S2", None, 50);
        photo.file_type = FileType::Photo;
        insert_file(&db, &photo).await.unwrap();
        insert_file(&db, &new_record("S3", None, 1000)).await.unwrap();
        soft_delete(&db, "S3").await.unwrap();

        let stats = aggregate_stats(&db).await.unwrap();
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_size, 150);
        assert_eq!(stats.counts_by_type.get("document"), Some(&1));
        assert_eq!(stats.counts_by_type.get("photo"), Some(&1));
    }

    #[tokio::test]
    async fn empty_store_has_zero_stats() {
        let db = Database::open_in_memory().await.unwrap();
        let stats = aggregate_stats(&db).await.unwrap();
        assert_eq!(stats, FileStats::default());
    }

    #[tokio::test]
    async fn mirror_link_is_set_once() {
        let db = Database::open_in_memory().await.unwrap();
        insert_file(&db, &new_record("M", None, 1)).await.unwrap();

        assert!(set_mirror_link(&db, "M", "https://drive/1").await.unwrap());
        assert!(!set_mirror_link(&db, "M", "https://drive/2").await.unwrap());
        let record = get_file(&db, "M", false).await.unwrap().unwrap();
        assert_eq!(record.external_mirror_link.as_deref(), Some("https://drive/1"));

        assert!(!set_mirror_link(&db, "UNKNOWN", "x").await.unwrap());
    }
}
