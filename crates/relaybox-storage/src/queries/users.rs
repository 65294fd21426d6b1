// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User session operations.

use relaybox_core::RelayboxError;
use relaybox_core::types::{UserProfile, UserSession};
use rusqlite::params;

use crate::database::Database;

/// Creates the session row or refreshes its display fields and activity
/// timestamp. Counters are left as they are.
pub async fn touch_user(db: &Database, profile: &UserProfile) -> Result<(), RelayboxError> {
    let profile = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO user_sessions (user_id, username, first_name, last_name, last_activity)
                 VALUES (?1, ?2, ?3, ?4, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(user_id) DO UPDATE SET
                     username = COALESCE(excluded.username, username),
                     first_name = COALESCE(excluded.first_name, first_name),
                     last_name = COALESCE(excluded.last_name, last_name),
                     last_activity = excluded.last_activity",
                params![
                    profile.user_id,
                    profile.username,
                    profile.first_name,
                    profile.last_name,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Reads a user's counters.
pub async fn get_user_session(
    db: &Database,
    user_id: i64,
) -> Result<Option<UserSession>, RelayboxError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, username, first_name, last_name, last_activity,
                        total_uploads, total_downloads, storage_used
                 FROM user_sessions WHERE user_id = ?1",
            )?;
            let result = stmt.query_row(params![user_id], |row| {
                let uploads: i64 = row.get(5)?;
                let downloads: i64 = row.get(6)?;
                let storage: i64 = row.get(7)?;
                Ok(UserSession {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    first_name: row.get(2)?,
                    last_name: row.get(3)?,
                    last_activity: row.get(4)?,
                    total_uploads: uploads.max(0) as u64,
                    total_downloads: downloads.max(0) as u64,
                    storage_used: storage.max(0) as u64,
                })
            });
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(user_id: i64, username: Option<&str>) -> UserProfile {
        UserProfile {
            user_id,
            username: username.map(str::to_string),
            first_name: Some("Ada".to_string()),
            last_name: None,
        }
    }

    #[tokio::test]
    async fn touch_creates_session_with_zero_counters() {
        let db = Database::open_in_memory().await.unwrap();
        touch_user(&db, &profile(7, Some("ada"))).await.unwrap();

        let session = get_user_session(&db, 7).await.unwrap().unwrap();
        assert_eq!(session.username.as_deref(), Some("ada"));
        assert_eq!(session.first_name.as_deref(), Some("Ada"));
        assert_eq!(session.total_uploads, 0);
        assert_eq!(session.total_downloads, 0);
        assert_eq!(session.storage_used, 0);
        assert!(!session.last_activity.is_empty());
    }

    #[tokio::test]
    async fn touch_keeps_known_names_and_counters() {
        let db = Database::open_in_memory().await.unwrap();
        touch_user(&db, &profile(7, Some("ada"))).await.unwrap();
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "UPDATE user_sessions SET total_uploads = 3 WHERE user_id = 7",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        touch_user(&db, &UserProfile::anonymous(7)).await.unwrap();

        let session = get_user_session(&db, 7).await.unwrap().unwrap();
        assert_eq!(session.username.as_deref(), Some("ada"));
        assert_eq!(session.total_uploads, 3);
    }

    #[tokio::test]
    async fn unknown_user_has_no_session() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(get_user_session(&db, 404).await.unwrap().is_none());
    }
}
