// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language-model interaction log.

use relaybox_core::RelayboxError;
use rusqlite::params;

use crate::database::Database;

/// Records one question/answer pair.
pub async fn log_interaction(
    db: &Database,
    user_id: i64,
    query: &str,
    response: &str,
    kind: &str,
) -> Result<(), RelayboxError> {
    let query = query.to_string();
    let response = response.to_string();
    let kind = kind.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO ai_interactions (user_id, query, response, interaction_type)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, query, response, kind],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn interactions_are_logged_in_order() {
        let db = Database::open_in_memory().await.unwrap();
        log_interaction(&db, 1, "what is this?", "a pdf", "file_analysis")
            .await
            .unwrap();
        log_interaction(&db, 1, "hello", "hi", "chat").await.unwrap();
        log_interaction(&db, 2, "other", "user", "chat").await.unwrap();

        let kinds: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT interaction_type FROM ai_interactions WHERE user_id = 1 ORDER BY id",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        assert_eq!(kinds, vec!["file_analysis", "chat"]);
    }
}
