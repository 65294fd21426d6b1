// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shortened URL log.

use relaybox_core::RelayboxError;
use rusqlite::params;

use crate::database::Database;

/// Records a shortened URL. Returns the new row id.
pub async fn insert_shortened_url(
    db: &Database,
    original_url: &str,
    short_url: &str,
    alias: Option<&str>,
    user_id: Option<i64>,
) -> Result<i64, RelayboxError> {
    let original_url = original_url.to_string();
    let short_url = short_url.to_string();
    let alias = alias.map(str::to_string);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO shortened_urls (original_url, short_url, alias, user_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![original_url, short_url, alias, user_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
