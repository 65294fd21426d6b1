// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use relaybox_core::RelayboxError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Handle to the metadata database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database at `path`, applies PRAGMAs and runs
    /// pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, RelayboxError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| RelayboxError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| RelayboxError::Storage {
                source: Box::new(e),
            })?;

        let db = Self { conn };
        db.configure(wal_mode).await?;
        db.migrate().await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database. Used by tests.
    pub async fn open_in_memory() -> Result<Self, RelayboxError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RelayboxError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.configure(false).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// The single writer connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoints the WAL so the main database file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), RelayboxError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn configure(&self, wal_mode: bool) -> Result<(), RelayboxError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    // journal_mode returns a row, so it cannot go through execute_batch.
                    conn.query_row("PRAGMA journal_mode = WAL;", [], |_| Ok(()))?;
                }
                conn.execute_batch(
                    "PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = 5000;
                     PRAGMA synchronous = NORMAL;",
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn migrate(&self) -> Result<(), RelayboxError> {
        self.conn
            .call(|conn| -> Result<Result<(), RelayboxError>, rusqlite::Error> {
                Ok(migrations::run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)?
    }
}

/// Maps a tokio-rusqlite error into [`RelayboxError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> RelayboxError {
    RelayboxError::Storage {
        source: Box::new(e),
    }
}
