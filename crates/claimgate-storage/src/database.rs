// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use claimgate_core::ClaimgateError;

/// Handle to the identity mapping database.
///
/// Wraps a single `tokio_rusqlite::Connection`; migrations run on open.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if necessary) the database at `path` and bring the
    /// schema up to date.
    ///
    /// `wal_mode` switches the journal to WAL before any other statement
    /// runs; busy timeout and foreign keys are always set.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, ClaimgateError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ClaimgateError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_sqlite_err)?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")
                    .map_err(map_sqlite_err)?;
            }
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
                .map_err(map_sqlite_err)?;
            crate::migrations::run_migrations(conn)?;
            Ok::<(), ClaimgateError>(())
        })
        .await
        .map_err(map_open_call_err)?;

        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and flush before shutdown.
    pub async fn close(&self) -> Result<(), ClaimgateError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Convert a tokio-rusqlite error into `ClaimgateError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> ClaimgateError {
    ClaimgateError::Storage {
        source: Box::new(e),
    }
}

/// Convert a raw rusqlite error into `ClaimgateError::Storage`.
pub fn map_sqlite_err(e: rusqlite::Error) -> ClaimgateError {
    ClaimgateError::Storage {
        source: Box::new(e),
    }
}

/// Flatten a `call` error whose closure yields [`ClaimgateError`].
///
/// An application error from the closure is surfaced as-is; a transport
/// failure (closed connection, close error) is wrapped as storage.
pub fn map_open_call_err(e: tokio_rusqlite::Error<ClaimgateError>) -> ClaimgateError {
    match e {
        tokio_rusqlite::Error::Error(inner) => inner,
        other => ClaimgateError::Storage {
            source: Box::new(other),
        },
    }
}

/// Whether a rusqlite error is a unique-key constraint violation.
///
/// The stores translate this into [`ClaimgateError::Duplicate`]; it is the
/// signal that a concurrent request already created the row.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
