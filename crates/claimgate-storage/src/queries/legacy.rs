// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Legacy identity mapping queries.
//!
//! The legacy table is inherited from the predecessor system and is never
//! written during resolution except to flip the `migrated` flag.
//! `insert_legacy_identity` exists for import tooling and test fixtures
//! only.

use claimgate_core::ClaimgateError;
use rusqlite::params;

use crate::database::Database;
use crate::models::LegacyIdentity;

fn row_to_legacy(row: &rusqlite::Row<'_>) -> Result<LegacyIdentity, rusqlite::Error> {
    Ok(LegacyIdentity {
        legacy_id: row.get(0)?,
        email: row.get(1)?,
        local_id: row.get(2)?,
        migrated: row.get(3)?,
        last_seen: row.get(4)?,
    })
}

/// Get a legacy identity by legacy id (exact, case-sensitive).
pub async fn get_legacy_identity(
    db: &Database,
    legacy_id: &str,
) -> Result<Option<LegacyIdentity>, ClaimgateError> {
    let legacy_id = legacy_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT legacy_id, email, local_id, migrated, last_seen
                 FROM legacy_identities WHERE legacy_id = ?1",
            )?;
            let result = stmt.query_row(params![legacy_id], row_to_legacy);
            match result {
                Ok(identity) => Ok(Some(identity)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All legacy records pointing at one local account.
pub async fn find_for_local_id(
    db: &Database,
    local_id: &str,
) -> Result<Vec<LegacyIdentity>, ClaimgateError> {
    let local_id = local_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT legacy_id, email, local_id, migrated, last_seen
                 FROM legacy_identities WHERE local_id = ?1 ORDER BY legacy_id",
            )?;
            let rows = stmt.query_map(params![local_id], row_to_legacy)?;
            let mut identities = Vec::new();
            for row in rows {
                identities.push(row?);
            }
            Ok(identities)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Case-insensitive search by legacy id or recorded e-mail.
pub async fn search_legacy(
    db: &Database,
    pattern: &str,
) -> Result<Vec<LegacyIdentity>, ClaimgateError> {
    let pattern = pattern.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT legacy_id, email, local_id, migrated, last_seen
                 FROM legacy_identities
                 WHERE LOWER(legacy_id) = LOWER(?1) OR LOWER(email) = LOWER(?1)
                 ORDER BY legacy_id",
            )?;
            let rows = stmt.query_map(params![pattern], row_to_legacy)?;
            let mut identities = Vec::new();
            for row in rows {
                identities.push(row?);
            }
            Ok(identities)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Local ids whose newest legacy activity is at or before `threshold`.
pub async fn find_expired(db: &Database, threshold: &str) -> Result<Vec<String>, ClaimgateError> {
    let threshold = threshold.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT local_id FROM legacy_identities
                 GROUP BY local_id HAVING MAX(last_seen) <= ?1",
            )?;
            let rows = stmt.query_map(params![threshold], |row| row.get::<_, String>(0))?;
            let mut local_ids = Vec::new();
            for row in rows {
                local_ids.push(row?);
            }
            Ok(local_ids)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Idempotent flip of the `migrated` flag; no-op when already set or when
/// no such record exists.
pub async fn mark_migrated(db: &Database, legacy_id: &str) -> Result<(), ClaimgateError> {
    let legacy_id = legacy_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE legacy_identities SET migrated = 1 WHERE legacy_id = ?1",
                params![legacy_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a legacy mapping row. Import tooling and test fixtures only;
/// resolution never creates legacy records.
pub async fn insert_legacy_identity(
    db: &Database,
    identity: &LegacyIdentity,
) -> Result<(), ClaimgateError> {
    let identity = identity.clone();
    let key = identity.legacy_id.clone();
    let inserted = db
        .connection()
        .call(move |conn| {
            match conn.execute(
                "INSERT INTO legacy_identities (legacy_id, email, local_id, migrated, last_seen)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    identity.legacy_id,
                    identity.email,
                    identity.local_id,
                    identity.migrated,
                    identity.last_seen,
                ],
            ) {
                Ok(_) => Ok(true),
                Err(e) if crate::database::is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if inserted {
        Ok(())
    } else {
        Err(ClaimgateError::Duplicate { key })
    }
}
