// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Current identity mapping CRUD operations.

use claimgate_core::ClaimgateError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Identity;

/// Insert a new identity mapping row.
///
/// Fails with [`ClaimgateError::Duplicate`] when a row for the same
/// external id already exists.
pub async fn insert_identity(db: &Database, identity: &Identity) -> Result<(), ClaimgateError> {
    let identity = identity.clone();
    let key = identity.external_id.clone();
    let inserted = db
        .connection()
        .call(move |conn| {
            match conn.execute(
                "INSERT INTO identities (external_id, local_id, nickname, last_seen)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    identity.external_id,
                    identity.local_id,
                    identity.nickname,
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

/// Get an identity mapping by external id (exact, case-sensitive).
pub async fn get_identity(
    db: &Database,
    external_id: &str,
) -> Result<Option<Identity>, ClaimgateError> {
    let external_id = external_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT external_id, local_id, nickname, last_seen
                 FROM identities WHERE external_id = ?1",
            )?;
            let result = stmt.query_row(params![external_id], |row| {
                Ok(Identity {
                    external_id: row.get(0)?,
                    local_id: row.get(1)?,
                    nickname: row.get(2)?,
                    last_seen: row.get(3)?,
                })
            });
            match result {
                Ok(identity) => Ok(Some(identity)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Case-insensitive nickname search, newest activity first.
pub async fn find_by_nickname(
    db: &Database,
    nickname: &str,
) -> Result<Vec<Identity>, ClaimgateError> {
    let nickname = nickname.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT external_id, local_id, nickname, last_seen
                 FROM identities WHERE LOWER(nickname) = LOWER(?1)
                 ORDER BY last_seen DESC",
            )?;
            let rows = stmt.query_map(params![nickname], |row| {
                Ok(Identity {
                    external_id: row.get(0)?,
                    local_id: row.get(1)?,
                    nickname: row.get(2)?,
                    last_seen: row.get(3)?,
                })
            })?;
            let mut identities = Vec::new();
            for row in rows {
                identities.push(row?);
            }
            Ok(identities)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Local ids whose newest mapping activity is at or before `threshold`.
pub async fn find_expired(db: &Database, threshold: &str) -> Result<Vec<String>, ClaimgateError> {
    let threshold = threshold.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT local_id FROM identities
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

/// Full replace of an identity mapping by external id.
pub async fn update_identity(db: &Database, identity: &Identity) -> Result<(), ClaimgateError> {
    let identity = identity.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE identities SET local_id = ?1, nickname = ?2, last_seen = ?3
                 WHERE external_id = ?4",
                params![
                    identity.local_id,
                    identity.nickname,
                    identity.last_seen,
                    identity.external_id,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Stamp a mapping's `last_seen` with the current time.
pub async fn touch_last_seen(db: &Database, external_id: &str) -> Result<(), ClaimgateError> {
    let external_id = external_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE identities SET last_seen = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE external_id = ?1",
                params![external_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
