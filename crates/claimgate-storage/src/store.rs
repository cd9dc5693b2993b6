// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the identity store traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use claimgate_config::model::StorageConfig;
use claimgate_core::{ClaimgateError, Identity, IdentityStore, LegacyIdentity, LegacyIdentityStore};

use crate::database::Database;
use crate::queries;

/// SQLite-backed identity mapping storage.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. One instance serves both the current and the
/// legacy store trait; both tables live in the same database file. The
/// database is lazily opened on the first call to [`SqliteStorage::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

/// Row counts reported by `claimgate status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingStats {
    pub identities: i64,
    pub legacy_total: i64,
    pub legacy_migrated: i64,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is
    /// called.
    ///
    /// [`initialize`]: SqliteStorage::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database at the configured path and run migrations.
    pub async fn initialize(&self) -> Result<(), ClaimgateError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ClaimgateError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite identity storage initialized");
        Ok(())
    }

    /// Checkpoint the WAL and flush before shutdown.
    pub async fn close(&self) -> Result<(), ClaimgateError> {
        self.db()?.close().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    /// Returns the underlying Database, or an error if not initialized.
    pub fn db(&self) -> Result<&Database, ClaimgateError> {
        self.db.get().ok_or_else(|| ClaimgateError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Row counts over both mapping tables, for admin reporting.
    pub async fn mapping_stats(&self) -> Result<MappingStats, ClaimgateError> {
        self.db()?
            .connection()
            .call(|conn| {
                let identities: i64 =
                    conn.query_row("SELECT COUNT(*) FROM identities", [], |row| row.get(0))?;
                let legacy_total: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM legacy_identities",
                    [],
                    |row| row.get(0),
                )?;
                let legacy_migrated: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM legacy_identities WHERE migrated = 1",
                    [],
                    |row| row.get(0),
                )?;
                Ok(MappingStats {
                    identities,
                    legacy_total,
                    legacy_migrated,
                })
            })
            .await
            .map_err(crate::database::map_tr_err)
    }
}

#[async_trait]
impl IdentityStore for SqliteStorage {
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Identity>, ClaimgateError> {
        queries::identities::get_identity(self.db()?, external_id).await
    }

    async fn find_by_nickname(&self, nickname: &str) -> Result<Vec<Identity>, ClaimgateError> {
        queries::identities::find_by_nickname(self.db()?, nickname).await
    }

    async fn find_expired(&self, threshold: &str) -> Result<Vec<String>, ClaimgateError> {
        queries::identities::find_expired(self.db()?, threshold).await
    }

    async fn insert(&self, identity: &Identity) -> Result<(), ClaimgateError> {
        queries::identities::insert_identity(self.db()?, identity).await
    }

    async fn update(&self, identity: &Identity) -> Result<(), ClaimgateError> {
        queries::identities::update_identity(self.db()?, identity).await
    }

    async fn touch_last_seen(&self, external_id: &str) -> Result<(), ClaimgateError> {
        queries::identities::touch_last_seen(self.db()?, external_id).await
    }
}

#[async_trait]
impl LegacyIdentityStore for SqliteStorage {
    async fn find_by_legacy_id(
        &self,
        legacy_id: &str,
    ) -> Result<Option<LegacyIdentity>, ClaimgateError> {
        queries::legacy::get_legacy_identity(self.db()?, legacy_id).await
    }

    async fn find_for_local_id(
        &self,
        local_id: &str,
    ) -> Result<Vec<LegacyIdentity>, ClaimgateError> {
        queries::legacy::find_for_local_id(self.db()?, local_id).await
    }

    async fn search(&self, pattern: &str) -> Result<Vec<LegacyIdentity>, ClaimgateError> {
        queries::legacy::search_legacy(self.db()?, pattern).await
    }

    async fn find_expired(&self, threshold: &str) -> Result<Vec<String>, ClaimgateError> {
        queries::legacy::find_expired(self.db()?, threshold).await
    }

    async fn mark_migrated(&self, legacy_id: &str) -> Result<(), ClaimgateError> {
        queries::legacy::mark_migrated(self.db()?, legacy_id).await
    }
}
