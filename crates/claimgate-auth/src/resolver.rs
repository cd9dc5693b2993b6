// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity resolution: reconciles a newly observed external identity
//! against the current and legacy mapping stores.
//!
//! The current store is authoritative; the legacy store only bootstraps
//! it. When the legacy records reachable from a login's alternate ids do
//! not agree on a single local account, resolution fails without touching
//! either store -- a choice between non-convergent identities is never
//! made automatically.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use claimgate_core::{
    ClaimgateError, Identity, IdentityStore, LegacyIdentity, LegacyIdentityStore, MappingCandidate,
};

/// Current UTC time as an ISO-8601 string, millisecond precision.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Local account id derived from an external id when no mapping history
/// exists.
///
/// With `strip_domain`, distinct external ids sharing a local part
/// collapse onto the same account; deployments enabling it must guarantee
/// local-part uniqueness across trusted issuers.
fn derive_local_id(external_id: &str, strip_domain: bool) -> &str {
    if strip_domain {
        external_id.split('@').next().unwrap_or(external_id)
    } else {
        external_id
    }
}

/// Resolves external identities to local account ids, migrating legacy
/// mappings opportunistically.
///
/// Owns no state of its own; everything lives in the two stores, and a
/// lost insert race is recovered by re-reading, so concurrent first
/// logins for the same external id converge on one mapping.
pub struct IdentityResolver {
    identities: Arc<dyn IdentityStore>,
    legacy: Arc<dyn LegacyIdentityStore>,
}

impl IdentityResolver {
    pub fn new(identities: Arc<dyn IdentityStore>, legacy: Arc<dyn LegacyIdentityStore>) -> Self {
        Self { identities, legacy }
    }

    /// Resolve `primary` (with its alternate external ids) to one local
    /// account id.
    ///
    /// Fails with [`ClaimgateError::UnresolvableMapping`] when the
    /// alternates' legacy records diverge to more than one local account;
    /// no store mutation happens on that path.
    pub async fn resolve(
        &self,
        primary: &str,
        alternates: &[String],
        strip_domain: bool,
    ) -> Result<String, ClaimgateError> {
        if let Some(existing) = self.identities.find_by_external_id(primary).await? {
            debug!(
                external_id = %primary,
                local_id = %existing.local_id,
                "resolved from current mapping"
            );
            return Ok(existing.local_id);
        }

        // Alternates are a set: duplicates collapse and order never
        // affects the outcome. The primary id is only ever looked up in
        // the current store.
        let unique: BTreeSet<&str> = alternates.iter().map(String::as_str).collect();
        let mut candidates: BTreeMap<String, Vec<LegacyIdentity>> = BTreeMap::new();
        for alternate in unique {
            if let Some(record) = self.legacy.find_by_legacy_id(alternate).await? {
                if record.local_id.is_empty() {
                    continue;
                }
                candidates
                    .entry(record.local_id.clone())
                    .or_default()
                    .push(record);
            }
        }

        if candidates.len() > 1 {
            let candidates: Vec<MappingCandidate> = candidates
                .into_iter()
                .map(|(local_id, records)| MappingCandidate { local_id, records })
                .collect();
            error!(
                external_id = %primary,
                candidates = candidates.len(),
                "legacy mappings diverge; refusing to pick an account"
            );
            return Err(ClaimgateError::UnresolvableMapping { candidates });
        }

        let local_id = match candidates.pop_first() {
            Some((local_id, records)) => {
                self.migrate_records(&records).await;
                local_id
            }
            None => derive_local_id(primary, strip_domain).to_string(),
        };

        let identity = Identity {
            external_id: primary.to_string(),
            local_id: local_id.clone(),
            nickname: String::new(),
            last_seen: now_timestamp(),
        };
        match self.identities.insert(&identity).await {
            Ok(()) => {
                info!(
                    external_id = %primary,
                    local_id = %local_id,
                    "created identity mapping"
                );
                Ok(local_id)
            }
            Err(ClaimgateError::Duplicate { .. }) => {
                // A concurrent request won the insert race; its row is
                // authoritative.
                match self.identities.find_by_external_id(primary).await? {
                    Some(existing) => Ok(existing.local_id),
                    None => Err(ClaimgateError::Internal(format!(
                        "mapping for {primary} vanished after duplicate insert"
                    ))),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Best-effort migration flagging; a failure is logged, never fatal.
    async fn migrate_records(&self, records: &[LegacyIdentity]) {
        for record in records {
            if let Err(e) = self.legacy.mark_migrated(&record.legacy_id).await {
                warn!(
                    legacy_id = %record.legacy_id,
                    error = %e,
                    "failed to set migrated flag"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use claimgate_config::model::StorageConfig;
    use claimgate_storage::SqliteStorage;
    use claimgate_storage::queries::legacy::insert_legacy_identity;
    use tempfile::tempdir;

    async fn setup_storage() -> (Arc<SqliteStorage>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("resolver.db");
        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        (Arc::new(storage), dir)
    }

    fn resolver_for(storage: &Arc<SqliteStorage>) -> IdentityResolver {
        IdentityResolver::new(storage.clone(), storage.clone())
    }

    async fn seed_legacy(storage: &SqliteStorage, legacy_id: &str, local_id: &str) {
        insert_legacy_identity(
            storage.db().unwrap(),
            &LegacyIdentity {
                legacy_id: legacy_id.to_string(),
                email: None,
                local_id: local_id.to_string(),
                migrated: false,
                last_seen: "2025-06-01T00:00:00.000Z".to_string(),
            },
        )
        .await
        .unwrap();
    }

    fn alts(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn no_history_resolves_verbatim() {
        let (storage, _dir) = setup_storage().await;
        let resolver = resolver_for(&storage);

        let local_id = resolver
            .resolve("user0@example.com", &[], false)
            .await
            .unwrap();
        assert_eq!(local_id, "user0@example.com");

        let inserted = storage
            .find_by_external_id("user0@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(inserted.local_id, "user0@example.com");
        assert_eq!(inserted.nickname, "");
    }

    #[tokio::test]
    async fn no_history_with_strip_domain_drops_suffix() {
        let (storage, _dir) = setup_storage().await;
        let resolver = resolver_for(&storage);

        let local_id = resolver
            .resolve("user0@example.com", &[], true)
            .await
            .unwrap();
        assert_eq!(local_id, "user0");
    }

    #[tokio::test]
    async fn strip_domain_takes_substring_before_first_at() {
        let (storage, _dir) = setup_storage().await;
        let resolver = resolver_for(&storage);

        let local_id = resolver.resolve("user0@a@b", &[], true).await.unwrap();
        assert_eq!(local_id, "user0");
    }

    #[tokio::test]
    async fn resolve_is_idempotent() {
        let (storage, _dir) = setup_storage().await;
        let resolver = resolver_for(&storage);

        let first = resolver
            .resolve("user0@example.com", &[], false)
            .await
            .unwrap();
        let recorded = storage
            .find_by_external_id("user0@example.com")
            .await
            .unwrap()
            .unwrap();

        let second = resolver
            .resolve("user0@example.com", &[], false)
            .await
            .unwrap();
        assert_eq!(first, second);

        // The fast path must not rewrite the existing row.
        let after = storage
            .find_by_external_id("user0@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recorded, after);
    }

    #[tokio::test]
    async fn convergent_alternates_resolve_and_migrate() {
        let (storage, _dir) = setup_storage().await;
        seed_legacy(&storage, "alice@old-idp.example", "alice").await;
        seed_legacy(&storage, "asmith@ancient.example", "alice").await;
        let resolver = resolver_for(&storage);

        let local_id = resolver
            .resolve(
                "alice@new-idp.example",
                &alts(&["alice@old-idp.example", "asmith@ancient.example"]),
                false,
            )
            .await
            .unwrap();
        assert_eq!(local_id, "alice");

        // New current mapping points the primary id at the legacy account.
        let mapping = storage
            .find_by_external_id("alice@new-idp.example")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mapping.local_id, "alice");

        // Both contributing legacy records carry the migrated flag.
        for legacy_id in ["alice@old-idp.example", "asmith@ancient.example"] {
            let record = storage.find_by_legacy_id(legacy_id).await.unwrap().unwrap();
            assert!(record.migrated, "{legacy_id} should be migrated");
        }
    }

    #[tokio::test]
    async fn non_convergent_alternates_fail_without_mutation() {
        let (storage, _dir) = setup_storage().await;
        seed_legacy(&storage, "alice@old-idp.example", "alice").await;
        seed_legacy(&storage, "asmith@ancient.example", "a.smith").await;
        let resolver = resolver_for(&storage);

        let result = resolver
            .resolve(
                "alice@new-idp.example",
                &alts(&["alice@old-idp.example", "asmith@ancient.example"]),
                false,
            )
            .await;

        match result {
            Err(ClaimgateError::UnresolvableMapping { candidates }) => {
                assert_eq!(candidates.len(), 2);
                let locals: Vec<&str> =
                    candidates.iter().map(|c| c.local_id.as_str()).collect();
                assert_eq!(locals, vec!["a.smith", "alice"]);
                assert!(candidates.iter().all(|c| c.records.len() == 1));
            }
            other => panic!("expected UnresolvableMapping, got {other:?}"),
        }

        // The failure path must leave both stores untouched.
        assert!(
            storage
                .find_by_external_id("alice@new-idp.example")
                .await
                .unwrap()
                .is_none()
        );
        for legacy_id in ["alice@old-idp.example", "asmith@ancient.example"] {
            let record = storage.find_by_legacy_id(legacy_id).await.unwrap().unwrap();
            assert!(!record.migrated);
        }
    }

    #[tokio::test]
    async fn alternates_without_legacy_records_contribute_nothing() {
        let (storage, _dir) = setup_storage().await;
        seed_legacy(&storage, "alice@old-idp.example", "alice").await;
        let resolver = resolver_for(&storage);

        let local_id = resolver
            .resolve(
                "alice@new-idp.example",
                &alts(&["unknown@nowhere.example", "alice@old-idp.example"]),
                false,
            )
            .await
            .unwrap();
        assert_eq!(local_id, "alice");
    }

    #[tokio::test]
    async fn alternate_order_does_not_affect_outcome() {
        for order in [
            ["alice@old-idp.example", "asmith@ancient.example"],
            ["asmith@ancient.example", "alice@old-idp.example"],
        ] {
            let (storage, _dir) = setup_storage().await;
            seed_legacy(&storage, "alice@old-idp.example", "alice").await;
            seed_legacy(&storage, "asmith@ancient.example", "alice").await;
            let resolver = resolver_for(&storage);

            let local_id = resolver
                .resolve("alice@new-idp.example", &alts(&order), false)
                .await
                .unwrap();
            assert_eq!(local_id, "alice");
        }
    }

    #[tokio::test]
    async fn empty_legacy_local_id_is_not_a_candidate() {
        let (storage, _dir) = setup_storage().await;
        seed_legacy(&storage, "broken@old-idp.example", "").await;
        let resolver = resolver_for(&storage);

        let local_id = resolver
            .resolve(
                "user0@example.com",
                &alts(&["broken@old-idp.example"]),
                false,
            )
            .await
            .unwrap();
        // The empty mapping contributes nothing; derivation falls through
        // to the primary id.
        assert_eq!(local_id, "user0@example.com");
    }

    #[tokio::test]
    async fn primary_id_is_not_consulted_in_legacy_store() {
        let (storage, _dir) = setup_storage().await;
        // A legacy record under the primary id itself must be ignored.
        seed_legacy(&storage, "user0@example.com", "somebody-else").await;
        let resolver = resolver_for(&storage);

        let local_id = resolver
            .resolve("user0@example.com", &[], false)
            .await
            .unwrap();
        assert_eq!(local_id, "user0@example.com");
    }

    // Scripted store double for the insert-race path: the first lookup
    // misses, the insert reports a duplicate, and the re-read returns the
    // concurrent winner's row.
    struct RacingStore {
        lookups: std::sync::Mutex<u32>,
    }

    #[async_trait]
    impl IdentityStore for RacingStore {
        async fn find_by_external_id(
            &self,
            external_id: &str,
        ) -> Result<Option<Identity>, ClaimgateError> {
            let mut lookups = self.lookups.lock().unwrap();
            *lookups += 1;
            if *lookups == 1 {
                Ok(None)
            } else {
                Ok(Some(Identity {
                    external_id: external_id.to_string(),
                    local_id: "winner".to_string(),
                    nickname: String::new(),
                    last_seen: "2026-01-01T00:00:00.000Z".to_string(),
                }))
            }
        }

        async fn find_by_nickname(&self, _: &str) -> Result<Vec<Identity>, ClaimgateError> {
            Ok(Vec::new())
        }

        async fn find_expired(&self, _: &str) -> Result<Vec<String>, ClaimgateError> {
            Ok(Vec::new())
        }

        async fn insert(&self, identity: &Identity) -> Result<(), ClaimgateError> {
            Err(ClaimgateError::Duplicate {
                key: identity.external_id.clone(),
            })
        }

        async fn update(&self, _: &Identity) -> Result<(), ClaimgateError> {
            Ok(())
        }

        async fn touch_last_seen(&self, _: &str) -> Result<(), ClaimgateError> {
            Ok(())
        }
    }

    struct EmptyLegacyStore;

    #[async_trait]
    impl LegacyIdentityStore for EmptyLegacyStore {
        async fn find_by_legacy_id(
            &self,
            _: &str,
        ) -> Result<Option<LegacyIdentity>, ClaimgateError> {
            Ok(None)
        }

        async fn find_for_local_id(&self, _: &str) -> Result<Vec<LegacyIdentity>, ClaimgateError> {
            Ok(Vec::new())
        }

        async fn search(&self, _: &str) -> Result<Vec<LegacyIdentity>, ClaimgateError> {
            Ok(Vec::new())
        }

        async fn find_expired(&self, _: &str) -> Result<Vec<String>, ClaimgateError> {
            Ok(Vec::new())
        }

        async fn mark_migrated(&self, _: &str) -> Result<(), ClaimgateError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn lost_insert_race_recovers_by_rereading() {
        let resolver = IdentityResolver::new(
            Arc::new(RacingStore {
                lookups: std::sync::Mutex::new(0),
            }),
            Arc::new(EmptyLegacyStore),
        );

        let local_id = resolver
            .resolve("user0@example.com", &[], false)
            .await
            .unwrap();
        assert_eq!(local_id, "winner");
    }
}
