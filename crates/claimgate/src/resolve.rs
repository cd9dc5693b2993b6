// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `claimgate resolve` command implementation.
//!
//! Runs the identity resolver standalone, outside any login, for
//! account-migration and admin work. A successful resolution mutates the
//! stores exactly like a login would (current mapping created, migrated
//! flags set).

use std::sync::Arc;

use claimgate_auth::IdentityResolver;
use claimgate_config::ClaimgateConfig;
use claimgate_core::ClaimgateError;
use claimgate_storage::SqliteStorage;

/// Run the `claimgate resolve` command.
pub async fn run_resolve(
    config: &ClaimgateConfig,
    external_id: &str,
    alternates: &[String],
) -> Result<(), ClaimgateError> {
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let resolver = IdentityResolver::new(storage.clone(), storage.clone());
    let result = resolver
        .resolve(external_id, alternates, config.backend.strip_domain)
        .await;

    match result {
        Ok(local_id) => {
            println!("{local_id}");
            storage.close().await?;
            Ok(())
        }
        Err(ClaimgateError::UnresolvableMapping { candidates }) => {
            eprintln!("cannot resolve {external_id}: legacy mappings diverge");
            for candidate in &candidates {
                eprintln!("  candidate local id: {}", candidate.local_id);
                for record in &candidate.records {
                    eprintln!(
                        "    legacy id {} (migrated: {}, last seen: {})",
                        record.legacy_id, record.migrated, record.last_seen
                    );
                }
            }
            eprintln!("review the legacy mappings and retire all but one local account");
            storage.close().await?;
            Err(ClaimgateError::UnresolvableMapping { candidates })
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimgate_storage::queries::legacy::insert_legacy_identity;
    use claimgate_core::LegacyIdentity;

    fn temp_config(dir: &std::path::Path) -> ClaimgateConfig {
        let mut config = ClaimgateConfig::default();
        config.storage.database_path = dir.join("resolve.db").to_string_lossy().into_owned();
        config
    }

    #[tokio::test]
    async fn resolve_command_creates_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(dir.path());

        run_resolve(&config, "user0@example.com", &[]).await.unwrap();

        // The mapping persists for subsequent commands.
        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await.unwrap();
        let identity = claimgate_core::IdentityStore::find_by_external_id(
            storage.as_ref(),
            "user0@example.com",
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(identity.local_id, "user0@example.com");
    }

    #[tokio::test]
    async fn resolve_command_surfaces_divergent_mappings() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(dir.path());

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await.unwrap();
        for (legacy_id, local_id) in [("a@old.example", "alice"), ("b@old.example", "a.smith")] {
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
        storage.close().await.unwrap();
        drop(storage);

        let result = run_resolve(
            &config,
            "alice@new.example",
            &["a@old.example".to_string(), "b@old.example".to_string()],
        )
        .await;
        assert!(matches!(
            result,
            Err(ClaimgateError::UnresolvableMapping { .. })
        ));
    }
}
