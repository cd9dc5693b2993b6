// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end login flow testing.
//!
//! `TestHarness` assembles a complete backend stack: temp SQLite mapping
//! stores, a static claim source, a mock account directory, and the
//! authenticator wired over all of them.

use std::sync::Arc;

use claimgate_auth::{AttributeMapper, Authenticator, LoginHooks};
use claimgate_config::ClaimgateConfig;
use claimgate_core::{
    Attribute, BackendMode, ClaimgateError, Identity, LegacyIdentity, StaticClaims,
};
use claimgate_storage::SqliteStorage;
use claimgate_storage::queries::legacy::insert_legacy_identity;

use crate::mock_directory::MockDirectory;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    mode: BackendMode,
    strip_domain: bool,
    autoupdate: bool,
    prefix: String,
    mapping: Vec<(Attribute, String)>,
    required: Vec<Attribute>,
    claims: Vec<(String, String)>,
    existing_users: Vec<String>,
    current_rows: Vec<Identity>,
    legacy_rows: Vec<LegacyIdentity>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            mode: BackendMode::LogonOnly,
            strip_domain: false,
            autoupdate: false,
            prefix: "OIDC_CLAIM_".to_string(),
            mapping: vec![
                (Attribute::UserId, "sub".to_string()),
                (Attribute::DisplayName, "name".to_string()),
                (Attribute::Email, "email".to_string()),
                (Attribute::AltUids, "altuids".to_string()),
            ],
            required: vec![Attribute::UserId],
            claims: Vec::new(),
            existing_users: Vec::new(),
            current_rows: Vec::new(),
            legacy_rows: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: BackendMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_strip_domain(mut self, strip_domain: bool) -> Self {
        self.strip_domain = strip_domain;
        self
    }

    pub fn with_autoupdate(mut self, autoupdate: bool) -> Self {
        self.autoupdate = autoupdate;
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Replace the default attribute-to-claim mapping.
    pub fn with_mapping(mut self, mapping: &[(Attribute, &str)]) -> Self {
        self.mapping = mapping
            .iter()
            .map(|(attr, name)| (*attr, name.to_string()))
            .collect();
        self
    }

    pub fn with_required(mut self, required: &[Attribute]) -> Self {
        self.required = required.to_vec();
        self
    }

    /// Add a proxy-asserted claim (physical key, value).
    pub fn with_claim(mut self, key: &str, value: &str) -> Self {
        self.claims.push((key.to_string(), value.to_string()));
        self
    }

    /// Pre-create a local account in the directory.
    pub fn with_existing_user(mut self, local_id: &str) -> Self {
        self.existing_users.push(local_id.to_string());
        self
    }

    /// Seed a current mapping row.
    pub fn with_current_row(mut self, external_id: &str, local_id: &str) -> Self {
        self.current_rows.push(Identity {
            external_id: external_id.to_string(),
            local_id: local_id.to_string(),
            nickname: String::new(),
            last_seen: "2026-01-01T00:00:00.000Z".to_string(),
        });
        self
    }

    /// Seed a legacy mapping row.
    pub fn with_legacy_row(mut self, legacy_id: &str, local_id: &str) -> Self {
        self.legacy_rows.push(LegacyIdentity {
            legacy_id: legacy_id.to_string(),
            email: None,
            local_id: local_id.to_string(),
            migrated: false,
            last_seen: "2025-06-01T00:00:00.000Z".to_string(),
        });
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, ClaimgateError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| ClaimgateError::Storage {
            source: e.into(),
        })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = ClaimgateConfig::default();
        config.backend.mode = self.mode;
        config.backend.strip_domain = self.strip_domain;
        config.backend.autoupdate = self.autoupdate;
        config.claims.prefix = self.prefix;
        config.claims.mapping = self.mapping.into_iter().collect();
        config.claims.required = self.required;
        config.storage.database_path = db_path.to_string_lossy().into_owned();

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;
        for row in &self.current_rows {
            claimgate_core::IdentityStore::insert(storage.as_ref(), row).await?;
        }
        for row in &self.legacy_rows {
            insert_legacy_identity(storage.db()?, row).await?;
        }

        let directory = Arc::new(MockDirectory::with_users(self.existing_users));
        let source = Arc::new(StaticClaims::new(self.claims));

        let mapper = AttributeMapper::new(config.claims.clone(), source.clone());
        let authenticator = Authenticator::new(
            config.clone(),
            source,
            storage.clone(),
            storage.clone(),
            directory.clone(),
        );
        let hooks = LoginHooks::new(
            config.backend.autoupdate,
            mapper,
            storage.clone(),
            directory.clone(),
        );

        Ok(TestHarness {
            authenticator,
            hooks,
            storage,
            directory,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired backend over temp storage and mock collaborators.
pub struct TestHarness {
    pub authenticator: Authenticator,
    pub hooks: LoginHooks,
    pub storage: Arc<SqliteStorage>,
    pub directory: Arc<MockDirectory>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Start building a harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }
}
