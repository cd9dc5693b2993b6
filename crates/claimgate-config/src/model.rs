// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the claimgate identity backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. The recognized options are enumerated here as
//! typed fields; nothing is read from a generic key/value store at
//! request time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use claimgate_core::{Attribute, BackendMode};

/// Default physical prefix the reverse proxy puts on claim variables.
pub const DEFAULT_CLAIM_PREFIX: &str = "OIDC_CLAIM_";

/// Top-level claimgate configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; the default backend mode is `inactive`, so a fresh install
/// refuses logins until configured.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimgateConfig {
    /// Backend operating mode and login behavior.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Claim prefix, attribute-to-claim mapping, and required claims.
    #[serde(default)]
    pub claims: ClaimsConfig,

    /// Identity mapping storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Backend operating mode and login behavior.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// `inactive` refuses all logins, `logon_only` never creates accounts,
    /// `provisioning` auto-creates missing accounts.
    #[serde(default)]
    pub mode: BackendMode,

    /// Refresh stored display name and e-mail from claims after login.
    #[serde(default)]
    pub autoupdate: bool,

    /// Derive the local account id by stripping everything from the first
    /// `@` of the external id when no mapping history exists.
    ///
    /// Distinct external ids sharing a local part then collapse onto one
    /// account; deployments enabling this must guarantee local-part
    /// uniqueness across trusted issuers.
    #[serde(default)]
    pub strip_domain: bool,
}

/// Claim prefix, attribute-to-claim mapping, and required claims.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimsConfig {
    /// Physical prefix on proxy-asserted claim variables.
    #[serde(default = "default_claim_prefix")]
    pub prefix: String,

    /// Physical claim name per logical attribute, e.g.
    /// `userid = "sub"`. The prefix is prepended unless the configured
    /// name already carries it. An unmapped attribute yields no value.
    #[serde(default)]
    pub mapping: BTreeMap<Attribute, String>,

    /// Attributes that must be present and valid before resolution.
    /// `userid` is always required, whether listed here or not.
    #[serde(default = "default_required")]
    pub required: Vec<Attribute>,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            prefix: default_claim_prefix(),
            mapping: BTreeMap::new(),
            required: default_required(),
        }
    }
}

fn default_claim_prefix() -> String {
    DEFAULT_CLAIM_PREFIX.to_string()
}

fn default_required() -> Vec<Attribute> {
    vec![Attribute::UserId]
}

/// Identity mapping storage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("claimgate").join("claimgate.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("claimgate.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_inactive_with_userid_required() {
        let config = ClaimgateConfig::default();
        assert_eq!(config.backend.mode, BackendMode::Inactive);
        assert!(!config.backend.autoupdate);
        assert!(!config.backend.strip_domain);
        assert_eq!(config.claims.prefix, "OIDC_CLAIM_");
        assert!(config.claims.mapping.is_empty());
        assert_eq!(config.claims.required, vec![Attribute::UserId]);
        assert!(config.storage.wal_mode);
    }

    #[test]
    fn mapping_keys_deserialize_as_attributes() {
        let toml = r#"
            [claims.mapping]
            userid = "sub"
            email = "email"
        "#;
        let config: ClaimgateConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.claims.mapping.get(&Attribute::UserId),
            Some(&"sub".to_string())
        );
        assert_eq!(
            config.claims.mapping.get(&Attribute::Email),
            Some(&"email".to_string())
        );
    }

    #[test]
    fn unknown_mapping_attribute_is_rejected() {
        let toml = r#"
            [claims.mapping]
            eligible = "isCesnetEligibleLastSeen"
        "#;
        assert!(toml::from_str::<ClaimgateConfig>(toml).is_err());
    }

    #[test]
    fn unknown_section_key_is_rejected() {
        let toml = r#"
            [backend]
            moed = "provisioning"
        "#;
        assert!(toml::from_str::<ClaimgateConfig>(toml).is_err());
    }
}
