// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and non-empty claim mappings.

use crate::diagnostic::ConfigError;
use crate::model::ClaimgateConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &ClaimgateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    for (attribute, claim_name) in &config.claims.mapping {
        if claim_name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("claims.mapping.{attribute} must not be empty"),
            });
        }
    }

    // A required attribute without a claim mapping can never be satisfied,
    // so every login would fail with a missing-claims report. Only checked
    // once the backend is switched on; a fresh inactive install carries no
    // mapping yet.
    if config.backend.mode != claimgate_core::BackendMode::Inactive {
        for attribute in &config.claims.required {
            if !config.claims.mapping.contains_key(attribute) {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "claims.required lists `{attribute}` but claims.mapping does not map it"
                    ),
                });
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
