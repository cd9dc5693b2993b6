// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./claimgate.toml` > `~/.config/claimgate/claimgate.toml`
//! > `/etc/claimgate/claimgate.toml` with environment variable overrides
//! via `CLAIMGATE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ClaimgateConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/claimgate/claimgate.toml` (system-wide)
/// 3. `~/.config/claimgate/claimgate.toml` (user XDG config)
/// 4. `./claimgate.toml` (local directory)
/// 5. `CLAIMGATE_*` environment variables
pub fn load_config() -> Result<ClaimgateConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ClaimgateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClaimgateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ClaimgateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClaimgateConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ClaimgateConfig::default()))
        .merge(Toml::file("/etc/claimgate/claimgate.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("claimgate/claimgate.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("claimgate.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CLAIMGATE_BACKEND_STRIP_DOMAIN` must
/// map to `backend.strip_domain`, not `backend.strip.domain`.
fn env_provider() -> Env {
    Env::prefixed("CLAIMGATE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: CLAIMGATE_BACKEND_MODE -> "backend_mode"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("backend_", "backend.", 1)
            .replacen("claims_", "claims.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
