// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-scoped claim source.

use std::collections::HashMap;

/// Key/value view of the claims an upstream authentication layer injected
/// into the current request environment.
///
/// Keys are physical claim names (already prefixed, e.g. `OIDC_CLAIM_sub`).
/// Lookups are pure and side-effect-free; implementations hold request
/// state only.
pub trait ClaimSource: Send + Sync {
    /// Returns the raw claim value for `key`, or `None` if the upstream
    /// layer did not assert it.
    fn get(&self, key: &str) -> Option<String>;
}

/// A [`ClaimSource`] over a fixed key/value map.
///
/// The usual production construction: the integration layer snapshots the
/// request environment variables into a map once per request.
#[derive(Debug, Clone, Default)]
pub struct StaticClaims {
    values: HashMap<String, String>,
}

impl StaticClaims {
    /// Build from any iterator of key/value pairs.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ClaimSource for StaticClaims {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
