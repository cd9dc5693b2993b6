// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attribute mapper: translates logical user attributes to physical claim
//! keys and returns validated values from the request claim source.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::warn;

use claimgate_config::model::ClaimsConfig;
use claimgate_core::{Attribute, ClaimSource};

/// External ids: account-name characters plus `@` for scoped ids.
static USER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.@-]*$").expect("valid regex"));

/// Display names: reject markup and injection-prone characters.
static DISPLAY_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^<>$#!%&*\\_+.@-]*$").expect("valid regex"));

/// Mailbox syntax (WHATWG pattern).
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid regex")
});

/// Whether `value` is acceptable for the given attribute.
///
/// Validation is pure and side-effect-free; a failing value makes the
/// attribute absent, it never fails the request by itself.
pub fn validate(attribute: Attribute, value: &str) -> bool {
    match attribute {
        Attribute::UserId => USER_ID_RE.is_match(value),
        Attribute::DisplayName => DISPLAY_NAME_RE.is_match(value),
        Attribute::Email => EMAIL_RE.is_match(value),
        Attribute::AltUids => value.split(',').all(|id| USER_ID_RE.is_match(id)),
    }
}

/// Maps logical attributes onto the claims the upstream proxy asserted
/// for the current request.
///
/// Physical claim keys come from configuration only: an attribute without
/// a configured mapping yields no value, whatever the request carries.
#[derive(Clone)]
pub struct AttributeMapper {
    config: ClaimsConfig,
    source: Arc<dyn ClaimSource>,
}

impl AttributeMapper {
    pub fn new(config: ClaimsConfig, source: Arc<dyn ClaimSource>) -> Self {
        Self { config, source }
    }

    /// The configured physical prefix on claim variables.
    pub fn claim_prefix(&self) -> &str {
        &self.config.prefix
    }

    /// The physical claim key for `attribute`, or `None` when no mapping
    /// is configured.
    ///
    /// The prefix is prepended unless the configured name already carries
    /// it, so a fully-qualified name is never double-prefixed.
    pub fn claim_key(&self, attribute: Attribute) -> Option<String> {
        let configured = self.config.mapping.get(&attribute)?;
        if configured.starts_with(&self.config.prefix) {
            Some(configured.clone())
        } else {
            Some(format!("{}{}", self.config.prefix, configured))
        }
    }

    /// The validated claim value for `attribute`.
    ///
    /// Absent when the attribute is unmapped, the claim is unasserted or
    /// empty, or the value fails validation (logged with the key name).
    pub fn claim_value(&self, attribute: Attribute) -> Option<String> {
        let key = self.claim_key(attribute)?;
        let value = self.source.get(&key)?;
        if value.is_empty() {
            return None;
        }
        if !validate(attribute, &value) {
            warn!(claim = %key, attribute = %attribute, "invalid claim value");
            return None;
        }
        Some(value)
    }

    /// The primary external user id.
    pub fn user_id(&self) -> Option<String> {
        self.claim_value(Attribute::UserId)
    }

    /// The user's display name.
    pub fn display_name(&self) -> Option<String> {
        self.claim_value(Attribute::DisplayName)
    }

    /// The user's e-mail address.
    pub fn email_address(&self) -> Option<String> {
        self.claim_value(Attribute::Email)
    }

    /// Alternate external ids the user held in predecessor systems.
    ///
    /// Comma-split with empty entries filtered out; empty when the claim
    /// is unasserted or invalid.
    pub fn alternate_user_ids(&self) -> Vec<String> {
        self.claim_value(Attribute::AltUids)
            .map(|value| {
                value
                    .split(',')
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Attributes that must be present and valid before resolution.
    ///
    /// The user id attribute is always included, whatever the
    /// configuration says.
    pub fn required_claims(&self) -> Vec<Attribute> {
        let mut required = Vec::new();
        for attribute in &self.config.required {
            if !required.contains(attribute) {
                required.push(*attribute);
            }
        }
        if !required.contains(&Attribute::UserId) {
            required.push(Attribute::UserId);
        }
        required
    }
}
