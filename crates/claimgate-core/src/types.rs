// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the claimgate backend.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A logical user attribute that can be mapped onto a proxy-asserted claim.
///
/// Physical claim keys are configuration; this enum is the closed set of
/// attributes the backend knows how to extract and validate. Attribute
/// names appearing in configuration (claim mapping keys, required list)
/// parse through the serde/strum lowercase forms: `userid`,
/// `displayname`, `email`, `altuids`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    /// Primary external user identifier (e.g. the OIDC `sub`).
    UserId,
    /// Human display name.
    DisplayName,
    /// E-mail address.
    Email,
    /// Comma-separated list of alternate external identifiers the user
    /// held in predecessor systems.
    AltUids,
}

impl Attribute {
    /// Human-readable description, used when reporting missing required
    /// claims back to the end user.
    pub fn description(&self) -> &'static str {
        match self {
            Attribute::UserId => "Identifier of user on a service",
            Attribute::DisplayName => "Full Name",
            Attribute::Email => "E-mail address",
            Attribute::AltUids => "Person principal usernames",
        }
    }
}

/// Operating mode of the authentication backend.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// Backend disabled; login attempts are refused without reading claims.
    #[default]
    Inactive,
    /// Resolve and log in existing accounts only; never create accounts.
    LogonOnly,
    /// Resolve and auto-provision accounts that do not exist yet.
    Provisioning,
}

/// A row in the current identity mapping store.
///
/// `external_id` is unique; `local_id` is the account identifier the rest
/// of the hosting system uses. `last_seen` is an ISO-8601 UTC timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub external_id: String,
    pub local_id: String,
    pub nickname: String,
    pub last_seen: String,
}

/// A row in the legacy identity mapping store inherited from the
/// predecessor system.
///
/// Read-only except for the `migrated` flag, which is flipped exactly once
/// when the owning account acquires a current-store record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyIdentity {
    pub legacy_id: String,
    pub email: Option<String>,
    pub local_id: String,
    pub migrated: bool,
    pub last_seen: String,
}

/// One candidate local account produced by a non-convergent legacy lookup,
/// together with every legacy record that voted for it. Carried inside
/// [`crate::ClaimgateError::UnresolvableMapping`] for administrator review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingCandidate {
    pub local_id: String,
    pub records: Vec<LegacyIdentity>,
}
