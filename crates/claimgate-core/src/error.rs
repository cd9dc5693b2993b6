// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the claimgate identity backend.

use thiserror::Error;

use crate::types::{Attribute, MappingCandidate};

/// The primary error type used across claimgate adapter traits and core
/// operations.
#[derive(Debug, Error)]
pub enum ClaimgateError {
    /// Configuration errors (invalid TOML, bad mode, missing mapping).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, schema).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A unique-key insert lost a race with a concurrent request.
    ///
    /// Benign concurrency signal internal to the stores; callers recover
    /// by re-reading and this variant is never surfaced to a login.
    #[error("duplicate key: {key}")]
    Duplicate { key: String },

    /// One or more required claims were absent or invalid.
    ///
    /// Surfaced to the end user as a list of human-readable attribute
    /// descriptions; authentication aborts.
    #[error("missing required claims: {}", format_claims(claims))]
    MissingClaims { claims: Vec<Attribute> },

    /// Legacy identities diverge to more than one local account.
    ///
    /// Fatal to the login attempt. Carries every candidate with its
    /// contributing legacy records so an administrator can untangle the
    /// mapping by hand; the resolver never picks a winner.
    #[error("unresolvable account mapping: {}", format_candidates(candidates))]
    UnresolvableMapping { candidates: Vec<MappingCandidate> },

    /// Account directory errors (existence check, provisioning).
    #[error("directory error: {message}")]
    Directory {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

fn format_claims(claims: &[Attribute]) -> String {
    claims
        .iter()
        .map(Attribute::description)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_candidates(candidates: &[MappingCandidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("{} ({} legacy records)", c.local_id, c.records.len()))
        .collect::<Vec<_>>()
        .join(", ")
}
