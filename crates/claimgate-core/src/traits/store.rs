// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity store traits.
//!
//! The current store is the authoritative external-id to local-account-id
//! mapping going forward. The legacy store carries the predecessor
//! system's mappings and is never written except to flip the `migrated`
//! flag. Id lookups are exact and case-sensitive; the free-text finders
//! are case-insensitive and exist for admin search, not for resolution.

use async_trait::async_trait;

use crate::error::ClaimgateError;
use crate::types::{Identity, LegacyIdentity};

/// The current (authoritative) identity mapping store.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Exact-match lookup by external id.
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Identity>, ClaimgateError>;

    /// Case-insensitive nickname search.
    async fn find_by_nickname(&self, nickname: &str) -> Result<Vec<Identity>, ClaimgateError>;

    /// Local ids whose newest mapping activity is at or before `threshold`
    /// (ISO-8601 UTC timestamp).
    async fn find_expired(&self, threshold: &str) -> Result<Vec<String>, ClaimgateError>;

    /// Insert a new mapping row.
    ///
    /// Fails with [`ClaimgateError::Duplicate`] when a row for the same
    /// external id already exists; callers treat that as "a concurrent
    /// request won the race" and re-read.
    async fn insert(&self, identity: &Identity) -> Result<(), ClaimgateError>;

    /// Full replace by external id.
    async fn update(&self, identity: &Identity) -> Result<(), ClaimgateError>;

    /// Stamp the mapping's `last_seen` with the current time.
    async fn touch_last_seen(&self, external_id: &str) -> Result<(), ClaimgateError>;
}

/// The read-mostly legacy identity mapping store.
#[async_trait]
pub trait LegacyIdentityStore: Send + Sync {
    /// Exact-match lookup by legacy id.
    async fn find_by_legacy_id(
        &self,
        legacy_id: &str,
    ) -> Result<Option<LegacyIdentity>, ClaimgateError>;

    /// All legacy records pointing at one local account.
    async fn find_for_local_id(
        &self,
        local_id: &str,
    ) -> Result<Vec<LegacyIdentity>, ClaimgateError>;

    /// Case-insensitive search by legacy id or recorded e-mail.
    async fn search(&self, pattern: &str) -> Result<Vec<LegacyIdentity>, ClaimgateError>;

    /// Local ids whose newest legacy activity is at or before `threshold`.
    async fn find_expired(&self, threshold: &str) -> Result<Vec<String>, ClaimgateError>;

    /// Idempotent flip of the `migrated` flag; no-op when already set.
    async fn mark_migrated(&self, legacy_id: &str) -> Result<(), ClaimgateError>;
}
