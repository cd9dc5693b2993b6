// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account directory trait: the narrow slice of the hosting system's user
//! management this backend consumes.

use async_trait::async_trait;

use crate::error::ClaimgateError;

/// Existence checks, provisioning, and profile fields for local accounts.
///
/// Implemented by the hosting framework integration; the backend never
/// touches account state except through this trait.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Whether a local account with this id exists.
    async fn user_exists(&self, local_id: &str) -> Result<bool, ClaimgateError>;

    /// Create a local account with the given initial password.
    async fn create_user(&self, local_id: &str, password: &str) -> Result<(), ClaimgateError>;

    /// Stored display name of the account, if any.
    async fn display_name(&self, local_id: &str) -> Result<Option<String>, ClaimgateError>;

    /// Replace the stored display name.
    async fn set_display_name(
        &self,
        local_id: &str,
        display_name: &str,
    ) -> Result<(), ClaimgateError>;

    /// Stored e-mail address of the account, if any.
    async fn email_address(&self, local_id: &str) -> Result<Option<String>, ClaimgateError>;

    /// Replace the stored e-mail address.
    async fn set_email_address(&self, local_id: &str, email: &str)
    -> Result<(), ClaimgateError>;
}
