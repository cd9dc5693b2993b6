// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-login bookkeeping, called explicitly by the login controller
//! after a successful authentication. No listener registration; the
//! controller owns the call order.

use std::sync::Arc;

use tracing::{debug, warn};

use claimgate_core::{AccountDirectory, ClaimgateError, IdentityStore};

use crate::attributes::AttributeMapper;

/// Explicit post-login actions.
///
/// Stamps the mapping's `last_seen` and, when autoupdate is enabled,
/// refreshes the stored display name and e-mail from the current claims.
/// Profile sync is best-effort; a directory failure is logged and never
/// rolls back a login that already succeeded.
pub struct LoginHooks {
    autoupdate: bool,
    mapper: AttributeMapper,
    identities: Arc<dyn IdentityStore>,
    directory: Arc<dyn AccountDirectory>,
}

impl LoginHooks {
    pub fn new(
        autoupdate: bool,
        mapper: AttributeMapper,
        identities: Arc<dyn IdentityStore>,
        directory: Arc<dyn AccountDirectory>,
    ) -> Self {
        Self {
            autoupdate,
            mapper,
            identities,
            directory,
        }
    }

    /// Run after a successful login of `local_id` via `external_id`.
    pub async fn post_login(
        &self,
        local_id: &str,
        external_id: &str,
    ) -> Result<(), ClaimgateError> {
        self.identities.touch_last_seen(external_id).await?;

        if !self.autoupdate {
            return Ok(());
        }
        self.sync_profile(local_id).await;
        Ok(())
    }

    async fn sync_profile(&self, local_id: &str) {
        if let Some(display_name) = self.mapper.display_name() {
            match self.directory.display_name(local_id).await {
                Ok(stored) if stored.as_deref() != Some(display_name.as_str()) => {
                    debug!(local_id = %local_id, "updating display name from claims");
                    if let Err(e) = self
                        .directory
                        .set_display_name(local_id, &display_name)
                        .await
                    {
                        warn!(local_id = %local_id, error = %e, "display name update failed");
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(local_id = %local_id, error = %e, "display name lookup failed"),
            }
        }

        if let Some(email) = self.mapper.email_address() {
            match self.directory.email_address(local_id).await {
                Ok(stored) if stored.as_deref() != Some(email.as_str()) => {
                    debug!(local_id = %local_id, "updating e-mail address from claims");
                    if let Err(e) = self.directory.set_email_address(local_id, &email).await {
                        warn!(local_id = %local_id, error = %e, "e-mail update failed");
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(local_id = %local_id, error = %e, "e-mail lookup failed"),
            }
        }
    }
}
