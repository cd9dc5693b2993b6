// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Login-gate composition: the single entry point a login controller
//! calls to turn proxy-asserted claims into a logged-in local account.

use std::sync::Arc;

use rand::{Rng, distributions::Alphanumeric};
use tracing::{debug, info, warn};

use claimgate_config::ClaimgateConfig;
use claimgate_core::{
    AccountDirectory, Attribute, BackendMode, ClaimSource, ClaimgateError, IdentityStore,
    LegacyIdentityStore,
};

use crate::attributes::AttributeMapper;
use crate::resolver::IdentityResolver;

/// Length of the throwaway password set on auto-provisioned accounts.
/// Logins always come through the proxy, so nobody ever types it.
const PROVISION_PASSWORD_LEN: usize = 30;

fn random_password() -> String {
    let mut rng = rand::thread_rng();
    (0..PROVISION_PASSWORD_LEN)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect()
}

/// The authentication backend.
///
/// Wires the attribute mapper, the required-claims gate, the identity
/// resolver, and the account directory into the login flow. One instance
/// serves one request; claim state is request-scoped.
pub struct Authenticator {
    config: ClaimgateConfig,
    mapper: AttributeMapper,
    resolver: IdentityResolver,
    directory: Arc<dyn AccountDirectory>,
}

impl Authenticator {
    pub fn new(
        config: ClaimgateConfig,
        source: Arc<dyn ClaimSource>,
        identities: Arc<dyn IdentityStore>,
        legacy: Arc<dyn LegacyIdentityStore>,
        directory: Arc<dyn AccountDirectory>,
    ) -> Self {
        let mapper = AttributeMapper::new(config.claims.clone(), source);
        let resolver = IdentityResolver::new(identities, legacy);
        Self {
            config,
            mapper,
            resolver,
            directory,
        }
    }

    /// The attribute mapper for this request.
    pub fn mapper(&self) -> &AttributeMapper {
        &self.mapper
    }

    /// The identity resolver, also usable standalone by migration tooling.
    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Authenticate the current request.
    ///
    /// Returns the local account id on success, `None` when the backend
    /// refuses the login without a hard failure (inactive mode, no valid
    /// user id claim, or an unknown account in `logon_only` mode), and an
    /// error for missing required claims, non-convergent legacy mappings,
    /// or store failures.
    pub async fn authenticate(&self) -> Result<Option<String>, ClaimgateError> {
        if self.config.backend.mode == BackendMode::Inactive {
            return Ok(None);
        }

        let Some(primary) = self.mapper.user_id() else {
            debug!("login refused: no valid user id claim");
            return Ok(None);
        };

        self.check_required_claims()?;

        let alternates = self.mapper.alternate_user_ids();
        let local_id = self
            .resolver
            .resolve(&primary, &alternates, self.config.backend.strip_domain)
            .await?;

        if !self.directory.user_exists(&local_id).await? {
            if self.config.backend.mode != BackendMode::Provisioning {
                debug!(local_id = %local_id, "login refused: account does not exist");
                return Ok(None);
            }
            info!(local_id = %local_id, "creating new account");
            self.directory
                .create_user(&local_id, &random_password())
                .await?;
        }

        Ok(Some(local_id))
    }

    /// The required-claims gate.
    ///
    /// Every configured required attribute must yield a valid claim value;
    /// otherwise the whole list of missing attributes is reported and
    /// resolution is never attempted.
    fn check_required_claims(&self) -> Result<(), ClaimgateError> {
        let mut missing: Vec<Attribute> = Vec::new();
        for attribute in self.mapper.required_claims() {
            if self.mapper.claim_value(attribute).is_none() {
                warn!(attribute = %attribute, "missing required claim");
                missing.push(attribute);
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ClaimgateError::MissingClaims { claims: missing })
        }
    }
}
