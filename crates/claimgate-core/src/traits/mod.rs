// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits at the seams of the backend: the request-scoped claim
//! source, the hosting system's account directory, and the two identity
//! stores.

pub mod claims;
pub mod directory;
pub mod store;

pub use claims::{ClaimSource, StaticClaims};
pub use directory::AccountDirectory;
pub use store::{IdentityStore, LegacyIdentityStore};
