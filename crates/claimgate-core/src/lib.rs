// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the claimgate identity backend.
//!
//! This crate provides the foundational trait definitions, error types,
//! and common types used throughout the claimgate workspace: the claim
//! source and account directory seams, the identity store traits, and the
//! record types persisted by the storage crate.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ClaimgateError;
pub use types::{Attribute, BackendMode, Identity, LegacyIdentity, MappingCandidate};

pub use traits::{AccountDirectory, ClaimSource, IdentityStore, LegacyIdentityStore, StaticClaims};
