// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Claim extraction, validation, and identity resolution for the
//! claimgate backend.
//!
//! The login controller drives this crate through [`Authenticator`]: the
//! attribute mapper turns proxy-asserted claims into validated logical
//! attributes, the required-claims gate refuses incomplete assertions,
//! and the [`IdentityResolver`] reconciles the external identity against
//! the current and legacy mapping stores. [`LoginHooks`] runs the
//! explicit post-login bookkeeping.

pub mod attributes;
pub mod backend;
pub mod hooks;
pub mod resolver;

pub use attributes::{AttributeMapper, validate};
pub use backend::Authenticator;
pub use hooks::LoginHooks;
pub use resolver::IdentityResolver;
