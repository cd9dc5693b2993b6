// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical record types are defined in `claimgate-core::types` for
//! use across adapter trait boundaries. This module re-exports them for
//! convenience within the storage crate.

pub use claimgate_core::types::{Identity, LegacyIdentity};
