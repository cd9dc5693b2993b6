// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules for the identity mapping tables.

pub mod identities;
pub mod legacy;
