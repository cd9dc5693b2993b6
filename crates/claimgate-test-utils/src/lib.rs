// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock adapters and a full-stack test harness for claimgate integration
//! tests.

pub mod harness;
pub mod mock_directory;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_directory::MockDirectory;
