// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `claimgate status` command implementation.
//!
//! Reports row counts for the current and legacy mapping tables and the
//! progress of the legacy migration. If `--json` is passed, outputs
//! structured JSON for scripting.

use std::io::IsTerminal;
use std::sync::Arc;

use serde::Serialize;

use claimgate_config::ClaimgateConfig;
use claimgate_core::ClaimgateError;
use claimgate_storage::SqliteStorage;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub backend_mode: String,
    pub database_path: String,
    pub identities: i64,
    pub legacy_total: i64,
    pub legacy_migrated: i64,
    pub legacy_pending: i64,
}

/// Run the `claimgate status` command.
pub async fn run_status(
    config: &ClaimgateConfig,
    json: bool,
    plain: bool,
) -> Result<(), ClaimgateError> {
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    let stats = storage.mapping_stats().await?;
    storage.close().await?;

    let response = StatusResponse {
        backend_mode: config.backend.mode.to_string(),
        database_path: config.storage.database_path.clone(),
        identities: stats.identities,
        legacy_total: stats.legacy_total,
        legacy_migrated: stats.legacy_migrated,
        legacy_pending: stats.legacy_total - stats.legacy_migrated,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&response, use_color);
    }

    Ok(())
}

/// Print the text status with optional colors.
fn print_status(response: &StatusResponse, use_color: bool) {
    println!();
    println!("  claimgate status");
    println!("  {}", "-".repeat(35));
    if use_color {
        use colored::Colorize;
        let mode = match response.backend_mode.as_str() {
            "inactive" => response.backend_mode.red(),
            _ => response.backend_mode.green(),
        };
        println!("    Mode:      {mode}");
    } else {
        println!("    Mode:      {}", response.backend_mode);
    }
    println!("    Database:  {}", response.database_path);
    println!("    Mappings:  {}", response.identities);
    println!(
        "    Legacy:    {} ({} migrated, {} pending)",
        response.legacy_total, response.legacy_migrated, response.legacy_pending
    );
    println!();
}
