// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! claimgate - proxy-asserted identity authentication backend.
//!
//! This is the admin binary entry point. The login flow itself is driven
//! by the hosting system through the `claimgate-auth` crate; the commands
//! here cover standalone resolution for migration work, mapping
//! statistics, and configuration inspection.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod resolve;
mod status;

/// claimgate - proxy-asserted identity authentication backend.
#[derive(Parser, Debug)]
#[command(name = "claimgate", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve an external identity to a local account id without logging in.
    Resolve {
        /// Primary external id to resolve.
        #[arg(long)]
        external_id: String,
        /// Alternate external ids from predecessor systems (repeatable).
        #[arg(long = "alt")]
        alternates: Vec<String>,
    },
    /// Show mapping and migration statistics.
    Status {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match claimgate_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            claimgate_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Resolve {
            external_id,
            alternates,
        }) => resolve::run_resolve(&config, &external_id, &alternates).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(())
            }
            Err(e) => Err(claimgate_core::ClaimgateError::Internal(format!(
                "failed to render config: {e}"
            ))),
        },
        None => {
            println!("claimgate: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("claimgate: {e}");
        std::process::exit(1);
    }
}
