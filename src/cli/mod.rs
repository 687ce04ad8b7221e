//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::sync::OnceLock;

use anyhow::{Context, Result};
use clap::Parser;

use crate::core::global_config::GlobalConfig;
use crate::infra::dirs::LanewayDirs;
use commands::Commands;
use output::OutputConfig;

/// Version with the git commit it was built from, when known
fn long_version() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();
    VERSION.get_or_init(|| match option_env!("VERGEN_GIT_SHA") {
        Some(sha) => format!("{} ({sha})", env!("CARGO_PKG_VERSION")),
        None => env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Laneway - run the lanes of a Lanefile
///
/// A lane is a named sequence of build and release actions, optionally
/// grouped by platform and wrapped in before/after/error hooks.
#[derive(Parser, Debug)]
#[command(name = "laneway")]
#[command(author, version, long_version = long_version(), about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Output switches from the flags alone
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::new(self.quiet, self.json, self.verbose)
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let Some(command) = self.command else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            return Ok(());
        };

        let dirs = LanewayDirs::new();
        let config = GlobalConfig::load(&dirs).context("Failed to load global configuration")?;

        OutputConfig::new(
            self.quiet || config.quiet(),
            self.json || config.json(),
            self.verbose,
        )
        .apply_global();

        command.run(&dirs, &config)
    }
}
