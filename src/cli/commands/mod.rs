//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod actions;
pub mod config;
pub mod init;
pub mod lanes;
pub mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::core::global_config::GlobalConfig;
use crate::infra::dirs::LanewayDirs;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a lane
    Run {
        /// `[PLATFORM] LANE`, followed by `key:value` lane parameters
        #[arg(value_name = "ARGS")]
        targets: Vec<String>,

        /// Lanefile to load instead of searching the current directory
        #[arg(short = 'f', long, env = "LANEWAY_LANEFILE")]
        lanefile: Option<PathBuf>,

        /// Print shell commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// List the lanes of the Lanefile
    Lanes {
        /// Lanefile to load instead of searching the current directory
        #[arg(short = 'f', long, env = "LANEWAY_LANEFILE")]
        lanefile: Option<PathBuf>,
    },

    /// List the available actions
    Actions,

    /// Write a starter Lanefile in the current directory
    Init {
        /// Include lanes for a platform (ios, mac or android)
        #[arg(short, long)]
        platform: Option<String>,

        /// Overwrite an existing Lanefile
        #[arg(short, long)]
        force: bool,
    },

    /// Show or change the global configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Global configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show every setting and the configuration file path
    Show,

    /// Print one setting
    Get {
        /// Setting, e.g. run.default_platform
        key: String,
    },

    /// Change one setting
    Set {
        /// Setting, e.g. run.default_platform
        key: String,

        /// New value
        value: String,
    },

    /// Reset one setting to its default
    Unset {
        /// Setting, e.g. run.dry_run
        key: String,
    },
}

impl Commands {
    /// Execute the command
    pub fn run(self, dirs: &LanewayDirs, config: &GlobalConfig) -> Result<()> {
        match self {
            Self::Run {
                targets,
                lanefile,
                dry_run,
            } => {
                let current_dir = std::env::current_dir()?;
                let options = run::RunArgs {
                    targets,
                    lanefile,
                    dry_run: dry_run || config.dry_run(),
                };
                run::execute(&current_dir, options, config)
            }
            Self::Lanes { lanefile } => {
                let current_dir = std::env::current_dir()?;
                lanes::execute(&current_dir, lanefile, config)
            }
            Self::Actions => actions::execute(),
            Self::Init { platform, force } => {
                let current_dir = std::env::current_dir()?;
                init::execute(&current_dir, platform, force)
            }
            Self::Config { command } => match command {
                ConfigCommands::Show => config::execute_show(dirs, config),
                ConfigCommands::Get { key } => config::execute_get(config, &key),
                ConfigCommands::Set { key, value } => config::execute_set(dirs, config, &key, &value),
                ConfigCommands::Unset { key } => config::execute_unset(dirs, config, &key),
            },
        }
    }
}
