//! Laneway CLI - run the lanes of a Lanefile
//!
//! Entry point for the laneway command-line application.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use laneway::cli::output::display_error;
use laneway::cli::Cli;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flags
    let level = cli.output_config().log_level();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::builder().with_default_directive(level.into()).from_env_lossy())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli.run() {
        display_error(&e);
        std::process::exit(1);
    }
}
