//! CLI implementation for `laneway init` command
//!
//! This module handles the CLI interface for Lanefile initialization.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::cli::output::{is_json, print_detail, print_json, print_success};
use crate::core::init::{init_lanefile, InitOptions, TEMPLATE_PLATFORMS};

/// Execute the init command
pub fn execute(path: &Path, platform: Option<String>, force: bool) -> Result<()> {
    if let Some(p) = platform.as_deref() {
        if !TEMPLATE_PLATFORMS.contains(&p) {
            bail!(
                "Unknown platform '{p}'. Choose one of: {}",
                TEMPLATE_PLATFORMS.join(", ")
            );
        }
    }

    let options = InitOptions { platform, force };
    let result = init_lanefile(path, &options).with_context(|| "Failed to initialize Lanefile")?;

    if is_json() {
        return print_json(&serde_json::json!({
            "success": true,
            "lanefile": result.lanefile_path.display().to_string(),
            "overwritten": result.overwritten,
            "platform": result.platform,
        }));
    }

    print_success(&format!("Created {}", result.lanefile_path.display()));
    if result.overwritten {
        print_detail("Replaced the existing Lanefile");
    }
    if let Some(platform) = &result.platform {
        print_detail(&format!("Added lanes for platform: {platform}"));
    }
    print_detail("Run 'laneway lanes' to see what it can do");
    Ok(())
}
