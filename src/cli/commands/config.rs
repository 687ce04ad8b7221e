//! CLI implementation for `laneway config` command
//!
//! Shows and edits the global `config.toml`.

use anyhow::{Context, Result};

use crate::cli::output::{is_json, print_detail, print_info, print_json, print_success, print_warning};
use crate::core::global_config::GlobalConfig;
use crate::infra::dirs::LanewayDirs;

/// Print every setting
pub fn execute_show(dirs: &LanewayDirs, config: &GlobalConfig) -> Result<()> {
    let entries = config.entries();

    if is_json() {
        let settings: serde_json::Map<String, serde_json::Value> = entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.map_or(serde_json::Value::Null, Into::into)))
            .collect();
        return print_json(&serde_json::json!({
            "path": dirs.global_config_path().display().to_string(),
            "settings": settings,
        }));
    }

    print_info(&format!("Configuration file: {}", dirs.global_config_path().display()));
    for (key, value) in entries {
        print_detail(&format!("{key:<22} {}", value.as_deref().unwrap_or("(not set)")));
    }
    Ok(())
}

/// Print one setting
pub fn execute_get(config: &GlobalConfig, key: &str) -> Result<()> {
    let value = config.get(key)?;

    if is_json() {
        return print_json(&serde_json::json!({ "key": key, "value": value }));
    }

    match value {
        Some(value) => println!("{value}"),
        None => print_warning(&format!("'{key}' is not set")),
    }
    Ok(())
}

/// Change one setting and write the file
pub fn execute_set(dirs: &LanewayDirs, config: &GlobalConfig, key: &str, value: &str) -> Result<()> {
    let mut updated = config.clone();
    updated.set(key, value)?;
    updated
        .save(dirs)
        .context("Failed to save global configuration")?;

    let stored = updated.get(key)?;
    if is_json() {
        return print_json(&serde_json::json!({ "success": true, "key": key, "value": stored }));
    }
    print_success(&format!("Set {key} = {}", stored.unwrap_or_default()));
    Ok(())
}

/// Clear one setting and write the file
pub fn execute_unset(dirs: &LanewayDirs, config: &GlobalConfig, key: &str) -> Result<()> {
    let mut updated = config.clone();
    updated.unset(key)?;
    updated
        .save(dirs)
        .context("Failed to save global configuration")?;

    if is_json() {
        return print_json(&serde_json::json!({ "success": true, "key": key, "value": null }));
    }
    print_success(&format!("Unset {key}"));
    Ok(())
}
