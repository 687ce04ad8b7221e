//! CLI implementation for `laneway lanes` command

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::run::load_lanefile;
use crate::cli::output::{is_json, print_detail, print_info, print_json};
use crate::core::global_config::GlobalConfig;

/// Execute the lanes command
pub fn execute(dir: &Path, lanefile: Option<PathBuf>, config: &GlobalConfig) -> Result<()> {
    let lanefile = load_lanefile(dir, lanefile.as_deref(), config, true)?;
    let registry = lanefile.registry();

    if is_json() {
        let lanes: Vec<_> = registry
            .lanes()
            .map(|lane| {
                serde_json::json!({
                    "name": lane.name,
                    "platform": lane.platform,
                    "full_name": lane.full_name(),
                    "description": lane.description.join("\n"),
                    "location": lane.location.to_string(),
                })
            })
            .collect();
        return print_json(&lanes);
    }

    let mut scopes: Vec<Option<&str>> = vec![None];
    scopes.extend(registry.platforms().map(Some));

    for scope in scopes {
        let lanes: Vec<_> = registry.lanes_in(scope).collect();
        if lanes.is_empty() {
            continue;
        }
        match scope {
            Some(platform) => print_info(platform),
            None => print_info("General"),
        }
        for lane in lanes {
            let command = format!("laneway run {}", lane.full_name());
            if lane.description.is_empty() {
                print_detail(&command);
            } else {
                print_detail(&format!("{command:<32} {}", lane.description.join(" ")));
            }
        }
    }
    Ok(())
}
