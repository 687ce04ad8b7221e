//! CLI implementation for `laneway actions` command

use anyhow::Result;

use crate::actions::ActionCatalog;
use crate::cli::output::{is_json, print_detail, print_info, print_json};

/// Execute the actions command
pub fn execute() -> Result<()> {
    let catalog = ActionCatalog::bundled();

    if is_json() {
        let actions: Vec<_> = catalog
            .iter()
            .map(|action| {
                serde_json::json!({
                    "name": action.name(),
                    "description": action.description(),
                    "platforms": action.platforms(),
                })
            })
            .collect();
        return print_json(&actions);
    }

    print_info(&format!("{} actions available", catalog.len()));
    for action in catalog.iter() {
        let platforms = action
            .platforms()
            .map(|p| format!(" [{}]", p.join(", ")))
            .unwrap_or_default();
        print_detail(&format!("{:<20} {}{platforms}", action.name(), action.description()));
    }
    Ok(())
}
