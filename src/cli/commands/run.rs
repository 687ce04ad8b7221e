//! CLI implementation for `laneway run` command

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::actions::ActionCatalog;
use crate::cli::output::{is_json, print_detail, print_json, print_success};
use crate::core::global_config::GlobalConfig;
use crate::core::invocation::plan_request;
use crate::core::lanefile::{self, Lanefile};
use crate::core::registry::full_lane_name;
use crate::core::runner::RunnerOptions;
use crate::core::value::Value;
use crate::infra::filesystem;

/// Arguments of `laneway run`
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub targets: Vec<String>,
    pub lanefile: Option<PathBuf>,
    pub dry_run: bool,
}

/// Find the Lanefile to load: the flag, then the configured path, then the
/// search directories below `dir`
pub fn locate_lanefile(dir: &Path, flag: Option<&Path>, config: &GlobalConfig) -> Result<PathBuf> {
    if let Some(path) = flag.or(config.run.lanefile.as_deref()) {
        return Ok(filesystem::resolve(dir, path));
    }
    match lanefile::discover(dir) {
        Some(path) => Ok(path),
        None => bail!(
            "No Lanefile found in {}. Run 'laneway init' to create one.",
            dir.display()
        ),
    }
}

/// Load the Lanefile for a command running in `dir`
pub fn load_lanefile(dir: &Path, flag: Option<&Path>, config: &GlobalConfig, dry_run: bool) -> Result<Lanefile> {
    let path = locate_lanefile(dir, flag, config)?;
    let options = RunnerOptions {
        dry_run,
        working_dir: dir.to_path_buf(),
    };
    Lanefile::load_with(&path, ActionCatalog::bundled(), options)
        .with_context(|| format!("Failed to load {}", path.display()))
}

/// Execute the run command
pub fn execute(dir: &Path, args: RunArgs, config: &GlobalConfig) -> Result<()> {
    let mut lanefile = load_lanefile(dir, args.lanefile.as_deref(), config, args.dry_run)?;

    let default_platform = config
        .run
        .default_platform
        .clone()
        .or_else(|| lanefile.runner().context().default_platform().map(str::to_string));
    let request = plan_request(&args.targets, lanefile.registry(), default_platform.as_deref())?;
    let full_name = full_lane_name(request.platform.as_deref(), &request.lane);

    let result = lanefile
        .runner_mut()
        .execute(&request.lane, request.platform.as_deref(), Some(Value::Map(request.params)))
        .with_context(|| format!("Lane '{full_name}' failed"))?;

    let summary = lanefile.runner().collector().summary();
    if is_json() {
        return print_json(&serde_json::json!({
            "success": true,
            "lane": full_name,
            "dry_run": args.dry_run,
            "result": result,
            "actions": summary,
        }));
    }

    print_success(&format!("Lane '{full_name}' finished"));
    if !result.is_nil() {
        print_detail(&format!("Result: {result}"));
    }
    for usage in &summary {
        print_detail(&format!("{} x{}", usage.name, usage.count));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::global_config::RunConfig;
    use tempfile::TempDir;

    #[test]
    fn test_locate_prefers_flag_over_config() {
        let temp = TempDir::new().unwrap();
        let config = GlobalConfig {
            run: RunConfig {
                lanefile: Some(PathBuf::from("configured/Lanefile")),
                ..RunConfig::default()
            },
            ..GlobalConfig::default()
        };

        let flagged = locate_lanefile(temp.path(), Some(Path::new("other/Lanefile")), &config).unwrap();
        assert_eq!(flagged, temp.path().join("other/Lanefile"));

        let configured = locate_lanefile(temp.path(), None, &config).unwrap();
        assert_eq!(configured, temp.path().join("configured/Lanefile"));
    }

    #[test]
    fn test_locate_without_lanefile_fails() {
        let temp = TempDir::new().unwrap();
        let err = locate_lanefile(temp.path(), None, &GlobalConfig::default()).unwrap_err();
        assert!(err.to_string().contains("laneway init"));
    }
}
