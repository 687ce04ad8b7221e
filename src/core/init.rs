//! Lanefile initialization logic
//!
//! Generates a starter Lanefile for a project directory.

use std::path::{Path, PathBuf};

use crate::config::defaults::LANEFILE_NAME;
use crate::core::lanefile::Lanefile;
use crate::error::InitError;
use crate::infra::filesystem;

/// Platforms the starter template knows lanes for
pub const TEMPLATE_PLATFORMS: &[&str] = &["ios", "mac", "android"];

/// Options for `laneway init`
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Platform block to include (optional)
    pub platform: Option<String>,
    /// Overwrite an existing Lanefile
    pub force: bool,
}

/// Result of initialization
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created Lanefile
    pub lanefile_path: PathBuf,
    /// Whether an existing Lanefile was replaced
    pub overwritten: bool,
    /// Platform block that was generated (if any)
    pub platform: Option<String>,
}

/// Derive project name from directory
pub fn derive_project_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "my-project".to_string())
}

fn platform_lanes(platform: &str) -> String {
    match platform {
        "android" => r#"
platform :android {
  # Build a debug APK
  lane :build {
    gradle task: "assembleDebug"
  }
}
"#
        .to_string(),
        other => format!(
            r#"
platform :{other} {{
  # Install pods and frame the screenshots
  lane :screenshots {{
    cocoapods
    frameit
  }}
}}
"#
        ),
    }
}

/// Generate the starter Lanefile with comments
pub fn generate_lanefile_content(project_name: &str, platform: Option<&str>) -> String {
    let version = env!("CARGO_PKG_VERSION");
    let default_platform = platform
        .map(|p| format!("default_platform :{p}\n"))
        .unwrap_or_default();
    let platform_section = platform.map(platform_lanes).unwrap_or_default();

    format!(
        r#"# Lanefile for {project_name}
#
# List the lanes with `laneway lanes`, run one with `laneway run <lane>`.

min_version "{version}"
{default_platform}
before_all {{ |lane|
  puts "Driving lane " + lane
}}

# Run the test suite
lane :test {{
  sh "echo 'Add your test command here'"
}}
{platform_section}
after_all {{ |lane|
  puts "Lane " + lane + " finished"
}}

error {{ |lane, message|
  puts "Lane " + lane + " failed: " + message
}}
"#
    )
}

/// Validate initialization can proceed
pub fn validate_init(path: &Path, options: &InitOptions) -> Result<(), InitError> {
    if !path.is_dir() {
        return Err(InitError::DirectoryNotFound {
            path: path.to_path_buf(),
        });
    }

    let lanefile_path = path.join(LANEFILE_NAME);
    if lanefile_path.exists() && !options.force {
        return Err(InitError::LanefileExists {
            path: lanefile_path,
        });
    }

    Ok(())
}

/// Write a starter Lanefile into `path`
pub fn init_lanefile(path: &Path, options: &InitOptions) -> Result<InitResult, InitError> {
    validate_init(path, options)?;

    let content = generate_lanefile_content(&derive_project_name(path), options.platform.as_deref());
    Lanefile::parse(&content).map_err(|e| InitError::InvalidTemplate {
        error: e.to_string(),
    })?;

    let lanefile_path = path.join(LANEFILE_NAME);
    let overwritten = lanefile_path.exists();
    filesystem::write_file(&lanefile_path, &content)?;

    Ok(InitResult {
        lanefile_path,
        overwritten,
        platform: options.platform.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generated_lanefile_loads_for_every_platform() {
        for platform in [None, Some("ios"), Some("mac"), Some("android")] {
            let content = generate_lanefile_content("demo", platform);
            let lanefile = Lanefile::parse(&content).unwrap();
            assert!(lanefile.registry().lane(None, "test").is_some());
            if let Some(p) = platform {
                assert_eq!(lanefile.is_platform_block(p), Ok(true));
            }
        }
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        init_lanefile(temp.path(), &InitOptions::default()).unwrap();

        let err = init_lanefile(temp.path(), &InitOptions::default()).unwrap_err();
        assert!(matches!(err, InitError::LanefileExists { .. }));

        let forced = InitOptions {
            force: true,
            ..InitOptions::default()
        };
        assert!(init_lanefile(temp.path(), &forced).unwrap().overwritten);
    }

    #[test]
    fn test_derive_project_name() {
        let path = Path::new("/home/user/my-project");
        assert_eq!(derive_project_name(path), "my-project");
    }
}
