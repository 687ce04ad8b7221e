//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use laneway::actions::ActionCatalog;
use laneway::core::lanefile::Lanefile;
use laneway::core::runner::RunnerOptions;
use tempfile::TempDir;

/// Path of a fixture Lanefile under `tests/fixtures`
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Test project context
///
/// Creates a temporary directory that lanes write their marker files into.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Runner options that resolve relative paths inside this project
    pub fn options(&self) -> RunnerOptions {
        RunnerOptions {
            dry_run: false,
            working_dir: self.path(),
        }
    }

    /// Load a fixture Lanefile with this project as working directory
    pub fn load_fixture(&self, name: &str) -> Lanefile {
        Lanefile::load_with(&fixture(name), ActionCatalog::bundled(), self.options())
            .expect("Failed to load fixture")
    }

    /// Parse Lanefile text with this project as working directory
    pub fn parse(&self, source: &str) -> Lanefile {
        Lanefile::parse_with(source, ActionCatalog::bundled(), self.options()).expect("Failed to parse Lanefile")
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Run the laneway binary in this project with an isolated config dir
    pub fn laneway(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_laneway"))
            .current_dir(self.path())
            .env("LANEWAY_CONFIG_DIR", self.path().join(".config"))
            .env_remove("LANEWAY_LANEFILE")
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("Failed to execute laneway")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Lanefile whose hooks append their names to the `log` shared value
pub const ORDERED_HOOKS: &str = r#"
set_shared_value "log", []

before_all { |lane|
  set_shared_value "log", shared_value("log") + ["root before_all"]
}

after_all { |lane|
  set_shared_value "log", shared_value("log") + ["root after_all"]
}

error { |lane, message|
  set_shared_value "log", shared_value("log") + ["root error"]
}

lane :plain {
  set_shared_value "log", shared_value("log") + ["body"]
}

platform :ios {
  before_all { |lane|
    set_shared_value "log", shared_value("log") + ["ios before_all"]
  }

  after_all { |lane|
    set_shared_value "log", shared_value("log") + ["ios after_all"]
  }

  error { |lane, message|
    set_shared_value "log", shared_value("log") + ["ios error"]
  }

  lane :build {
    set_shared_value "log", shared_value("log") + ["body"]
  }

  lane :broken {
    fail "broken body"
  }
}

platform :android {
  before_all { |lane|
    set_shared_value "log", shared_value("log") + ["android before_all"]
  }

  after_all { |lane|
    set_shared_value "log", shared_value("log") + ["android after_all"]
  }
}
"#;
