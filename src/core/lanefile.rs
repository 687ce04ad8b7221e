//! Lanefile loading
//!
//! A [`Lanefile`] is a parsed and registered script together with the runner
//! that executes its lanes.

use std::path::{Path, PathBuf};

use tracing::info;

use super::registry::{Registrar, Registry};
use super::runner::{Runner, RunnerOptions};
use super::script::Script;
use crate::actions::ActionCatalog;
use crate::config::defaults::{LANEFILE_NAME, LANEFILE_SEARCH_DIRS};
use crate::error::{LanewayError, RunnerError};

/// A loaded Lanefile
#[derive(Debug)]
pub struct Lanefile {
    /// Directory relative imports resolve against
    base_dir: PathBuf,
    path: Option<PathBuf>,
    runner: Runner,
}

impl Lanefile {
    /// Load a Lanefile with the bundled actions and default options
    pub fn load(path: &Path) -> Result<Self, LanewayError> {
        Self::load_with(path, ActionCatalog::bundled(), RunnerOptions::default())
    }

    pub fn load_with(path: &Path, catalog: ActionCatalog, options: RunnerOptions) -> Result<Self, LanewayError> {
        let script = Script::from_path(path)?;
        let mut lanefile = Self::from_script(&script, catalog, options)?;
        lanefile.path = Some(path.to_path_buf());
        info!("Loaded {} lanes from {}", lanefile.registry().lanes().count(), path.display());
        Ok(lanefile)
    }

    /// Parse Lanefile text with the bundled actions and default options
    pub fn parse(source: &str) -> Result<Self, LanewayError> {
        Self::parse_with(source, ActionCatalog::bundled(), RunnerOptions::default())
    }

    pub fn parse_with(source: &str, catalog: ActionCatalog, options: RunnerOptions) -> Result<Self, LanewayError> {
        Self::from_script(&Script::inline(source), catalog, options)
    }

    fn from_script(script: &Script, catalog: ActionCatalog, options: RunnerOptions) -> Result<Self, LanewayError> {
        let mut registry = Registry::new();
        let mut registrar = Registrar::new(&mut registry);
        registrar.register(script)?;
        let preamble = registrar.into_preamble();

        let mut runner = Runner::new(registry, catalog, options);
        runner.run_preamble(&preamble)?;

        Ok(Self {
            base_dir: script.base_dir(),
            path: None,
            runner,
        })
    }

    /// Register another script's declarations into this Lanefile, as if it
    /// were imported at the end of it. Relative paths resolve against this
    /// Lanefile's directory.
    pub fn import(&mut self, path: &Path) -> Result<(), LanewayError> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path.strip_prefix(".").unwrap_or(path))
        };
        let script = Script::from_path(&path)?;

        // Declarations land in a copy so a failing import leaves nothing behind
        let mut staged = self.runner.registry().clone();
        let mut registrar = Registrar::new(&mut staged);
        registrar.register(&script)?;
        let preamble = registrar.into_preamble();
        *self.runner.registry_mut() = staged;
        self.runner.run_preamble(&preamble)?;
        Ok(())
    }

    /// Path the Lanefile was loaded from, `None` for parsed text
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn registry(&self) -> &Registry {
        self.runner.registry()
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut Runner {
        &mut self.runner
    }

    /// Whether `token` names a platform (true) or a root lane (false)
    pub fn is_platform_block(&self, token: &str) -> Result<bool, RunnerError> {
        self.runner.is_platform_block(token)
    }
}

/// Look for a Lanefile in `dir` and its search directories
pub fn discover(dir: &Path) -> Option<PathBuf> {
    LANEFILE_SEARCH_DIRS
        .iter()
        .map(|sub| dir.join(sub).join(LANEFILE_NAME))
        .find(|candidate| candidate.is_file())
}
