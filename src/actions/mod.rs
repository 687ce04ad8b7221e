//! Action catalog
//!
//! Actions are the leaves of a lane: anything a statement calls that is
//! neither a local variable nor a lane. Each action is a capability
//! descriptor (name, description, allowed platforms) plus its invocation.
//!
//! # Submodules
//!
//! - [`control`] - Flow and context actions (`puts`, `fail`, `shared_value`, ...)
//! - [`files`] - `read_file` and `write_file`
//! - [`shell`] - Shell-wrapping actions (`sh`, `cocoapods`, `gradle`, `frameit`)
//! - [`transporter`] - `itunes_transporter`

pub mod control;
pub mod files;
pub mod shell;
pub mod transporter;

use indexmap::IndexMap;

use crate::core::context::LaneContext;
use crate::core::runner::RunnerOptions;
use crate::core::value::{Map, Value};
use crate::error::ActionError;

/// Names of every bundled action; these count as official in usage stats
pub const BUNDLED_ACTIONS: &[&str] = &[
    "sh",
    "puts",
    "write_file",
    "read_file",
    "shared_value",
    "set_shared_value",
    "default_platform",
    "min_version",
    "fail",
    "cocoapods",
    "gradle",
    "frameit",
    "itunes_transporter",
];

/// Evaluated call arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub positional: Vec<Value>,
    pub named: Map,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn named(&self, key: &str) -> Option<&Value> {
        self.named.get(key)
    }

    /// Named argument `key`, falling back to positional `index`
    pub fn get(&self, key: &str, index: usize) -> Option<&Value> {
        self.named(key).or_else(|| self.positional(index))
    }

    /// Like [`Arguments::get`] but as display text; nil counts as missing
    pub fn text(&self, key: &str, index: usize) -> Option<String> {
        self.get(key, index)
            .filter(|v| !v.is_nil())
            .map(ToString::to_string)
    }

    /// Required textual argument
    pub fn require_text(&self, action: &str, key: &str, index: usize) -> Result<String, ActionError> {
        self.text(key, index).ok_or_else(|| {
            ActionError::new(format!("Action '{action}' requires the '{key}' parameter"))
        })
    }

    /// Boolean flag; absent means false
    pub fn flag(&self, key: &str) -> bool {
        self.named(key).is_some_and(Value::is_truthy)
    }
}

/// State an action may read or write while it runs
pub struct ActionContext<'a> {
    /// Shared run context
    pub lane_context: &'a mut LaneContext,
    pub options: &'a RunnerOptions,
    /// Platform selected for the running lane
    pub platform: Option<&'a str>,
}

/// An invocable action
pub trait Action {
    fn name(&self) -> &str;

    /// One-line summary shown by `laneway actions`
    fn description(&self) -> &str;

    /// Platforms the action may run on, `None` for any
    fn platforms(&self) -> Option<&[&str]> {
        None
    }

    /// Restrictions only apply once a platform is selected
    fn is_supported(&self, platform: Option<&str>) -> bool {
        match (self.platforms(), platform) {
            (Some(allowed), Some(platform)) => allowed.contains(&platform),
            _ => true,
        }
    }

    fn run(&self, args: &Arguments, ctx: &mut ActionContext<'_>) -> Result<Value, ActionError>;
}

/// Actions by name, in registration order
#[derive(Default)]
pub struct ActionCatalog {
    actions: IndexMap<String, Box<dyn Action>>,
}

impl std::fmt::Debug for ActionCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.actions.keys()).finish()
    }
}

impl ActionCatalog {
    /// Catalog without any actions
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog with every bundled action
    pub fn bundled() -> Self {
        let mut catalog = Self::empty();
        catalog.register(Box::new(shell::Sh));
        catalog.register(Box::new(control::Puts));
        catalog.register(Box::new(files::WriteFile));
        catalog.register(Box::new(files::ReadFile));
        catalog.register(Box::new(control::SharedValue));
        catalog.register(Box::new(control::SetSharedValue));
        catalog.register(Box::new(control::DefaultPlatform));
        catalog.register(Box::new(control::MinVersion));
        catalog.register(Box::new(control::Fail));
        catalog.register(Box::new(shell::Cocoapods));
        catalog.register(Box::new(shell::Gradle));
        catalog.register(Box::new(shell::Frameit));
        catalog.register(Box::new(transporter::ItunesTransporter));
        catalog
    }

    /// Add an action, replacing any action of the same name
    pub fn register(&mut self, action: Box<dyn Action>) {
        self.actions.insert(action.name().to_string(), action);
    }

    pub fn get(&self, name: &str) -> Option<&(dyn Action + 'static)> {
        self.actions.get(name).map(|a| &**a)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Action + 'static)> {
        self.actions.values().map(|a| &**a)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
