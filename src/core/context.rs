//! Shared run context
//!
//! Key/value store written by the runner and by actions. It lives as long as
//! the runner that owns it and is never cleared between executions.

use indexmap::IndexMap;

use super::value::Value;

/// Well-known context keys
pub mod keys {
    /// Full name of the lane currently executing
    pub const LANE_NAME: &str = "LANE_NAME";
    /// Platform of the lane currently executing, as a symbol
    pub const PLATFORM_NAME: &str = "PLATFORM_NAME";
    /// Platform chosen by `default_platform`
    pub const DEFAULT_PLATFORM: &str = "DEFAULT_PLATFORM";
}

/// Mutable mapping shared by every lane and action of a runner
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneContext {
    values: IndexMap<String, Value>,
}

impl LaneContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Store a value, returning the previous one
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// `LANE_NAME`, when a lane has run
    pub fn current_lane(&self) -> Option<&str> {
        self.get(keys::LANE_NAME).and_then(Value::as_str)
    }

    /// `PLATFORM_NAME`, when the running lane has one
    pub fn current_platform(&self) -> Option<&str> {
        self.get(keys::PLATFORM_NAME).and_then(Value::as_str)
    }

    /// `DEFAULT_PLATFORM`, when set
    pub fn default_platform(&self) -> Option<&str> {
        self.get(keys::DEFAULT_PLATFORM).and_then(Value::as_str)
    }

    /// Record the lane about to run
    pub(crate) fn enter_lane(&mut self, full_name: &str, platform: Option<&str>) {
        self.set(keys::LANE_NAME, full_name);
        self.set(
            keys::PLATFORM_NAME,
            platform.map_or(Value::Nil, Value::symbol),
        );
    }
}
