//! Action usage collector
//!
//! Counts how often each action or lane switch was launched during one
//! top-level execution.

use indexmap::IndexMap;
use serde::Serialize;

use crate::actions::BUNDLED_ACTIONS;
use crate::config::defaults::LANE_SWITCH_ACTION;

/// One row of [`ActionCollector::summary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionUsage {
    pub name: String,
    pub count: usize,
    pub official: bool,
}

/// Per-run usage ledger
#[derive(Debug, Clone, Default)]
pub struct ActionCollector {
    launches: IndexMap<String, usize>,
}

impl ActionCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one launch of `name`
    pub fn did_launch_action(&mut self, name: &str) {
        *self.launches.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Launch counts in first-launch order
    pub fn launches(&self) -> &IndexMap<String, usize> {
        &self.launches
    }

    pub fn count(&self, name: &str) -> usize {
        self.launches.get(name).copied().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.launches.clear();
    }

    /// Whether `name` is a bundled action or the lane switch marker
    pub fn is_official(name: &str) -> bool {
        name == LANE_SWITCH_ACTION || BUNDLED_ACTIONS.contains(&name)
    }

    pub fn summary(&self) -> Vec<ActionUsage> {
        self.launches
            .iter()
            .map(|(name, &count)| ActionUsage {
                name: name.clone(),
                count,
                official: Self::is_official(name),
            })
            .collect()
    }
}
