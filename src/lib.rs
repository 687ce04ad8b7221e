//! Laneway - lane execution engine for declarative automation scripts
//!
//! A Lanefile declares lanes (named sequences of actions), groups them by
//! platform and wraps them in `before_all`, `after_all` and `error` hooks.
//! This library parses Lanefiles, registers their lanes and runs them.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Script parsing, lane registration and execution
//! - [`actions`] - The action catalog and the bundled actions
//! - [`infra`] - Infrastructure layer (filesystem, processes, directories)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling
//!
//! # Example
//!
//! ```
//! use laneway::core::lanefile::Lanefile;
//! use laneway::core::value::Value;
//!
//! let mut lanefile = Lanefile::parse("lane :hello {\n  \"hi\"\n}\n").unwrap();
//! let result = lanefile.runner_mut().execute("hello", None, None).unwrap();
//! assert_eq!(result, Value::from("hi"));
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
