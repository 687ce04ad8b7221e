//! Core module
//!
//! Everything between Lanefile text and a finished lane. Process and file
//! access stays in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`script`] - Script sources, origins and quote repair
//! - [`lexer`] / [`parser`] / [`ast`] - Lanefile syntax
//! - [`registry`] - Lanes, platforms and hooks registered from scripts
//! - [`runner`] - Lane resolution, hook ordering and evaluation
//! - [`context`] - Shared values visible to lanes and actions
//! - [`collector`] - Per-execution action usage ledger
//! - [`lanefile`] - Loading a Lanefile into a runner
//! - [`invocation`] - Command-line lane requests
//! - [`init`] - Starter Lanefile generation
//! - [`global_config`] - Global configuration management

pub mod ast;
pub mod collector;
pub mod context;
pub mod global_config;
pub mod init;
pub mod invocation;
pub mod lanefile;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod runner;
pub mod script;
pub mod value;
