//! Infrastructure layer
//!
//! Handles I/O operations: filesystem, external processes and platform
//! directories. Actions reach side effects only through this module.

pub mod dirs;
pub mod filesystem;
pub mod shell;
