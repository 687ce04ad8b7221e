//! Default configuration values

/// Human name of the script kind, used in user-facing messages
pub const SCRIPT_KIND: &str = "Lanefile";

/// File name looked up when no script path is given
pub const LANEFILE_NAME: &str = "Lanefile";

/// Directories searched (in order) for a Lanefile, relative to the working directory
pub const LANEFILE_SEARCH_DIRS: &[&str] = &[".", "laneway"];

/// Origin marker for scripts parsed from a string
pub const INLINE_ORIGIN: &str = "(inline)";

/// Identifier recorded in the usage ledger for every lane switch
pub const LANE_SWITCH_ACTION: &str = "lane_switch";

/// Names a lane may not use
pub const RESERVED_LANE_NAMES: &[&str] = &[
    "run",
    "init",
    "lanes",
    "list",
    "actions",
    "action",
    "help",
    "version",
    "docs",
    "env",
    "lane",
    "platform",
    "before_all",
    "after_all",
    "error",
    "import",
    "lane_switch",
];

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
