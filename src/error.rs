//! Error types for laneway
//!
//! Domain-specific error types using thiserror. Every message is complete on
//! its own so it can be shown to the user as-is.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::defaults::SCRIPT_KIND;

/// A parse failure with its position in the originating script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// File path or the inline-source marker
    pub origin: String,
    /// 1-based line number, relative to the start of the script text
    pub line: usize,
    /// 1-based column of the offending token
    pub column: usize,
    /// Low-level parser message
    pub message: String,
    /// The offending source line, verbatim
    pub source_line: String,
}

impl SyntaxError {
    /// Render the caret line pointing at the offending column
    pub fn caret(&self) -> String {
        let offset: String = self
            .source_line
            .chars()
            .take(self.column.saturating_sub(1))
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        format!("{offset}^")
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Syntax error in your {SCRIPT_KIND} on line {line}: {origin}:{line}: {message}\n{source}\n{caret}",
            line = self.line,
            origin = self.origin,
            message = self.message,
            source = self.source_line,
            caret = self.caret(),
        )
    }
}

impl std::error::Error for SyntaxError {}

/// Script loading errors
#[derive(Error, Debug)]
pub enum ScriptError {
    /// Script file does not exist
    #[error("Could not find Lanefile at path '{path}'")]
    NotFound { path: String },

    /// Script file exists but could not be read
    #[error("Failed to read Lanefile '{path}': {error}")]
    Read { path: String, error: String },

    /// Script text is malformed
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// Declaration errors raised while building the lane registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    /// Lane name was not written as a symbol
    #[error("lane name must start with :")]
    NotSymbol { name: String },

    /// Lane name contains whitespace
    #[error("lane name must not contain any spaces")]
    ContainsSpaces { name: String },

    /// Lane name is reserved
    #[error("Name '{name}' is already taken")]
    NameTaken { name: String },

    /// Lane declared twice in the same scope
    #[error("Lane '{name}' was defined multiple times!")]
    Duplicate { name: String },

    /// Lane declared without a body
    #[error("You have to pass a block for lane '{name}'.")]
    MissingBlock { name: String },

    /// Platform name was not written as a symbol
    #[error("platform name must start with :")]
    PlatformNotSymbol { name: String },

    /// Platform declared inside another platform
    #[error("Platform '{name}' cannot be declared inside platform '{outer}'")]
    NestedPlatform { name: String, outer: String },

    /// Plain statement inside a platform block
    #[error("Only lanes and hooks can be declared inside platform '{platform}' ({location})")]
    StatementInPlatform { platform: String, location: String },

    /// Import chain refers back to itself
    #[error("Cyclic import of '{path}'")]
    CyclicImport { path: PathBuf },
}

/// Errors raised while resolving or executing lanes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunnerError {
    /// Requested lane does not exist in the requested scope
    #[error("Could not find lane '{requested}'. Available lanes: {}", available.join(", "))]
    LaneNotFound {
        requested: String,
        available: Vec<String>,
    },

    /// Token is neither a platform nor a root lane
    #[error("Could not find '{token}'. Available lanes: {}", available.join(", "))]
    UnknownScope {
        token: String,
        available: Vec<String>,
    },

    /// Identifier is neither a variable, a lane nor an action
    #[error("Could not find action or lane '{name}'. Referenced at {location}; run 'laneway actions' to list the available actions.")]
    UnresolvedIdentifier { name: String, location: String },

    /// Action is restricted to other platforms
    #[error("Action '{action}' doesn't support required operating system '{platform}'.")]
    UnsupportedPlatform { action: String, platform: String },

    /// Lane switch received something other than a mapping
    #[error("Parameters for a lane must always be a mapping, got {got} for lane '{lane}'")]
    InvalidLaneParameters { lane: String, got: String },

    /// Operator applied to values it does not support
    #[error("{message} ({location})")]
    TypeMismatch { message: String, location: String },

    /// Failure raised by an action, message passed through unchanged
    #[error("{message}")]
    ActionFailure { action: String, message: String },
}

/// Failure reported by an action implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    /// Create an action error from any message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ShellError> for ActionError {
    fn from(e: ShellError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<FilesystemError> for ActionError {
    fn from(e: FilesystemError) -> Self {
        Self::new(e.to_string())
    }
}

/// External command errors
#[derive(Error, Debug)]
pub enum ShellError {
    /// Required tool is not on PATH
    #[error("Could not find '{tool}' in PATH. {hint}")]
    ToolNotFound { tool: String, hint: String },

    /// Process could not be started
    #[error("Failed to run '{command}': {error}")]
    Spawn { command: String, error: String },

    /// Process exited unsuccessfully
    #[error("Exit status of command '{command}' was {status} instead of 0.\n{output}")]
    Failed {
        command: String,
        status: String,
        output: String,
    },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Errors in a command-line lane request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    /// Only parameters were given
    #[error("No lane given. Run 'laneway lanes' to list the available lanes")]
    MissingLane,

    /// More than a platform and a lane
    #[error("Too many lane arguments: {}. Expected [PLATFORM] LANE", .0.join(" "))]
    TooManyTargets(Vec<String>),

    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// Errors from `laneway init`
#[derive(Error, Debug)]
pub enum InitError {
    /// Target directory does not exist
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// A Lanefile is already present
    #[error("A Lanefile already exists at '{path}'. Use --force to overwrite it")]
    LanefileExists { path: PathBuf },

    /// Generated Lanefile could not be written
    #[error(transparent)]
    Write(#[from] FilesystemError),

    /// Generated Lanefile does not load
    #[error("Generated Lanefile is invalid: {error}")]
    InvalidTemplate { error: String },
}

/// Top-level laneway error type
#[derive(Error, Debug)]
pub enum LanewayError {
    /// Script loading or parsing error
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Registry declaration error
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    /// Lane resolution or execution error
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

impl From<SyntaxError> for LanewayError {
    fn from(e: SyntaxError) -> Self {
        Self::Script(ScriptError::Syntax(e))
    }
}
