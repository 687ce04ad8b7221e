//! External command execution
//!
//! Runs shell commands for the shell-wrapping actions.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::ShellError;

/// Locate a tool on PATH
pub fn require_tool(tool: &str, hint: &str) -> Result<PathBuf, ShellError> {
    which::which(tool).map_err(|_| ShellError::ToolNotFound {
        tool: tool.to_string(),
        hint: hint.to_string(),
    })
}

/// Run `command` through `sh -c` in `dir` and return its stdout.
///
/// A non-zero exit status is an error carrying stdout and stderr.
pub fn run(command: &str, dir: &Path) -> Result<String, ShellError> {
    debug!("$ {command}");

    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(dir)
        .output()
        .map_err(|e| ShellError::Spawn {
            command: command.to_string(),
            error: e.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let status = output
            .status
            .code()
            .map_or_else(|| "unknown".to_string(), |c| c.to_string());
        return Err(ShellError::Failed {
            command: command.to_string(),
            status,
            output: format!("{stdout}{stderr}").trim_end().to_string(),
        });
    }

    Ok(stdout)
}

/// Quote an argument for `sh`
pub fn quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@%+,".contains(c))
    {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_captures_stdout() {
        let temp = TempDir::new().unwrap();
        let out = run("echo hello", temp.path()).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn test_run_reports_exit_status() {
        let temp = TempDir::new().unwrap();
        let err = run("echo broken >&2; exit 3", temp.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Exit status of command 'echo broken >&2; exit 3' was 3 instead of 0."));
        assert!(message.contains("broken"));
    }

    #[test]
    fn test_require_missing_tool() {
        let err = require_tool("definitely-not-a-real-tool-xyz", "Install it.").unwrap_err();
        assert!(matches!(err, ShellError::ToolNotFound { .. }));
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("two words"), "'two words'");
        assert_eq!(quote("it's"), r"'it'\''s'");
    }
}
