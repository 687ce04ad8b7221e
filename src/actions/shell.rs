//! Shell-wrapping actions
//!
//! In dry-run mode these return the command line they would run instead of
//! running it.

use tracing::info;

use super::{Action, ActionContext, Arguments};
use crate::core::value::Value;
use crate::error::ActionError;
use crate::infra::shell;

/// Run `command` unless dry run is on; returns trimmed stdout, or the
/// command itself in dry run
fn run_command(command: &str, tool: Option<(&str, &str)>, ctx: &ActionContext<'_>) -> Result<Value, ActionError> {
    if ctx.options.dry_run {
        info!("[dry run] {command}");
        return Ok(Value::Str(command.to_string()));
    }

    if let Some((tool, hint)) = tool {
        shell::require_tool(tool, hint)?;
    }

    info!("$ {command}");
    let output = shell::run(command, &ctx.options.working_dir)?;
    Ok(Value::Str(output.trim().to_string()))
}

/// `sh "command"`
pub struct Sh;

impl Action for Sh {
    fn name(&self) -> &str {
        "sh"
    }

    fn description(&self) -> &str {
        "Run a shell command and return its output"
    }

    fn run(&self, args: &Arguments, ctx: &mut ActionContext<'_>) -> Result<Value, ActionError> {
        let command = match args.named("command") {
            Some(command) => command.to_string(),
            None => args
                .positional
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        };
        if command.trim().is_empty() {
            return Err(ActionError::new("Action 'sh' requires a command"));
        }
        run_command(&command, None, ctx)
    }
}

/// `cocoapods` runs `pod install`
pub struct Cocoapods;

impl Action for Cocoapods {
    fn name(&self) -> &str {
        "cocoapods"
    }

    fn description(&self) -> &str {
        "Install CocoaPods dependencies"
    }

    fn platforms(&self) -> Option<&[&str]> {
        Some(&["ios", "mac"])
    }

    fn run(&self, args: &Arguments, ctx: &mut ActionContext<'_>) -> Result<Value, ActionError> {
        let mut command = String::from("pod install");
        if args.flag("clean") {
            command.push_str(" --clean-install");
        }
        if args.flag("repo_update") {
            command.push_str(" --repo-update");
        }
        run_command(
            &command,
            Some(("pod", "Install CocoaPods with 'gem install cocoapods'.")),
            ctx,
        )
    }
}

/// `gradle task: "assembleRelease"` runs the project's gradle wrapper
pub struct Gradle;

impl Action for Gradle {
    fn name(&self) -> &str {
        "gradle"
    }

    fn description(&self) -> &str {
        "Run a task with the project's gradle wrapper"
    }

    fn platforms(&self) -> Option<&[&str]> {
        Some(&["android"])
    }

    fn run(&self, args: &Arguments, ctx: &mut ActionContext<'_>) -> Result<Value, ActionError> {
        let task = args.require_text(self.name(), "task", 0)?;
        let mut command = format!("./gradlew {task}");
        if let Some(flags) = args.text("flags", 1) {
            command.push(' ');
            command.push_str(&flags);
        }

        if !ctx.options.dry_run && !ctx.options.working_dir.join("gradlew").is_file() {
            return Err(ActionError::new(format!(
                "Could not find gradlew in '{}'",
                ctx.options.working_dir.display()
            )));
        }
        run_command(&command, None, ctx)
    }
}

/// `frameit` puts screenshots into device frames
pub struct Frameit;

impl Action for Frameit {
    fn name(&self) -> &str {
        "frameit"
    }

    fn description(&self) -> &str {
        "Put screenshots into device frames"
    }

    fn platforms(&self) -> Option<&[&str]> {
        Some(&["ios", "mac"])
    }

    fn run(&self, args: &Arguments, ctx: &mut ActionContext<'_>) -> Result<Value, ActionError> {
        let mut command = String::from("frameit");
        if args.flag("white") {
            command.push_str(" white");
        }
        if let Some(path) = args.text("path", 0) {
            command = format!("cd {} && {command}", shell::quote(&path));
        }
        run_command(
            &command,
            Some(("frameit", "Install frameit with 'gem install frameit'.")),
            ctx,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::LaneContext;
    use crate::core::runner::RunnerOptions;
    use tempfile::TempDir;

    fn run_with(action: &dyn Action, args: &Arguments, options: &RunnerOptions) -> Result<Value, ActionError> {
        let mut context = LaneContext::new();
        let mut ctx = ActionContext {
            lane_context: &mut context,
            options,
            platform: Some("ios"),
        };
        action.run(args, &mut ctx)
    }

    fn dry_run() -> RunnerOptions {
        RunnerOptions {
            dry_run: true,
            ..RunnerOptions::default()
        }
    }

    #[test]
    fn test_sh_returns_trimmed_output() {
        let temp = TempDir::new().unwrap();
        let options = RunnerOptions {
            working_dir: temp.path().to_path_buf(),
            ..RunnerOptions::default()
        };
        let args = Arguments {
            positional: vec!["echo".into(), "hello".into()],
            ..Arguments::default()
        };
        assert_eq!(run_with(&Sh, &args, &options).unwrap(), Value::from("hello"));
    }

    #[test]
    fn test_sh_failure_is_action_error() {
        let temp = TempDir::new().unwrap();
        let options = RunnerOptions {
            working_dir: temp.path().to_path_buf(),
            ..RunnerOptions::default()
        };
        let args = Arguments {
            positional: vec!["exit 2".into()],
            ..Arguments::default()
        };
        let err = run_with(&Sh, &args, &options).unwrap_err();
        assert!(err.message.contains("was 2 instead of 0"));
    }

    #[test]
    fn test_dry_run_returns_commands() {
        let options = dry_run();
        assert_eq!(
            run_with(&Cocoapods, &Arguments::new(), &options).unwrap(),
            Value::from("pod install")
        );

        let mut args = Arguments::new();
        args.named.insert("task".into(), "assembleRelease".into());
        assert_eq!(
            run_with(&Gradle, &args, &options).unwrap(),
            Value::from("./gradlew assembleRelease")
        );
    }

    #[test]
    fn test_gradle_requires_task() {
        let err = run_with(&Gradle, &Arguments::new(), &dry_run()).unwrap_err();
        assert_eq!(err.message, "Action 'gradle' requires the 'task' parameter");
    }
}
