//! File actions
//!
//! Relative paths resolve against the runner's working directory.

use super::{Action, ActionContext, Arguments};
use crate::core::value::Value;
use crate::error::ActionError;
use crate::infra::filesystem;

/// `write_file "path", "content"`
pub struct WriteFile;

impl Action for WriteFile {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write text to a file"
    }

    fn run(&self, args: &Arguments, ctx: &mut ActionContext<'_>) -> Result<Value, ActionError> {
        let path = args.require_text(self.name(), "path", 0)?;
        let content = args.text("content", 1).unwrap_or_default();
        let target = filesystem::resolve(&ctx.options.working_dir, &path);
        filesystem::write_file(&target, &content)?;
        Ok(Value::Str(target.display().to_string()))
    }
}

/// `read_file "path"`
pub struct ReadFile;

impl Action for ReadFile {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a text file"
    }

    fn run(&self, args: &Arguments, ctx: &mut ActionContext<'_>) -> Result<Value, ActionError> {
        let path = args.require_text(self.name(), "path", 0)?;
        let target = filesystem::resolve(&ctx.options.working_dir, &path);
        Ok(Value::Str(filesystem::read_file(&target)?))
    }
}
