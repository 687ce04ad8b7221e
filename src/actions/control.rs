//! Flow and context actions

use semver::Version;
use tracing::info;

use super::{Action, ActionContext, Arguments};
use crate::core::context::keys;
use crate::core::value::Value;
use crate::error::ActionError;

/// `puts "message"`
pub struct Puts;

impl Action for Puts {
    fn name(&self) -> &str {
        "puts"
    }

    fn description(&self) -> &str {
        "Print a message"
    }

    fn run(&self, args: &Arguments, _ctx: &mut ActionContext<'_>) -> Result<Value, ActionError> {
        let message = args.text("message", 0).unwrap_or_default();
        info!(target: "laneway::puts", "{message}");
        println!("{message}");
        Ok(Value::Nil)
    }
}

/// `fail "message"`
pub struct Fail;

impl Action for Fail {
    fn name(&self) -> &str {
        "fail"
    }

    fn description(&self) -> &str {
        "Abort the lane with a message"
    }

    fn run(&self, args: &Arguments, _ctx: &mut ActionContext<'_>) -> Result<Value, ActionError> {
        let message = args
            .text("message", 0)
            .unwrap_or_else(|| "Lane failed".to_string());
        Err(ActionError::new(message))
    }
}

/// `shared_value "KEY"`
pub struct SharedValue;

impl Action for SharedValue {
    fn name(&self) -> &str {
        "shared_value"
    }

    fn description(&self) -> &str {
        "Read a value from the shared run context"
    }

    fn run(&self, args: &Arguments, ctx: &mut ActionContext<'_>) -> Result<Value, ActionError> {
        let key = args.require_text(self.name(), "key", 0)?;
        Ok(ctx.lane_context.get(&key).cloned().unwrap_or_default())
    }
}

/// `set_shared_value "KEY", value`
pub struct SetSharedValue;

impl Action for SetSharedValue {
    fn name(&self) -> &str {
        "set_shared_value"
    }

    fn description(&self) -> &str {
        "Store a value in the shared run context"
    }

    fn run(&self, args: &Arguments, ctx: &mut ActionContext<'_>) -> Result<Value, ActionError> {
        let key = args.require_text(self.name(), "key", 0)?;
        let value = args.get("value", 1).cloned().unwrap_or_default();
        ctx.lane_context.set(key, value.clone());
        Ok(value)
    }
}

/// `default_platform :ios`
pub struct DefaultPlatform;

impl Action for DefaultPlatform {
    fn name(&self) -> &str {
        "default_platform"
    }

    fn description(&self) -> &str {
        "Set the platform used when none is given on the command line"
    }

    fn run(&self, args: &Arguments, ctx: &mut ActionContext<'_>) -> Result<Value, ActionError> {
        let platform = args.require_text(self.name(), "platform", 0)?;
        let value = Value::symbol(platform);
        ctx.lane_context.set(keys::DEFAULT_PLATFORM, value.clone());
        Ok(value)
    }
}

/// `min_version "0.1.0"`
pub struct MinVersion;

impl MinVersion {
    fn check(required: &str, running: &str) -> Result<(), ActionError> {
        let required_version = Version::parse(required)
            .map_err(|e| ActionError::new(format!("Invalid version '{required}': {e}")))?;
        let running_version = Version::parse(running)
            .map_err(|e| ActionError::new(format!("Invalid version '{running}': {e}")))?;

        if running_version < required_version {
            return Err(ActionError::new(format!(
                "The Lanefile requires laneway version {required} or newer, you are running {running}"
            )));
        }
        Ok(())
    }
}

impl Action for MinVersion {
    fn name(&self) -> &str {
        "min_version"
    }

    fn description(&self) -> &str {
        "Require a minimum laneway version"
    }

    fn run(&self, args: &Arguments, _ctx: &mut ActionContext<'_>) -> Result<Value, ActionError> {
        let required = args.require_text(self.name(), "version", 0)?;
        Self::check(&required, env!("CARGO_PKG_VERSION"))?;
        Ok(Value::Bool(true))
    }
}
