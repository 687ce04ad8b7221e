//! `itunes_transporter` action
//!
//! Wraps Apple's iTMSTransporter to download app metadata from, or upload a
//! package to, App Store Connect. The transporter prints its failures as
//! `ERROR ITMS-<code>: "<text>"` lines, which are collected into the action's
//! error message.

use std::env;

use regex::Regex;
use tracing::{debug, info};

use super::{Action, ActionContext, Arguments};
use crate::core::value::Value;
use crate::error::{ActionError, ShellError};
use crate::infra::shell;

/// Default location of the transporter inside Xcode
const DEFAULT_TRANSPORTER_PATH: &str =
    "/Applications/Xcode.app/Contents/Applications/Application Loader.app/Contents/itms/bin/iTMSTransporter";

/// Overrides the transporter binary
pub const ENV_TRANSPORTER_PATH: &str = "LANEWAY_TRANSPORTER_PATH";
/// Account used when no `username` is given
pub const ENV_USERNAME: &str = "LANEWAY_ITUNES_USER";
/// Password for the account
pub const ENV_PASSWORD: &str = "LANEWAY_ITUNES_PASSWORD";

const PASSWORD_MASK: &str = "YourPassword";

/// `ERROR ITMS-<code>: "<text>"`
const ITMS_ERROR_PATTERN: &str = r#"ERROR ITMS-(\d+): "?([^"\n]*)"?"#;

/// What the transporter should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransporterMode {
    /// `lookupMetadata`: fetch the current `.itmsp` package
    Download,
    /// `upload`: send a prepared `.itmsp` package
    Upload,
}

impl TransporterMode {
    fn parse(text: &str) -> Result<Self, ActionError> {
        match text {
            "download" => Ok(Self::Download),
            "upload" => Ok(Self::Upload),
            other => Err(ActionError::new(format!(
                "Unknown transporter action '{other}', use 'download' or 'upload'"
            ))),
        }
    }
}

/// Parameters for one transporter run
#[derive(Debug, Clone)]
pub struct TransporterRequest {
    pub mode: TransporterMode,
    pub apple_id: u64,
    pub username: String,
    pub password: String,
    pub directory: String,
    pub transporter: String,
}

impl TransporterRequest {
    /// Command line; the password is masked unless `reveal` is set
    pub fn command(&self, reveal: bool) -> String {
        let password = if reveal { &self.password } else { PASSWORD_MASK };
        let credentials = format!(
            "-u {} -p {}",
            shell::quote(&self.username),
            shell::quote(password)
        );
        let transporter = shell::quote(&self.transporter);
        match self.mode {
            TransporterMode::Download => format!(
                "{transporter} -m lookupMetadata {credentials} -apple_id {} -destination {}",
                self.apple_id,
                shell::quote(&self.directory)
            ),
            TransporterMode::Upload => format!(
                "{transporter} -m upload {credentials} -f {}",
                shell::quote(&self.directory)
            ),
        }
    }
}

/// Collect `ERROR ITMS-...` messages from transporter output
pub fn transporter_errors(output: &str) -> Vec<String> {
    let Ok(re) = Regex::new(ITMS_ERROR_PATTERN) else {
        return Vec::new();
    };
    re.captures_iter(output)
        .map(|c| format!("ITMS-{}: {}", &c[1], c[2].trim()))
        .collect()
}

/// Numeric App Store id from an integer or a string of digits
fn parse_apple_id(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Int(n) => u64::try_from(*n).ok().filter(|n| *n > 0),
        Value::Str(s) => s.trim().parse().ok().filter(|n| *n > 0),
        _ => None,
    }
}

/// `itunes_transporter apple_id: 794902327, action: "download"`
pub struct ItunesTransporter;

impl ItunesTransporter {
    fn request(args: &Arguments) -> Result<TransporterRequest, ActionError> {
        let apple_id =
            parse_apple_id(args.get("apple_id", 0)).ok_or_else(|| ActionError::new("No valid app given"))?;

        let mode = match args.text("action", 1) {
            Some(text) => TransporterMode::parse(&text)?,
            None => TransporterMode::Download,
        };

        let username = args
            .text("username", 2)
            .or_else(|| env::var(ENV_USERNAME).ok())
            .ok_or_else(|| {
                ActionError::new(format!(
                    "No App Store Connect account given, pass 'username' or set {ENV_USERNAME}"
                ))
            })?;

        let password = args
            .text("password", 3)
            .or_else(|| env::var(ENV_PASSWORD).ok())
            .unwrap_or_default();

        let directory = args.text("directory", 4).unwrap_or_else(|| ".".to_string());

        let transporter = args
            .text("transporter_path", 5)
            .or_else(|| env::var(ENV_TRANSPORTER_PATH).ok())
            .unwrap_or_else(|| DEFAULT_TRANSPORTER_PATH.to_string());

        Ok(TransporterRequest {
            mode,
            apple_id,
            username,
            password,
            directory,
            transporter,
        })
    }
}

impl Action for ItunesTransporter {
    fn name(&self) -> &str {
        "itunes_transporter"
    }

    fn description(&self) -> &str {
        "Download or upload App Store metadata with iTMSTransporter"
    }

    fn platforms(&self) -> Option<&[&str]> {
        Some(&["ios", "mac"])
    }

    fn run(&self, args: &Arguments, ctx: &mut ActionContext<'_>) -> Result<Value, ActionError> {
        let request = Self::request(args)?;
        let shown = request.command(false);

        if ctx.options.dry_run {
            info!("[dry run] {shown}");
            return Ok(Value::Str(shown));
        }

        if request.password.is_empty() {
            return Err(ActionError::new(format!(
                "No password for '{}', pass 'password' or set {ENV_PASSWORD}",
                request.username
            )));
        }

        info!("$ {shown}");
        let output = match shell::run(&request.command(true), &ctx.options.working_dir) {
            Ok(output) => output,
            // Mask the password before the command line reaches an error message
            Err(ShellError::Failed { status, output, .. }) => {
                return Err(failure(&shown, &status, &output));
            }
            Err(e) => return Err(e.into()),
        };

        let errors = transporter_errors(&output);
        if !errors.is_empty() {
            return Err(ActionError::new(errors.join("\n")));
        }

        debug!("Transporter finished for app {}", request.apple_id);
        Ok(Value::Bool(true))
    }
}

fn failure(shown: &str, status: &str, output: &str) -> ActionError {
    let errors = transporter_errors(output);
    if errors.is_empty() {
        ShellError::Failed {
            command: shown.to_string(),
            status: status.to_string(),
            output: output.to_string(),
        }
        .into()
    } else {
        ActionError::new(errors.join("\n"))
    }
}
