//! Lane runner
//!
//! Resolves a requested lane, runs it between its hooks and evaluates lane
//! bodies. Identifiers in a body resolve, in order, to a local variable, a
//! lane (current platform first, then root) or a catalog action.
//!
//! Hook order for a lane declared in platform `p`:
//!
//! 1. root `before_all`, then `p`'s `before_all`
//! 2. the lane body
//! 3. on success: `p`'s `after_all`, then root `after_all`
//! 4. on failure in 1-2: `p`'s `error`, then root `error`, then the failure
//!    propagates unchanged

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, error, info};

use super::ast::{Arg, Block, Expr, ExprKind, HookKind, StmtKind};
use super::collector::ActionCollector;
use super::context::{keys, LaneContext};
use super::registry::{full_lane_name, Lane, Registry};
use super::value::{Map, Value};
use crate::actions::{ActionCatalog, ActionContext, Arguments};
use crate::config::defaults::LANE_SWITCH_ACTION;
use crate::error::RunnerError;

/// Options that affect how actions run
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Shell-wrapping actions report their command instead of running it
    pub dry_run: bool,
    /// Directory commands run in and relative file paths resolve against
    pub working_dir: PathBuf,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            working_dir: PathBuf::from("."),
        }
    }
}

/// Where the runner is in the current execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Resolving,
    RunningBeforeAll,
    RunningLaneBody,
    RunningAfterAll,
    Done,
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::RunningBeforeAll => "running before_all",
            Self::RunningLaneBody => "running lane body",
            Self::RunningAfterAll => "running after_all",
            Self::Done => "done",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// What an identifier in a lane body refers to
#[derive(Debug, Clone)]
pub enum Resolution {
    Variable(Value),
    Lane(Rc<Lane>),
    Action,
    Unresolved,
}

/// Evaluation state of one block invocation
struct Frame<'b> {
    block: &'b Block,
    vars: HashMap<String, Value>,
    /// Platform selected for the running lane
    platform: Option<String>,
}

impl Frame<'_> {
    fn location(&self, line: usize) -> String {
        self.block.location(line).to_string()
    }
}

/// Executes lanes from a [`Registry`]
#[derive(Debug)]
pub struct Runner {
    registry: Registry,
    catalog: ActionCatalog,
    context: LaneContext,
    collector: ActionCollector,
    options: RunnerOptions,
    phase: Phase,
}

impl Runner {
    pub fn new(registry: Registry, catalog: ActionCatalog, options: RunnerOptions) -> Self {
        Self {
            registry,
            catalog,
            context: LaneContext::new(),
            collector: ActionCollector::new(),
            options,
            phase: Phase::Idle,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut ActionCatalog {
        &mut self.catalog
    }

    pub fn context(&self) -> &LaneContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut LaneContext {
        &mut self.context
    }

    pub fn collector(&self) -> &ActionCollector {
        &self.collector
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut RunnerOptions {
        &mut self.options
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Full names of every lane, in registration order
    pub fn available_lanes(&self) -> Vec<String> {
        self.registry.available_lanes()
    }

    /// See [`Registry::is_platform_block`]
    pub fn is_platform_block(&self, token: &str) -> Result<bool, RunnerError> {
        self.registry.is_platform_block(token)
    }

    /// Find a lane in the given platform scope, or the root scope
    pub fn resolve(&self, lane: &str, platform: Option<&str>) -> Result<Rc<Lane>, RunnerError> {
        self.registry
            .lane(platform, lane)
            .ok_or_else(|| RunnerError::LaneNotFound {
                requested: full_lane_name(platform, lane),
                available: self.registry.available_lanes(),
            })
    }

    /// Run a lane requested by a caller.
    ///
    /// Resets the usage ledger; the run context is kept.
    pub fn execute(
        &mut self,
        lane: &str,
        platform: Option<&str>,
        params: Option<Value>,
    ) -> Result<Value, RunnerError> {
        self.collector.reset();
        self.phase = Phase::Resolving;

        let requested = full_lane_name(platform, lane);
        let resolved = lane_parameters(&requested, params.unwrap_or_default())
            .and_then(|params| self.resolve(lane, platform).map(|found| (found, params)));
        let (resolved, params) = match resolved {
            Ok(found) => found,
            Err(e) => {
                self.phase = Phase::Idle;
                return Err(e);
            }
        };

        let result = self.run_lane(&resolved, platform.map(str::to_string), params);

        for usage in self.collector.summary() {
            debug!(
                "Action '{}' launched {} time(s) ({})",
                usage.name,
                usage.count,
                if usage.official { "official" } else { "custom" }
            );
        }
        result
    }

    /// Run top-level statements gathered at load time
    pub fn run_preamble(&mut self, blocks: &[Rc<Block>]) -> Result<(), RunnerError> {
        for block in blocks {
            self.run_block(block, Vec::new(), None)?;
        }
        Ok(())
    }

    /// What `name` refers to from a frame with `vars` bound and `platform`
    /// selected. Variables only apply to bare identifiers, so callers pass
    /// `None` for calls with arguments.
    pub fn resolution(
        &self,
        name: &str,
        vars: Option<&HashMap<String, Value>>,
        platform: Option<&str>,
    ) -> Resolution {
        if let Some(value) = vars.and_then(|v| v.get(name)) {
            return Resolution::Variable(value.clone());
        }
        let lane = platform
            .and_then(|p| self.registry.lane(Some(p), name))
            .or_else(|| self.registry.lane(None, name));
        if let Some(lane) = lane {
            return Resolution::Lane(lane);
        }
        if self.catalog.contains(name) {
            return Resolution::Action;
        }
        Resolution::Unresolved
    }

    // ------------------------------------------------------------------
    // Lane lifecycle
    // ------------------------------------------------------------------

    fn run_lane(&mut self, lane: &Rc<Lane>, selected: Option<String>, params: Map) -> Result<Value, RunnerError> {
        let full_name = lane.full_name();
        let hook_arg = Value::symbol(lane.name.as_str());
        info!("Driving the lane '{full_name}'");

        match self.run_lane_stages(lane, &full_name, selected.as_deref(), params) {
            Ok(value) => {
                self.phase = Phase::RunningAfterAll;
                for scope in hook_scopes(lane.platform.as_deref(), HookKind::AfterAll) {
                    if let Some(hook) = self.registry.hook(scope, HookKind::AfterAll) {
                        debug!("Running after_all hook of {}", scope.unwrap_or("root scope"));
                        if let Err(e) = self.run_block(&hook, vec![hook_arg.clone()], selected.as_deref()) {
                            self.phase = Phase::Error;
                            return Err(e);
                        }
                    }
                }
                self.phase = Phase::Done;
                info!("Lane '{full_name}' finished");
                Ok(value)
            }
            Err(failure) => {
                self.phase = Phase::Error;
                error!("Lane '{full_name}' failed: {failure}");
                let message = Value::Str(failure.to_string());
                for scope in hook_scopes(lane.platform.as_deref(), HookKind::Error) {
                    if let Some(hook) = self.registry.hook(scope, HookKind::Error) {
                        debug!("Running error hook of {}", scope.unwrap_or("root scope"));
                        self.run_block(
                            &hook,
                            vec![hook_arg.clone(), message.clone()],
                            selected.as_deref(),
                        )?;
                    }
                }
                self.phase = Phase::Error;
                Err(failure)
            }
        }
    }

    /// `before_all` hooks then the body
    fn run_lane_stages(
        &mut self,
        lane: &Rc<Lane>,
        full_name: &str,
        selected: Option<&str>,
        params: Map,
    ) -> Result<Value, RunnerError> {
        self.context.enter_lane(full_name, selected);
        self.phase = Phase::RunningBeforeAll;
        let hook_arg = Value::symbol(lane.name.as_str());
        for scope in hook_scopes(lane.platform.as_deref(), HookKind::BeforeAll) {
            if let Some(hook) = self.registry.hook(scope, HookKind::BeforeAll) {
                debug!("Running before_all hook of {}", scope.unwrap_or("root scope"));
                self.run_block(&hook, vec![hook_arg.clone()], selected)?;
            }
        }

        self.phase = Phase::RunningLaneBody;
        let body = Rc::clone(&lane.body);
        self.run_block(&body, vec![Value::Map(params)], selected)
    }

    /// Run another lane from inside a body. The switched-to lane keeps the
    /// caller's platform selection unless it is declared in a platform
    /// itself; the caller's lane and platform names are restored afterwards.
    fn switch_lane(&mut self, lane: &Rc<Lane>, params: Map, caller_platform: Option<&str>) -> Result<Value, RunnerError> {
        info!("Cruising over to lane '{}'", lane.full_name());
        self.collector.did_launch_action(LANE_SWITCH_ACTION);

        let saved_phase = self.phase;
        let saved_lane = self.context.get(keys::LANE_NAME).cloned();
        let saved_platform = self.context.get(keys::PLATFORM_NAME).cloned();

        let selected = lane
            .platform
            .clone()
            .or_else(|| caller_platform.map(str::to_string));
        let result = self.run_lane(lane, selected, params);

        restore(&mut self.context, keys::LANE_NAME, saved_lane);
        restore(&mut self.context, keys::PLATFORM_NAME, saved_platform);
        if result.is_ok() {
            self.phase = saved_phase;
            info!("Cruising back to lane '{}'", self.context.current_lane().unwrap_or_default());
        }
        result
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// Run a block with positional block arguments; its value is the value
    /// of its last statement
    fn run_block(&mut self, block: &Rc<Block>, args: Vec<Value>, platform: Option<&str>) -> Result<Value, RunnerError> {
        let mut args = args.into_iter();
        let vars = block
            .params
            .iter()
            .map(|name| (name.clone(), args.next().unwrap_or_default()))
            .collect();

        let mut frame = Frame {
            block,
            vars,
            platform: platform.map(str::to_string),
        };

        let mut last = Value::Nil;
        for stmt in &block.stmts {
            last = match &stmt.kind {
                StmtKind::Assign { name, value } => {
                    let value = self.eval(value, &mut frame)?;
                    frame.vars.insert(name.clone(), value.clone());
                    value
                }
                StmtKind::Expr(expr) => self.eval(expr, &mut frame)?,
            };
        }
        Ok(last)
    }

    fn eval(&mut self, expr: &Expr, frame: &mut Frame<'_>) -> Result<Value, RunnerError> {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),
            ExprKind::Array(items) => items
                .iter()
                .map(|item| self.eval(item, frame))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            ExprKind::Map(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    let value = self.eval(value, frame)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::Map(map))
            }
            ExprKind::Ident(name) => {
                if let Some(value) = frame.vars.get(name) {
                    return Ok(value.clone());
                }
                self.call(name, &[], frame, expr.line)
            }
            ExprKind::Call { name, args } => self.call(name, args, frame, expr.line),
            ExprKind::Index { target, index } => {
                let target = self.eval(target, frame)?;
                let index = self.eval(index, frame)?;
                index_value(&target, &index).map_err(|message| RunnerError::TypeMismatch {
                    message,
                    location: frame.location(expr.line),
                })
            }
            ExprKind::Add { lhs, rhs } => {
                let lhs = self.eval(lhs, frame)?;
                let rhs = self.eval(rhs, frame)?;
                add_values(lhs, rhs).map_err(|message| RunnerError::TypeMismatch {
                    message,
                    location: frame.location(expr.line),
                })
            }
        }
    }

    fn eval_args(&mut self, args: &[Arg], frame: &mut Frame<'_>) -> Result<Arguments, RunnerError> {
        let mut arguments = Arguments::new();
        for arg in args {
            match arg {
                Arg::Positional(expr) => {
                    let value = self.eval(expr, frame)?;
                    arguments.positional.push(value);
                }
                Arg::Named(key, expr) => {
                    let value = self.eval(expr, frame)?;
                    arguments.named.insert(key.clone(), value);
                }
            }
        }
        Ok(arguments)
    }

    /// Dispatch a call to a lane or an action
    fn call(&mut self, name: &str, args: &[Arg], frame: &mut Frame<'_>, line: usize) -> Result<Value, RunnerError> {
        match self.resolution(name, None, frame.platform.as_deref()) {
            Resolution::Lane(lane) => {
                debug!("'{name}' resolved to lane '{}'", lane.full_name());
                let arguments = self.eval_args(args, frame)?;
                let params = switch_parameters(&lane.full_name(), arguments)?;
                self.switch_lane(&lane, params, frame.platform.as_deref())
            }
            Resolution::Action => {
                debug!("'{name}' resolved to an action");
                let arguments = self.eval_args(args, frame)?;
                self.run_action(name, &arguments, frame.platform.as_deref())
            }
            Resolution::Variable(value) => Ok(value),
            Resolution::Unresolved => Err(RunnerError::UnresolvedIdentifier {
                name: name.to_string(),
                location: frame.location(line),
            }),
        }
    }

    fn run_action(&mut self, name: &str, arguments: &Arguments, platform: Option<&str>) -> Result<Value, RunnerError> {
        let Some(action) = self.catalog.get(name) else {
            return Err(RunnerError::UnresolvedIdentifier {
                name: name.to_string(),
                location: String::from("(catalog)"),
            });
        };

        if !action.is_supported(platform) {
            return Err(RunnerError::UnsupportedPlatform {
                action: name.to_string(),
                platform: platform.unwrap_or_default().to_string(),
            });
        }

        self.collector.did_launch_action(name);
        info!("--- Step: {name} ---");

        let mut ctx = ActionContext {
            lane_context: &mut self.context,
            options: &self.options,
            platform,
        };
        action
            .run(arguments, &mut ctx)
            .map_err(|e| RunnerError::ActionFailure {
                action: name.to_string(),
                message: e.message,
            })
    }
}

/// Hook scopes in run order for a lane declared in `platform`
fn hook_scopes(platform: Option<&str>, kind: HookKind) -> Vec<Option<&str>> {
    match (platform, kind) {
        (None, _) => vec![None],
        (Some(p), HookKind::BeforeAll) => vec![None, Some(p)],
        (Some(p), HookKind::AfterAll | HookKind::Error) => vec![Some(p), None],
    }
}

fn restore(context: &mut LaneContext, key: &str, saved: Option<Value>) {
    match saved {
        Some(value) => {
            context.set(key, value);
        }
        None => {
            context.remove(key);
        }
    }
}

/// Parameters passed by a caller of [`Runner::execute`]; nil means none
fn lane_parameters(lane: &str, params: Value) -> Result<Map, RunnerError> {
    match params {
        Value::Nil => Ok(Map::new()),
        Value::Map(map) => Ok(map),
        other => Err(RunnerError::InvalidLaneParameters {
            lane: lane.to_string(),
            got: other.type_name().to_string(),
        }),
    }
}

/// Parameters of a lane switch: named arguments, one positional mapping, or
/// nothing at all
fn switch_parameters(lane: &str, arguments: Arguments) -> Result<Map, RunnerError> {
    let Arguments {
        mut positional,
        named,
    } = arguments;

    match (positional.len(), named.is_empty()) {
        (0, _) => Ok(named),
        (1, true) => lane_parameters(lane, positional.remove(0)),
        _ => Err(RunnerError::InvalidLaneParameters {
            lane: lane.to_string(),
            got: format!("{} positional arguments", positional.len()),
        }),
    }
}

/// `target[index]`
fn index_value(target: &Value, index: &Value) -> Result<Value, String> {
    match target {
        Value::Map(map) => match index.as_str() {
            Some(key) => Ok(map.get(key).cloned().unwrap_or_default()),
            None => Err(format!(
                "mapping keys must be strings or symbols, got {}",
                index.type_name()
            )),
        },
        Value::Array(items) => {
            let Some(i) = index.as_int() else {
                return Err(format!("array index must be an integer, got {}", index.type_name()));
            };
            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let position = if i < 0 { len + i } else { i };
            Ok(usize::try_from(position)
                .ok()
                .and_then(|p| items.get(p))
                .cloned()
                .unwrap_or_default())
        }
        other => Err(format!("cannot index into {}", other.type_name())),
    }
}

/// `lhs + rhs`
fn add_values(lhs: Value, rhs: Value) -> Result<Value, String> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => a
            .checked_add(b)
            .map(Value::Int)
            .ok_or_else(|| format!("integer overflow in {a} + {b}")),
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Ok(Value::Array(a))
        }
        (Value::Map(mut a), Value::Map(b)) => {
            a.extend(b);
            Ok(Value::Map(a))
        }
        (a, b) => Ok(Value::Str(format!("{a}{b}"))),
    }
}
