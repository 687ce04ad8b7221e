//! Declaration registry
//!
//! Builds the platform → lane tree and the per-scope hook sets from parsed
//! scripts. All validation happens here, before any lane runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::ast::{Block, HookKind, Item, LaneDecl, Location, PlatformDecl, Stmt};
use super::parser;
use super::script::Script;
use crate::config::defaults::RESERVED_LANE_NAMES;
use crate::error::{DeclarationError, LanewayError, RunnerError};

/// A registered lane
#[derive(Debug, Clone)]
pub struct Lane {
    pub name: String,
    /// Declaring platform, `None` for root lanes
    pub platform: Option<String>,
    /// Comment lines directly above the declaration
    pub description: Vec<String>,
    pub body: Rc<Block>,
    pub location: Location,
}

impl Lane {
    /// `"<platform> <lane>"` or just the lane name
    pub fn full_name(&self) -> String {
        full_lane_name(self.platform.as_deref(), &self.name)
    }
}

/// Join a platform and lane name the way they are shown to users
pub fn full_lane_name(platform: Option<&str>, lane: &str) -> String {
    match platform {
        Some(platform) => format!("{platform} {lane}"),
        None => lane.to_string(),
    }
}

/// Hooks declared for one scope
#[derive(Debug, Clone, Default)]
pub struct HookSet {
    pub before_all: Option<Rc<Block>>,
    pub after_all: Option<Rc<Block>>,
    pub error: Option<Rc<Block>>,
}

impl HookSet {
    pub fn get(&self, kind: HookKind) -> Option<&Rc<Block>> {
        match kind {
            HookKind::BeforeAll => self.before_all.as_ref(),
            HookKind::AfterAll => self.after_all.as_ref(),
            HookKind::Error => self.error.as_ref(),
        }
    }

    /// Install a hook, returning the one it replaces
    pub fn set(&mut self, kind: HookKind, block: Rc<Block>) -> Option<Rc<Block>> {
        let slot = match kind {
            HookKind::BeforeAll => &mut self.before_all,
            HookKind::AfterAll => &mut self.after_all,
            HookKind::Error => &mut self.error,
        };
        slot.replace(block)
    }
}

/// Lanes and hooks keyed by scope, `None` being the root scope
#[derive(Debug, Clone)]
pub struct Registry {
    lanes: IndexMap<Option<String>, IndexMap<String, Rc<Lane>>>,
    hooks: HashMap<Option<String>, HookSet>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Empty registry with the root scope in place
    pub fn new() -> Self {
        let mut lanes = IndexMap::new();
        lanes.insert(None, IndexMap::new());
        Self {
            lanes,
            hooks: HashMap::new(),
        }
    }

    /// Register a platform scope; registering it again is a no-op
    pub fn add_platform(&mut self, name: &str) {
        self.lanes.entry(Some(name.to_string())).or_default();
    }

    /// Insert a lane, rejecting duplicates within its scope
    pub fn add_lane(&mut self, lane: Lane) -> Result<(), DeclarationError> {
        let scope = self.lanes.entry(lane.platform.clone()).or_default();
        if scope.contains_key(&lane.name) {
            return Err(DeclarationError::Duplicate { name: lane.name });
        }
        scope.insert(lane.name.clone(), Rc::new(lane));
        Ok(())
    }

    /// Install a hook for a scope, returning true when one was replaced
    pub fn set_hook(&mut self, platform: Option<&str>, kind: HookKind, block: Rc<Block>) -> bool {
        self.hooks
            .entry(platform.map(str::to_string))
            .or_default()
            .set(kind, block)
            .is_some()
    }

    /// Look up a lane in exactly one scope
    pub fn lane(&self, platform: Option<&str>, name: &str) -> Option<Rc<Lane>> {
        self.lanes
            .get(&platform.map(str::to_string))
            .and_then(|scope| scope.get(name))
            .cloned()
    }

    /// Hook block of a scope, if declared
    pub fn hook(&self, platform: Option<&str>, kind: HookKind) -> Option<Rc<Block>> {
        self.hooks
            .get(&platform.map(str::to_string))
            .and_then(|set| set.get(kind))
            .cloned()
    }

    pub fn has_platform(&self, name: &str) -> bool {
        self.lanes.contains_key(&Some(name.to_string()))
    }

    /// Declared platforms in declaration order
    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.lanes.keys().filter_map(|k| k.as_deref())
    }

    /// Every lane, root scope first, then platforms in declaration order
    pub fn lanes(&self) -> impl Iterator<Item = &Rc<Lane>> {
        self.lanes.values().flat_map(IndexMap::values)
    }

    /// Lanes of one scope
    pub fn lanes_in(&self, platform: Option<&str>) -> impl Iterator<Item = &Rc<Lane>> {
        self.lanes
            .get(&platform.map(str::to_string))
            .into_iter()
            .flat_map(IndexMap::values)
    }

    /// Full names of every lane, in registration order
    pub fn available_lanes(&self) -> Vec<String> {
        self.lanes().map(|lane| lane.full_name()).collect()
    }

    /// Whether `token` names a platform (true) or a root lane (false)
    pub fn is_platform_block(&self, token: &str) -> Result<bool, RunnerError> {
        if self.has_platform(token) {
            return Ok(true);
        }
        if self.lane(None, token).is_some() {
            return Ok(false);
        }
        Err(RunnerError::UnknownScope {
            token: token.to_string(),
            available: self.available_lanes(),
        })
    }
}

/// Validate a lane declaration's name; checks run in a fixed order and the
/// first failure wins. The missing-block check comes last, after the
/// duplicate check done by [`Registry::add_lane`].
pub fn validate_lane_name(decl: &LaneDecl) -> Result<String, DeclarationError> {
    let name = decl.name.text().to_string();
    if !decl.name.is_symbol() {
        return Err(DeclarationError::NotSymbol { name });
    }
    if name.chars().any(char::is_whitespace) {
        return Err(DeclarationError::ContainsSpaces { name });
    }
    if RESERVED_LANE_NAMES.contains(&name.as_str()) {
        return Err(DeclarationError::NameTaken { name });
    }
    Ok(name)
}

/// Walks parsed scripts into a [`Registry`], following imports.
///
/// Top-level statements of each script are gathered into a synthetic block
/// per script so they can be run once registration is complete.
pub struct Registrar<'r> {
    registry: &'r mut Registry,
    import_stack: Vec<PathBuf>,
    preamble: Vec<Rc<Block>>,
}

impl<'r> Registrar<'r> {
    pub fn new(registry: &'r mut Registry) -> Self {
        Self {
            registry,
            import_stack: Vec::new(),
            preamble: Vec::new(),
        }
    }

    /// Parse and register a script at the root scope
    pub fn register(&mut self, script: &Script) -> Result<(), LanewayError> {
        self.register_scoped(script, None)
    }

    /// Top-level statement blocks gathered so far, in script order
    pub fn into_preamble(self) -> Vec<Rc<Block>> {
        self.preamble
    }

    fn register_scoped(&mut self, script: &Script, platform: Option<&str>) -> Result<(), LanewayError> {
        let canonical = script.canonical_path();
        if let Some(path) = &canonical {
            if self.import_stack.contains(path) {
                return Err(DeclarationError::CyclicImport { path: path.clone() }.into());
            }
            self.import_stack.push(path.clone());
        }

        let result = self.walk_script(script, platform);

        if canonical.is_some() {
            self.import_stack.pop();
        }
        result
    }

    fn walk_script(&mut self, script: &Script, platform: Option<&str>) -> Result<(), LanewayError> {
        let program = parser::parse(script)?;
        debug!(
            "Registering {} items from {}",
            program.items.len(),
            script.origin_label()
        );

        let mut statements = Vec::new();
        self.walk_items(script, program.items, platform, &mut statements)?;

        if !statements.is_empty() {
            let line = statements.first().map_or(1, |s: &Stmt| s.line);
            self.preamble.push(Rc::new(Block {
                params: Vec::new(),
                stmts: statements,
                origin: Rc::from(script.origin_label()),
                line,
            }));
        }
        Ok(())
    }

    fn walk_items(
        &mut self,
        script: &Script,
        items: Vec<Item>,
        platform: Option<&str>,
        statements: &mut Vec<Stmt>,
    ) -> Result<(), LanewayError> {
        for item in items {
            match item {
                Item::Lane(decl) => self.register_lane(script, decl, platform)?,
                Item::Platform(decl) => self.register_platform(script, decl, platform, statements)?,
                Item::Hook(hook) => {
                    if self.registry.set_hook(platform, hook.kind, hook.block) {
                        warn!(
                            "{} hook for {} declared more than once, the last one wins ({}:{})",
                            hook.kind.keyword(),
                            platform.unwrap_or("root scope"),
                            script.origin_label(),
                            hook.line
                        );
                    }
                }
                Item::Import(import) => {
                    let relative = Path::new(&import.path);
                    let path = script
                        .base_dir()
                        .join(relative.strip_prefix(".").unwrap_or(relative));
                    debug!("Importing {}", path.display());
                    let imported = Script::from_path(&path)?;
                    self.register_scoped(&imported, platform)?;
                }
                Item::Statement(stmt) => {
                    if let Some(platform) = platform {
                        return Err(DeclarationError::StatementInPlatform {
                            platform: platform.to_string(),
                            location: format!("{}:{}", script.origin_label(), stmt.line),
                        }
                        .into());
                    }
                    statements.push(stmt);
                }
            }
        }
        Ok(())
    }

    fn register_lane(
        &mut self,
        script: &Script,
        decl: LaneDecl,
        platform: Option<&str>,
    ) -> Result<(), LanewayError> {
        let name = validate_lane_name(&decl)?;

        if self.registry.lane(platform, &name).is_some() {
            return Err(DeclarationError::Duplicate { name }.into());
        }
        let Some(body) = decl.block else {
            return Err(DeclarationError::MissingBlock { name }.into());
        };

        let lane = Lane {
            description: script.comment_block_above(decl.line),
            location: body.location(decl.line),
            platform: platform.map(str::to_string),
            name,
            body,
        };
        debug!("Registered lane '{}'", lane.full_name());
        self.registry.add_lane(lane)?;
        Ok(())
    }

    fn register_platform(
        &mut self,
        script: &Script,
        decl: PlatformDecl,
        outer: Option<&str>,
        statements: &mut Vec<Stmt>,
    ) -> Result<(), LanewayError> {
        let name = decl.name.text().to_string();
        if let Some(outer) = outer {
            return Err(DeclarationError::NestedPlatform {
                name,
                outer: outer.to_string(),
            }
            .into());
        }
        if !decl.name.is_symbol() {
            return Err(DeclarationError::PlatformNotSymbol { name }.into());
        }

        self.registry.add_platform(&name);
        self.walk_items(script, decl.items, Some(&name), statements)
    }
}
