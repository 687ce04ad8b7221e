//! Lanefile syntax tree
//!
//! Every declaration, statement and expression carries the line it starts on.
//! Blocks additionally carry the origin label of the script they came from so
//! runtime errors can point back at the right file.

use std::fmt;
use std::rc::Rc;

use super::value::Value;

/// A source position used in runtime messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub origin: Rc<str>,
    pub line: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.origin, self.line)
    }
}

/// A parsed script
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub items: Vec<Item>,
}

/// Top-level or platform-level item
#[derive(Debug, Clone)]
pub enum Item {
    Lane(LaneDecl),
    Platform(PlatformDecl),
    Hook(HookDecl),
    Import(ImportDecl),
    Statement(Stmt),
}

/// How a lane or platform name was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclName {
    /// `:name` or `:"text"`
    Symbol(String),
    /// `"name"`
    Str(String),
    /// `name`
    Ident(String),
}

impl DeclName {
    pub fn text(&self) -> &str {
        match self {
            Self::Symbol(s) | Self::Str(s) | Self::Ident(s) => s,
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }
}

/// `lane :name { ... }`
#[derive(Debug, Clone)]
pub struct LaneDecl {
    pub name: DeclName,
    pub block: Option<Rc<Block>>,
    pub line: usize,
}

/// `platform :name { ... }`
#[derive(Debug, Clone)]
pub struct PlatformDecl {
    pub name: DeclName,
    pub items: Vec<Item>,
    pub line: usize,
}

/// Lifecycle hook kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    BeforeAll,
    AfterAll,
    Error,
}

impl HookKind {
    /// Keyword that declares this hook
    pub fn keyword(self) -> &'static str {
        match self {
            Self::BeforeAll => "before_all",
            Self::AfterAll => "after_all",
            Self::Error => "error",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "before_all" => Some(Self::BeforeAll),
            "after_all" => Some(Self::AfterAll),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// `before_all { ... }` and friends
#[derive(Debug, Clone)]
pub struct HookDecl {
    pub kind: HookKind,
    pub block: Rc<Block>,
    pub line: usize,
}

/// `import "path"`
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub path: String,
    pub line: usize,
}

/// `{ |params| statements }`
#[derive(Debug, Clone)]
pub struct Block {
    pub params: Vec<String>,
    pub stmts: Vec<Stmt>,
    pub origin: Rc<str>,
    pub line: usize,
}

impl Block {
    /// Location of a line inside this block's script
    pub fn location(&self, line: usize) -> Location {
        Location {
            origin: Rc::clone(&self.origin),
            line,
        }
    }
}

/// A statement
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `name = value`
    Assign { name: String, value: Expr },
    /// Expression or command call
    Expr(Expr),
}

/// An expression
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Value),
    Array(Vec<Expr>),
    Map(Vec<(String, Expr)>),
    /// Bare identifier: a variable if bound, otherwise a call without arguments
    Ident(String),
    /// `name(args)` or `name arg, key: value`
    Call { name: String, args: Vec<Arg> },
    Index { target: Box<Expr>, index: Box<Expr> },
    Add { lhs: Box<Expr>, rhs: Box<Expr> },
}

/// Call argument
#[derive(Debug, Clone)]
pub enum Arg {
    Positional(Expr),
    Named(String, Expr),
}
