//! Runtime values
//!
//! Everything a Lanefile expression can evaluate to. Lane parameters are
//! always a [`Value::Map`].

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Ordered mapping used for lane parameters and map literals
pub type Map = IndexMap<String, Value>;

/// A value produced by evaluating a Lanefile expression
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Absence of a value
    #[default]
    Nil,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// String
    Str(String),
    /// Symbol (`:name`)
    Symbol(String),
    /// Array
    Array(Vec<Value>),
    /// Insertion-ordered mapping with string keys
    Map(Map),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Create a symbol value
    pub fn symbol(s: impl Into<String>) -> Self {
        Self::Symbol(s.into())
    }

    /// Human readable type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Str(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Array(_) => "array",
            Self::Map(_) => "mapping",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Borrow the textual content of strings and symbols
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Truthiness: only `nil` and `false` are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil | Self::Bool(false))
    }

    /// Literal-style rendering (`"text"`, `:sym`, `nil`)
    pub fn inspect(&self) -> String {
        match self {
            Self::Nil => "nil".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Str(s) => format!("{s:?}"),
            Self::Symbol(s) => format!(":{s}"),
            Self::Array(items) => {
                let inner: Vec<String> = items.iter().map(Value::inspect).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::Map(map) => {
                if map.is_empty() {
                    return "{}".to_string();
                }
                let inner: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{k}: {}", v.inspect()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }
}

/// Display is the string-interpolation form: nil renders empty, strings and
/// symbols render bare, containers use [`Value::inspect`].
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => Ok(()),
            Self::Str(s) | Self::Symbol(s) => write!(f, "{s}"),
            other => write!(f, "{}", other.inspect()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Self::Map(m)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}
