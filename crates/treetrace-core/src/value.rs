//! Dynamic field values
//!
//! Wrapped structures are structurally typed: every field holds a [`Value`],
//! and a node reference may be either raw ([`Value::Node`]) or seen through an
//! interceptor ([`Value::Intercepted`]). Comparisons treat both forms of a
//! reference to the same real node as the same value.

use crate::error::{TraceError, TraceResult};
use crate::intercept::InterceptingNode;
use crate::object::{NodeAccess, NodeRef};
use std::cmp::Ordering;
use std::fmt;

/// A field value of a wrapped node or tree.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent reference or missing data
    #[default]
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar
    Int(i64),
    /// Floating point scalar
    Float(f64),
    /// Text scalar
    Text(String),
    /// Sequence of values
    List(Vec<Value>),
    /// Raw reference to a real node
    Node(NodeRef),
    /// Reference to a real node seen through an interceptor
    Intercepted(InterceptingNode),
}

impl Value {
    /// Wrap a node implementation in a fresh raw reference
    pub fn node<F: crate::object::Fields + 'static>(fields: F) -> Self {
        Value::Node(NodeRef::new(fields))
    }

    /// Whether this is [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value is a node reference in either form
    pub fn is_node(&self) -> bool {
        matches!(self, Value::Node(_) | Value::Intercepted(_))
    }

    /// Truthiness; node references defer to the real node.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Node(node) => node.is_truthy(),
            Value::Intercepted(node) => node.is_truthy(),
        }
    }

    /// The real node behind this value, unwrapping any interceptor
    pub fn real_node(&self) -> Option<NodeRef> {
        match self {
            Value::Node(node) => Some(node.clone()),
            Value::Intercepted(node) => Some(node.real().clone()),
            _ => None,
        }
    }

    /// Replace every interceptor in this value by the real node it wraps
    pub fn into_raw(self) -> Value {
        match self {
            Value::Intercepted(node) => Value::Node(node.into_real()),
            Value::List(items) => Value::List(items.into_iter().map(Value::into_raw).collect()),
            other => other,
        }
    }

    /// Integer content, if any
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Node(_) => "node",
            Value::Intercepted(_) => "intercepted node",
        }
    }

    /// Read a field of the node behind this value.
    ///
    /// Raw references read silently; intercepted references go through the
    /// interceptor and may record an event.
    pub fn get(&self, field: &str) -> TraceResult<Value> {
        match self {
            Value::Node(node) => node.get_field(field),
            Value::Intercepted(node) => node.get_field(field),
            other => Err(TraceError::NotANode {
                field: field.to_string(),
                found: other.kind(),
            }),
        }
    }

    /// Read a field of the node behind this value without recording anything
    pub fn get_extra(&self, field: &str) -> TraceResult<Value> {
        match self {
            Value::Node(node) => node.get_extra(field),
            Value::Intercepted(node) => node.get_extra(field),
            other => Err(TraceError::NotANode {
                field: field.to_string(),
                found: other.kind(),
            }),
        }
    }

    /// Assign a field of the node behind this value.
    pub fn set(&self, field: &str, value: impl Into<Value>) -> TraceResult<()> {
        let value = value.into();
        match self {
            Value::Node(node) => node.set_field(field, value),
            Value::Intercepted(node) => node.set_field(field, value),
            other => Err(TraceError::NotANode {
                field: field.to_string(),
                found: other.kind(),
            }),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.real_node(), other.real_node()) {
            return a == b;
        }
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.real_node(), other.real_node()) {
            return a.partial_cmp(&b);
        }
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("none"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Node(node) => write!(f, "{node:?}"),
            Value::Intercepted(node) => write!(f, "{:?}", node.real()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NodeRef> for Value {
    fn from(node: NodeRef) -> Self {
        Value::Node(node)
    }
}

impl From<InterceptingNode> for Value {
    fn from(node: InterceptingNode) -> Self {
        Value::Intercepted(node)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
