//! Plain binary search tree
//!
//! Nodes are [`Record`]s with `key`, `left` and `right`; there is no parent
//! field. Equal keys go right.

use crate::argument;
use treetrace_core::{
    FieldError, Fields, Method, Record, TraceResult, TreeAccess, TreeObject, Value,
};

/// Operations exposed by [`BinaryTree`]
pub const METHODS: [&str; 3] = ["insert", "search", "delete"];

/// A fresh unlinked node
pub fn node(key: impl Into<Value>) -> Value {
    Value::node(
        Record::new()
            .with("key", key)
            .with("left", Value::Null)
            .with("right", Value::Null),
    )
}

/// Binary search tree container with a single `root` field.
#[derive(Debug, Default)]
pub struct BinaryTree {
    root: Value,
}

impl BinaryTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fields for BinaryTree {
    fn field(&self, name: &str) -> Result<Value, FieldError> {
        match name {
            "root" => Ok(self.root.clone()),
            other => Err(FieldError::missing(other)),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldError> {
        match name {
            "root" => {
                self.root = value;
                Ok(())
            }
            other => Err(FieldError::missing(other)),
        }
    }

    fn field_names(&self) -> Vec<String> {
        vec!["root".to_string()]
    }
}

impl TreeObject for BinaryTree {
    fn method(&self, name: &str) -> Option<Method> {
        match name {
            "insert" => Some(insert),
            "search" => Some(search),
            "delete" => Some(delete),
            _ => None,
        }
    }

    fn method_names(&self) -> Vec<&'static str> {
        METHODS.to_vec()
    }
}

/// `insert(key)`: iterative descent, attaching a new leaf
pub fn insert(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    let key = argument("insert", args, 0, "a key")?;
    let mut current = this.get("root")?;
    if current.is_null() {
        this.set("root", node(key))?;
        return Ok(Value::Null);
    }

    loop {
        let side = if key < current.get("key")? { "left" } else { "right" };
        let next = current.get(side)?;
        if next.is_null() {
            current.set(side, node(key))?;
            return Ok(Value::Null);
        }
        current = next;
    }
}

/// `search(key)`: whether the key is present
pub fn search(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    let key = argument("search", args, 0, "a key")?;
    let mut current = this.get("root")?;
    while !current.is_null() {
        let here = current.get("key")?;
        if key == here {
            return Ok(Value::Bool(true));
        }
        current = current.get(if key < here { "left" } else { "right" })?;
    }
    Ok(Value::Bool(false))
}

/// `delete(key)`: unlink the node holding `key`.
///
/// A node with two children takes its in-order successor's key and the
/// successor is unlinked instead.
pub fn delete(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    let key = argument("delete", args, 0, "a key")?;
    let mut link: Option<(Value, &str)> = None;
    let mut current = this.get("root")?;
    loop {
        if current.is_null() {
            return Ok(Value::Bool(false));
        }
        let here = current.get("key")?;
        if key == here {
            break;
        }
        let side = if key < here { "left" } else { "right" };
        let next = current.get(side)?;
        link = Some((current, side));
        current = next;
    }

    let left = current.get("left")?;
    let right = current.get("right")?;
    let replacement = if left.is_null() {
        right
    } else if right.is_null() {
        left
    } else {
        let mut successor_parent = current.clone();
        let mut successor_side = "right";
        let mut successor = right;
        loop {
            let next = successor.get("left")?;
            if next.is_null() {
                break;
            }
            successor_parent = successor;
            successor_side = "left";
            successor = next;
        }
        current.set("key", successor.get("key")?)?;
        successor_parent.set(successor_side, successor.get("right")?)?;
        return Ok(Value::Bool(true));
    };

    match link {
        Some((parent, side)) => parent.set(side, replacement)?,
        None => this.set("root", replacement)?,
    }
    Ok(Value::Bool(true))
}
