//! Binary search tree with non-standard field names
//!
//! Nodes use `val`, `l` and `r` and the tree keeps its root in `head`. Search
//! recurses through the receiver, so every level is a separate method entry.

use crate::argument;
use treetrace_core::{DynamicTree, FieldRoleMap, Record, TraceResult, TreeAccess, TreeRef, Value};

/// Operations exposed by the weird tree
pub const METHODS: [&str; 3] = ["add_stuff", "find_stuff", "_find_recursive"];

/// Roles of the weird layout; nodes have no parent field
pub fn roles() -> FieldRoleMap {
    FieldRoleMap::from_pairs([
        ("left", "l"),
        ("right", "r"),
        ("parent", "up"),
        ("key", "val"),
        ("root", "head"),
    ])
    .expect("weird role map is valid")
}

/// A fresh unlinked node
pub fn node(val: impl Into<Value>) -> Value {
    Value::node(
        Record::new()
            .with("val", val)
            .with("l", Value::Null)
            .with("r", Value::Null),
    )
}

/// An empty weird tree
pub fn tree() -> TreeRef {
    TreeRef::new(
        DynamicTree::new()
            .with_field("head", Value::Null)
            .with_method("add_stuff", add_stuff)
            .with_method("find_stuff", find_stuff)
            .with_method("_find_recursive", find_recursive),
    )
}

/// `add_stuff(val)`
pub fn add_stuff(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    let val = argument("add_stuff", args, 0, "a value")?;
    let mut current = this.get("head")?;
    if current.is_null() {
        this.set("head", node(val))?;
        return Ok(Value::Null);
    }
    loop {
        let side = if val < current.get("val")? { "l" } else { "r" };
        let next = current.get(side)?;
        if next.is_null() {
            current.set(side, node(val))?;
            return Ok(Value::Null);
        }
        current = next;
    }
}

/// `find_stuff(val)`
pub fn find_stuff(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    let val = argument("find_stuff", args, 0, "a value")?;
    let head = this.get("head")?;
    this.invoke("_find_recursive", &[head, val])
}

/// `_find_recursive(node, val)`
pub fn find_recursive(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    let current = argument("_find_recursive", args, 0, "a node and a value")?;
    let val = argument("_find_recursive", args, 1, "a node and a value")?;
    if current.is_null() {
        return Ok(Value::Bool(false));
    }
    let here = current.get("val")?;
    if val == here {
        return Ok(Value::Bool(true));
    }
    let next = current.get(if val < here { "l" } else { "r" })?;
    this.invoke("_find_recursive", &[next, val])
}
