//! AVL tree with virtual leaves
//!
//! Every real node has two children; missing children are virtual nodes
//! (key `Null`, height -1). The tree caches its maximum node in `max_node`
//! and counts its items in `size_count`. Insertions return
//! `[node, edges, promotions]`, searches return `[node, edges]`.

use crate::{argument, int_argument};
use std::cmp::Ordering;
use treetrace_core::{
    FieldError, FieldRoleMap, Fields, Method, TraceError, TraceResult, TreeAccess, TreeObject,
    Value,
};

/// Operations exposed by [`AvlTree`]
pub const METHODS: [&str; 11] = [
    "insert",
    "insert_helper",
    "finger_insert",
    "search",
    "rec_search",
    "finger_search",
    "rotation",
    "left_rotation",
    "right_rotation",
    "size",
    "get_root",
];

/// Roles of the AVL layout: the standard names with `max` bound to `max_node`
pub fn roles() -> FieldRoleMap {
    FieldRoleMap::from_pairs([
        ("left", "left"),
        ("right", "right"),
        ("parent", "parent"),
        ("key", "key"),
        ("root", "root"),
        ("max", "max_node"),
    ])
    .expect("AVL role map is valid")
}

/// One AVL node, real or virtual.
#[derive(Debug, Clone)]
pub struct AvlNode {
    key: Value,
    value: Value,
    left: Value,
    right: Value,
    parent: Value,
    height: i64,
}

impl AvlNode {
    const FIELDS: [&'static str; 6] = ["key", "value", "left", "right", "parent", "height"];

    /// Placeholder child of a real node
    pub fn virtual_leaf() -> Self {
        Self {
            key: Value::Null,
            value: Value::Null,
            left: Value::Null,
            right: Value::Null,
            parent: Value::Null,
            height: -1,
        }
    }

    /// Real leaf of height 0 with two virtual children
    pub fn leaf(key: Value, value: Value, parent: Value) -> Self {
        Self {
            key,
            value,
            left: Value::node(Self::virtual_leaf()),
            right: Value::node(Self::virtual_leaf()),
            parent: parent.into_raw(),
            height: 0,
        }
    }
}

impl Fields for AvlNode {
    fn field(&self, name: &str) -> Result<Value, FieldError> {
        match name {
            "key" => Ok(self.key.clone()),
            "value" => Ok(self.value.clone()),
            "left" => Ok(self.left.clone()),
            "right" => Ok(self.right.clone()),
            "parent" => Ok(self.parent.clone()),
            "height" => Ok(Value::Int(self.height)),
            other => Err(FieldError::missing(other)),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldError> {
        match name {
            "key" => self.key = value,
            "value" => self.value = value,
            "left" => self.left = value,
            "right" => self.right = value,
            "parent" => self.parent = value,
            "height" => {
                self.height = value.as_int().ok_or_else(|| {
                    FieldError::rejected(
                        name,
                        format!("expected an integer, got {}", value.kind()),
                    )
                })?;
            }
            other => return Err(FieldError::missing(other)),
        }
        Ok(())
    }

    fn field_names(&self) -> Vec<String> {
        Self::FIELDS.iter().map(|name| (*name).to_string()).collect()
    }

    fn compare(&self, other: &dyn Fields) -> Option<Ordering> {
        let theirs = other.field("key").ok()?;
        self.key.partial_cmp(&theirs)
    }
}

/// AVL tree container.
#[derive(Debug, Default)]
pub struct AvlTree {
    root: Value,
    max_node: Value,
    size_count: i64,
}

impl AvlTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fields for AvlTree {
    fn field(&self, name: &str) -> Result<Value, FieldError> {
        match name {
            "root" => Ok(self.root.clone()),
            "max_node" => Ok(self.max_node.clone()),
            "size_count" => Ok(Value::Int(self.size_count)),
            other => Err(FieldError::missing(other)),
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldError> {
        match name {
            "root" => self.root = value,
            "max_node" => self.max_node = value,
            "size_count" => {
                self.size_count = value
                    .as_int()
                    .ok_or_else(|| FieldError::rejected(name, "expected an integer"))?;
            }
            other => return Err(FieldError::missing(other)),
        }
        Ok(())
    }

    fn field_names(&self) -> Vec<String> {
        ["root", "max_node", "size_count"].map(String::from).to_vec()
    }
}

impl TreeObject for AvlTree {
    fn method(&self, name: &str) -> Option<Method> {
        let body: Method = match name {
            "insert" => insert,
            "insert_helper" => insert_helper,
            "finger_insert" => finger_insert,
            "search" => search,
            "rec_search" => rec_search,
            "finger_search" => finger_search,
            "rotation" => rotation,
            "left_rotation" => left_rotation,
            "right_rotation" => right_rotation,
            "size" => size,
            "get_root" => get_root,
            _ => return None,
        };
        Some(body)
    }

    fn method_names(&self) -> Vec<&'static str> {
        METHODS.to_vec()
    }
}

/// Whether `node` is a real node; reads the key without recording it
fn is_real(node: &Value) -> TraceResult<bool> {
    Ok(!node.is_null() && !node.get_extra("key")?.is_null())
}

fn height(node: &Value) -> TraceResult<i64> {
    node.get_extra("height")?
        .as_int()
        .ok_or_else(|| FieldError::rejected("height", "not an integer").into())
}

/// `1 + max(child heights)`, and the balance factor `left - right`
fn balance(node: &Value) -> TraceResult<(i64, i64)> {
    let left = height(&node.get("left")?)?;
    let right = height(&node.get("right")?)?;
    Ok((1 + left.max(right), left - right))
}

fn adjust_size(this: &dyn TreeAccess, delta: i64) -> TraceResult<()> {
    let count = this.get("size_count")?.as_int().unwrap_or(0);
    this.set("size_count", Value::Int(count + delta))
}

fn insertion(node: Value, edges: i64, promotions: i64) -> Value {
    Value::List(vec![node, Value::Int(edges), Value::Int(promotions)])
}

/// Plant the first node; `None` when the tree already has a root
fn plant_first(this: &dyn TreeAccess, key: &Value, value: &Value) -> TraceResult<Option<Value>> {
    if !this.get("root")?.is_null() {
        return Ok(None);
    }
    let node = Value::node(AvlNode::leaf(key.clone(), value.clone(), Value::Null));
    this.set("root", node.clone())?;
    this.set("max_node", node.clone())?;
    Ok(Some(insertion(node, 0, 0)))
}

/// `insert(key, value)`: descend from the root
pub fn insert(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    let key = argument("insert", args, 0, "a key and a value")?;
    let value = args.get(1).cloned().unwrap_or_default();
    adjust_size(this, 1)?;
    if let Some(planted) = plant_first(this, &key, &value)? {
        return Ok(planted);
    }
    let root = this.get("root")?;
    this.invoke("insert_helper", &[root, key, value, Value::Int(0)])
}

/// `finger_insert(key, value)`: climb from the max node, then descend
pub fn finger_insert(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    let key = argument("finger_insert", args, 0, "a key and a value")?;
    let value = args.get(1).cloned().unwrap_or_default();
    adjust_size(this, 1)?;
    if let Some(planted) = plant_first(this, &key, &value)? {
        return Ok(planted);
    }
    let (start, edges) = climb_from_max(this, &key)?;
    this.invoke("insert_helper", &[start, key, value, Value::Int(edges)])
}

/// Lowest ancestor of the max node whose parent's key is below `key`
fn climb_from_max(this: &dyn TreeAccess, key: &Value) -> TraceResult<(Value, i64)> {
    let mut current = this.get("max_node")?;
    let mut edges = 1;
    loop {
        let parent = current.get("parent")?;
        if parent.is_null() || parent.get("key")? < *key {
            return Ok((current, edges));
        }
        current = parent;
        edges += 1;
    }
}

/// `insert_helper(start, key, value, edges)`: attach below `start` and rebalance
pub fn insert_helper(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    const EXPECTED: &str = "a start node, a key, a value and an edge count";
    let mut current = argument("insert_helper", args, 0, EXPECTED)?;
    let key = argument("insert_helper", args, 1, EXPECTED)?;
    let value = argument("insert_helper", args, 2, EXPECTED)?;
    let mut edges = int_argument("insert_helper", args, 3, EXPECTED)?;

    let mut parent = Value::Null;
    while is_real(&current)? {
        let side = if key < current.get("key")? { "left" } else { "right" };
        parent = current.clone();
        current = current.get(side)?;
        edges += 1;
    }

    let node = Value::node(AvlNode::leaf(key.clone(), value, parent.clone()));
    let max = this.get("max_node")?;
    if max.is_null() || key > max.get("key")? {
        this.set("max_node", node.clone())?;
    }
    if parent.is_null() {
        this.set("root", node.clone())?;
    } else if key < parent.get("key")? {
        parent.set("left", node.clone())?;
    } else {
        parent.set("right", node.clone())?;
    }
    edges += 1;

    let mut promotions = 0;
    let mut current = parent;
    while !current.is_null() {
        let (expected, factor) = balance(&current)?;
        if factor.abs() >= 2 {
            this.invoke("rotation", &[current, Value::Int(factor)])?;
            return Ok(insertion(node, edges, promotions + 1));
        }
        if height(&current)? == expected {
            break;
        }
        current.set("height", expected)?;
        current = current.get("parent")?;
        promotions += 1;
    }
    Ok(insertion(node, edges, promotions))
}

/// `rotation(node, factor)`: single or double rotation at an unbalanced node
pub fn rotation(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    const EXPECTED: &str = "a node and its balance factor";
    let node = argument("rotation", args, 0, EXPECTED)?;
    let factor = int_argument("rotation", args, 1, EXPECTED)?;

    if factor == 2 {
        let (_, child_factor) = balance(&node.get("left")?)?;
        if child_factor < 0 {
            this.invoke("left_rotation", &[node.get("left")?])?;
        }
        this.invoke("right_rotation", &[node])?;
    } else {
        let (_, child_factor) = balance(&node.get("right")?)?;
        if child_factor > 0 {
            this.invoke("right_rotation", &[node.get("right")?])?;
        }
        this.invoke("left_rotation", &[node])?;
    }
    Ok(Value::Null)
}

/// `right_rotation(node)`
pub fn right_rotation(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    let pivot = argument("right_rotation", args, 0, "a node")?;
    rotate(this, &pivot, "left", "right")
}

/// `left_rotation(node)`
pub fn left_rotation(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    let pivot = argument("left_rotation", args, 0, "a node")?;
    rotate(this, &pivot, "right", "left")
}

/// Lift `pivot`'s `up` child above it; `across` is the opposite side.
fn rotate(this: &dyn TreeAccess, pivot: &Value, up: &str, across: &str) -> TraceResult<Value> {
    let lifted = pivot.get(up)?;
    let moved = lifted.get(across)?;
    pivot.set(up, moved.clone())?;
    if is_real(&moved)? {
        moved.set("parent", pivot.clone())?;
    }

    lifted.set(across, pivot.clone())?;
    let grandparent = pivot.get("parent")?;
    lifted.set("parent", grandparent.clone())?;
    if grandparent.is_null() {
        this.set("root", lifted.clone())?;
    } else if grandparent.get("left")? == *pivot {
        grandparent.set("left", lifted.clone())?;
    } else {
        grandparent.set("right", lifted.clone())?;
    }
    pivot.set("parent", lifted.clone())?;

    let (pivot_height, _) = balance(pivot)?;
    pivot.set("height", pivot_height)?;
    let (lifted_height, _) = balance(&lifted)?;
    lifted.set("height", lifted_height)?;
    Ok(Value::Null)
}

/// `search(key)`: descend from the root
pub fn search(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    let key = argument("search", args, 0, "a key")?;
    let root = this.get("root")?;
    if root.is_null() {
        return Ok(Value::List(vec![Value::Null, Value::Int(-1)]));
    }
    this.invoke("rec_search", &[root, key, Value::Int(1)])
}

/// `finger_search(key)`: climb from the max node, then descend
pub fn finger_search(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    let key = argument("finger_search", args, 0, "a key")?;
    if this.get("root")?.is_null() {
        return Ok(Value::List(vec![Value::Null, Value::Int(-1)]));
    }
    let (start, edges) = climb_from_max(this, &key)?;
    this.invoke("rec_search", &[start, key, Value::Int(edges)])
}

/// `rec_search(node, key, edges)`: recursive descent through the receiver
pub fn rec_search(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
    const EXPECTED: &str = "a node, a key and an edge count";
    let node = argument("rec_search", args, 0, EXPECTED)?;
    let key = argument("rec_search", args, 1, EXPECTED)?;
    let edges = int_argument("rec_search", args, 2, EXPECTED)?;

    if !is_real(&node)? {
        return Ok(Value::List(vec![Value::Null, Value::Int(edges)]));
    }
    let here = node.get("key")?;
    if key == here {
        return Ok(Value::List(vec![node, Value::Int(edges)]));
    }
    let next = node.get(if key < here { "left" } else { "right" })?;
    this.invoke("rec_search", &[next, key, Value::Int(edges + 1)])
}

/// `size()`: number of items
pub fn size(this: &dyn TreeAccess, _args: &[Value]) -> TraceResult<Value> {
    this.get("size_count")
}

/// `get_root()`: the root node, `Null` when empty
pub fn get_root(this: &dyn TreeAccess, _args: &[Value]) -> TraceResult<Value> {
    this.get("root")
}

/// Split an insertion or search result into its node and counters
pub fn unpack(result: &Value) -> TraceResult<(Value, Vec<i64>)> {
    match result {
        Value::List(items) if !items.is_empty() => {
            let counters = items[1..].iter().filter_map(Value::as_int).collect();
            Ok((items[0].clone(), counters))
        }
        other => Err(TraceError::NotANode {
            field: "result".into(),
            found: other.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treetrace_core::TreeRef;

    fn build(keys: &[i64]) -> TreeRef {
        let tree = TreeRef::new(AvlTree::new());
        for key in keys {
            tree.invoke("insert", &[Value::Int(*key), Value::from(format!("v{key}"))]).unwrap();
        }
        tree
    }

    fn shape(node: &Value) -> String {
        if !is_real(node).unwrap() {
            return ".".into();
        }
        format!(
            "({} {} {})",
            shape(&node.get("left").unwrap()),
            node.get("key").unwrap(),
            shape(&node.get("right").unwrap())
        )
    }

    #[test]
    fn test_left_rotation_on_ascending_inserts() {
        let tree = build(&[1, 2, 3]);
        let root = tree.get("root").unwrap();
        assert_eq!(shape(&root), "((. 1 .) 2 (. 3 .))");
        assert_eq!(height(&root).unwrap(), 1);
        assert!(root.get("parent").unwrap().is_null());
        assert_eq!(root.get("left").unwrap().get("parent").unwrap(), root);
        assert_eq!(tree.invoke("size", &[]).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_double_rotation() {
        let tree = build(&[3, 1, 2]);
        assert_eq!(shape(&tree.get("root").unwrap()), "((. 1 .) 2 (. 3 .))");
        let tree = build(&[1, 3, 2]);
        assert_eq!(shape(&tree.get("root").unwrap()), "((. 1 .) 2 (. 3 .))");
    }

    #[test]
    fn test_larger_tree_stays_balanced() {
        let tree = build(&[10, 20, 30, 40, 50, 25]);
        assert_eq!(
            shape(&tree.get("root").unwrap()),
            "(((. 10 .) 20 (. 25 .)) 30 (. 40 (. 50 .)))"
        );
        let max = tree.get("max_node").unwrap();
        assert_eq!(max.get("key").unwrap(), Value::Int(50));
    }

    #[test]
    fn test_search_reports_edges() {
        let tree = build(&[10, 20, 30, 40, 50, 25]);
        let (node, counters) = unpack(&tree.invoke("search", &[Value::Int(25)]).unwrap()).unwrap();
        assert_eq!(node.get("value").unwrap(), Value::from("v25"));
        assert_eq!(counters, vec![3]);

        let (missing, _) = unpack(&tree.invoke("search", &[Value::Int(26)]).unwrap()).unwrap();
        assert!(missing.is_null());

        let (found, _) = unpack(&tree.invoke("finger_search", &[Value::Int(40)]).unwrap()).unwrap();
        assert_eq!(found.get("key").unwrap(), Value::Int(40));
    }

    #[test]
    fn test_finger_insert_matches_insert() {
        let tree = TreeRef::new(AvlTree::new());
        for key in [5, 8, 9, 1, 7, 12] {
            tree.invoke("finger_insert", &[Value::Int(key), Value::Null]).unwrap();
        }
        let reference = build(&[5, 8, 9, 1, 7, 12]);
        assert_eq!(
            shape(&tree.get("root").unwrap()),
            shape(&reference.get("root").unwrap())
        );
    }

    #[test]
    fn test_height_rejects_non_integers() {
        let node = Value::node(AvlNode::virtual_leaf());
        assert!(node.set("height", "tall").is_err());
        assert_eq!(height(&node).unwrap(), -1);
    }

    #[test]
    fn test_empty_tree_queries() {
        let tree = TreeRef::new(AvlTree::new());
        assert_eq!(tree.invoke("get_root", &[]).unwrap(), Value::Null);
        let (node, counters) = unpack(&tree.invoke("search", &[Value::Int(1)]).unwrap()).unwrap();
        assert!(node.is_null());
        assert_eq!(counters, vec![-1]);
    }

    #[test]
    fn test_roles_bind_max_node() {
        let roles = roles();
        assert_eq!(roles.field(treetrace_core::Role::Max), Some("max_node"));
        assert_ne!(roles, FieldRoleMap::standard());
    }
}
