//! Cycle-safe forest serialization
//!
//! A snapshot is the component reachable from the current root followed by
//! every registered node that root traversal did not reach, each rendered as
//! its own component. A per-call visited set guarantees each identity appears
//! at most once; a recurring reference becomes an empty child slot.

use crate::object::NodeRef;
use crate::registry::{NodeId, NodeRegistry};
use crate::roles::FieldRoleMap;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Display label used when a node's key cannot be read
pub const UNKNOWN_LABEL: &str = "unknown";

/// Serialized value of a non-structural node field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Null scalar
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar
    Int(i64),
    /// Floating point scalar
    Float(f64),
    /// Text scalar or textual fallback of a composite value
    Text(String),
}

/// One node of a serialized component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Stable handle of the real node
    pub identity: NodeId,
    /// Rendered key
    pub display_label: String,
    /// Left child, or `None` when absent or already rendered
    pub left: Option<Box<NodeRecord>>,
    /// Right child, or `None` when absent or already rendered
    pub right: Option<Box<NodeRecord>>,
    /// Handle of the node the parent field points to
    pub parent_identity: Option<NodeId>,
    /// Readable non-structural fields
    pub extra_attributes: IndexMap<String, AttributeValue>,
}

impl NodeRecord {
    /// Records of this subtree in pre-order
    pub fn iter(&self) -> impl Iterator<Item = &NodeRecord> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let record = stack.pop()?;
            if let Some(right) = record.right.as_deref() {
                stack.push(right);
            }
            if let Some(left) = record.left.as_deref() {
                stack.push(left);
            }
            Some(record)
        })
    }

    /// Labels of this subtree in in-order
    pub fn in_order_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        let mut stack = Vec::new();
        let mut cursor = Some(self);
        while cursor.is_some() || !stack.is_empty() {
            while let Some(record) = cursor {
                stack.push(record);
                cursor = record.left.as_deref();
            }
            if let Some(record) = stack.pop() {
                labels.push(record.display_label.clone());
                cursor = record.right.as_deref();
            }
        }
        labels
    }
}

impl Drop for NodeRecord {
    fn drop(&mut self) {
        let mut pending: Vec<Box<NodeRecord>> =
            self.left.take().into_iter().chain(self.right.take()).collect();
        while let Some(mut record) = pending.pop() {
            pending.extend(record.left.take());
            pending.extend(record.right.take());
        }
    }
}

/// Every known tree component at one point in time.
///
/// Exported as a list whose first element is the main component (`null` when
/// the tree is empty) followed by the floating components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Option<NodeRecord>>", into = "Vec<Option<NodeRecord>>")]
pub struct ForestSnapshot {
    /// Component reachable from the tree's root
    pub main: Option<NodeRecord>,
    /// Registered components unreachable from the root, in registration order
    pub floating: Vec<NodeRecord>,
}

impl ForestSnapshot {
    /// Every record across all components
    pub fn records(&self) -> impl Iterator<Item = &NodeRecord> {
        self.main
            .iter()
            .chain(self.floating.iter())
            .flat_map(|record| record.iter())
    }

    /// Find the record of `id` in any component
    pub fn find(&self, id: NodeId) -> Option<&NodeRecord> {
        self.records().find(|record| record.identity == id)
    }

    /// Number of node records across all components
    pub fn node_count(&self) -> usize {
        self.records().count()
    }

    /// Number of components, counting an empty main component
    pub fn component_count(&self) -> usize {
        1 + self.floating.len()
    }
}

impl From<Vec<Option<NodeRecord>>> for ForestSnapshot {
    fn from(components: Vec<Option<NodeRecord>>) -> Self {
        let mut components = components.into_iter();
        let main = components.next().flatten();
        Self {
            main,
            floating: components.flatten().collect(),
        }
    }
}

impl From<ForestSnapshot> for Vec<Option<NodeRecord>> {
    fn from(snapshot: ForestSnapshot) -> Self {
        std::iter::once(snapshot.main)
            .chain(snapshot.floating.into_iter().map(Some))
            .collect()
    }
}

/// Serialize the forest made of `root`'s component and the floating members.
///
/// Never fails: unreadable keys render as [`UNKNOWN_LABEL`], unreadable extra
/// fields are omitted, and unreadable edges are treated as empty.
pub fn serialize_forest(
    roles: &FieldRoleMap,
    registry: &NodeRegistry,
    root: Option<&NodeRef>,
    members: &[(NodeId, NodeRef)],
) -> ForestSnapshot {
    let mut walk = ForestWalk {
        roles,
        registry,
        visited: HashSet::new(),
    };
    let main = root.and_then(|node| walk.component(node));
    let floating = members
        .iter()
        .filter_map(|(id, node)| {
            if walk.visited.contains(id) {
                None
            } else {
                walk.component(node)
            }
        })
        .collect();
    ForestSnapshot { main, floating }
}

struct ForestWalk<'a> {
    roles: &'a FieldRoleMap,
    registry: &'a NodeRegistry,
    visited: HashSet<NodeId>,
}

/// Child slot a pending record fills next.
#[derive(Clone, Copy)]
enum Slot {
    Left,
    Right,
    Complete,
}

/// A record whose children are still being walked.
struct Frame {
    node: NodeRef,
    identity: NodeId,
    display_label: String,
    left: Option<Box<NodeRecord>>,
    right: Option<Box<NodeRecord>>,
    next: Slot,
}

impl Frame {
    fn attach(&mut self, child: NodeRecord) {
        let slot = match self.next {
            Slot::Right => &mut self.left,
            Slot::Left | Slot::Complete => &mut self.right,
        };
        *slot = Some(Box::new(child));
    }
}

impl ForestWalk<'_> {
    /// Walk the component of `node` depth first, left before right.
    ///
    /// Pending records are kept on an explicit stack, not the call stack.
    fn component(&mut self, node: &NodeRef) -> Option<NodeRecord> {
        let roles = self.roles;
        let mut stack = vec![self.enter(node)?];
        loop {
            let frame = stack.last_mut()?;
            let field = match frame.next {
                Slot::Left => {
                    frame.next = Slot::Right;
                    roles.left()
                }
                Slot::Right => {
                    frame.next = Slot::Complete;
                    roles.right()
                }
                Slot::Complete => {
                    let record = self.finish(stack.pop()?);
                    match stack.last_mut() {
                        Some(parent) => parent.attach(record),
                        None => return Some(record),
                    }
                    continue;
                }
            };
            let child = frame
                .node
                .read(field)
                .ok()
                .and_then(|value| value.real_node());
            if let Some(child) = child.and_then(|child| self.enter(&child)) {
                stack.push(child);
            }
        }
    }

    /// Identify `node` and open its frame, unless it was already rendered
    fn enter(&mut self, node: &NodeRef) -> Option<Frame> {
        let identity = self.registry.identify(node);
        if !self.visited.insert(identity) {
            return None;
        }
        let display_label = match node.read(self.roles.key()) {
            Ok(key) => key.to_string(),
            Err(_) => UNKNOWN_LABEL.to_string(),
        };
        Some(Frame {
            node: node.clone(),
            identity,
            display_label,
            left: None,
            right: None,
            next: Slot::Left,
        })
    }

    fn finish(&self, frame: Frame) -> NodeRecord {
        let parent_identity = frame
            .node
            .read(self.roles.parent())
            .ok()
            .and_then(|parent| parent.real_node())
            .map(|parent| self.registry.identify(&parent));
        let extra_attributes = self.extras(&frame.node);
        NodeRecord {
            identity: frame.identity,
            display_label: frame.display_label,
            left: frame.left,
            right: frame.right,
            parent_identity,
            extra_attributes,
        }
    }

    fn extras(&self, node: &NodeRef) -> IndexMap<String, AttributeValue> {
        let mut extras = IndexMap::new();
        for name in node.field_names() {
            if self.roles.is_structural(&name) {
                continue;
            }
            match node.read(&name) {
                Ok(value) => {
                    let attribute = self.attribute(value);
                    extras.insert(name, attribute);
                }
                Err(error) => {
                    tracing::trace!(field = %name, %error, "omitting unreadable attribute");
                }
            }
        }
        extras
    }

    fn attribute(&self, value: Value) -> AttributeValue {
        match value {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Bool(b),
            Value::Int(i) => AttributeValue::Int(i),
            Value::Float(x) => AttributeValue::Float(x),
            Value::Text(s) => AttributeValue::Text(s),
            Value::Node(node) => {
                AttributeValue::Text(format!("node {}", self.registry.identify(&node)))
            }
            Value::Intercepted(node) => {
                AttributeValue::Text(format!("node {}", self.registry.identify(node.real())))
            }
            list @ Value::List(_) => AttributeValue::Text(list.to_string()),
        }
    }
}
