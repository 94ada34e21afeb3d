//! Node identities and the append-only registry of observed nodes
//!
//! Every real node the tracer encounters gets a [`NodeId`] on first sight.
//! Nodes that pass through an interceptor additionally become registry
//! members; membership is never revoked, which is what keeps detached nodes
//! visible in later snapshots.

use crate::object::NodeRef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

/// Stable handle of one real node for the lifetime of a tracer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl From<u64> for NodeId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Default)]
struct RegistryState {
    /// Allocation address → handle. The paired `NodeRef` keeps the allocation
    /// alive so the address is never reused while the mapping exists.
    known: HashMap<usize, (NodeId, NodeRef)>,
    /// Registered members in registration order
    members: IndexMap<NodeId, NodeRef>,
    last: u64,
}

/// Identity table and membership record of one tracer.
///
/// Methods take `&self` and hold the internal borrow only for their own
/// duration, so they can be called from inside serialization.
#[derive(Default)]
pub struct NodeRegistry {
    state: RefCell<RegistryState>,
}

impl NodeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of `node`, assigning the next one on first sight
    pub fn identify(&self, node: &NodeRef) -> NodeId {
        let mut state = self.state.borrow_mut();
        if let Some((id, _)) = state.known.get(&node.addr()) {
            return *id;
        }
        state.last += 1;
        let id = NodeId(state.last);
        state.known.insert(node.addr(), (id, node.clone()));
        id
    }

    /// Handle of `node` if it has one, without assigning
    pub fn lookup(&self, node: &NodeRef) -> Option<NodeId> {
        self.state
            .borrow()
            .known
            .get(&node.addr())
            .map(|(id, _)| *id)
    }

    /// Record `node` as a member. Idempotent.
    pub fn register(&self, node: &NodeRef) -> NodeId {
        let id = self.identify(node);
        let mut state = self.state.borrow_mut();
        if !state.members.contains_key(&id) {
            state.members.insert(id, node.clone());
            tracing::trace!(node = %id, "registered node");
        }
        id
    }

    /// Whether `id` is a registered member
    pub fn contains(&self, id: NodeId) -> bool {
        self.state.borrow().members.contains_key(&id)
    }

    /// Copy of the members in registration order
    pub fn snapshot_members(&self) -> Vec<(NodeId, NodeRef)> {
        self.state
            .borrow()
            .members
            .iter()
            .map(|(id, node)| (*id, node.clone()))
            .collect()
    }

    /// Number of registered members
    pub fn len(&self) -> usize {
        self.state.borrow().members.len()
    }

    /// Whether no node has been registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
