//! History recorder
//!
//! A [`Tracer`] owns everything one observation shares: the role map, the
//! node registry, the history, the reentrancy flag and the current method
//! context. It is a cheap handle; interceptors keep clones of it.

use crate::error::{ConfigurationError, FieldError};
use crate::export::HistoryDocument;
use crate::intercept::InterceptingTree;
use crate::object::{NodeRef, TreeRef};
use crate::registry::{NodeId, NodeRegistry};
use crate::roles::{FieldRoleMap, Role};
use crate::serializer::{serialize_forest, ForestSnapshot};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Exported in place of a node handle when no node is active
pub const NO_ACTIVE_NODE: &str = "N/A";

/// Node an entry is about, or none for method entries and annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActiveNode {
    /// The entry concerns this node
    Node(NodeId),
    /// The entry concerns no particular node
    None,
}

impl ActiveNode {
    /// Handle of the active node, if any
    pub fn id(self) -> Option<NodeId> {
        match self {
            ActiveNode::Node(id) => Some(id),
            ActiveNode::None => None,
        }
    }
}

impl fmt::Display for ActiveNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveNode::Node(id) => write!(f, "{id}"),
            ActiveNode::None => f.write_str(NO_ACTIVE_NODE),
        }
    }
}

impl Serialize for ActiveNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ActiveNode::Node(id) => id.serialize(serializer),
            ActiveNode::None => serializer.serialize_str(NO_ACTIVE_NODE),
        }
    }
}

impl<'de> Deserialize<'de> for ActiveNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Id(NodeId),
            Sentinel(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Id(id) => Ok(ActiveNode::Node(id)),
            Raw::Sentinel(text) if text == NO_ACTIVE_NODE => Ok(ActiveNode::None),
            Raw::Sentinel(text) => Err(serde::de::Error::custom(format!(
                "expected a node handle or \"{NO_ACTIVE_NODE}\", found \"{text}\""
            ))),
        }
    }
}

/// One recorded step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Node the step is about
    pub identity: ActiveNode,
    /// Human-readable description of the step
    pub action: String,
    /// Method running when the step was recorded
    pub method: Option<String>,
    /// Whole forest after the step
    pub snapshot: ForestSnapshot,
}

struct TracerState {
    roles: Rc<FieldRoleMap>,
    registry: NodeRegistry,
    history: RefCell<Vec<HistoryEntry>>,
    logging: Cell<bool>,
    current_method: RefCell<Option<String>>,
    observed: RefCell<Option<TreeRef>>,
}

/// Clears the reentrancy flag when serialization ends, even by unwinding.
struct LoggingGuard<'a>(&'a Cell<bool>);

impl Drop for LoggingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Recorder of one observed tree.
#[derive(Clone)]
pub struct Tracer {
    state: Rc<TracerState>,
}

impl Tracer {
    /// Create a tracer with an empty history
    pub fn new(roles: FieldRoleMap) -> Self {
        Self {
            state: Rc::new(TracerState {
                roles: Rc::new(roles),
                registry: NodeRegistry::new(),
                history: RefCell::new(Vec::new()),
                logging: Cell::new(false),
                current_method: RefCell::new(None),
                observed: RefCell::new(None),
            }),
        }
    }

    /// Role map shared with every interceptor of this tracer
    pub fn roles(&self) -> &FieldRoleMap {
        &self.state.roles
    }

    pub(crate) fn shared_roles(&self) -> Rc<FieldRoleMap> {
        Rc::clone(&self.state.roles)
    }

    /// Registry of observed nodes
    pub fn registry(&self) -> &NodeRegistry {
        &self.state.registry
    }

    /// Start observing `tree` and return its intercepting stand-in.
    ///
    /// Fails before anything is recorded when a required role is unbound, or
    /// when the tree lacks the configured root field or a configured min or
    /// max field.
    pub fn observe(&self, tree: TreeRef) -> Result<InterceptingTree, ConfigurationError> {
        self.roles().require(&Role::REQUIRED)?;
        for (role, field) in self.roles().tree_fields() {
            if let Err(FieldError::Missing { .. }) = tree.read(field) {
                return Err(ConfigurationError::MissingTreeField {
                    role: role.as_str(),
                    field: field.to_string(),
                });
            }
        }

        tracing::info!(
            root = self.roles().root(),
            methods = tree.method_names().len(),
            "observing tree"
        );
        *self.state.observed.borrow_mut() = Some(tree.clone());
        Ok(InterceptingTree::new(tree, self))
    }

    /// Record one step.
    ///
    /// Does nothing while a snapshot is being taken, so field reads made on
    /// behalf of the serializer never produce entries of their own.
    pub fn log(&self, active: ActiveNode, action: impl Into<String>) {
        let state = &self.state;
        if state.logging.replace(true) {
            return;
        }
        let guard = LoggingGuard(&state.logging);
        let snapshot = self.take_snapshot();
        drop(guard);

        let action = action.into();
        let method = state.current_method.borrow().clone();
        let mut history = state.history.borrow_mut();
        tracing::debug!(
            step = history.len(),
            node = %active,
            method = method.as_deref().unwrap_or("-"),
            %action,
            "recorded step"
        );
        history.push(HistoryEntry {
            identity: active,
            action,
            method,
            snapshot,
        });
    }

    /// Make `name` the current method and record its entry
    pub fn set_current_method(&self, name: &str) {
        *self.state.current_method.borrow_mut() = Some(name.to_string());
        self.log(ActiveNode::None, format!("entering {name}"));
    }

    /// Method context of the next recorded step
    pub fn current_method(&self) -> Option<String> {
        self.state.current_method.borrow().clone()
    }

    /// Enter `name`, returning the context to restore afterwards
    pub(crate) fn enter_method(&self, name: &str) -> Option<String> {
        let caller = self.current_method();
        self.set_current_method(name);
        caller
    }

    pub(crate) fn leave_method(&self, caller: Option<String>) {
        *self.state.current_method.borrow_mut() = caller;
    }

    /// Add `node` to the registry
    pub fn register_node(&self, node: &NodeRef) -> NodeId {
        self.state.registry.register(node)
    }

    /// Handle of `node`, without making it a registry member
    pub fn identify(&self, node: &NodeRef) -> NodeId {
        self.state.registry.identify(node)
    }

    /// Whether `node` has passed through an interceptor of this tracer
    pub fn is_registered(&self, node: &NodeRef) -> bool {
        let registry = &self.state.registry;
        registry.lookup(node).is_some_and(|id| registry.contains(id))
    }

    /// Record an annotation that concerns no particular node
    pub fn mark(&self, message: impl Into<String>) {
        self.log(ActiveNode::None, message);
    }

    /// Copy of the recorded history
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state.history.borrow().clone()
    }

    /// Entry at `index`
    pub fn entry(&self, index: usize) -> Option<HistoryEntry> {
        self.state.history.borrow().get(index).cloned()
    }

    /// Number of recorded steps
    pub fn len(&self) -> usize {
        self.state.history.borrow().len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the forest as it is now, without recording anything
    pub fn snapshot_now(&self) -> ForestSnapshot {
        let was_logging = self.state.logging.replace(true);
        let snapshot = self.take_snapshot();
        self.state.logging.set(was_logging);
        snapshot
    }

    /// Exportable document of the recorded history
    pub fn export(&self) -> HistoryDocument {
        HistoryDocument::new(self.history())
    }

    fn take_snapshot(&self) -> ForestSnapshot {
        let state = &self.state;
        let root = state
            .observed
            .borrow()
            .as_ref()
            .and_then(|tree| tree.read(state.roles.root()).ok())
            .and_then(|value| value.real_node());
        let members = state.registry.snapshot_members();
        serialize_forest(&state.roles, &state.registry, root.as_ref(), &members)
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("steps", &self.len())
            .field("nodes", &self.state.registry.len())
            .field("method", &self.current_method())
            .finish()
    }
}
