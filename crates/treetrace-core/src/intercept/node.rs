//! Node-level interception

use super::display_key;
use crate::error::{FieldError, TraceResult};
use crate::object::{NodeAccess, NodeRef};
use crate::registry::NodeId;
use crate::roles::FieldRoleMap;
use crate::serializer::UNKNOWN_LABEL;
use crate::tracer::{ActiveNode, Tracer};
use crate::value::Value;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Recording stand-in for one real node.
///
/// Created fresh at every traversal step. Identity, equality, ordering,
/// hashing and truthiness are those of the real node, so a wrapped and a raw
/// reference to the same node are interchangeable in comparisons.
#[derive(Clone)]
pub struct InterceptingNode {
    real: NodeRef,
    tracer: Tracer,
    roles: Rc<FieldRoleMap>,
}

impl InterceptingNode {
    /// Wrap `real` and register it with the tracer
    pub fn new(real: NodeRef, tracer: &Tracer) -> Self {
        tracer.register_node(&real);
        Self {
            real,
            tracer: tracer.clone(),
            roles: tracer.shared_roles(),
        }
    }

    /// Wrap the real node behind `candidate`, unwrapping any interceptor first
    pub fn wrap(candidate: &Value, tracer: &Tracer) -> Option<Self> {
        candidate.real_node().map(|real| Self::new(real, tracer))
    }

    /// The wrapped node
    pub fn real(&self) -> &NodeRef {
        &self.real
    }

    /// Give up the wrapper, keeping the real node
    pub fn into_real(self) -> NodeRef {
        self.real
    }

    /// Identity of the wrapped node
    pub fn id(&self) -> NodeId {
        self.tracer.identify(&self.real)
    }

    /// Truthiness of the wrapped node
    pub fn is_truthy(&self) -> bool {
        self.real.is_truthy()
    }

    fn record(&self, action: String) {
        self.tracer.log(ActiveNode::Node(self.id()), action);
    }

    fn read_key(&self, name: &str) -> TraceResult<Value> {
        match self.real.read(name) {
            Ok(key) => {
                self.record(format!("read key {key}"));
                Ok(key)
            }
            Err(FieldError::Missing { .. }) => {
                self.record(format!("read key {UNKNOWN_LABEL}"));
                Ok(Value::Null)
            }
            Err(error) => Err(error.into()),
        }
    }
}

impl NodeAccess for InterceptingNode {
    fn get_field(&self, name: &str) -> TraceResult<Value> {
        match self.roles.node_role(name) {
            Some(role) if role.is_edge() => {
                let target = self.real.read(name)?;
                let label = display_key(&self.roles, &target);
                self.record(format!("traverse {role} to {label}"));
                Ok(match target {
                    Value::Node(node) => {
                        Value::Intercepted(InterceptingNode::new(node, &self.tracer))
                    }
                    other => other,
                })
            }
            Some(_) => self.read_key(name),
            None => self.get_extra(name),
        }
    }

    fn set_field(&self, name: &str, value: Value) -> TraceResult<()> {
        let value = value.into_raw();
        let label = display_key(&self.roles, &value);
        self.real.write(name, value)?;
        match self.roles.node_role(name) {
            Some(role) if role.is_edge() => self.record(format!("set {role} to {label}")),
            _ => self.record(format!("update {name} to {label}")),
        }
        Ok(())
    }

    fn get_extra(&self, name: &str) -> TraceResult<Value> {
        Ok(self.real.read(name)?)
    }
}

impl PartialEq for InterceptingNode {
    fn eq(&self, other: &Self) -> bool {
        self.real == other.real
    }
}

impl Eq for InterceptingNode {}

impl PartialEq<NodeRef> for InterceptingNode {
    fn eq(&self, other: &NodeRef) -> bool {
        self.real == *other
    }
}

impl PartialEq<InterceptingNode> for NodeRef {
    fn eq(&self, other: &InterceptingNode) -> bool {
        *self == other.real
    }
}

impl PartialOrd for InterceptingNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.real.partial_cmp(&other.real)
    }
}

impl Hash for InterceptingNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.real.hash(state);
    }
}

impl fmt::Debug for InterceptingNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InterceptingNode").field(&self.real).finish()
    }
}
