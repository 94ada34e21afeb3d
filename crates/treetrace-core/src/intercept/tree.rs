//! Tree-level interception

use super::display_key;
use crate::error::{TraceError, TraceResult};
use crate::intercept::InterceptingNode;
use crate::object::{TreeAccess, TreeRef};
use crate::roles::{FieldRoleMap, Role};
use crate::tracer::{ActiveNode, Tracer};
use crate::value::Value;
use std::rc::Rc;

/// Recording stand-in for one real tree.
///
/// Root, min and max reads hand out [`InterceptingNode`]s, and operations are
/// run with this wrapper as their receiver so every access they make is seen.
#[derive(Debug)]
pub struct InterceptingTree {
    real: TreeRef,
    tracer: Tracer,
    roles: Rc<FieldRoleMap>,
}

impl InterceptingTree {
    pub(crate) fn new(real: TreeRef, tracer: &Tracer) -> Self {
        Self {
            real,
            tracer: tracer.clone(),
            roles: tracer.shared_roles(),
        }
    }

    /// The wrapped tree
    pub fn real(&self) -> &TreeRef {
        &self.real
    }

    /// The tracer recording this tree
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }
}

impl TreeAccess for InterceptingTree {
    fn get(&self, field: &str) -> TraceResult<Value> {
        let value = self.real.read(field)?;
        if self.roles.tree_role(field).is_none() {
            return Ok(value);
        }
        Ok(match value {
            Value::Node(node) => Value::Intercepted(InterceptingNode::new(node, &self.tracer)),
            other => other,
        })
    }

    fn set(&self, field: &str, value: Value) -> TraceResult<()> {
        let value = value.into_raw();
        if self.roles.tree_role(field) != Some(Role::Root) {
            return Ok(self.real.write(field, value)?);
        }

        let label = display_key(&self.roles, &value);
        let active = value
            .real_node()
            .map_or(ActiveNode::None, |node| ActiveNode::Node(self.tracer.identify(&node)));
        self.real.write(field, value)?;
        self.tracer.log(active, format!("set root to {label}"));
        Ok(())
    }

    fn invoke(&self, method: &str, args: &[Value]) -> TraceResult<Value> {
        let body = self.real.method(method).ok_or_else(|| TraceError::UnknownMethod {
            name: method.to_string(),
        })?;
        let caller = self.tracer.enter_method(method);
        let outcome = body(self, args);
        self.tracer.leave_method(caller);
        outcome
    }
}
