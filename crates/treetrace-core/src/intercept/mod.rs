//! Transparent wrappers that record structural access
//!
//! [`InterceptingNode`] stands in for one real node and [`InterceptingTree`]
//! for one real tree. Both forward every access to the real object and report
//! structural reads and writes to their [`Tracer`](crate::Tracer). Neither
//! owns the object it wraps.

mod node;
mod tree;

pub use node::InterceptingNode;
pub use tree::InterceptingTree;

use crate::roles::FieldRoleMap;
use crate::serializer::UNKNOWN_LABEL;
use crate::value::Value;

/// Human-readable key of the node behind `value`, read without interception.
pub(crate) fn display_key(roles: &FieldRoleMap, value: &Value) -> String {
    match value.real_node() {
        Some(node) => node
            .read(roles.key())
            .map(|key| key.to_string())
            .unwrap_or_else(|_| UNKNOWN_LABEL.to_string()),
        None => value.to_string(),
    }
}
