//! Treetrace Testing Infrastructure
//!
//! Reference implementations of third-party trees written against
//! [`TreeAccess`](treetrace_core::TreeAccess), scripted scenarios that drive
//! them through a tracer, and assertions over recorded snapshots.
//!
//! - [`bst`]: plain binary search tree with deletion
//! - [`avl`]: AVL tree with virtual leaves, rotations and a cached max node
//! - [`weird`]: binary search tree with non-standard field names
//!
//! ```rust
//! use treetrace_testkit::{fixtures, TreeKind};
//!
//! let (tracer, tree) = fixtures::traced(TreeKind::Bst);
//! fixtures::insert_all(&tree, TreeKind::Bst, &[6, 7, 8]).unwrap();
//! let last = tracer.history().pop().unwrap();
//! assert_eq!(fixtures::in_order(&last.snapshot), vec!["6", "7", "8"]);
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod avl;
pub mod bst;
pub mod fixtures;
pub mod scenario;
pub mod strategies;
pub mod weird;

pub use fixtures::TreeKind;
pub use scenario::{Operation, Scenario, ScenarioError};

use treetrace_core::{TraceError, TraceResult, Value};

/// Positional argument `index` of `method`, or a bad-arguments error
pub(crate) fn argument(
    method: &str,
    args: &[Value],
    index: usize,
    expected: &str,
) -> TraceResult<Value> {
    args.get(index)
        .cloned()
        .ok_or_else(|| TraceError::bad_arguments(method, expected))
}

/// Integer argument `index` of `method`
pub(crate) fn int_argument(
    method: &str,
    args: &[Value],
    index: usize,
    expected: &str,
) -> TraceResult<i64> {
    argument(method, args, index, expected)?
        .as_int()
        .ok_or_else(|| TraceError::bad_arguments(method, expected))
}
