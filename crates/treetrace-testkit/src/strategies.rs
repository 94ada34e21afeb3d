//! Property test strategies for reference tree workloads

use crate::fixtures::TreeKind;
use crate::scenario::Operation;
use proptest::prelude::*;
use treetrace_core::Value;

// Re-export proptest for convenience
pub use proptest;

/// Keys in a small range, so searches and deletes regularly hit
pub fn arb_key() -> impl Strategy<Value = i64> {
    -64i64..64
}

/// Up to `max_len` distinct keys in random order
pub fn arb_distinct_keys(max_len: usize) -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::btree_set(arb_key(), 0..=max_len)
        .prop_map(|keys| keys.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

/// One operation the given tree supports
pub fn arb_operation(kind: TreeKind) -> BoxedStrategy<Operation> {
    let names: &'static [&'static str] = match kind {
        TreeKind::Bst => &["insert", "insert", "search", "delete"],
        TreeKind::Avl => &["insert", "finger_insert", "search", "finger_search"],
        TreeKind::Weird => &["insert", "insert", "search"],
    };
    (proptest::sample::select(names), arb_key())
        .prop_map(|(name, key)| Operation::new(name, vec![Value::Int(key)]))
        .boxed()
}

/// Operation sequences for `kind`, starting from a few distinct inserts.
///
/// AVL insertion requires absent keys, so AVL sequences only insert keys not
/// inserted before.
pub fn arb_workload(kind: TreeKind, max_len: usize) -> BoxedStrategy<Vec<Operation>> {
    let operations = proptest::collection::vec(arb_operation(kind), 0..=max_len);
    (arb_distinct_keys(4), operations)
        .prop_map(move |(seed, operations)| {
            let mut inserted = std::collections::HashSet::new();
            seed.into_iter()
                .map(|key| Operation::new("insert", vec![Value::Int(key)]))
                .chain(operations)
                .filter(|operation| {
                    let inserting = operation.name.ends_with("insert");
                    if kind != TreeKind::Avl || !inserting {
                        return true;
                    }
                    operation
                        .args
                        .first()
                        .and_then(Value::as_int)
                        .is_some_and(|key| inserted.insert(key))
                })
                .collect()
        })
        .boxed()
}
