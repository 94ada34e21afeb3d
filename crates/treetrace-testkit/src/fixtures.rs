//! Reference tree selection, traced setups and snapshot helpers

use crate::{avl, bst, weird};
use std::fmt;
use std::str::FromStr;
use treetrace_core::{
    FieldRoleMap, ForestSnapshot, HistoryEntry, InterceptingTree, NodeRecord, TraceResult, Tracer,
    TreeAccess, TreeRef, Value,
};

/// Display label of a virtual AVL leaf
pub const VIRTUAL_LABEL: &str = "none";

/// The reference trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    /// [`bst::BinaryTree`]
    Bst,
    /// [`avl::AvlTree`]
    Avl,
    /// [`weird::tree`]
    Weird,
}

impl TreeKind {
    /// Every reference tree
    pub const ALL: [TreeKind; 3] = [TreeKind::Bst, TreeKind::Avl, TreeKind::Weird];

    /// Role map matching the tree's field names
    pub fn roles(self) -> FieldRoleMap {
        match self {
            TreeKind::Bst => FieldRoleMap::standard(),
            TreeKind::Avl => avl::roles(),
            TreeKind::Weird => weird::roles(),
        }
    }

    /// A new empty tree
    pub fn build(self) -> TreeRef {
        match self {
            TreeKind::Bst => TreeRef::new(bst::BinaryTree::new()),
            TreeKind::Avl => TreeRef::new(avl::AvlTree::new()),
            TreeKind::Weird => weird::tree(),
        }
    }

    /// Method implementing the generic operation `name` on this tree
    pub fn resolve(self, name: &str) -> &str {
        match (self, name) {
            (TreeKind::Weird, "insert") => "add_stuff",
            (TreeKind::Weird, "search") => "find_stuff",
            _ => name,
        }
    }

    /// Name used on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            TreeKind::Bst => "bst",
            TreeKind::Avl => "avl",
            TreeKind::Weird => "weird",
        }
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreeKind {
    type Err = crate::ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TreeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| crate::ScenarioError::UnknownTree(s.to_string()))
    }
}

/// A tracer observing a new empty tree of `kind`
pub fn traced(kind: TreeKind) -> (Tracer, InterceptingTree) {
    let tracer = Tracer::new(kind.roles());
    let tree = tracer
        .observe(kind.build())
        .expect("reference trees expose their configured fields");
    (tracer, tree)
}

/// Insert `keys` in order through the tree's insert operation
pub fn insert_all(tree: &InterceptingTree, kind: TreeKind, keys: &[i64]) -> TraceResult<()> {
    for key in keys {
        tree.invoke(kind.resolve("insert"), &[Value::Int(*key)])?;
    }
    Ok(())
}

/// In-order labels of the main component, empty when the tree is empty
pub fn in_order(snapshot: &ForestSnapshot) -> Vec<String> {
    snapshot
        .main
        .as_ref()
        .map(NodeRecord::in_order_labels)
        .unwrap_or_default()
}

/// In-order labels of the main component without virtual leaves
pub fn real_in_order(snapshot: &ForestSnapshot) -> Vec<String> {
    in_order(snapshot)
        .into_iter()
        .filter(|label| label != VIRTUAL_LABEL)
        .collect()
}

/// Root labels of the floating components, in order
pub fn floating_roots(snapshot: &ForestSnapshot) -> Vec<String> {
    snapshot
        .floating
        .iter()
        .map(|record| record.display_label.clone())
        .collect()
}

/// Entries that record a link or root assignment
pub fn structural_entries(history: &[HistoryEntry]) -> Vec<&HistoryEntry> {
    history
        .iter()
        .filter(|entry| entry.action.starts_with("set "))
        .collect()
}

/// Label of a record's child on `side` (`"left"` or `"right"`)
pub fn child_label(record: &NodeRecord, side: &str) -> Option<String> {
    let child = match side {
        "left" => record.left.as_deref(),
        _ => record.right.as_deref(),
    };
    child.map(|child| child.display_label.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_parse_and_build() {
        for kind in TreeKind::ALL {
            assert_eq!(kind.as_str().parse::<TreeKind>().unwrap(), kind);
            let (tracer, tree) = traced(kind);
            assert!(tracer.is_empty());
            assert!(tree.get(kind.roles().root()).unwrap().is_null());
        }
        assert!("heap".parse::<TreeKind>().is_err());
    }

    #[test]
    fn test_resolve_aliases() {
        assert_eq!(TreeKind::Weird.resolve("insert"), "add_stuff");
        assert_eq!(TreeKind::Bst.resolve("insert"), "insert");
        assert_eq!(TreeKind::Avl.resolve("finger_insert"), "finger_insert");
    }
}
