//! End-to-end recordings of the plain binary search tree.

use treetrace_core::{ActiveNode, InterceptingNode, NodeAccess, Tracer, TreeAccess, Value};
use treetrace_testkit::fixtures::{self, TreeKind};

#[test]
fn inserting_into_an_empty_tree_records_one_structural_step() {
    let (tracer, tree) = fixtures::traced(TreeKind::Bst);
    tree.invoke("insert", &[Value::Int(10)]).unwrap();

    let history = tracer.history();
    assert_eq!(history[0].action, "entering insert");
    assert_eq!(history[0].identity, ActiveNode::None);

    let structural = fixtures::structural_entries(&history);
    assert_eq!(structural.len(), 1);
    let main = structural[0].snapshot.main.as_ref().unwrap();
    assert_eq!(main.display_label, "10");
    assert!(main.left.is_none());
    assert!(main.right.is_none());
    assert_eq!(structural[0].snapshot.node_count(), 1);
    assert_eq!(structural[0].identity, ActiveNode::Node(main.identity));
}

#[test]
fn ascending_inserts_build_a_right_spine() {
    let (tracer, tree) = fixtures::traced(TreeKind::Bst);
    fixtures::insert_all(&tree, TreeKind::Bst, &[6, 7, 8]).unwrap();

    let history = tracer.history();
    assert!(fixtures::structural_entries(&history).len() >= 3);

    let last = history.last().unwrap();
    let root = last.snapshot.main.as_ref().unwrap();
    assert_eq!(root.display_label, "6");
    assert!(root.left.is_none());
    let seven = root.right.as_deref().unwrap();
    assert_eq!(seven.display_label, "7");
    assert_eq!(fixtures::child_label(seven, "right").as_deref(), Some("8"));
    assert_eq!(last.action, "set right to 8");
    assert_eq!(last.method.as_deref(), Some("insert"));
}

#[test]
fn history_reads_like_the_algorithm() {
    let (tracer, tree) = fixtures::traced(TreeKind::Bst);
    fixtures::insert_all(&tree, TreeKind::Bst, &[50, 30]).unwrap();
    tree.invoke("search", &[Value::Int(30)]).unwrap();

    let actions: Vec<String> = tracer.history().into_iter().map(|entry| entry.action).collect();
    assert_eq!(
        actions,
        vec![
            "entering insert",
            "set root to 50",
            "entering insert",
            "read key 50",
            "traverse left to none",
            "set left to 30",
            "entering search",
            "read key 50",
            "traverse left to 30",
            "read key 30",
        ]
    );
}

#[test]
fn detached_nodes_stay_visible_after_delete() {
    let (tracer, tree) = fixtures::traced(TreeKind::Bst);
    fixtures::insert_all(&tree, TreeKind::Bst, &[5, 3, 8]).unwrap();
    assert_eq!(tree.invoke("delete", &[Value::Int(3)]).unwrap(), Value::Bool(true));

    let after_delete = tracer.history().pop().unwrap();
    assert_eq!(after_delete.action, "set left to none");
    assert_eq!(fixtures::in_order(&after_delete.snapshot), vec!["5", "8"]);
    assert_eq!(fixtures::floating_roots(&after_delete.snapshot), vec!["3"]);

    fixtures::insert_all(&tree, TreeKind::Bst, &[1]).unwrap();
    let later = tracer.history().pop().unwrap();
    assert_eq!(fixtures::in_order(&later.snapshot), vec!["1", "5", "8"]);
    assert_eq!(fixtures::floating_roots(&later.snapshot), vec!["3"]);
}

#[test]
fn two_child_delete_copies_the_successor_key() {
    let (tracer, tree) = fixtures::traced(TreeKind::Bst);
    fixtures::insert_all(&tree, TreeKind::Bst, &[50, 30, 70, 60, 80]).unwrap();
    tree.invoke("delete", &[Value::Int(50)]).unwrap();

    let history = tracer.history();
    let last = history.last().unwrap();
    assert_eq!(fixtures::in_order(&last.snapshot), vec!["30", "60", "70", "80"]);
    assert_eq!(fixtures::floating_roots(&last.snapshot), vec!["60"]);
    assert!(history.iter().any(|entry| entry.action == "update key to 60"));
}

#[test]
fn wrappers_over_one_node_share_its_identity() {
    let (tracer, tree) = fixtures::traced(TreeKind::Bst);
    fixtures::insert_all(&tree, TreeKind::Bst, &[4]).unwrap();

    let raw = tree.real().get("root").unwrap().real_node().unwrap();
    let first = InterceptingNode::new(raw.clone(), &tracer);
    let second = InterceptingNode::wrap(&tree.get("root").unwrap(), &tracer).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, raw);
    assert_eq!(Value::Intercepted(first.clone()), Value::Node(raw));

    first.get_field("key").unwrap();
    second.get_field("key").unwrap();
    let history = tracer.history();
    let n = history.len();
    assert_eq!(history[n - 1].identity, history[n - 2].identity);
    assert_eq!(history[n - 1].snapshot, history[n - 2].snapshot);
    assert_eq!(history[n - 1].snapshot.main.as_ref().unwrap().identity, first.id());
}

#[test]
fn separate_tracers_do_not_share_state() {
    let (first, tree) = fixtures::traced(TreeKind::Bst);
    let second = Tracer::new(TreeKind::Bst.roles());
    fixtures::insert_all(&tree, TreeKind::Bst, &[1, 2]).unwrap();
    assert!(!first.is_empty());
    assert!(second.is_empty());
    assert!(second.registry().is_empty());
}
