//! Recordings of a tree with non-standard field names.

use treetrace_core::{ConfigurationError, FieldRoleMap, Tracer, TreeAccess, Value};
use treetrace_testkit::fixtures::{self, TreeKind};
use treetrace_testkit::weird;

#[test]
fn custom_roles_drive_interception() {
    let (tracer, tree) = fixtures::traced(TreeKind::Weird);
    fixtures::insert_all(&tree, TreeKind::Weird, &[5, 2, 8]).unwrap();

    let actions: Vec<String> = tracer.history().into_iter().map(|entry| entry.action).collect();
    assert_eq!(
        actions,
        vec![
            "entering add_stuff",
            "set root to 5",
            "entering add_stuff",
            "read key 5",
            "traverse left to none",
            "set left to 2",
            "entering add_stuff",
            "read key 5",
            "traverse right to none",
            "set right to 8",
        ]
    );

    let last = tracer.history().pop().unwrap();
    let root = last.snapshot.main.as_ref().unwrap();
    assert_eq!(fixtures::in_order(&last.snapshot), vec!["2", "5", "8"]);
    assert!(root.extra_attributes.is_empty());
    assert_eq!(root.parent_identity, None);
}

#[test]
fn recursion_through_the_receiver_is_attributed_per_call() {
    let (tracer, tree) = fixtures::traced(TreeKind::Weird);
    fixtures::insert_all(&tree, TreeKind::Weird, &[5, 2, 8, 6]).unwrap();
    let start = tracer.len();

    assert_eq!(tree.invoke("find_stuff", &[Value::Int(6)]).unwrap(), Value::Bool(true));
    let steps: Vec<(String, Option<String>)> = tracer.history()[start..]
        .iter()
        .map(|entry| (entry.action.clone(), entry.method.clone()))
        .collect();
    let recursive = Some("_find_recursive".to_string());
    assert_eq!(
        steps,
        vec![
            ("entering find_stuff".to_string(), Some("find_stuff".to_string())),
            ("entering _find_recursive".to_string(), recursive.clone()),
            ("read key 5".to_string(), recursive.clone()),
            ("traverse right to 8".to_string(), recursive.clone()),
            ("entering _find_recursive".to_string(), recursive.clone()),
            ("read key 8".to_string(), recursive.clone()),
            ("traverse left to 6".to_string(), recursive.clone()),
            ("entering _find_recursive".to_string(), recursive.clone()),
            ("read key 6".to_string(), recursive),
        ]
    );
    assert_eq!(tracer.current_method(), None);
}

#[test]
fn standard_roles_do_not_fit_the_weird_tree() {
    let tracer = Tracer::new(FieldRoleMap::standard());
    let error = tracer.observe(weird::tree()).unwrap_err();
    assert!(matches!(
        error,
        ConfigurationError::MissingTreeField { ref field, .. } if field == "root"
    ));
}
