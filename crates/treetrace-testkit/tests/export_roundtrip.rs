//! Writing recorded histories to disk and reading them back.

use assert_matches::assert_matches;
use std::io::Write;
use treetrace_core::{
    ExportConfig, ExportError, ExportFormat, HistoryDocument, TraceConfig, Tracer, TreeAccess,
};
use treetrace_testkit::fixtures::{self, TreeKind};
use treetrace_testkit::Scenario;

fn recorded() -> HistoryDocument {
    let run = Scenario::new(TreeKind::Avl)
        .inserting(&[3, 1, 4, 5])
        .with("search=4".parse().unwrap())
        .run()
        .unwrap();
    run.tracer.export()
}

#[test]
fn script_bundle_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree_data.js");
    let document = recorded();

    document.write_to(&path, &ExportConfig::default()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("const TREE_HISTORY = ["));

    let parsed = HistoryDocument::read(&path).unwrap();
    assert_eq!(parsed, document);
    assert_eq!(parsed.entries().last().unwrap().method.as_deref(), Some("rec_search"));
}

#[test]
fn json_export_matches_the_visualizer_contract() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let options = ExportConfig {
        format: ExportFormat::Json,
        pretty: false,
        ..ExportConfig::default()
    };
    recorded().write_to(&path, &options).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let steps = value.as_array().unwrap();
    assert_eq!(steps[0]["identity"], "N/A");
    assert_eq!(steps[0]["action"], "entering insert");
    assert!(steps[0]["snapshot"][0].is_null());

    let last = steps.last().unwrap();
    let main = &last["snapshot"][0];
    for key in ["identity", "displayLabel", "left", "right", "parentIdentity", "extraAttributes"] {
        assert!(main.get(key).is_some(), "missing {key}");
    }
    assert!(main["extraAttributes"]["height"].is_i64());
    assert!(last["snapshot"].as_array().unwrap().len() > 1);
}

#[test]
fn configured_roles_and_output_from_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[roles]
left = "l"
right = "r"
parent = "up"
key = "val"
root = "head"

[export]
format = "json"
variable = "STEPS"
"#
    )
    .unwrap();

    let config = TraceConfig::load(file.path()).unwrap();
    let tracer = Tracer::new(config.roles.clone());
    let tree = tracer.observe(TreeKind::Weird.build()).unwrap();
    fixtures::insert_all(&tree, TreeKind::Weird, &[2, 1]).unwrap();
    assert!(!tree.get("head").unwrap().is_null());

    let rendered = tracer.export().render(&config.export).unwrap();
    let parsed = HistoryDocument::parse(&rendered).unwrap();
    assert_eq!(parsed.len(), tracer.len());
}

#[test]
fn unreadable_documents_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    assert_matches!(
        HistoryDocument::read(&dir.path().join("absent.js")),
        Err(ExportError::Io(_))
    );

    let path = dir.path().join("broken.js");
    std::fs::write(&path, "window.TREE_HISTORY = [];").unwrap();
    assert_matches!(HistoryDocument::read(&path), Err(ExportError::Malformed(_)));
}
