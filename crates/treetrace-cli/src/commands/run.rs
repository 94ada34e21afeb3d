//! `treetrace run`: trace a scripted workload and export its history

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use treetrace_core::{ExportConfig, ExportFormat, HistoryDocument, TraceConfig};
use treetrace_testkit::{Operation, Scenario, TreeKind};

/// Output format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// `const TREE_HISTORY = [...];` bundle for the visualizer
    Js,
    /// Bare JSON array
    Json,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Js => ExportFormat::Js,
            Format::Json => ExportFormat::Json,
        }
    }
}

/// Arguments of `treetrace run`.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Reference tree to trace: bst, avl or weird
    #[arg(short, long, value_parser = parse_tree)]
    pub tree: TreeKind,

    /// Operation to invoke, `NAME` or `NAME=ARG[,ARG...]`; repeatable
    #[arg(long = "op", value_name = "OPERATION")]
    pub ops: Vec<String>,

    /// Output file (defaults to the configured export path)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Output format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Record a marker entry before each operation
    #[arg(long)]
    pub annotate: bool,
}

fn parse_tree(name: &str) -> Result<TreeKind, String> {
    name.parse().map_err(|e: treetrace_testkit::ScenarioError| e.to_string())
}

/// Recorded history together with the options it should be written with.
#[derive(Debug)]
pub struct Trace {
    /// The exported steps
    pub document: HistoryDocument,
    /// Effective export options
    pub export: ExportConfig,
}

/// Run the workload and collect the history without writing it.
pub fn trace(args: &RunArgs, config: Option<TraceConfig>) -> Result<Trace> {
    let mut scenario = Scenario::new(args.tree);
    for op in &args.ops {
        scenario = scenario.with(op.parse::<Operation>()?);
    }
    if args.annotate {
        scenario = scenario.annotated();
    }

    let (roles, mut export) = match config {
        Some(config) => (config.roles, config.export),
        None => (args.tree.roles(), ExportConfig::default()),
    };
    if let Some(format) = args.format {
        export.format = format.into();
    }
    if let Some(out) = &args.out {
        export.path = out.clone();
    }

    let run = scenario
        .run_with(roles)
        .with_context(|| format!("tracing the {} tree failed", args.tree))?;
    for (operation, result) in &run.results {
        tracing::info!(%operation, %result, "operation returned");
    }

    Ok(Trace {
        document: run.tracer.export(),
        export,
    })
}

/// Handle `treetrace run`.
pub fn run(args: &RunArgs, config: Option<TraceConfig>) -> Result<()> {
    let Trace { document, export } = trace(args, config)?;
    document
        .write_to(&export.path, &export)
        .with_context(|| format!("failed to write {}", export.path.display()))?;
    println!(
        "recorded {} steps to {} ({})",
        document.len(),
        export.path.display(),
        export.format
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use treetrace_core::{ConfigurationError, FieldRoleMap, TraceError};
    use treetrace_testkit::ScenarioError;

    fn args(tree: TreeKind, ops: &[&str]) -> RunArgs {
        RunArgs {
            tree,
            ops: ops.iter().map(ToString::to_string).collect(),
            out: None,
            format: None,
            annotate: false,
        }
    }

    #[test]
    fn test_trace_records_every_operation() {
        let trace = trace(&args(TreeKind::Bst, &["insert=10", "search=10"]), None).unwrap();
        let methods: Vec<_> = trace
            .document
            .entries()
            .iter()
            .filter_map(|entry| entry.action.strip_prefix("entering "))
            .collect();
        assert_eq!(methods, vec!["insert", "search"]);
        assert_eq!(trace.export, ExportConfig::default());
    }

    #[test]
    fn test_flags_override_configured_export() {
        let mut run_args = args(TreeKind::Weird, &["insert=1"]);
        run_args.format = Some(Format::Json);
        run_args.out = Some(PathBuf::from("steps.json"));
        run_args.annotate = true;
        let trace = trace(&run_args, None).unwrap();
        assert_eq!(trace.export.format, ExportFormat::Json);
        assert_eq!(trace.export.path, PathBuf::from("steps.json"));
        assert_eq!(trace.document.entries()[0].action, "before insert=1");
    }

    #[test]
    fn test_configured_roles_replace_the_tree_defaults() {
        let config = TraceConfig {
            roles: FieldRoleMap::standard(),
            ..TraceConfig::default()
        };
        let error = trace(&args(TreeKind::Weird, &["insert=1"]), Some(config)).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ScenarioError>(),
            Some(ScenarioError::Trace(TraceError::Configuration(
                ConfigurationError::MissingTreeField { .. }
            )))
        ));
    }

    #[test]
    fn test_malformed_operations_are_rejected() {
        assert!(trace(&args(TreeKind::Bst, &["insert=1", "=2"]), None).is_err());
        assert!(parse_tree("redblack").is_err());
        assert_eq!(parse_tree("avl"), Ok(TreeKind::Avl));
    }

    #[test]
    fn test_run_writes_the_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let mut run_args = args(TreeKind::Avl, &["insert=2", "insert=1", "insert=3"]);
        run_args.out = Some(dir.path().join("tree_data.js"));
        run(&run_args, None).unwrap();

        let text = std::fs::read_to_string(dir.path().join("tree_data.js")).unwrap();
        assert!(text.starts_with("const TREE_HISTORY = "));
        let document = HistoryDocument::parse(&text).unwrap();
        assert!(!document.is_empty());
    }
}
