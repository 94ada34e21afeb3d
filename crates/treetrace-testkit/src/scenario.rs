//! Scripted operation sequences
//!
//! An [`Operation`] is written `name` or `name=arg[,arg...]`, for example
//! `insert=6`, `finger_search=12` or `size`. Arguments that parse as integers
//! or floats become numbers; anything else is text.

use crate::fixtures::TreeKind;
use std::fmt;
use std::str::FromStr;
use treetrace_core::{FieldRoleMap, TraceError, Tracer, TreeAccess, Value};

/// Failure building or running a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// An operation string could not be parsed.
    #[error("invalid operation `{0}`: expected NAME or NAME=ARG[,ARG...]")]
    BadOperation(String),

    /// No reference tree has this name.
    #[error("unknown tree `{0}`: expected bst, avl or weird")]
    UnknownTree(String),

    /// An operation failed inside the traced tree.
    #[error("operation `{operation}` failed: {source}")]
    Failed {
        /// The failing operation
        operation: String,
        /// Underlying error
        #[source]
        source: TraceError,
    },

    /// The tree could not be observed.
    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// One operation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Generic or tree-specific operation name
    pub name: String,
    /// Positional arguments
    pub args: Vec<Value>,
}

impl Operation {
    /// Create an operation call
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

fn parse_argument(text: &str) -> Value {
    if let Ok(int) = text.parse::<i64>() {
        Value::Int(int)
    } else if let Ok(float) = text.parse::<f64>() {
        Value::Float(float)
    } else {
        Value::from(text)
    }
}

impl FromStr for Operation {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, args) = match s.split_once('=') {
            Some((name, args)) => (
                name.trim(),
                args.split(',').map(str::trim).map(parse_argument).collect(),
            ),
            None => (s.trim(), Vec::new()),
        };
        let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(ScenarioError::BadOperation(s.to_string()));
        }
        Ok(Self::new(name, args))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(Value::to_string).collect();
            write!(f, "={}", args.join(","))?;
        }
        Ok(())
    }
}

/// A reference tree and the operations to run against it.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Tree to build
    pub kind: TreeKind,
    /// Operations in order
    pub operations: Vec<Operation>,
    /// Record a marker entry before each operation
    pub annotate: bool,
}

/// Outcome of a scenario run.
#[derive(Debug)]
pub struct ScenarioRun {
    /// Tracer holding the recorded history
    pub tracer: Tracer,
    /// Each operation with its return value
    pub results: Vec<(Operation, Value)>,
}

impl Scenario {
    /// Scenario without operations
    pub fn new(kind: TreeKind) -> Self {
        Self {
            kind,
            operations: Vec::new(),
            annotate: false,
        }
    }

    /// Append an operation
    pub fn with(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Append one `insert` per key
    pub fn inserting(mut self, keys: &[i64]) -> Self {
        self.operations
            .extend(keys.iter().map(|key| Operation::new("insert", vec![Value::Int(*key)])));
        self
    }

    /// Record a marker entry before each operation
    pub fn annotated(mut self) -> Self {
        self.annotate = true;
        self
    }

    /// Run with the tree's own role map
    pub fn run(&self) -> Result<ScenarioRun, ScenarioError> {
        self.run_with(self.kind.roles())
    }

    /// Run with an explicit role map
    pub fn run_with(&self, roles: FieldRoleMap) -> Result<ScenarioRun, ScenarioError> {
        let tracer = Tracer::new(roles);
        let tree = tracer.observe(self.kind.build()).map_err(TraceError::from)?;
        let mut results = Vec::with_capacity(self.operations.len());

        for operation in &self.operations {
            if self.annotate {
                tracer.mark(format!("before {operation}"));
            }
            let method = self.kind.resolve(&operation.name);
            let result = tree
                .invoke(method, &operation.args)
                .map_err(|source| ScenarioError::Failed {
                    operation: operation.to_string(),
                    source,
                })?;
            tracing::debug!(%operation, %result, steps = tracer.len(), "operation finished");
            results.push((operation.clone(), result));
        }

        Ok(ScenarioRun { tracer, results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_operations() {
        let op: Operation = "insert=6".parse().unwrap();
        assert_eq!(op, Operation::new("insert", vec![Value::Int(6)]));
        let op: Operation = "insert=6, six".parse().unwrap();
        assert_eq!(op.args, vec![Value::Int(6), Value::from("six")]);
        let op: Operation = "size".parse().unwrap();
        assert!(op.args.is_empty());
        assert_eq!(op.to_string(), "size");
        assert_matches!("=3".parse::<Operation>(), Err(ScenarioError::BadOperation(_)));
        assert_matches!("in sert=3".parse::<Operation>(), Err(ScenarioError::BadOperation(_)));
    }

    #[test]
    fn test_run_collects_results() {
        let run = Scenario::new(TreeKind::Bst)
            .inserting(&[4, 2])
            .with("search=2".parse().unwrap())
            .run()
            .unwrap();
        assert_eq!(run.results.len(), 3);
        assert_eq!(run.results[2].1, Value::Bool(true));
        assert!(!run.tracer.is_empty());
    }

    #[test]
    fn test_annotations_precede_operations() {
        let run = Scenario::new(TreeKind::Weird).inserting(&[1]).annotated().run().unwrap();
        let actions: Vec<String> = run
            .tracer
            .history()
            .into_iter()
            .map(|entry| entry.action)
            .collect();
        assert_eq!(actions, vec!["before insert=1", "entering add_stuff", "set root to 1"]);
    }

    #[test]
    fn test_failures_name_the_operation() {
        let error = Scenario::new(TreeKind::Avl)
            .with("delete=1".parse().unwrap())
            .run()
            .unwrap_err();
        assert_matches!(
            error,
            ScenarioError::Failed {
                ref operation,
                source: TraceError::UnknownMethod { .. },
            } if operation == "delete=1"
        );
    }
}
