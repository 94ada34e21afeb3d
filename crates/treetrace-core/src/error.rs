//! Error types for the tracing engine
//!
//! Configuration problems are reported before any tracing begins. Field
//! problems come from the wrapped structure itself and are surfaced to the
//! wrapped algorithm unchanged; the serializer swallows them.

use std::path::PathBuf;

/// Invalid or incomplete role configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// A role required for tracing has no field name.
    #[error("role `{role}` has no field name configured")]
    MissingRole {
        /// Name of the absent role
        role: &'static str,
    },

    /// A mapping names a role that does not exist.
    #[error("unknown role `{name}`")]
    UnknownRole {
        /// The unrecognised role name
        name: String,
    },

    /// A role maps to an empty field name.
    #[error("role `{role}` maps to an empty field name")]
    EmptyField {
        /// Role with the empty binding
        role: &'static str,
    },

    /// Two roles of the same object are bound to one field.
    #[error("field `{field}` is bound to both `{first}` and `{second}`")]
    DuplicateField {
        /// The shared field name
        field: String,
        /// First role bound to it
        first: &'static str,
        /// Second role bound to it
        second: &'static str,
    },

    /// The observed tree does not expose a configured field.
    #[error("tree does not expose field `{field}` for role `{role}`")]
    MissingTreeField {
        /// Role whose field is absent
        role: &'static str,
        /// Configured field name
        field: String,
    },

    /// A configuration file could not be read.
    #[error("failed to read config file {}: {message}", path.display())]
    Unreadable {
        /// Path of the file
        path: PathBuf,
        /// Underlying I/O message
        message: String,
    },

    /// A configuration document could not be parsed.
    #[error("failed to parse configuration: {message}")]
    Malformed {
        /// Parser message
        message: String,
    },
}

/// Failure reading or writing one field of a wrapped object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The object has no field with this name.
    #[error("no field `{name}`")]
    Missing {
        /// Requested field name
        name: String,
    },

    /// The field exists but its value cannot be produced.
    #[error("field `{name}` cannot be read: {reason}")]
    Unreadable {
        /// Requested field name
        name: String,
        /// Why the read failed
        reason: String,
    },

    /// The object refused the assignment.
    #[error("field `{name}` rejected the assignment: {reason}")]
    Rejected {
        /// Assigned field name
        name: String,
        /// Why the write failed
        reason: String,
    },

    /// The object is already mutably borrowed further up the call stack.
    #[error("field `{name}` accessed while its object is borrowed")]
    Busy {
        /// Requested field name
        name: String,
    },
}

impl FieldError {
    /// Create a missing-field error
    pub fn missing(name: impl Into<String>) -> Self {
        Self::Missing { name: name.into() }
    }

    /// Create a rejected-assignment error
    pub fn rejected(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced to the wrapped algorithm and to callers of the tracer.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// Role configuration problem
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Field access problem
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Field access on a value that is not a node.
    #[error("cannot access `{field}` on a {found} value")]
    NotANode {
        /// Requested field
        field: String,
        /// Kind of the value that was dereferenced
        found: &'static str,
    },

    /// The tree has no operation with this name.
    #[error("tree has no method `{name}`")]
    UnknownMethod {
        /// Requested method
        name: String,
    },

    /// A method was invoked with unsuitable arguments.
    #[error("method `{method}` expects {expected}")]
    BadArguments {
        /// Invoked method
        method: String,
        /// Description of the expected arguments
        expected: String,
    },
}

impl TraceError {
    /// Create a bad-arguments error
    pub fn bad_arguments(method: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::BadArguments {
            method: method.into(),
            expected: expected.into(),
        }
    }
}

/// Result alias used by wrapped operations and interceptors
pub type TraceResult<T> = Result<T, TraceError>;

/// Failure producing or parsing an exported history document.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Writing the document failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is neither a JSON array nor a script bundle.
    #[error("malformed history document: {0}")]
    Malformed(String),
}
