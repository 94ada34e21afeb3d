//! # Treetrace Core
//!
//! **Purpose**: Observe an existing linked-tree implementation without
//! changing it, and record a replayable history of whole-forest snapshots.
//!
//! A wrapped structure only has to expose its fields by name ([`Fields`]) and
//! write its operations against a generic receiver ([`TreeAccess`]). The
//! tracer then runs those operations with an [`InterceptingTree`] standing in
//! for the real tree, so every structural read and write the algorithm makes
//! is seen and recorded.
//!
//! ## Core Concepts
//!
//! - **Role map**: binds the abstract roles `left`, `right`, `parent`, `key`,
//!   `root` (and optionally `min`, `max`) to the wrapped structure's field names
//! - **Registry**: every node that passed through an interceptor, kept for the
//!   tracer's lifetime so detached nodes stay visible
//! - **Forest snapshot**: the root's component followed by every floating
//!   component, serialized without revisiting any node
//! - **History document**: the exported sequence of steps
//!
//! ```rust
//! use treetrace_core::{
//!     DynamicTree, FieldRoleMap, Record, TraceResult, Tracer, TreeAccess, TreeRef, Value,
//! };
//!
//! fn plant(this: &dyn TreeAccess, args: &[Value]) -> TraceResult<Value> {
//!     let node = Value::node(
//!         Record::new()
//!             .with("key", args[0].clone())
//!             .with("left", Value::Null)
//!             .with("right", Value::Null),
//!     );
//!     this.set("root", node)?;
//!     Ok(Value::Null)
//! }
//!
//! let tracer = Tracer::new(FieldRoleMap::standard());
//! let tree = tracer.observe(TreeRef::new(
//!     DynamicTree::new()
//!         .with_field("root", Value::Null)
//!         .with_method("plant", plant),
//! ))?;
//! tree.invoke("plant", &[Value::Int(10)])?;
//! assert_eq!(tracer.len(), 2);
//! # Ok::<(), treetrace_core::TraceError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Configuration loading
pub mod config;

/// Error types
pub mod error;

/// History document export and parsing
pub mod export;

/// Recording wrappers for nodes and trees
pub mod intercept;

/// Field access traits and shared handles
pub mod object;

/// Structural roles and the role map
pub mod roles;

/// Node identities and membership
pub mod registry;

/// Forest snapshots
pub mod serializer;

/// The history recorder
pub mod tracer;

/// Dynamic field values
pub mod value;

pub use config::TraceConfig;
pub use error::{ConfigurationError, ExportError, FieldError, TraceError, TraceResult};
pub use export::{ExportConfig, ExportFormat, HistoryDocument};
pub use intercept::{InterceptingNode, InterceptingTree};
pub use object::{
    DynamicTree, Fields, Method, NodeAccess, NodeRef, Record, TreeAccess, TreeObject, TreeRef,
};
pub use registry::{NodeId, NodeRegistry};
pub use roles::{FieldRoleMap, Role, RoleMapConfig};
pub use serializer::{serialize_forest, AttributeValue, ForestSnapshot, NodeRecord};
pub use tracer::{ActiveNode, HistoryEntry, Tracer};
pub use value::Value;
