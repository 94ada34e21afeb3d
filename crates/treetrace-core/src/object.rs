//! Object model for wrapped structures
//!
//! A third-party node or tree participates in tracing by implementing
//! [`Fields`]: field access by name, with no fixed layout. Trees additionally
//! implement [`TreeObject`] to expose their operations as plain functions
//! written against a [`TreeAccess`] receiver, so the same logic runs against
//! the real tree or against an intercepting stand-in.
//!
//! [`Record`] and [`DynamicTree`] are ready-made field bags for structures
//! assembled at runtime.

use crate::error::{FieldError, TraceError, TraceResult};
use crate::value::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Name-based field access implemented by wrapped nodes and trees.
pub trait Fields {
    /// Read a field by name
    fn field(&self, name: &str) -> Result<Value, FieldError>;

    /// Assign a field by name
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldError>;

    /// Names of every field this object currently exposes, in display order
    fn field_names(&self) -> Vec<String>;

    /// Truthiness of the object itself
    fn is_truthy(&self) -> bool {
        true
    }

    /// Ordering against another object of the wrapped structure
    fn compare(&self, _other: &dyn Fields) -> Option<Ordering> {
        None
    }
}

/// Capability interface for node-level field access.
///
/// Implemented by raw references (silent) and by interceptors (recording).
pub trait NodeAccess {
    /// Read a structural or extra field
    fn get_field(&self, name: &str) -> TraceResult<Value>;

    /// Assign a structural or extra field
    fn set_field(&self, name: &str, value: Value) -> TraceResult<()>;

    /// Read a field without any interception
    fn get_extra(&self, name: &str) -> TraceResult<Value>;
}

/// Shared handle to one real node.
///
/// Equality, hashing and identity are by allocation, never by content.
#[derive(Clone)]
pub struct NodeRef(Rc<RefCell<dyn Fields>>);

impl NodeRef {
    /// Move a node implementation behind a new handle
    pub fn new<F: Fields + 'static>(fields: F) -> Self {
        Self(Rc::new(RefCell::new(fields)))
    }

    /// Address of the shared allocation
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    /// Read a field without interception
    pub fn read(&self, name: &str) -> Result<Value, FieldError> {
        let inner = self
            .0
            .try_borrow()
            .map_err(|_| FieldError::Busy { name: name.into() })?;
        inner.field(name)
    }

    /// Assign a field without interception.
    ///
    /// Interceptors inside `value` are replaced by the nodes they wrap, so a
    /// real node only ever stores raw references.
    pub fn write(&self, name: &str, value: Value) -> Result<(), FieldError> {
        let mut inner = self
            .0
            .try_borrow_mut()
            .map_err(|_| FieldError::Busy { name: name.into() })?;
        inner.set_field(name, value.into_raw())
    }

    /// Field names of the node; empty while the node is borrowed
    pub fn field_names(&self) -> Vec<String> {
        self.0
            .try_borrow()
            .map(|inner| inner.field_names())
            .unwrap_or_default()
    }

    /// Truthiness of the real node
    pub fn is_truthy(&self) -> bool {
        self.0.try_borrow().map(|inner| inner.is_truthy()).unwrap_or(true)
    }
}

impl NodeAccess for NodeRef {
    fn get_field(&self, name: &str) -> TraceResult<Value> {
        Ok(self.read(name)?)
    }

    fn set_field(&self, name: &str, value: Value) -> TraceResult<()> {
        Ok(self.write(name, value)?)
    }

    fn get_extra(&self, name: &str) -> TraceResult<Value> {
        Ok(self.read(name)?)
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for NodeRef {}

impl std::hash::Hash for NodeRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        let a = self.0.try_borrow().ok()?;
        let b = other.0.try_borrow().ok()?;
        a.compare(&*b)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<node {:#x}>", self.addr())
    }
}

/// An operation of a wrapped tree, written against a generic receiver.
pub type Method = fn(&dyn TreeAccess, &[Value]) -> TraceResult<Value>;

/// A wrapped tree container: fields plus a table of operations.
pub trait TreeObject: Fields {
    /// Look up an operation by name
    fn method(&self, name: &str) -> Option<Method>;

    /// Names of the operations this tree exposes
    fn method_names(&self) -> Vec<&'static str> {
        Vec::new()
    }
}

/// Capability interface shared by real trees and intercepting trees.
///
/// Operations of a wrapped tree only ever see their receiver through this
/// trait, which is what lets an interceptor stand in for the real tree.
pub trait TreeAccess {
    /// Read a tree field
    fn get(&self, field: &str) -> TraceResult<Value>;

    /// Assign a tree field
    fn set(&self, field: &str, value: Value) -> TraceResult<()>;

    /// Run a named operation with this receiver
    fn invoke(&self, method: &str, args: &[Value]) -> TraceResult<Value>;
}

/// Shared handle to one real tree.
#[derive(Clone)]
pub struct TreeRef(Rc<RefCell<dyn TreeObject>>);

impl TreeRef {
    /// Move a tree implementation behind a new handle
    pub fn new<T: TreeObject + 'static>(tree: T) -> Self {
        Self(Rc::new(RefCell::new(tree)))
    }

    /// Look up an operation; the borrow is released before returning
    pub fn method(&self, name: &str) -> Option<Method> {
        self.0.try_borrow().ok()?.method(name)
    }

    /// Names of the tree's operations
    pub fn method_names(&self) -> Vec<&'static str> {
        self.0
            .try_borrow()
            .map(|inner| inner.method_names())
            .unwrap_or_default()
    }

    /// Read a field without interception
    pub fn read(&self, name: &str) -> Result<Value, FieldError> {
        let inner = self
            .0
            .try_borrow()
            .map_err(|_| FieldError::Busy { name: name.into() })?;
        inner.field(name)
    }

    /// Assign a field without interception, unwrapping interceptors
    pub fn write(&self, name: &str, value: Value) -> Result<(), FieldError> {
        let mut inner = self
            .0
            .try_borrow_mut()
            .map_err(|_| FieldError::Busy { name: name.into() })?;
        inner.set_field(name, value.into_raw())
    }
}

impl TreeAccess for TreeRef {
    fn get(&self, field: &str) -> TraceResult<Value> {
        Ok(self.read(field)?)
    }

    fn set(&self, field: &str, value: Value) -> TraceResult<()> {
        Ok(self.write(field, value)?)
    }

    fn invoke(&self, method: &str, args: &[Value]) -> TraceResult<Value> {
        let body = self.method(method).ok_or_else(|| TraceError::UnknownMethod {
            name: method.to_string(),
        })?;
        body(self, args)
    }
}

impl fmt::Debug for TreeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<tree {:#x}>", Rc::as_ptr(&self.0).cast::<()>() as usize)
    }
}

/// Field bag usable as a node; accepts new fields on assignment.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field initialisation
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

impl Fields for Record {
    fn field(&self, name: &str) -> Result<Value, FieldError> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| FieldError::missing(name))
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldError> {
        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }
}

/// Tree container assembled at runtime from fields and operations.
#[derive(Default)]
pub struct DynamicTree {
    fields: Record,
    methods: IndexMap<&'static str, Method>,
}

impl DynamicTree {
    /// Create a tree with no fields and no operations
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields = self.fields.with(name, value);
        self
    }

    /// Add or replace an operation
    pub fn with_method(mut self, name: &'static str, body: Method) -> Self {
        self.methods.insert(name, body);
        self
    }
}

impl Fields for DynamicTree {
    fn field(&self, name: &str) -> Result<Value, FieldError> {
        self.fields.field(name)
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldError> {
        self.fields.set_field(name, value)
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.field_names()
    }
}

impl TreeObject for DynamicTree {
    fn method(&self, name: &str) -> Option<Method> {
        self.methods.get(name).copied()
    }

    fn method_names(&self) -> Vec<&'static str> {
        self.methods.keys().copied().collect()
    }
}
