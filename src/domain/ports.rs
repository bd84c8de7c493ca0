//! Ports to the external collaborators: the Model Store that persists the
//! graph, and the source that hands over a resolved program.

use crate::domain::ast::Program;
use anyhow::Result;

/// Opaque handle to a store object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u32);

/// Attribute value written through the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Bool(bool),
    /// Enumeration literal: enumeration name plus literal.
    EnumLit(&'static str, String),
}

/// Outcome of a link insertion. A duplicate is a normal result, never an
/// error: overlapping traversals legitimately attempt the same edge twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    Duplicate,
}

/// Typed object/relation storage with a fixed schema (implemented by
/// Infrastructure). Errors from these methods are structural violations and
/// abort the run; they are reported once at the top level.
pub trait ModelStore {
    /// Create an object of the given class. With `name: None` the store
    /// assigns a fresh name.
    fn create_object(&mut self, name: Option<&str>, class_name: &str) -> Result<ObjectHandle>;

    fn object_by_name(&self, name: &str) -> Option<ObjectHandle>;

    fn set_attribute(
        &mut self,
        object: ObjectHandle,
        attribute: &str,
        value: AttrValue,
    ) -> Result<()>;

    /// Insert-if-absent over (association, source, target).
    fn create_link(&mut self, association: &str, ends: [ObjectHandle; 2]) -> Result<LinkOutcome>;

    /// Live instance count for a class; statement naming counts off this.
    fn count_instances(&self, class_name: &str) -> usize;
}

/// Source of resolved programs (implemented by Infrastructure).
pub trait ProgramSource {
    fn load(&self) -> Result<Program>;
}
