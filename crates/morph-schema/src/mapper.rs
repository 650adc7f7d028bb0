//! Mapper contract and mapper chains

use crate::model::Schema;
use crate::{Error, Result};
use morph_data::Object;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a schema node.
pub type SchemaRef = Rc<RefCell<Schema>>;

/// Resolves schemas by type name, building them on first use
pub trait SchemaLookup {
    /// Resolve the schema for `type_name`.
    ///
    /// Returns `Ok(None)` for types that have no schema (scalars). A type
    /// that is being built further up the call stack resolves to its
    /// in-progress handle.
    fn resolve(&self, type_name: &str) -> Result<Option<SchemaRef>>;
}

/// A bidirectional transformation step
pub trait Mapper {
    /// Convert data from its internal to its external representation, in place.
    fn from_internal(&self, data: &mut Object);

    /// Convert data from its external to its internal representation, in place.
    fn to_internal(&self, data: &mut Object) -> Result<()>;

    /// Adjust the schema this mapper is installed on.
    fn modify_schema(&mut self, schema: &mut Schema, schemas: &dyn SchemaLookup) -> Result<()>;
}

/// An ordered chain of mappers
///
/// `from_internal` runs first to last. `to_internal` runs last to first so
/// it undoes the chain in stack order, and keeps going past failures.
/// `modify_schema` runs first to last and stops at the first failure.
#[derive(Default)]
pub struct Mappers(Vec<Box<dyn Mapper>>);

impl Mappers {
    /// Create an empty chain
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a mapper
    pub fn push(&mut self, mapper: impl Mapper + 'static) -> &mut Self {
        self.0.push(Box::new(mapper));
        self
    }

    /// Append a boxed mapper
    pub fn push_boxed(&mut self, mapper: Box<dyn Mapper>) -> &mut Self {
        self.0.push(mapper);
        self
    }

    /// Append the mappers of another chain
    pub fn extend(&mut self, other: Mappers) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Box<dyn Mapper>>> for Mappers {
    fn from(mappers: Vec<Box<dyn Mapper>>) -> Self {
        Self(mappers)
    }
}

impl FromIterator<Box<dyn Mapper>> for Mappers {
    fn from_iter<I: IntoIterator<Item = Box<dyn Mapper>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Debug for Mappers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mappers").field("len", &self.0.len()).finish()
    }
}

impl Mapper for Mappers {
    fn from_internal(&self, data: &mut Object) {
        for mapper in &self.0 {
            mapper.from_internal(data);
        }
    }

    fn to_internal(&self, data: &mut Object) -> Result<()> {
        let mut errors = Vec::new();
        for mapper in self.0.iter().rev() {
            if let Err(err) = mapper.to_internal(data) {
                errors.push(err);
            }
        }
        Error::join(errors)
    }

    fn modify_schema(&mut self, schema: &mut Schema, schemas: &dyn SchemaLookup) -> Result<()> {
        for mapper in &mut self.0 {
            mapper.modify_schema(schema, schemas)?;
        }
        Ok(())
    }
}
