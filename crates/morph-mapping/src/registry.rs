//! Schema registry
//!
//! Types are defined up front and built lazily, the first time anything
//! resolves them. Building a type snapshots its definition as the internal
//! schema, installs a [`TypeMapper`] wrapping the chain registered for the
//! type, and runs the mapper's schema modification.
//!
//! A type is registered before its modification runs, so a type that
//! refers to itself, directly or through other types, resolves to the
//! handle already under construction instead of being built again.
//!
//! Type names with no definition resolve to nothing, so fields of those
//! types pass through conversion untouched. A build that fails puts the
//! definition and its chain back, and can be retried once the cause is
//! fixed.

use crate::type_mapper::TypeMapper;
use morph_schema::{
    Error, Mapper, Mappers, Result, Schema, SchemaLookup, SchemaRef, is_scalar_type,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info, trace};

/// Registry building and caching schemas by type name
#[derive(Default)]
pub struct Schemas {
    schemas: RefCell<HashMap<String, SchemaRef>>,
    definitions: RefCell<HashMap<String, Schema>>,
    mappers: RefCell<HashMap<String, Mappers>>,
    failed: RefCell<HashMap<String, SchemaRef>>,
}

impl Schemas {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a type to be built on first use. Redefining a type that has
    /// not been built yet replaces the earlier definition.
    pub fn define(&self, schema: Schema) -> Result<()> {
        if is_scalar_type(&schema.id) {
            return Err(Error::schema(&schema.id, "scalar types cannot be defined"));
        }
        self.ensure_unbuilt(&schema.id)?;
        trace!("Defining schema {}", schema.id);
        self.definitions.borrow_mut().insert(schema.id.clone(), schema);
        Ok(())
    }

    /// Append a mapper to the chain of a type that has not been built yet
    pub fn add_mapper(&self, type_name: &str, mapper: impl Mapper + 'static) -> Result<()> {
        self.ensure_unbuilt(type_name)?;
        self.mappers
            .borrow_mut()
            .entry(type_name.to_string())
            .or_default()
            .push(mapper);
        Ok(())
    }

    /// Append a whole chain to a type that has not been built yet
    pub fn add_mappers(&self, type_name: &str, mappers: Mappers) -> Result<()> {
        self.ensure_unbuilt(type_name)?;
        self.mappers
            .borrow_mut()
            .entry(type_name.to_string())
            .or_default()
            .extend(mappers);
        Ok(())
    }

    /// Build a type, or return it if already built
    pub fn build(&self, type_name: &str) -> Result<SchemaRef> {
        self.resolve(type_name)?
            .ok_or_else(|| Error::NotFound(type_name.to_string()))
    }

    /// Build every defined type
    pub fn build_all(&self) -> Result<()> {
        let mut pending: Vec<String> = self.definitions.borrow().keys().cloned().collect();
        pending.sort();
        for type_name in pending {
            self.build(&type_name)?;
        }
        Ok(())
    }

    /// Re-run schema modification on a built type
    pub fn rebuild(&self, type_name: &str) -> Result<()> {
        let schema = self
            .schema(type_name)
            .ok_or_else(|| Error::NotFound(type_name.to_string()))?;
        let mut schema = schema
            .try_borrow_mut()
            .map_err(|_| Error::SchemaBusy(type_name.to_string()))?;
        info!("Rebuilding schema {}", type_name);
        schema.modify(self)
    }

    /// A built schema
    pub fn schema(&self, type_name: &str) -> Option<SchemaRef> {
        self.schemas.borrow().get(type_name).cloned()
    }

    /// Whether a type is defined or built
    pub fn contains(&self, type_name: &str) -> bool {
        self.schemas.borrow().contains_key(type_name)
            || self.definitions.borrow().contains_key(type_name)
    }

    /// Names of all defined and built types, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .schemas
            .borrow()
            .keys()
            .chain(self.definitions.borrow().keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Number of built schemas
    pub fn len(&self) -> usize {
        self.schemas.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.borrow().is_empty()
    }

    fn ensure_unbuilt(&self, type_name: &str) -> Result<()> {
        if self.schemas.borrow().contains_key(type_name) {
            return Err(Error::schema(type_name, "schema is already built"));
        }
        Ok(())
    }

    fn build_definition(&self, mut schema: Schema) -> Result<SchemaRef> {
        let type_name = schema.id.clone();
        debug!("Building schema {}", type_name);

        let definition = Schema {
            internal_schema: schema
                .internal_schema
                .as_ref()
                .map(|internal| Box::new(internal.snapshot())),
            ..schema.snapshot()
        };
        if schema.internal_schema.is_none() {
            schema.internal_schema = Some(Box::new(schema.snapshot()));
        }

        let mut chain = Mappers::new();
        if let Some(existing) = schema.mapper.take() {
            chain.push_boxed(existing);
        }
        let registered = self.mappers.borrow_mut().remove(&type_name);
        if let Some(registered) = registered {
            chain.extend(registered);
        }
        let mut type_mapper = TypeMapper::new(chain);

        // Types built earlier may still point at the handle of a failed attempt
        let failed = self.failed.borrow_mut().remove(&type_name);
        let handle = match failed {
            Some(handle) if handle.try_borrow_mut().is_ok() => {
                *handle.borrow_mut() = schema;
                handle
            }
            _ => Rc::new(RefCell::new(schema)),
        };
        self.schemas
            .borrow_mut()
            .insert(type_name.clone(), Rc::clone(&handle));

        let result = type_mapper.modify_schema(&mut handle.borrow_mut(), self);
        if let Err(err) = result {
            debug!("Building schema {} failed: {}", type_name, err);
            self.schemas.borrow_mut().remove(&type_name);
            self.definitions
                .borrow_mut()
                .insert(type_name.clone(), definition);
            let chain = type_mapper.into_mappers();
            if !chain.is_empty() {
                self.mappers.borrow_mut().insert(type_name.clone(), chain);
            }
            self.failed.borrow_mut().insert(type_name, handle);
            return Err(err);
        }

        {
            let mut schema = handle.borrow_mut();
            if !schema.has_mapper() {
                schema.mapper = Some(Box::new(type_mapper));
            }
        }
        Ok(handle)
    }
}

impl SchemaLookup for Schemas {
    fn resolve(&self, type_name: &str) -> Result<Option<SchemaRef>> {
        if let Some(schema) = self.schema(type_name) {
            return Ok(Some(schema));
        }
        if is_scalar_type(type_name) {
            return Ok(None);
        }

        let definition = self.definitions.borrow_mut().remove(type_name);
        match definition {
            Some(schema) => self.build_definition(schema).map(Some),
            None => {
                trace!("No schema for {}, treating as opaque", type_name);
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for Schemas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut built: Vec<String> = self.schemas.borrow().keys().cloned().collect();
        built.sort();
        let mut defined: Vec<String> = self.definitions.borrow().keys().cloned().collect();
        defined.sort();
        f.debug_struct("Schemas")
            .field("built", &built)
            .field("defined", &defined)
            .finish()
    }
}
