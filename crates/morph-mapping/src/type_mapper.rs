//! Structural mapper that recurses into a type's nested fields
//!
//! During `modify_schema` every field of the type is sorted into one of
//! three buckets, by the shape of its declared type, together with the
//! sub-schema that converts its values:
//!
//! - object: `T`, a single nested object
//! - array: `array[T]`, a sequence of objects
//! - map: `map[T]`, a map of objects
//!
//! Fields whose type has no schema, or whose schema has no mapper, land in
//! no bucket and pass through untouched. Data conversion then only follows
//! the buckets; it never re-reads the schema.

use morph_data::{DataView, Object};
use morph_schema::{Error, FieldType, Mapper, Mappers, Result, Schema, SchemaLookup, SchemaRef};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Traversal strategy chosen for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Object,
    Array,
    Map,
}

/// Mapper bound to one schema node
#[derive(Debug, Default)]
pub struct TypeMapper {
    /// Chain declared for the type itself
    mappers: Mappers,

    /// Type name recorded at the last schema modification
    type_name: String,

    sub_schemas: BTreeMap<String, SchemaRef>,
    sub_array_schemas: BTreeMap<String, SchemaRef>,
    sub_map_schemas: BTreeMap<String, SchemaRef>,
}

impl TypeMapper {
    /// Create a type mapper running `mappers` for the type itself
    pub fn new(mappers: Mappers) -> Self {
        Self {
            mappers,
            ..Self::default()
        }
    }

    /// Type name recorded by the last `modify_schema`
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The bucket a field was classified into, if any
    pub fn bucket(&self, field: &str) -> Option<Bucket> {
        if self.sub_schemas.contains_key(field) {
            Some(Bucket::Object)
        } else if self.sub_array_schemas.contains_key(field) {
            Some(Bucket::Array)
        } else if self.sub_map_schemas.contains_key(field) {
            Some(Bucket::Map)
        } else {
            None
        }
    }

    /// Names of the fields in a bucket
    pub fn fields(&self, bucket: Bucket) -> Vec<&str> {
        let schemas = match bucket {
            Bucket::Object => &self.sub_schemas,
            Bucket::Array => &self.sub_array_schemas,
            Bucket::Map => &self.sub_map_schemas,
        };
        schemas.keys().map(String::as_str).collect()
    }

    /// Give back the type's own chain
    pub fn into_mappers(self) -> Mappers {
        self.mappers
    }

    fn busy(&self, field: &str) -> Error {
        Error::SchemaBusy(format!("{}.{}", self.type_name, field))
    }

    fn clear(&mut self) {
        self.sub_schemas.clear();
        self.sub_array_schemas.clear();
        self.sub_map_schemas.clear();
    }

    fn classify(&mut self, schema: &Schema, schemas: &dyn SchemaLookup) -> Result<()> {
        for (name, field) in schema.traversal_fields() {
            let field_type = field.kind();
            let Some(sub_schema) = schemas.resolve(field_type.type_name())? else {
                trace!("{}.{}: scalar {}", schema.id, name, field.field_type);
                continue;
            };
            if !has_mapper(&sub_schema) {
                trace!("{}.{}: {} has no mapper", schema.id, name, field.field_type);
                continue;
            }

            let target = match field_type {
                FieldType::Array(_) => &mut self.sub_array_schemas,
                FieldType::Map(_) => &mut self.sub_map_schemas,
                FieldType::Named(_) => &mut self.sub_schemas,
            };
            trace!("{}.{}: traversing as {}", schema.id, name, field.field_type);
            target.insert(name.clone(), sub_schema);
        }
        Ok(())
    }
}

/// A schema that is borrowed mutably is being built further up the stack and
/// will get its mapper once that finishes.
fn has_mapper(schema: &SchemaRef) -> bool {
    match schema.try_borrow() {
        Ok(schema) => schema.has_mapper(),
        Err(_) => true,
    }
}

impl Mapper for TypeMapper {
    fn from_internal(&self, data: &mut Object) {
        for (field, schema) in &self.sub_schemas {
            let Ok(schema) = schema.try_borrow() else {
                warn!("{}.{}: schema in use, skipping", self.type_name, field);
                continue;
            };
            if let Some(value) = data.object_mut(field) {
                schema.from_internal(value);
            }
        }

        for (field, schema) in &self.sub_map_schemas {
            let Ok(schema) = schema.try_borrow() else {
                warn!("{}.{}: schema in use, skipping", self.type_name, field);
                continue;
            };
            for value in data.map_values_mut(field) {
                schema.from_internal(value);
            }
        }

        for (field, schema) in &self.sub_array_schemas {
            let Ok(schema) = schema.try_borrow() else {
                warn!("{}.{}: schema in use, skipping", self.type_name, field);
                continue;
            };
            for item in data.sequence_mut(field) {
                schema.from_internal(item);
            }
        }

        self.mappers.from_internal(data);
    }

    fn to_internal(&self, data: &mut Object) -> Result<()> {
        let mut errors = Vec::new();
        errors.extend(self.mappers.to_internal(data).err());

        for (field, schema) in &self.sub_array_schemas {
            let Ok(sub_schema) = schema.try_borrow() else {
                errors.push(self.busy(field));
                continue;
            };
            for item in data.sequence_mut(field) {
                errors.extend(sub_schema.to_internal(item).err());
            }
        }

        for (field, schema) in &self.sub_map_schemas {
            let Ok(sub_schema) = schema.try_borrow() else {
                errors.push(self.busy(field));
                continue;
            };
            for value in data.map_values_mut(field) {
                errors.extend(sub_schema.to_internal(value).err());
            }
        }

        for (field, schema) in &self.sub_schemas {
            let Ok(sub_schema) = schema.try_borrow() else {
                errors.push(self.busy(field));
                continue;
            };
            if let Some(value) = data.object_mut(field) {
                errors.extend(sub_schema.to_internal(value).err());
            }
        }

        Error::join(errors)
    }

    fn modify_schema(&mut self, schema: &mut Schema, schemas: &dyn SchemaLookup) -> Result<()> {
        self.clear();
        self.type_name = schema.id.clone();

        if let Err(err) = self.classify(schema, schemas) {
            self.clear();
            return Err(err);
        }
        debug!(
            "Classified {}: {} object, {} array, {} map fields",
            self.type_name,
            self.sub_schemas.len(),
            self.sub_array_schemas.len(),
            self.sub_map_schemas.len()
        );

        self.mappers.modify_schema(schema, schemas)
    }
}
