//! Registry construction from schema documents

use crate::mappers::{DropField, Move, Required, SetDefault};
use crate::registry::Schemas;
use morph_schema::{Mapper, Mappers, MapperSpec, Result, SchemaDefinition, SchemaLoader};
use std::path::Path;
use tracing::info;

/// Instantiate the built-in mapper a spec describes
pub fn mapper_from_spec(spec: &MapperSpec) -> Box<dyn Mapper> {
    match spec {
        MapperSpec::Move { from, to } => Box::new(Move::new(from, to)),
        MapperSpec::Drop { field } => Box::new(DropField::new(field)),
        MapperSpec::SetDefault { field, value } => Box::new(SetDefault::new(field, value.clone())),
        MapperSpec::Required { fields } => Box::new(Required::new(fields.iter().cloned())),
    }
}

/// Define every loaded type, with its declared chain, in a new registry.
/// Types are built lazily on first resolve.
pub fn load_registry(definitions: Vec<SchemaDefinition>) -> Result<Schemas> {
    let schemas = Schemas::new();
    for definition in definitions {
        let type_name = definition.schema.id.clone();
        let chain: Mappers = definition.mappers.iter().map(mapper_from_spec).collect();
        schemas.define(definition.schema)?;
        if !chain.is_empty() {
            schemas.add_mappers(&type_name, chain)?;
        }
    }
    Ok(schemas)
}

impl Schemas {
    /// Load a registry from a YAML or JSON schema document
    pub fn from_file(path: &Path) -> Result<Schemas> {
        let definitions = SchemaLoader::new().load_from_file(path)?;
        info!("Loaded {} types from {:?}", definitions.len(), path);
        load_registry(definitions)
    }

    /// Load a registry from a YAML schema document
    pub fn from_yaml(yaml: &str) -> Result<Schemas> {
        load_registry(SchemaLoader::new().load_from_yaml(yaml)?)
    }
}
