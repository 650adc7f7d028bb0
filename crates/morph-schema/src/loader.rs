//! Schema document loader
//!
//! Reads type definitions, together with the mapper chains declared for
//! them, from YAML or JSON documents:
//!
//! ```yaml
//! types:
//!   - id: Pod
//!     fields:
//!       name: string
//!       containers:
//!         type: "array[Container]"
//!     mappers:
//!       - kind: move
//!         from: containerList
//!         to: containers
//! ```

use crate::model::{Field, FieldType, Schema};
use crate::{Error, Result};
use morph_data::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, trace};

/// Declarative description of a built-in mapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapperSpec {
    /// Expose internal field `from` as external field `to`
    Move { from: String, to: String },
    /// Hide an internal field from the external representation
    Drop { field: String },
    /// Fill a field on the way in when it is absent
    SetDefault { field: String, value: Value },
    /// Require fields on the way in
    Required { fields: Vec<String> },
}

/// A schema as written in a document, plus its declared mapper chain
#[derive(Debug)]
pub struct SchemaDefinition {
    pub schema: Schema,
    pub mappers: Vec<MapperSpec>,
}

/// Serializable document format
#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    types: Vec<TypeFile>,
}

#[derive(Debug, Deserialize)]
struct TypeFile {
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, FieldFile>,
    #[serde(default)]
    mappers: Vec<MapperSpec>,
}

/// A field written either as a bare type string or in full
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldFile {
    Type(String),
    Full(Field),
}

impl From<FieldFile> for Field {
    fn from(file: FieldFile) -> Self {
        match file {
            FieldFile::Type(field_type) => Field::new(field_type),
            FieldFile::Full(field) => field,
        }
    }
}

/// Loads schema definitions from documents
#[derive(Debug, Default)]
pub struct SchemaLoader;

impl SchemaLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self
    }

    /// Load definitions from a file, choosing YAML or JSON by extension
    pub fn load_from_file(&self, path: &Path) -> Result<Vec<SchemaDefinition>> {
        trace!("Loading schema document from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;

        if path
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false)
        {
            self.load_from_yaml(&content)
        } else {
            self.load_from_json(&content)
        }
    }

    /// Load definitions from a JSON string
    pub fn load_from_json(&self, json: &str) -> Result<Vec<SchemaDefinition>> {
        let document: SchemaDocument = serde_json::from_str(json)
            .map_err(|e| Error::InvalidFormat(format!("JSON parse error: {}", e)))?;

        self.convert_document(document)
    }

    /// Load definitions from a YAML string
    pub fn load_from_yaml(&self, yaml: &str) -> Result<Vec<SchemaDefinition>> {
        let document: SchemaDocument = serde_yaml::from_str(yaml)
            .map_err(|e| Error::InvalidFormat(format!("YAML parse error: {}", e)))?;

        self.convert_document(document)
    }

    fn convert_document(&self, document: SchemaDocument) -> Result<Vec<SchemaDefinition>> {
        let mut seen = HashSet::new();
        let mut definitions = Vec::with_capacity(document.types.len());

        for type_file in document.types {
            if type_file.id.trim().is_empty() {
                return Err(Error::InvalidFormat("type with empty id".to_string()));
            }
            if !seen.insert(type_file.id.clone()) {
                return Err(Error::InvalidFormat(format!(
                    "type {} is defined more than once",
                    type_file.id
                )));
            }

            let definition = self.convert_type(type_file)?;
            debug!(
                "Loaded type {} with {} fields and {} mappers",
                definition.schema.id,
                definition.schema.fields.len(),
                definition.mappers.len()
            );
            definitions.push(definition);
        }

        Ok(definitions)
    }

    fn convert_type(&self, type_file: TypeFile) -> Result<SchemaDefinition> {
        let mut schema = Schema::new(type_file.id);
        schema.description = type_file.description;

        for (name, field_file) in type_file.fields {
            let field: Field = field_file.into();
            if FieldType::parse(&field.field_type).type_name().is_empty() {
                return Err(Error::InvalidFieldType {
                    field: name,
                    field_type: field.field_type,
                });
            }
            schema.fields.insert(name, field);
        }

        Ok(SchemaDefinition {
            schema,
            mappers: type_file.mappers,
        })
    }
}
