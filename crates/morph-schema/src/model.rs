//! Schema model definitions

use crate::mapper::{Mapper, SchemaLookup};
use crate::Result;
use morph_data::{Object, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Type names that never resolve to a schema.
const SCALAR_TYPES: &[&str] = &[
    "string",
    "int",
    "float",
    "boolean",
    "bool",
    "date",
    "json",
    "enum",
    "password",
    "base64",
    "intOrString",
    "dnsLabel",
    "hostname",
];

/// Check whether a type name denotes a built-in scalar.
pub fn is_scalar_type(type_name: &str) -> bool {
    SCALAR_TYPES.contains(&type_name) || type_name.starts_with("reference[")
}

/// A named type: its fields and the mapper converting its instances
#[derive(Serialize)]
pub struct Schema {
    /// Type name
    pub id: String,

    /// Human readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fields keyed by name, in their external representation
    pub fields: BTreeMap<String, Field>,

    /// Shape of the same type in its internal representation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_schema: Option<Box<Schema>>,

    /// Mapper converting instances of this type
    #[serde(skip)]
    pub mapper: Option<Box<dyn Mapper>>,
}

impl Schema {
    /// Create an empty schema for a type name
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            fields: BTreeMap::new(),
            internal_schema: None,
            mapper: None,
        }
    }

    /// Add a field
    pub fn with_field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Install a mapper
    pub fn with_mapper(mut self, mapper: impl Mapper + 'static) -> Self {
        self.mapper = Some(Box::new(mapper));
        self
    }

    /// Copy of the descriptive parts of this schema, without mapper or
    /// internal schema.
    pub fn snapshot(&self) -> Schema {
        Schema {
            id: self.id.clone(),
            description: self.description.clone(),
            fields: self.fields.clone(),
            internal_schema: None,
            mapper: None,
        }
    }

    /// Fields that govern traversal: the internal schema's when present,
    /// otherwise this schema's own.
    pub fn traversal_fields(&self) -> &BTreeMap<String, Field> {
        match &self.internal_schema {
            Some(internal) => &internal.fields,
            None => &self.fields,
        }
    }

    /// Whether a mapper is installed
    pub fn has_mapper(&self) -> bool {
        self.mapper.is_some()
    }

    /// Convert internal data to its external form. No-op without a mapper.
    pub fn from_internal(&self, data: &mut Object) {
        if let Some(mapper) = &self.mapper {
            mapper.from_internal(data);
        }
    }

    /// Convert external data to its internal form. No-op without a mapper.
    pub fn to_internal(&self, data: &mut Object) -> Result<()> {
        match &self.mapper {
            Some(mapper) => mapper.to_internal(data),
            None => Ok(()),
        }
    }

    /// Re-enter the installed mapper's schema modification.
    ///
    /// The mapper is detached while it runs so it can rewrite this schema.
    /// A mapper installed by the modification itself replaces the one that
    /// ran.
    pub fn modify(&mut self, schemas: &dyn SchemaLookup) -> Result<()> {
        let Some(mut mapper) = self.mapper.take() else {
            return Ok(());
        };
        let result = mapper.modify_schema(self, schemas);
        if self.mapper.is_none() {
            self.mapper = Some(mapper);
        }
        result
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.id)
            .field("fields", &self.fields)
            .field("internal_schema", &self.internal_schema)
            .field("has_mapper", &self.mapper.is_some())
            .finish()
    }
}

/// A named, typed member of a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Declared type string (e.g. `string`, `Container`, `array[Container]`)
    #[serde(rename = "type")]
    pub field_type: String,

    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Value used when the field is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Whether the field must be present
    #[serde(default)]
    pub required: bool,

    /// Whether the field may be null
    #[serde(default)]
    pub nullable: bool,
}

impl Field {
    /// Create a field of the given type
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            description: None,
            default: None,
            required: false,
            nullable: false,
        }
    }

    /// Mark the field required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Classify the declared type
    pub fn kind(&self) -> FieldType {
        FieldType::parse(&self.field_type)
    }
}

/// Structural classification of a field type string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// `array[T]` or `[]T`
    Array(String),
    /// `map[T]`
    Map(String),
    /// A scalar or object type named directly
    Named(String),
}

impl FieldType {
    /// Parse a type string. Malformed wrappers are treated as plain names.
    pub fn parse(field_type: &str) -> Self {
        let field_type = field_type.trim();
        if let Some(inner) = unwrap_type(field_type, "array[") {
            return Self::Array(inner.to_string());
        }
        if let Some(inner) = field_type.strip_prefix("[]").filter(|s| !s.is_empty()) {
            return Self::Array(inner.to_string());
        }
        if let Some(inner) = unwrap_type(field_type, "map[") {
            return Self::Map(inner.to_string());
        }
        Self::Named(field_type.to_string())
    }

    /// The type name inside any wrapper
    pub fn type_name(&self) -> &str {
        match self {
            Self::Array(name) | Self::Map(name) | Self::Named(name) => name,
        }
    }

    /// Whether the named type is a built-in scalar
    pub fn is_scalar(&self) -> bool {
        is_scalar_type(self.type_name())
    }
}

fn unwrap_type<'a>(field_type: &'a str, prefix: &str) -> Option<&'a str> {
    field_type
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|inner| !inner.is_empty())
}
