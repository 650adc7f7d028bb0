//! # morph-schema
//!
//! Schema model, mapper contract, and schema document loader for morph.
//!
//! A [`Schema`] names a type, lists its fields, and carries the [`Mapper`]
//! that converts instances of that type between their internal and external
//! representations. Mappers compose into [`Mappers`] chains.

pub mod loader;
pub mod mapper;
pub mod model;

pub use loader::{MapperSpec, SchemaDefinition, SchemaLoader};
pub use mapper::{Mapper, Mappers, SchemaLookup, SchemaRef};
pub use model::{Field, FieldType, Schema, is_scalar_type};

use thiserror::Error;

/// Errors raised while building schemas or converting data
///
/// `Conversion` errors are collected during `to_internal` and reported
/// together as [`Error::Multiple`]. Every other variant is a
/// schema-construction error and is propagated as soon as it occurs.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema not found: {0}")]
    NotFound(String),

    #[error("Invalid type '{field_type}' on field '{field}'")]
    InvalidFieldType { field: String, field_type: String },

    #[error("Schema error on {type_name}: {message}")]
    Schema { type_name: String, message: String },

    #[error("Schema {0} is in use and cannot be modified")]
    SchemaBusy(String),

    #[error("Conversion error on field '{field}': {message}")]
    Conversion { field: String, message: String },

    #[error("{}", join_messages(.0))]
    Multiple(Vec<Error>),

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a schema-construction error for a type.
    pub fn schema(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Build a conversion error for a field.
    pub fn conversion(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Join errors into a single result.
    ///
    /// Nested aggregates are flattened. No errors is success; a single error
    /// is returned as-is; anything more becomes [`Error::Multiple`].
    pub fn join(errors: impl IntoIterator<Item = Error>) -> Result<()> {
        let mut flat = Vec::new();
        for error in errors {
            error.flatten_into(&mut flat);
        }

        if flat.len() > 1 {
            return Err(Self::Multiple(flat));
        }
        match flat.pop() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn flatten_into(self, out: &mut Vec<Error>) {
        match self {
            Self::Multiple(errors) => {
                for error in errors {
                    error.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }

    /// The individual errors behind this one. A plain error is its own
    /// single constituent.
    pub fn errors(&self) -> Vec<&Error> {
        match self {
            Self::Multiple(errors) => errors.iter().flat_map(|error| error.errors()).collect(),
            other => vec![other],
        }
    }

    /// Number of constituent errors.
    pub fn error_count(&self) -> usize {
        self.errors().len()
    }
}

fn join_messages(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Crate-local result type for schema and mapper operations.
pub type Result<T> = std::result::Result<T, Error>;
