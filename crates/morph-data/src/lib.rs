#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # morph-data
//!
//! Loosely-typed structured data view for morph mappers.
//!
//! Data flowing through the mapping engine is an untyped nested structure: a
//! string-keyed map whose values are scalars, nested maps, or sequences of
//! maps. This crate gives mappers uniform, coercing access into that structure
//! without ever failing on absent or oddly-shaped values.

/// Value coercion helpers.
pub mod convert;
/// The `DataView` accessor trait over [`Object`].
pub mod object;

/// Raw value type stored in an [`Object`].
pub use serde_json::Value;

pub use convert::{kind_of, to_bool, to_int, to_object, to_string, try_into_object};
pub use object::DataView;

use thiserror::Error;

/// A string-keyed map of loosely-typed values, mutated in place by mappers.
pub type Object = serde_json::Map<String, Value>;

/// Errors that can occur when coercing raw values into objects
#[derive(Error, Debug)]
pub enum Error {
    #[error("Expected an object, found {found}")]
    NotAnObject { found: &'static str },
}

impl Error {
    /// Build a not-an-object error for the given value.
    pub fn not_an_object(value: &Value) -> Self {
        Self::NotAnObject {
            found: kind_of(value),
        }
    }
}

/// Crate-local result type for data view operations.
pub type Result<T> = std::result::Result<T, Error>;
