//! # morph-mapping
//!
//! Recursive type mapper, schema registry, and built-in mappers.
//!
//! A [`Schemas`] registry builds each type on first use and installs a
//! [`TypeMapper`] on it. The type mapper walks the type's object, array and
//! map fields, handing each nested value to the sub-type's own mapper, and
//! runs the chain declared for the type itself.

pub mod loader;
pub mod mappers;
pub mod registry;
pub mod type_mapper;

pub use loader::{load_registry, mapper_from_spec};
pub use mappers::{DropField, Move, Required, SetDefault};
pub use registry::Schemas;
pub use type_mapper::{Bucket, TypeMapper};

pub use morph_schema::{Error, Result};
