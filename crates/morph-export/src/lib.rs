//! # morph-export
//!
//! Manifest cleaning and YAML stream export for converted resources.
//!
//! Exported manifests keep only what is needed to recreate the resource
//! elsewhere: identity metadata, user labels and annotations, and the `spec` body.
//! Status and tool-owned metadata are stripped.

pub mod clean;
pub mod config;
pub mod writer;

pub use clean::{clean_map, clean_object_for_export};
pub use config::ExportConfig;
pub use writer::{export, print, write_file};

use thiserror::Error;

/// Errors that can occur when exporting manifests
#[derive(Error, Debug)]
pub enum Error {
    #[error("kind is not set on input object")]
    MissingKind,

    #[error("either name or generateName must be set on {kind} object")]
    MissingName { kind: String },

    #[error("Invalid object: {0}")]
    InvalidObject(String),

    #[error("failed to encode {kind}: {source}")]
    Yaml {
        kind: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
