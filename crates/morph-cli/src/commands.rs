//! Subcommand implementations

use crate::input::{read_documents, read_object};
use anyhow::Context;
use morph_export::ExportConfig;
use morph_mapping::Schemas;
use morph_schema::{Error, Schema, SchemaRef};
use std::cell::Ref;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

/// Load the schema document and build one type from it
fn build_type(schema_path: &Path, type_name: &str) -> anyhow::Result<SchemaRef> {
    let schemas = Schemas::from_file(schema_path)
        .with_context(|| format!("Failed to load schemas from {}", schema_path.display()))?;
    let schema = schemas
        .build(type_name)
        .with_context(|| format!("Failed to build type {type_name}"))?;
    Ok(schema)
}

fn borrow<'a>(schema: &'a SchemaRef, type_name: &str) -> anyhow::Result<Ref<'a, Schema>> {
    Ok(schema
        .try_borrow()
        .map_err(|_| Error::SchemaBusy(type_name.to_string()))?)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Convert internal data to its external representation and print it
pub fn from_internal(
    schema_path: &Path,
    type_name: &str,
    input: &Path,
) -> anyhow::Result<ExitCode> {
    let schema = build_type(schema_path, type_name)?;
    let schema = borrow(&schema, type_name)?;
    let mut data = read_object(input)?;

    schema.from_internal(&mut data);

    print_json(&data)?;
    Ok(ExitCode::SUCCESS)
}

/// Convert external data to its internal representation and print it.
/// Every conversion error is reported before exiting with failure.
pub fn to_internal(
    schema_path: &Path,
    type_name: &str,
    input: &Path,
) -> anyhow::Result<ExitCode> {
    let schema = build_type(schema_path, type_name)?;
    let schema = borrow(&schema, type_name)?;
    let mut data = read_object(input)?;

    if let Err(err) = schema.to_internal(&mut data) {
        let errors = err.errors();
        warn!("{} conversion errors in {}", errors.len(), input.display());
        for error in errors {
            eprintln!("error: {error}");
        }
        return Ok(ExitCode::FAILURE);
    }

    print_json(&data)?;
    Ok(ExitCode::SUCCESS)
}

/// Print the external and internal shape of a type
pub fn describe(schema_path: &Path, type_name: &str) -> anyhow::Result<ExitCode> {
    let schema = build_type(schema_path, type_name)?;
    let schema = borrow(&schema, type_name)?;
    print_json(&*schema)?;
    Ok(ExitCode::SUCCESS)
}

/// Clean manifests and emit them as one YAML stream
pub fn export(
    inputs: &[PathBuf],
    output: Option<&Path>,
    config: &ExportConfig,
) -> anyhow::Result<ExitCode> {
    let mut objects = Vec::new();
    for input in inputs {
        objects.extend(read_documents(input)?);
    }

    match output {
        Some(path) => morph_export::write_file(path, &objects, config)?,
        None => morph_export::print(&mut io::stdout().lock(), &objects, config)?,
    }

    info!("Exported {} objects from {} files", objects.len(), inputs.len());
    Ok(ExitCode::SUCCESS)
}
