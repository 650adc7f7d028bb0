//! Reading data documents from disk

use anyhow::{Context, bail};
use morph_data::{Object, Value, try_into_object};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Read every document in a JSON or YAML file.
///
/// A `.json` file holds one value; a top level array is split into its
/// elements. Anything else is read as a YAML stream, skipping empty documents.
pub fn read_documents(path: &Path) -> anyhow::Result<Vec<Value>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        return Ok(match value {
            Value::Array(items) => items,
            value => vec![value],
        });
    }

    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&content) {
        let value = Value::deserialize(document)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// Read a file holding exactly one object
pub fn read_object(path: &Path) -> anyhow::Result<Object> {
    let mut documents = read_documents(path)?;
    if documents.len() != 1 {
        bail!(
            "Expected one document in {}, found {}",
            path.display(),
            documents.len()
        );
    }
    let object = try_into_object(documents.remove(0))
        .with_context(|| format!("Invalid document in {}", path.display()))?;
    Ok(object)
}
