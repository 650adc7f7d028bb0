//! YAML stream rendering

use crate::clean::clean_object_for_export;
use crate::config::ExportConfig;
use crate::{Error, Result};
use morph_data::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Document separator between exported objects
const SEPARATOR: &str = "\n---\n";

/// Clean every object and render them as one multi-document YAML stream.
/// An empty slice renders as an empty string.
pub fn export(objects: &[Value], config: &ExportConfig) -> Result<String> {
    let mut buffer = String::new();

    for (index, object) in objects.iter().enumerate() {
        if index > 0 {
            buffer.push_str(SEPARATOR);
        }

        let cleaned = clean_object_for_export(object, config)?;
        let yaml = serde_yaml::to_string(&cleaned).map_err(|source| Error::Yaml {
            kind: cleaned
                .get("kind")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            source,
        })?;
        buffer.push_str(&yaml);
    }

    debug!("Exported {} objects", objects.len());
    Ok(buffer)
}

/// Write the export stream to `out`
pub fn print<W: Write>(out: &mut W, objects: &[Value], config: &ExportConfig) -> Result<()> {
    let data = export(objects, config)?;
    out.write_all(data.as_bytes())?;
    Ok(())
}

/// Write the export stream to a file, creating parent directories
pub fn write_file(path: &Path, objects: &[Value], config: &ExportConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(path)?;
    print(&mut file, objects, config)?;
    info!("Wrote {} objects to {:?}", objects.len(), path);
    Ok(())
}
