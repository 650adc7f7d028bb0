//! Manifest cleaning before export

use crate::config::ExportConfig;
use crate::{Error, Result};
use morph_data::{DataView, Object, Value, try_into_object};
use tracing::trace;

/// Copy of `map` without the keys owned by tooling
pub fn clean_map(map: &Object, config: &ExportConfig) -> Object {
    map.iter()
        .filter(|(key, _)| !config.is_cleaned(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Clean up a manifest so it can be imported elsewhere.
///
/// Metadata is reduced to the name (or generated name), namespace, and the
/// labels and annotations left after cleaning. An empty spec and the status
/// are removed.
pub fn clean_object_for_export(object: &Value, config: &ExportConfig) -> Result<Value> {
    let mut data =
        try_into_object(object.clone()).map_err(|e| Error::InvalidObject(e.to_string()))?;

    let kind = data
        .string("kind")
        .filter(|kind| !kind.is_empty())
        .ok_or(Error::MissingKind)?;

    let source = data.object("metadata").cloned().unwrap_or_default();
    let mut metadata = Object::new();

    if let Some(name) = non_empty(&source, "name") {
        metadata.set("name", name);
    } else if let Some(generated) = non_empty(&source, "generateName") {
        metadata.set("generateName", generated);
    } else {
        return Err(Error::MissingName { kind });
    }

    if let Some(namespace) = non_empty(&source, "namespace") {
        metadata.set("namespace", namespace);
    }
    for key in ["annotations", "labels"] {
        let Some(values) = source.object(key) else {
            continue;
        };
        let cleaned = clean_map(values, config);
        if !cleaned.is_empty() {
            metadata.set(key, Value::Object(cleaned));
        }
    }

    let empty_spec = match data.get("spec") {
        Some(Value::Null) => true,
        Some(Value::Object(spec)) => spec.is_empty(),
        _ => false,
    };
    if empty_spec {
        data.shift_remove("spec");
    }

    data.set("metadata", Value::Object(metadata));
    if config.drop_status {
        data.shift_remove("status");
    }

    trace!("Cleaned {} object for export", kind);
    Ok(Value::Object(data))
}

fn non_empty(metadata: &Object, key: &str) -> Option<String> {
    metadata.string(key).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clean(object: Value) -> Result<Value> {
        clean_object_for_export(&object, &ExportConfig::default())
    }

    #[test]
    fn test_metadata_is_reduced() {
        let cleaned = clean(json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {
                "name": "settings",
                "namespace": "prod",
                "uid": "1234",
                "resourceVersion": "7",
                "labels": {"app": "web", "apply.acorn.io/hash": "x"},
                "annotations": {"kubectl.kubernetes.io/last-applied-configuration": "{}"}
            },
            "data": {"key": "value"},
            "status": {"phase": "Active"}
        }))
        .unwrap();

        assert_eq!(
            cleaned,
            json!({
                "apiVersion": "v1",
                "kind": "ConfigMap",
                "metadata": {
                    "name": "settings",
                    "namespace": "prod",
                    "labels": {"app": "web"}
                },
                "data": {"key": "value"}
            })
        );
    }

    #[test]
    fn test_generate_name_is_used_without_name() {
        let cleaned = clean(json!({
            "kind": "Job",
            "metadata": {"name": "", "generateName": "run-"}
        }))
        .unwrap();
        assert_eq!(cleaned["metadata"], json!({"generateName": "run-"}));
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let err = clean(json!({"kind": "Job", "metadata": {}})).unwrap_err();
        assert!(matches!(err, Error::MissingName { ref kind } if kind == "Job"));
    }

    #[test]
    fn test_missing_kind_is_an_error() {
        let err = clean(json!({"metadata": {"name": "x"}})).unwrap_err();
        assert!(matches!(err, Error::MissingKind));
        let err = clean(json!({"kind": "", "metadata": {"name": "x"}})).unwrap_err();
        assert!(matches!(err, Error::MissingKind));
    }

    #[test]
    fn test_non_object_is_invalid() {
        assert!(matches!(clean(json!([1])), Err(Error::InvalidObject(_))));
    }

    #[test]
    fn test_empty_spec_is_dropped() {
        let cleaned = clean(json!({"kind": "A", "metadata": {"name": "a"}, "spec": {}})).unwrap();
        assert!(cleaned.get("spec").is_none());
        let cleaned = clean(json!({"kind": "A", "metadata": {"name": "a"}, "spec": null})).unwrap();
        assert!(cleaned.get("spec").is_none());
        let cleaned =
            clean(json!({"kind": "A", "metadata": {"name": "a"}, "spec": {"x": 1}})).unwrap();
        assert_eq!(cleaned["spec"], json!({"x": 1}));
    }

    #[test]
    fn test_fully_cleaned_maps_are_dropped() {
        let cleaned = clean(json!({
            "kind": "A",
            "metadata": {"name": "a", "labels": {"apply.acorn.io/app": "x"}, "annotations": {}}
        }))
        .unwrap();
        assert_eq!(cleaned["metadata"], json!({"name": "a"}));
    }

    #[test]
    fn test_key_order_is_preserved() {
        let cleaned = clean(json!({
            "apiVersion": "v1",
            "kind": "A",
            "spec": {},
            "metadata": {"name": "a"},
            "data": {},
            "status": {},
            "extra": 1
        }))
        .unwrap();
        let keys: Vec<&str> = cleaned
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["apiVersion", "kind", "metadata", "data", "extra"]);
    }

    #[test]
    fn test_status_can_be_kept() {
        let config = ExportConfig::new().keep_status();
        let object = json!({"kind": "A", "metadata": {"name": "a"}, "status": {"ok": true}});
        let cleaned = clean_object_for_export(&object, &config).unwrap();
        assert_eq!(cleaned["status"], json!({"ok": true}));
    }
}
