//! Integration tests: recursive traversal of the type mapper
//!
//! Uses a fake lookup so every sub-schema and every failure is controlled
//! by the test.

use morph_data::{DataView, Object, to_object};
use morph_mapping::{Bucket, TypeMapper};
use morph_schema::{Error, Field, Mapper, Mappers, Result, Schema, SchemaLookup, SchemaRef};
use serde_json::json;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

/// Records every call it receives and optionally fails conversions.
struct Recorder {
    name: String,
    log: Log,
    fail: bool,
}

impl Recorder {
    fn new(name: &str, log: &Log) -> Self {
        Self {
            name: name.to_string(),
            log: Rc::clone(log),
            fail: false,
        }
    }

    fn failing(name: &str, log: &Log) -> Self {
        Self {
            fail: true,
            ..Self::new(name, log)
        }
    }
}

impl Mapper for Recorder {
    fn from_internal(&self, data: &mut Object) {
        self.log.borrow_mut().push(format!("{}:from", self.name));
        data.set("seen_by", self.name.as_str());
    }

    fn to_internal(&self, _data: &mut Object) -> Result<()> {
        self.log.borrow_mut().push(format!("{}:to", self.name));
        if self.fail {
            return Err(Error::conversion(self.name.as_str(), "rejected"));
        }
        Ok(())
    }

    fn modify_schema(&mut self, _schema: &mut Schema, _schemas: &dyn SchemaLookup) -> Result<()> {
        self.log.borrow_mut().push(format!("{}:modify", self.name));
        Ok(())
    }
}

#[derive(Default)]
struct FakeSchemas {
    schemas: HashMap<String, SchemaRef>,
    failing: HashSet<String>,
    lookups: RefCell<Vec<String>>,
}

impl FakeSchemas {
    fn with(mut self, schema: Schema) -> Self {
        self.schemas
            .insert(schema.id.clone(), Rc::new(RefCell::new(schema)));
        self
    }

    fn failing_on(mut self, type_name: &str) -> Self {
        self.failing.insert(type_name.to_string());
        self
    }
}

impl SchemaLookup for FakeSchemas {
    fn resolve(&self, type_name: &str) -> Result<Option<SchemaRef>> {
        self.lookups.borrow_mut().push(type_name.to_string());
        if self.failing.contains(type_name) {
            return Err(Error::NotFound(type_name.to_string()));
        }
        Ok(self.schemas.get(type_name).cloned())
    }
}

fn chain(mapper: impl Mapper + 'static) -> Mappers {
    let mut mappers = Mappers::new();
    mappers.push(mapper);
    mappers
}

#[test]
fn test_all_scalar_schema_only_runs_chain() {
    let log: Log = Rc::default();
    let mut schema = Schema::new("Config")
        .with_field("name", Field::new("string"))
        .with_field("count", Field::new("int"));
    let lookup = FakeSchemas::default();
    let mut mapper = TypeMapper::new(chain(Recorder::new("config", &log)));

    mapper.modify_schema(&mut schema, &lookup).unwrap();
    let mut data = to_object(json!({"name": "x", "count": 2}));
    mapper.from_internal(&mut data);
    mapper.to_internal(&mut data).unwrap();

    assert_eq!(mapper.type_name(), "Config");
    assert!(mapper.fields(Bucket::Object).is_empty());
    assert_eq!(
        *log.borrow(),
        vec!["config:modify", "config:from", "config:to"]
    );
}

#[test]
fn test_child_from_internal_runs_before_parent_chain() {
    let log: Log = Rc::default();
    let lookup = FakeSchemas::default()
        .with(Schema::new("X").with_mapper(Recorder::new("child", &log)));
    let mut schema = Schema::new("Parent").with_field("a", Field::new("X"));
    let mut mapper = TypeMapper::new(chain(Recorder::new("parent", &log)));
    mapper.modify_schema(&mut schema, &lookup).unwrap();
    log.borrow_mut().clear();

    let mut data = to_object(json!({"a": {"value": 1}}));
    mapper.from_internal(&mut data);

    assert_eq!(mapper.bucket("a"), Some(Bucket::Object));
    assert_eq!(*log.borrow(), vec!["child:from", "parent:from"]);
    assert_eq!(data["a"]["seen_by"], json!("child"));
    assert_eq!(data["seen_by"], json!("parent"));
}

#[test]
fn test_parent_to_internal_runs_before_children() {
    let log: Log = Rc::default();
    let lookup = FakeSchemas::default()
        .with(Schema::new("X").with_mapper(Recorder::new("object", &log)))
        .with(Schema::new("Y").with_mapper(Recorder::new("item", &log)))
        .with(Schema::new("Z").with_mapper(Recorder::new("entry", &log)));
    let mut schema = Schema::new("Parent")
        .with_field("a", Field::new("X"))
        .with_field("items", Field::new("array[Y]"))
        .with_field("entries", Field::new("map[Z]"));
    let mut mapper = TypeMapper::new(chain(Recorder::new("parent", &log)));
    mapper.modify_schema(&mut schema, &lookup).unwrap();
    log.borrow_mut().clear();

    let mut data = to_object(json!({
        "a": {},
        "items": [{}],
        "entries": {"k": {}}
    }));
    mapper.to_internal(&mut data).unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["parent:to", "item:to", "entry:to", "object:to"]
    );
}

#[test]
fn test_array_errors_are_all_collected() {
    let log: Log = Rc::default();
    let lookup = FakeSchemas::default()
        .with(Schema::new("X").with_mapper(Recorder::failing("x", &log)));
    let mut schema = Schema::new("List").with_field("items", Field::new("array[X]"));
    let mut mapper = TypeMapper::new(Mappers::new());
    mapper.modify_schema(&mut schema, &lookup).unwrap();

    let mut data = to_object(json!({"items": [{}, {}, {}]}));
    let err = mapper.to_internal(&mut data).unwrap_err();

    assert_eq!(err.error_count(), 3);
    assert!(matches!(err, Error::Multiple(ref errors) if errors.len() == 3));
}

#[test]
fn test_chain_and_field_errors_are_joined() {
    let log: Log = Rc::default();
    let lookup = FakeSchemas::default()
        .with(Schema::new("X").with_mapper(Recorder::failing("x", &log)));
    let mut schema = Schema::new("Parent")
        .with_field("a", Field::new("X"))
        .with_field("b", Field::new("map[X]"));
    let mut mapper = TypeMapper::new(chain(Recorder::failing("parent", &log)));
    mapper.modify_schema(&mut schema, &lookup).unwrap();

    let mut data = to_object(json!({"a": {}, "b": {"one": {}, "two": {}}}));
    let err = mapper.to_internal(&mut data).unwrap_err();

    assert_eq!(err.error_count(), 4);
}

#[test]
fn test_successful_to_internal_is_ok() {
    let log: Log = Rc::default();
    let lookup = FakeSchemas::default()
        .with(Schema::new("X").with_mapper(Recorder::new("x", &log)));
    let mut schema = Schema::new("List").with_field("items", Field::new("array[X]"));
    let mut mapper = TypeMapper::new(chain(Recorder::new("list", &log)));
    mapper.modify_schema(&mut schema, &lookup).unwrap();

    let mut data = to_object(json!({"items": [{}, {}]}));
    assert!(mapper.to_internal(&mut data).is_ok());
}

#[test]
fn test_failed_lookup_aborts_classification() {
    let log: Log = Rc::default();
    let lookup = FakeSchemas::default()
        .with(Schema::new("A").with_mapper(Recorder::new("a", &log)))
        .with(Schema::new("C").with_mapper(Recorder::new("c", &log)))
        .failing_on("B");
    let mut schema = Schema::new("Parent")
        .with_field("a", Field::new("A"))
        .with_field("b", Field::new("B"))
        .with_field("c", Field::new("C"));
    let mut mapper = TypeMapper::new(chain(Recorder::new("parent", &log)));

    let err = mapper.modify_schema(&mut schema, &lookup).unwrap_err();

    assert!(matches!(err, Error::NotFound(ref name) if name == "B"));
    assert_eq!(*lookup.lookups.borrow(), vec!["A", "B"]);
    assert_eq!(mapper.bucket("a"), None);
    assert!(log.borrow().is_empty());

    let mut data = to_object(json!({"a": {}, "c": {}}));
    mapper.from_internal(&mut data);
    assert!(data["a"].get("seen_by").is_none());
}

#[test]
fn test_rebuild_overwrites_stale_buckets() {
    let log: Log = Rc::default();
    let lookup = FakeSchemas::default()
        .with(Schema::new("A").with_mapper(Recorder::new("a", &log)))
        .with(Schema::new("C").with_mapper(Recorder::new("c", &log)));
    let mut schema = Schema::new("Parent")
        .with_field("a", Field::new("A"))
        .with_field("c", Field::new("array[C]"));
    let mut mapper = TypeMapper::new(Mappers::new());
    mapper.modify_schema(&mut schema, &lookup).unwrap();
    assert_eq!(mapper.bucket("c"), Some(Bucket::Array));

    schema.fields.remove("c");
    schema.fields.insert("c".to_string(), Field::new("map[C]"));
    schema.fields.remove("a");
    mapper.modify_schema(&mut schema, &lookup).unwrap();

    assert_eq!(mapper.bucket("a"), None);
    assert_eq!(mapper.bucket("c"), Some(Bucket::Map));
    assert!(mapper.fields(Bucket::Array).is_empty());
}

#[test]
fn test_mapperless_sub_schema_is_not_traversed() {
    let lookup = FakeSchemas::default().with(Schema::new("Opaque"));
    let mut schema = Schema::new("Parent")
        .with_field("blob", Field::new("Opaque"))
        .with_field("blobs", Field::new("array[Opaque]"));
    let mut mapper = TypeMapper::new(Mappers::new());

    mapper.modify_schema(&mut schema, &lookup).unwrap();

    assert_eq!(mapper.bucket("blob"), None);
    assert_eq!(mapper.bucket("blobs"), None);
}

#[test]
fn test_internal_schema_governs_classification() {
    let log: Log = Rc::default();
    let lookup = FakeSchemas::default()
        .with(Schema::new("X").with_mapper(Recorder::new("x", &log)));
    let mut schema = Schema::new("Parent").with_field("external", Field::new("X"));
    schema.internal_schema = Some(Box::new(
        Schema::new("Parent").with_field("internal", Field::new("X")),
    ));
    let mut mapper = TypeMapper::new(Mappers::new());

    mapper.modify_schema(&mut schema, &lookup).unwrap();

    assert_eq!(mapper.bucket("internal"), Some(Bucket::Object));
    assert_eq!(mapper.bucket("external"), None);
}

#[test]
fn test_map_and_array_values_are_each_visited() {
    let log: Log = Rc::default();
    let lookup = FakeSchemas::default()
        .with(Schema::new("X").with_mapper(Recorder::new("x", &log)));
    let mut schema = Schema::new("Parent")
        .with_field("byName", Field::new("map[X]"))
        .with_field("list", Field::new("array[X]"));
    let mut mapper = TypeMapper::new(Mappers::new());
    mapper.modify_schema(&mut schema, &lookup).unwrap();

    let mut data = to_object(json!({
        "byName": {"one": {}, "two": {}, "skip": 3},
        "list": [{}, "skip", {}]
    }));
    mapper.from_internal(&mut data);

    assert_eq!(log.borrow().len(), 4);
    assert_eq!(data["byName"]["two"]["seen_by"], json!("x"));
    assert_eq!(data["byName"]["skip"], json!(3));
    assert_eq!(data["list"][1], json!("skip"));
    assert_eq!(data["list"][2]["seen_by"], json!("x"));
}

#[test]
fn test_absent_and_malformed_fields_are_skipped() {
    let log: Log = Rc::default();
    let lookup = FakeSchemas::default()
        .with(Schema::new("X").with_mapper(Recorder::failing("x", &log)));
    let mut schema = Schema::new("Parent")
        .with_field("a", Field::new("X"))
        .with_field("items", Field::new("array[X]"))
        .with_field("byName", Field::new("map[X]"));
    let mut mapper = TypeMapper::new(Mappers::new());
    mapper.modify_schema(&mut schema, &lookup).unwrap();

    let mut data = to_object(json!({"a": "not an object", "items": {"k": {}}}));
    let before = data.clone();

    mapper.from_internal(&mut data);
    assert!(mapper.to_internal(&mut data).is_ok());
    assert_eq!(data, before);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_unclassified_fields_pass_through() {
    let log: Log = Rc::default();
    let lookup = FakeSchemas::default()
        .with(Schema::new("X").with_mapper(Recorder::new("x", &log)));
    let mut schema = Schema::new("Parent").with_field("a", Field::new("X"));
    let mut mapper = TypeMapper::new(Mappers::new());
    mapper.modify_schema(&mut schema, &lookup).unwrap();

    let extra = json!({"nested": {"deep": [1, {"x": null}]}, "n": 1.5});
    let mut data = to_object(json!({"a": {}, "extra": extra.clone()}));
    mapper.from_internal(&mut data);
    mapper.to_internal(&mut data).unwrap();

    assert_eq!(data["extra"], extra);
}

#[test]
fn test_busy_sub_schema_is_handled_alike_in_every_bucket() {
    let log: Log = Rc::default();
    let lookup = FakeSchemas::default()
        .with(Schema::new("X").with_mapper(Recorder::new("x", &log)));
    let mut schema = Schema::new("Parent")
        .with_field("a", Field::new("X"))
        .with_field("items", Field::new("array[X]"))
        .with_field("byName", Field::new("map[X]"));
    let mut mapper = TypeMapper::new(chain(Recorder::new("parent", &log)));
    mapper.modify_schema(&mut schema, &lookup).unwrap();
    log.borrow_mut().clear();

    let x = Rc::clone(&lookup.schemas["X"]);
    let _guard = x.borrow_mut();
    let mut data = to_object(json!({"a": {}, "items": [{}], "byName": {"k": {}}}));

    mapper.from_internal(&mut data);
    assert_eq!(*log.borrow(), vec!["parent:from"]);
    assert!(data["a"].get("seen_by").is_none());

    let err = mapper.to_internal(&mut data).unwrap_err();
    assert_eq!(err.error_count(), 3);
    assert!(
        err.errors()
            .iter()
            .all(|error| matches!(error, Error::SchemaBusy(name) if name.starts_with("Parent.")))
    );
}
