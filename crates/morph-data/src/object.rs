//! Accessors over a loosely-typed object
//!
//! Every accessor tolerates missing keys and values of the wrong shape: they
//! read as "nothing here" rather than as an error. The `_mut` accessors hand
//! out borrows into the parent map, so writes through them land in place.

use crate::convert;
use crate::{Object, Value};

/// Uniform access into an [`Object`].
pub trait DataView {
    /// Raw value at `key`.
    fn value(&self, key: &str) -> Option<&Value>;

    /// Sub-object at `key`, or `None` when missing or not an object.
    fn object(&self, key: &str) -> Option<&Object>;

    /// Mutable sub-object at `key`, or `None` when missing or not an object.
    fn object_mut(&mut self, key: &str) -> Option<&mut Object>;

    /// Sub-object at `key`, inserting an empty one when the key is missing
    /// or holds something other than an object.
    fn object_entry(&mut self, key: &str) -> &mut Object;

    /// Object elements of the sequence at `key`. Non-object elements are
    /// skipped; a missing key yields an empty sequence.
    fn sequence(&self, key: &str) -> Vec<&Object>;

    /// Mutable variant of [`DataView::sequence`].
    fn sequence_mut(&mut self, key: &str) -> Vec<&mut Object>;

    /// Object values of the map at `key`.
    fn map_values(&self, key: &str) -> Vec<&Object>;

    /// Mutable variant of [`DataView::map_values`].
    fn map_values_mut(&mut self, key: &str) -> Vec<&mut Object>;

    /// Scalar at `key` coerced to a string.
    fn string(&self, key: &str) -> Option<String>;

    /// Scalar at `key` coerced to an integer.
    fn int(&self, key: &str) -> Option<i64>;

    /// Scalar at `key` coerced to a boolean.
    fn bool(&self, key: &str) -> Option<bool>;

    /// Sequence at `key` coerced to strings; a single scalar becomes a
    /// one-element list.
    fn string_slice(&self, key: &str) -> Vec<String>;

    /// Store `value` at `key`, returning the previous value.
    fn set(&mut self, key: &str, value: impl Into<Value>) -> Option<Value>;

    /// Move the value at `from` to `to`. Returns `false` when `from` is absent,
    /// in which case nothing changes.
    fn rename(&mut self, from: &str, to: &str) -> bool;

    /// `true` when `key` is missing or explicitly null.
    fn is_unset(&self, key: &str) -> bool {
        matches!(self.value(key), None | Some(Value::Null))
    }
}

impl DataView for Object {
    fn value(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn object(&self, key: &str) -> Option<&Object> {
        self.get(key).and_then(Value::as_object)
    }

    fn object_mut(&mut self, key: &str) -> Option<&mut Object> {
        self.get_mut(key).and_then(Value::as_object_mut)
    }

    fn object_entry(&mut self, key: &str) -> &mut Object {
        let slot = self.entry(key).or_insert(Value::Null);
        if !slot.is_object() {
            *slot = Value::Object(Object::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was normalized to an object"),
        }
    }

    fn sequence(&self, key: &str) -> Vec<&Object> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
            _ => Vec::new(),
        }
    }

    fn sequence_mut(&mut self, key: &str) -> Vec<&mut Object> {
        match self.get_mut(key) {
            Some(Value::Array(items)) => items
                .iter_mut()
                .filter_map(Value::as_object_mut)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn map_values(&self, key: &str) -> Vec<&Object> {
        match self.get(key) {
            Some(Value::Object(map)) => map.values().filter_map(Value::as_object).collect(),
            _ => Vec::new(),
        }
    }

    fn map_values_mut(&mut self, key: &str) -> Vec<&mut Object> {
        match self.get_mut(key) {
            Some(Value::Object(map)) => map
                .values_mut()
                .filter_map(Value::as_object_mut)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(convert::to_string)
    }

    fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(convert::to_int)
    }

    fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(convert::to_bool)
    }

    fn string_slice(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(convert::to_string).collect(),
            Some(other) => convert::to_string(other).into_iter().collect(),
            None => Vec::new(),
        }
    }

    fn set(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.insert(key.to_string(), value.into())
    }

    fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.shift_remove(from) {
            Some(value) => {
                self.insert(to.to_string(), value);
                true
            }
            None => false,
        }
    }
}
