//! Built-in mappers
//!
//! Field names a mapper refers to are the names visible at its position in
//! the chain: after every mapper declared before it has been applied.

use morph_data::{DataView, Object, Value};
use morph_schema::{Error, Mapper, Result, Schema, SchemaLookup};

/// Exposes internal field `from` as external field `to`
#[derive(Debug, Clone)]
pub struct Move {
    pub from: String,
    pub to: String,
}

impl Move {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Mapper for Move {
    fn from_internal(&self, data: &mut Object) {
        data.rename(&self.from, &self.to);
    }

    fn to_internal(&self, data: &mut Object) -> Result<()> {
        data.rename(&self.to, &self.from);
        Ok(())
    }

    fn modify_schema(&mut self, schema: &mut Schema, _schemas: &dyn SchemaLookup) -> Result<()> {
        if schema.fields.contains_key(&self.to) {
            // already moved by an earlier modification
            if !schema.fields.contains_key(&self.from) {
                return Ok(());
            }
            return Err(Error::schema(
                &schema.id,
                format!("cannot move {} to {}: field already exists", self.from, self.to),
            ));
        }

        let field = schema.fields.remove(&self.from).ok_or_else(|| {
            Error::schema(&schema.id, format!("cannot move missing field {}", self.from))
        })?;
        schema.fields.insert(self.to.clone(), field);
        Ok(())
    }
}

/// Hides an internal field from the external representation
#[derive(Debug, Clone)]
pub struct DropField {
    pub field: String,
}

impl DropField {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Mapper for DropField {
    fn from_internal(&self, data: &mut Object) {
        data.shift_remove(&self.field);
    }

    fn to_internal(&self, _data: &mut Object) -> Result<()> {
        Ok(())
    }

    fn modify_schema(&mut self, schema: &mut Schema, _schemas: &dyn SchemaLookup) -> Result<()> {
        if schema.fields.remove(&self.field).is_some() {
            return Ok(());
        }
        let dropped_earlier = schema
            .internal_schema
            .as_ref()
            .is_some_and(|internal| internal.fields.contains_key(&self.field));
        if dropped_earlier {
            return Ok(());
        }
        Err(Error::schema(
            &schema.id,
            format!("cannot drop missing field {}", self.field),
        ))
    }
}

/// Fills a field on the way in when it is absent or null
#[derive(Debug, Clone)]
pub struct SetDefault {
    pub field: String,
    pub value: Value,
}

impl SetDefault {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl Mapper for SetDefault {
    fn from_internal(&self, _data: &mut Object) {}

    fn to_internal(&self, data: &mut Object) -> Result<()> {
        if data.is_unset(&self.field) {
            data.set(&self.field, self.value.clone());
        }
        Ok(())
    }

    fn modify_schema(&mut self, schema: &mut Schema, _schemas: &dyn SchemaLookup) -> Result<()> {
        let field = schema.fields.get_mut(&self.field).ok_or_else(|| {
            Error::schema(&schema.id, format!("cannot default missing field {}", self.field))
        })?;
        field.default = Some(self.value.clone());
        Ok(())
    }
}

/// Requires fields on the way in, reporting every missing one
#[derive(Debug, Clone)]
pub struct Required {
    pub fields: Vec<String>,
}

impl Required {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl Mapper for Required {
    fn from_internal(&self, _data: &mut Object) {}

    fn to_internal(&self, data: &mut Object) -> Result<()> {
        Error::join(
            self.fields
                .iter()
                .filter(|field| data.is_unset(field))
                .map(|field| Error::conversion(field.as_str(), "required field is missing")),
        )
    }

    fn modify_schema(&mut self, schema: &mut Schema, _schemas: &dyn SchemaLookup) -> Result<()> {
        for name in &self.fields {
            let field = schema.fields.get_mut(name).ok_or_else(|| {
                Error::schema(&schema.id, format!("cannot require missing field {}", name))
            })?;
            field.required = true;
        }
        Ok(())
    }
}
