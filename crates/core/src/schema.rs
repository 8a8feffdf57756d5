//! Dictionary schema boundary types.
//!
//! The schema loader collaborator supplies, per field, its declared kind,
//! whether it repeats, its enumerated legal values, and the sub-schema for
//! nested messages. This module only defines the shape of that contract;
//! loading and structural validation belong to the loader.

use crate::error::SchemaError;
use crate::value::{Value, ValueKind};

/// One declared legal value of an enumerated field.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumItem {
    /// Symbolic name from the dictionary (e.g. "BUY").
    pub name: String,
    /// The legal wire value. Enum comparison is exact-kind: no conversion
    /// is applied when validating against it.
    pub value: Value,
}

impl EnumItem {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        EnumItem {
            name: name.into(),
            value,
        }
    }
}

/// A single field declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub kind: ValueKind,
    /// True for repeated/collection fields.
    pub repeated: bool,
    /// Legal values when the field is an enumeration.
    pub enumeration: Option<Vec<EnumItem>>,
    /// Sub-schema when the field is a nested message (or repeated group).
    pub message: Option<MessageSchema>,
}

impl FieldSchema {
    pub fn scalar(name: impl Into<String>, kind: ValueKind) -> Self {
        FieldSchema {
            name: name.into(),
            kind,
            repeated: false,
            enumeration: None,
            message: None,
        }
    }

    pub fn enumerated(
        name: impl Into<String>,
        kind: ValueKind,
        items: Vec<EnumItem>,
    ) -> Self {
        FieldSchema {
            name: name.into(),
            kind,
            repeated: false,
            enumeration: Some(items),
            message: None,
        }
    }

    pub fn group(name: impl Into<String>, schema: MessageSchema, repeated: bool) -> Self {
        FieldSchema {
            name: name.into(),
            kind: ValueKind::Message,
            repeated,
            enumeration: None,
            message: Some(schema),
        }
    }
}

/// An ordered message schema. Field names are unique; schema loaders reject
/// self-recursive definitions before this type is ever built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageSchema {
    fields: Vec<FieldSchema>,
}

impl MessageSchema {
    pub fn new() -> Self {
        MessageSchema { fields: Vec::new() }
    }

    pub fn push(&mut self, field: FieldSchema) -> Result<(), SchemaError> {
        if self.fields.iter().any(|f| f.name == field.name) {
            return Err(SchemaError::DuplicateField { name: field.name });
        }
        self.fields.push(field);
        Ok(())
    }

    /// Builder-style `push` that fails fast on duplicates.
    pub fn with(mut self, field: FieldSchema) -> Result<Self, SchemaError> {
        self.push(field)?;
        Ok(self)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter()
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_field_rejected() {
        let mut schema = MessageSchema::new();
        schema
            .push(FieldSchema::scalar("Qty", ValueKind::I64))
            .unwrap();
        let result = schema.push(FieldSchema::scalar("Qty", ValueKind::Decimal));
        assert!(matches!(result, Err(SchemaError::DuplicateField { name }) if name == "Qty"));
    }

    #[test]
    fn field_lookup() {
        let schema = MessageSchema::new()
            .with(FieldSchema::scalar("Side", ValueKind::Str))
            .unwrap();
        assert_eq!(schema.field("Side").unwrap().kind, ValueKind::Str);
        assert!(schema.field("Missing").is_none());
    }
}
