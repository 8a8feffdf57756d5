//! Recursive enum-validation visitor.
//!
//! Walks an actual message against its dictionary schema and checks every
//! enumerated leaf field against the declared legal values. Enum comparison
//! is exact-kind: no conversion is applied. The walk never raises; all
//! violations accumulate into the returned list.

use verax_core::{EnumItem, FieldSchema, Message, MessageSchema, Value};

/// Validate enumerated fields, returning dotted-path error descriptions.
/// An empty list signals full validity.
pub fn validate(message: &Message, schema: &MessageSchema) -> Vec<String> {
    let mut errors = Vec::new();
    let mut path = Vec::new();
    walk(message, schema, &mut path, &mut errors);
    errors
}

fn walk(
    message: &Message,
    schema: &MessageSchema,
    path: &mut Vec<String>,
    errors: &mut Vec<String>,
) {
    for (name, value) in message.fields() {
        // Fields the dictionary does not declare are the loader's concern.
        let Some(field) = schema.field(name) else {
            continue;
        };
        match value {
            Value::Message(sub) => {
                if let Some(sub_schema) = &field.message {
                    path.push(name.to_string());
                    walk(sub, sub_schema, path, errors);
                    path.pop();
                }
            }
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    match item {
                        Value::Message(sub) => {
                            if let Some(sub_schema) = &field.message {
                                path.push(format!("{}[{}]", name, i));
                                walk(sub, sub_schema, path, errors);
                                path.pop();
                            }
                        }
                        scalar => {
                            check_leaf(&format!("{}[{}]", name, i), scalar, field, path, errors)
                        }
                    }
                }
            }
            scalar => check_leaf(name, scalar, field, path, errors),
        }
    }
}

fn check_leaf(
    leaf_name: &str,
    value: &Value,
    field: &FieldSchema,
    path: &[String],
    errors: &mut Vec<String>,
) {
    let Some(items) = &field.enumeration else {
        return;
    };
    if items.iter().any(|item| item.value == *value) {
        return;
    }
    let dotted = if path.is_empty() {
        leaf_name.to_string()
    } else {
        format!("{}.{}", path.join("."), leaf_name)
    };
    errors.push(format!(
        "Unknown value in field '{}': {} (expected values: {})",
        dotted,
        value,
        legal_values(items)
    ));
}

fn legal_values(items: &[EnumItem]) -> String {
    items
        .iter()
        .map(|item| format!("{}={}", item.value, item.name))
        .collect::<Vec<_>>()
        .join(", ")
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
