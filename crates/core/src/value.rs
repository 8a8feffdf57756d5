//! Runtime value types: the tagged union over scalar kinds, nested
//! messages, lists, and filter values.
//!
//! All decimal payloads use `rust_decimal::Decimal`; temporal payloads use
//! `time` types and are treated as UTC everywhere they are rendered.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Kinds
// ──────────────────────────────────────────────

/// Closed enumeration of value kinds. The scalar kinds (everything except
/// `Message`, `List`, and `Filter`) form the convertible set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    Char,
    Str,
    Date,
    Time,
    DateTime,
    Message,
    List,
    Filter,
}

impl ValueKind {
    /// Human-readable kind name for error messages and reports.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Bool => "Bool",
            ValueKind::I8 => "I8",
            ValueKind::I16 => "I16",
            ValueKind::I32 => "I32",
            ValueKind::I64 => "I64",
            ValueKind::F32 => "F32",
            ValueKind::F64 => "F64",
            ValueKind::Decimal => "Decimal",
            ValueKind::Char => "Char",
            ValueKind::Str => "Str",
            ValueKind::Date => "Date",
            ValueKind::Time => "Time",
            ValueKind::DateTime => "DateTime",
            ValueKind::Message => "Message",
            ValueKind::List => "List",
            ValueKind::Filter => "Filter",
        }
    }

    /// True for the integer and floating/decimal kinds.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueKind::I8
                | ValueKind::I16
                | ValueKind::I32
                | ValueKind::I64
                | ValueKind::F32
                | ValueKind::F64
                | ValueKind::Decimal
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ──────────────────────────────────────────────
// Values
// ──────────────────────────────────────────────

/// A runtime value: scalar, nested message, homogeneous list, or filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Char(char),
    Str(String),
    Date(time::Date),
    Time(time::Time),
    DateTime(time::OffsetDateTime),
    Message(Message),
    List(Vec<Value>),
    Filter(FilterValue),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::I8(_) => ValueKind::I8,
            Value::I16(_) => ValueKind::I16,
            Value::I32(_) => ValueKind::I32,
            Value::I64(_) => ValueKind::I64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Char(_) => ValueKind::Char,
            Value::Str(_) => ValueKind::Str,
            Value::Date(_) => ValueKind::Date,
            Value::Time(_) => ValueKind::Time,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Message(_) => ValueKind::Message,
            Value::List(_) => ValueKind::List,
            Value::Filter(_) => ValueKind::Filter,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_filter(&self) -> Option<&FilterValue> {
        match self {
            Value::Filter(f) => Some(f),
            _ => None,
        }
    }

    /// Render to kind-tagged JSON for the reporting collaborator.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::json!({ "kind": "bool", "value": b }),
            Value::I8(i) => serde_json::json!({ "kind": "i8", "value": i }),
            Value::I16(i) => serde_json::json!({ "kind": "i16", "value": i }),
            Value::I32(i) => serde_json::json!({ "kind": "i32", "value": i }),
            Value::I64(i) => serde_json::json!({ "kind": "i64", "value": i }),
            Value::F32(x) => serde_json::json!({ "kind": "f32", "value": x }),
            Value::F64(x) => serde_json::json!({ "kind": "f64", "value": x }),
            Value::Decimal(d) => {
                serde_json::json!({ "kind": "decimal", "value": d.to_string() })
            }
            Value::Char(c) => serde_json::json!({ "kind": "char", "value": c.to_string() }),
            Value::Str(s) => serde_json::json!({ "kind": "str", "value": s }),
            Value::Date(_) | Value::Time(_) | Value::DateTime(_) => {
                let rendered = match crate::convert::convert(self, ValueKind::Str) {
                    Ok(Value::Str(s)) => s,
                    _ => self.to_string(),
                };
                let kind = match self {
                    Value::Date(_) => "date",
                    Value::Time(_) => "time",
                    _ => "datetime",
                };
                serde_json::json!({ "kind": kind, "value": rendered })
            }
            Value::Message(m) => {
                let mut fields = serde_json::Map::new();
                for (name, value) in m.fields() {
                    fields.insert(name.to_string(), value.to_json());
                }
                serde_json::json!({ "kind": "message", "fields": fields })
            }
            Value::List(items) => {
                let arr: Vec<serde_json::Value> = items.iter().map(Value::to_json).collect();
                serde_json::json!({ "kind": "list", "elements": arr })
            }
            Value::Filter(f) => match (&f.literal, &f.condition) {
                (Some(lit), _) => serde_json::json!({
                    "kind": "filter",
                    "literal": lit.to_json(),
                }),
                (None, Some(cond)) => serde_json::json!({
                    "kind": "filter",
                    "condition": cond.description(),
                }),
                (None, None) => serde_json::json!({ "kind": "filter" }),
            },
        }
    }
}

impl fmt::Display for Value {
    /// Diagnostic rendering used in error messages. Report output renders
    /// through the conversion registry's string profile instead.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::I8(i) => write!(f, "{}", i),
            Value::I16(i) => write!(f, "{}", i),
            Value::I32(i) => write!(f, "{}", i),
            Value::I64(i) => write!(f, "{}", i),
            Value::F32(x) => write!(f, "{}", x),
            Value::F64(x) => write!(f, "{}", x),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::Message(m) => write!(f, "<message: {} fields>", m.len()),
            Value::List(items) => write!(f, "<list: {} elements>", items.len()),
            Value::Filter(flt) => match (&flt.literal, &flt.condition) {
                (Some(lit), _) => write!(f, "{}", lit),
                (None, Some(cond)) => write!(f, "{}", cond.description()),
                (None, None) => write!(f, "<filter>"),
            },
        }
    }
}

// ──────────────────────────────────────────────
// Filter values
// ──────────────────────────────────────────────

/// An opaque predicate over an actual value, with a printable description.
///
/// The predicate receives `None` when the field is absent from the actual
/// message, so conditions can accept or reject absence explicitly.
/// Equality compares descriptions only -- predicates are opaque.
#[derive(Clone)]
pub struct Condition {
    description: String,
    predicate: Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>,
}

impl Condition {
    pub fn new(
        description: impl Into<String>,
        predicate: impl Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Condition {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn eval(&self, actual: Option<&Value>) -> bool {
        (self.predicate)(actual)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
    }
}

/// An expected-side value that is a condition, a literal substitute, or a
/// condition with a literal to compare against. At least one of the two is
/// always present.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterValue {
    pub literal: Option<Box<Value>>,
    pub condition: Option<Condition>,
}

impl FilterValue {
    /// A filter carrying only a literal substitute value.
    pub fn literal(value: Value) -> Self {
        FilterValue {
            literal: Some(Box::new(value)),
            condition: None,
        }
    }

    /// A filter carrying only a condition.
    pub fn condition(condition: Condition) -> Self {
        FilterValue {
            literal: None,
            condition: Some(condition),
        }
    }

    /// A condition with an attached literal to compare against.
    pub fn with_literal(condition: Condition, value: Value) -> Self {
        FilterValue {
            literal: Some(Box::new(value)),
            condition: Some(condition),
        }
    }
}

// ──────────────────────────────────────────────
// Messages
// ──────────────────────────────────────────────

/// An ordered field-name → value mapping. Field names are unique; `set`
/// replaces an existing value in place so declaration order is preserved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    fields: Vec<(String, Value)>,
}

impl Message {
    pub fn new() -> Self {
        Message { fields: Vec::new() }
    }

    /// Insert or replace a field, keeping first-insertion order.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder-style `set` for template construction.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn message_preserves_declaration_order() {
        let msg = Message::new()
            .with("ClOrdID", Value::Str("A1".to_string()))
            .with("Qty", Value::I64(100))
            .with("Price", Value::Decimal(dec("9.75")));
        let names: Vec<&str> = msg.fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["ClOrdID", "Qty", "Price"]);
    }

    #[test]
    fn message_set_replaces_in_place() {
        let mut msg = Message::new()
            .with("a", Value::I32(1))
            .with("b", Value::I32(2));
        msg.set("a", Value::I32(9));
        let names: Vec<&str> = msg.fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(msg.get("a"), Some(&Value::I32(9)));
    }

    #[test]
    fn value_kind_names() {
        assert_eq!(Value::Bool(true).kind().name(), "Bool");
        assert_eq!(Value::Decimal(dec("1")).kind().name(), "Decimal");
        assert_eq!(Value::Str("x".to_string()).kind().name(), "Str");
    }

    #[test]
    fn numeric_kind_classification() {
        assert!(Value::I16(1).is_numeric());
        assert!(Value::F64(1.0).is_numeric());
        assert!(Value::Decimal(dec("1")).is_numeric());
        assert!(!Value::Str("1".to_string()).is_numeric());
        assert!(!Value::Bool(true).is_numeric());
    }

    #[test]
    fn condition_equality_is_by_description() {
        let a = Condition::new("x > 5", |v| {
            matches!(v, Some(Value::I64(i)) if *i > 5)
        });
        let b = Condition::new("x > 5", |_| false);
        assert_eq!(a, b);
    }

    #[test]
    fn condition_sees_absence() {
        let present = Condition::new("present", |v| v.is_some());
        assert!(present.eval(Some(&Value::Bool(true))));
        assert!(!present.eval(None));
    }

    #[test]
    fn filter_identity_distinct_from_literal() {
        let plain = Value::I64(5);
        let filtered = Value::Filter(FilterValue::literal(Value::I64(5)));
        assert_ne!(plain, filtered);
        assert_eq!(filtered.kind(), ValueKind::Filter);
    }

    #[test]
    fn value_to_json_scalars() {
        let j = Value::Decimal(dec("10.50")).to_json();
        assert_eq!(j["kind"], "decimal");
        assert_eq!(j["value"], "10.50");
    }

    #[test]
    fn value_to_json_nested_message() {
        let msg = Message::new().with("Side", Value::Str("1".to_string()));
        let j = Value::Message(msg).to_json();
        assert_eq!(j["kind"], "message");
        assert_eq!(j["fields"]["Side"]["value"], "1");
    }
}
