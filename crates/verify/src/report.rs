//! Generic ordered report serialization.
//!
//! The reporting collaborator consumes either the raw comparison tree or
//! this flattened map form. Entries keep insertion order (`Vec` backing),
//! so field order from the compared messages survives into the report.

use verax_core::{convert, Value, ValueKind};

use crate::result::ComparisonNode;

/// A report entry: rendered text or a nested ordered map.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValue {
    Text(String),
    Map(ReportMap),
}

/// An insertion-ordered string-keyed map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportMap(Vec<(String, ReportValue)>);

impl ReportMap {
    pub fn new() -> Self {
        ReportMap(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ReportValue) {
        self.0.push((key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<&ReportValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReportValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render to JSON. `serde_json` objects do not preserve entry order;
    /// order-sensitive consumers should walk `iter()` instead.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        for (key, value) in &self.0 {
            let rendered = match value {
                ReportValue::Text(s) => serde_json::Value::String(s.clone()),
                ReportValue::Map(m) => m.to_json(),
            };
            obj.insert(key.clone(), rendered);
        }
        serde_json::Value::Object(obj)
    }
}

/// Serialize a comparison node into the generic report form: keys `type`,
/// `value`, and (for non-expected-side rendering) `status`.
///
/// Filter values unwrap to their literal and the literal's kind name, or to
/// the condition text when no literal is present. Lists render `type` as a
/// parametrized list-of-element-kind string and `value` as an index-keyed
/// sub-map; nested messages render recursively.
pub fn to_report_map(node: &ComparisonNode, expected_side: bool) -> ReportMap {
    let side = if expected_side {
        node.expected.as_ref()
    } else {
        node.actual.as_ref()
    };

    let mut map = ReportMap::new();
    if node.is_leaf() {
        let (type_name, rendered) = render_leaf(side);
        map.insert("type", ReportValue::Text(type_name));
        map.insert("value", ReportValue::Text(rendered));
    } else {
        map.insert(
            "type",
            ReportValue::Text(structural_type_name(side)),
        );
        let mut sub = ReportMap::new();
        for child in &node.children {
            sub.insert(
                child.name.clone(),
                ReportValue::Map(to_report_map(child, expected_side)),
            );
        }
        map.insert("value", ReportValue::Map(sub));
    }
    if !expected_side {
        if let Some(status) = node.status {
            map.insert("status", ReportValue::Text(status.as_str().to_string()));
        }
    }
    map
}

fn structural_type_name(side: Option<&Value>) -> String {
    match unwrap_filter(side) {
        Some(Value::List(items)) => {
            let elem = items
                .first()
                .map(|v| v.kind().name())
                .unwrap_or("Value");
            format!("List<{}>", elem)
        }
        _ => "Message".to_string(),
    }
}

fn render_leaf(side: Option<&Value>) -> (String, String) {
    let Some(value) = side else {
        return ("null".to_string(), "null".to_string());
    };
    if let Value::Filter(filter) = value {
        return match (filter.literal.as_deref(), &filter.condition) {
            (Some(literal), _) => render_leaf(Some(literal)),
            (None, Some(cond)) => (
                ValueKind::Filter.name().to_string(),
                cond.description().to_string(),
            ),
            (None, None) => (ValueKind::Filter.name().to_string(), String::new()),
        };
    }
    let rendered = match convert(value, ValueKind::Str) {
        Ok(Value::Str(s)) => s,
        _ => value.to_string(),
    };
    (value.kind().name().to_string(), rendered)
}

/// The effective side value for type naming: filters stand for their
/// literal when one is present.
fn unwrap_filter(side: Option<&Value>) -> Option<&Value> {
    match side {
        Some(Value::Filter(f)) => f.literal.as_deref().or(side),
        other => other,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
