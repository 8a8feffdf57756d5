//! Per-message-level comparison settings and their propagation tree.
//!
//! A `ConfigNode` mirrors one nesting level of the expected/template
//! message: numeric tolerances, the key-field set, the unexpected-field
//! policy, and per-occurrence child nodes for nested and repeated groups.
//! Trees are built while the template is parsed, `propagate()`d once, and
//! read-only afterwards.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::ConfigError;

/// Settings for one message level of the expected tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigNode {
    precision: BTreeMap<String, Decimal>,
    system_precision: BTreeMap<String, Decimal>,
    alternate_value: Option<String>,
    fail_unexpected: Option<String>,
    /// Directly declared key fields. The flag value is `false` here;
    /// transitive `true` entries only appear in the computed view.
    key_fields: BTreeMap<String, bool>,
    /// One child node per occurrence of a nested/repeated group field.
    children: BTreeMap<String, Vec<ConfigNode>>,
}

impl ConfigNode {
    pub fn new() -> Self {
        ConfigNode::default()
    }

    // ── Construction-time mutators ────────────────────────────────

    /// Declare a user tolerance for one field. User tolerances take
    /// precedence over system tolerances for the same field.
    pub fn add_precision(&mut self, field: impl Into<String>, tolerance: Decimal) {
        self.precision.insert(field.into(), tolerance);
    }

    /// Declare a platform-level tolerance for one field.
    pub fn add_system_precision(&mut self, field: impl Into<String>, tolerance: Decimal) {
        self.system_precision.insert(field.into(), tolerance);
    }

    /// Parse and merge a `"field1=0.01;field2=0.5"` declaration string into
    /// the user tolerances.
    pub fn add_precision_str(&mut self, declaration: &str) -> Result<(), ConfigError> {
        for (field, tolerance) in parse_precision(declaration)? {
            self.precision.insert(field, tolerance);
        }
        Ok(())
    }

    /// Parse and merge a declaration string into the system tolerances.
    pub fn add_system_precision_str(&mut self, declaration: &str) -> Result<(), ConfigError> {
        for (field, tolerance) in parse_precision(declaration)? {
            self.system_precision.insert(field, tolerance);
        }
        Ok(())
    }

    pub fn set_alternate_value(&mut self, value: impl Into<String>) {
        self.alternate_value = Some(value.into());
    }

    pub fn set_fail_unexpected(&mut self, flag: impl Into<String>) {
        self.fail_unexpected = Some(flag.into());
    }

    /// Declare direct key fields on this node.
    pub fn set_key_fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.key_fields.insert(field.into(), false);
        }
    }

    /// Attach a child node for the next occurrence of a group field.
    pub fn add(&mut self, field: impl Into<String>, child: ConfigNode) {
        self.children.entry(field.into()).or_default().push(child);
    }

    /// One-pass parent-to-child propagation over the whole tree.
    ///
    /// Fills empty only: a child keeps every tolerance it declares itself
    /// and inherits the parent's entries for keys it does not define;
    /// `fail_unexpected` is inherited only when unset on the child. After
    /// this pass every descendant observes its merged configuration, so
    /// the tree can be shared read-only across comparison calls.
    pub fn propagate(&mut self) {
        for occurrences in self.children.values_mut() {
            for child in occurrences.iter_mut() {
                for (field, tolerance) in &self.precision {
                    child
                        .precision
                        .entry(field.clone())
                        .or_insert(*tolerance);
                }
                for (field, tolerance) in &self.system_precision {
                    child
                        .system_precision
                        .entry(field.clone())
                        .or_insert(*tolerance);
                }
                if child.fail_unexpected.is_none() {
                    child.fail_unexpected = self.fail_unexpected.clone();
                }
                child.propagate();
            }
        }
    }

    // ── Read views ────────────────────────────────────────────────

    /// Tolerance consulted for a field: user precision first, then system.
    pub fn tolerance_for(&self, field: &str) -> Option<Decimal> {
        self.precision
            .get(field)
            .or_else(|| self.system_precision.get(field))
            .copied()
    }

    pub fn precision(&self) -> &BTreeMap<String, Decimal> {
        &self.precision
    }

    pub fn system_precision(&self) -> &BTreeMap<String, Decimal> {
        &self.system_precision
    }

    pub fn alternate_value(&self) -> Option<&str> {
        self.alternate_value.as_deref()
    }

    pub fn fail_unexpected(&self) -> Option<&str> {
        self.fail_unexpected.as_deref()
    }

    /// Unexpected-field policy flag, interpreted with the platform's string
    /// truthiness: `y`, `yes`, `true`, `1` (case-insensitive).
    pub fn fail_unexpected_truthy(&self) -> bool {
        matches!(
            self.fail_unexpected
                .as_deref()
                .map(str::to_ascii_lowercase)
                .as_deref(),
            Some("y") | Some("yes") | Some("true") | Some("1")
        )
    }

    /// Computed key-field view: directly declared entries (flag `false`)
    /// plus a transitive `true` entry for every child field whose subtree
    /// carries key fields in any occurrence.
    pub fn key_fields(&self) -> BTreeMap<String, bool> {
        let mut view = self.key_fields.clone();
        for (field, occurrences) in &self.children {
            if view.contains_key(field) {
                continue;
            }
            if occurrences.iter().any(ConfigNode::has_key_fields) {
                view.insert(field.clone(), true);
            }
        }
        view
    }

    /// True iff this node has a direct key field or any descendant does.
    pub fn has_key_fields(&self) -> bool {
        !self.key_fields.is_empty()
            || self
                .children
                .values()
                .flatten()
                .any(ConfigNode::has_key_fields)
    }

    pub fn is_key_field(&self, field: &str) -> bool {
        self.key_fields().contains_key(field)
    }

    /// Child node for the given occurrence of a group field. A repeated
    /// group with more occurrences than declared nodes is covered by the
    /// last declared node.
    pub fn child(&self, field: &str, occurrence: usize) -> Option<&ConfigNode> {
        self.children
            .get(field)
            .and_then(|nodes| nodes.get(occurrence).or_else(|| nodes.last()))
    }

    /// The view an undeclared child observes after propagation: the
    /// inheritable settings of this node and nothing else.
    pub fn inherited(&self) -> ConfigNode {
        ConfigNode {
            precision: self.precision.clone(),
            system_precision: self.system_precision.clone(),
            alternate_value: None,
            fail_unexpected: self.fail_unexpected.clone(),
            key_fields: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }
}

/// Parse a `"field1=0.01;field2=0.5"` tolerance declaration. Empty
/// fragments are skipped; a fragment with no `=`, an empty field name, or a
/// non-numeric value fails with the offending fragment quoted.
pub fn parse_precision(declaration: &str) -> Result<BTreeMap<String, Decimal>, ConfigError> {
    let mut map = BTreeMap::new();
    for fragment in declaration.split(';') {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        let malformed = || ConfigError::MalformedPrecision {
            fragment: fragment.to_string(),
        };
        let (field, value) = fragment.split_once('=').ok_or_else(malformed)?;
        let field = field.trim();
        let value = value.trim();
        if field.is_empty() {
            return Err(malformed());
        }
        let tolerance = value.parse::<Decimal>().map_err(|_| malformed())?;
        map.insert(field.to_string(), tolerance);
    }
    Ok(map)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
