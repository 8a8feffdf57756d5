//! Comparison engine: walks an actual message against an expected template
//! field by field, consulting the config tree for tolerances and policy and
//! the conversion registry for cross-kind coercion.
//!
//! The walk records one `ComparisonNode` per expected field (plus extra
//! nodes for unexpected actual fields when the policy demands it). Leaf
//! statuses are written here; structural verdicts are left to the status
//! module so rollup policy can change independently.

use std::borrow::Cow;
use std::cmp::Ordering;

use verax_core::{convert, ordering, to_decimal, Message, Value, ValueKind};

use crate::config::ConfigNode;
use crate::error::VerifyError;
use crate::result::ComparisonNode;
use crate::status::Status;

/// Compare an actual message against an expected template.
///
/// The returned root node carries the two messages and the per-field child
/// nodes; its own status is unset until aggregated.
pub fn compare_messages(
    actual: &Message,
    expected: &Message,
    config: &ConfigNode,
) -> Result<ComparisonNode, VerifyError> {
    let children = compare_fields(actual, expected, config)?;
    Ok(ComparisonNode::branch(
        "",
        Some(Value::Message(actual.clone())),
        Some(Value::Message(expected.clone())),
        children,
    ))
}

fn compare_fields(
    actual: &Message,
    expected: &Message,
    config: &ConfigNode,
) -> Result<Vec<ComparisonNode>, VerifyError> {
    let mut nodes = Vec::with_capacity(expected.len());
    for (name, exp) in expected.fields() {
        nodes.push(compare_field(name, name, 0, actual.get(name), exp, config)?);
    }
    if config.fail_unexpected_truthy() {
        for (name, act) in actual.fields() {
            if !expected.contains(name) {
                nodes.push(ComparisonNode::leaf(
                    name,
                    Some(act.clone()),
                    None,
                    Status::Failed,
                ));
            }
        }
    }
    Ok(nodes)
}

/// Compare one expected field (or list element).
///
/// `node_name` is the result-tree name (field name, or stringified index
/// for list elements); `cfg_field` is the field name used for tolerance,
/// key-field, and child-config lookups; `occurrence` selects the child
/// config node for repeated groups.
fn compare_field(
    node_name: &str,
    cfg_field: &str,
    occurrence: usize,
    actual: Option<&Value>,
    expected: &Value,
    config: &ConfigNode,
) -> Result<ComparisonNode, VerifyError> {
    if let Value::Filter(filter) = expected {
        let Some(literal) = &filter.literal else {
            // Pure condition: evaluated against the actual value directly.
            let passed = filter
                .condition
                .as_ref()
                .map(|cond| cond.eval(actual))
                .unwrap_or(false);
            let status = if passed { Status::Passed } else { Status::Failed };
            return Ok(ComparisonNode::leaf(
                node_name,
                actual.cloned(),
                Some(expected.clone()),
                status,
            ));
        };
        // Filter with a literal compares like the literal, but the node
        // keeps the filter as its expected value for reporting.
        return compare_concrete(
            node_name, cfg_field, occurrence, actual, literal, expected, config,
        );
    }
    compare_concrete(
        node_name, cfg_field, occurrence, actual, expected, expected, config,
    )
}

#[allow(clippy::too_many_arguments)]
fn compare_concrete(
    node_name: &str,
    cfg_field: &str,
    occurrence: usize,
    actual: Option<&Value>,
    expected: &Value,
    display_expected: &Value,
    config: &ConfigNode,
) -> Result<ComparisonNode, VerifyError> {
    match expected {
        Value::Message(exp_msg) => match actual {
            Some(Value::Message(act_msg)) => {
                let child_cfg = child_config(config, cfg_field, occurrence);
                let children = compare_fields(act_msg, exp_msg, &child_cfg)?;
                Ok(ComparisonNode::branch(
                    node_name,
                    actual.cloned(),
                    Some(display_expected.clone()),
                    children,
                ))
            }
            _ => Ok(ComparisonNode::leaf(
                node_name,
                actual.cloned(),
                Some(display_expected.clone()),
                Status::Failed,
            )),
        },
        Value::List(exp_items) => match actual {
            Some(Value::List(act_items)) => compare_lists(
                node_name,
                cfg_field,
                act_items,
                exp_items,
                display_expected,
                config,
            ),
            _ => Ok(ComparisonNode::leaf(
                node_name,
                actual.cloned(),
                Some(display_expected.clone()),
                Status::Failed,
            )),
        },
        scalar => match actual {
            Some(act) => compare_scalar(
                node_name,
                cfg_field,
                act,
                scalar,
                display_expected,
                config,
                false,
            ),
            None => {
                if let Some(alternate) = config.alternate_value() {
                    let substituted = parse_alternate(cfg_field, alternate, scalar)?;
                    compare_scalar(
                        node_name,
                        cfg_field,
                        &substituted,
                        scalar,
                        display_expected,
                        config,
                        true,
                    )
                } else {
                    Ok(ComparisonNode::leaf(
                        node_name,
                        None,
                        Some(display_expected.clone()),
                        Status::Failed,
                    ))
                }
            }
        },
    }
}

fn compare_lists(
    node_name: &str,
    cfg_field: &str,
    act_items: &[Value],
    exp_items: &[Value],
    display_expected: &Value,
    config: &ConfigNode,
) -> Result<ComparisonNode, VerifyError> {
    let mut children = Vec::with_capacity(exp_items.len());
    for (i, exp_el) in exp_items.iter().enumerate() {
        let idx_name = i.to_string();
        match act_items.get(i) {
            Some(act_el) => children.push(compare_field(
                &idx_name,
                cfg_field,
                i,
                Some(act_el),
                exp_el,
                config,
            )?),
            // Expected element with no actual counterpart.
            None => children.push(ComparisonNode::leaf(
                idx_name,
                None,
                Some(exp_el.clone()),
                Status::Failed,
            )),
        }
    }
    if config.fail_unexpected_truthy() {
        for (i, act_el) in act_items.iter().enumerate().skip(exp_items.len()) {
            children.push(ComparisonNode::leaf(
                i.to_string(),
                Some(act_el.clone()),
                None,
                Status::Failed,
            ));
        }
    }
    Ok(ComparisonNode::branch(
        node_name,
        Some(Value::List(act_items.to_vec())),
        Some(display_expected.clone()),
        children,
    ))
}

#[allow(clippy::too_many_arguments)]
fn compare_scalar(
    node_name: &str,
    cfg_field: &str,
    actual: &Value,
    expected: &Value,
    display_expected: &Value,
    config: &ConfigNode,
    substituted: bool,
) -> Result<ComparisonNode, VerifyError> {
    let status = scalar_status(cfg_field, actual, expected, config, substituted)?;
    Ok(ComparisonNode::leaf(
        node_name,
        Some(actual.clone()),
        Some(display_expected.clone()),
        status,
    ))
}

fn scalar_status(
    cfg_field: &str,
    actual: &Value,
    expected: &Value,
    config: &ConfigNode,
    substituted: bool,
) -> Result<Status, VerifyError> {
    if actual.is_numeric() && expected.is_numeric() {
        if let Some(tolerance) = config.tolerance_for(cfg_field) {
            let a = to_decimal(actual)?;
            let e = to_decimal(expected)?;
            let diff = (a - e).abs();
            return Ok(if diff.is_zero() {
                Status::Passed
            } else if diff <= tolerance {
                Status::ConditionallyPassed
            } else {
                mismatch_status(cfg_field, config, substituted)
            });
        }
    }
    let equal = ordering::compare(actual, expected)? == Ordering::Equal;
    Ok(if equal {
        Status::Passed
    } else {
        mismatch_status(cfg_field, config, substituted)
    })
}

/// Key-field mismatches always fail outright; a mismatch against an
/// alternate-substituted actual is only conditionally failed.
fn mismatch_status(cfg_field: &str, config: &ConfigNode, substituted: bool) -> Status {
    if config.is_key_field(cfg_field) {
        Status::Failed
    } else if substituted {
        Status::ConditionallyFailed
    } else {
        Status::Failed
    }
}

fn parse_alternate(
    field: &str,
    alternate: &str,
    expected: &Value,
) -> Result<Value, VerifyError> {
    let raw = Value::Str(alternate.to_string());
    if expected.kind() == ValueKind::Str {
        return Ok(raw);
    }
    convert(&raw, expected.kind()).map_err(|source| VerifyError::Alternate {
        field: field.to_string(),
        value: alternate.to_string(),
        source,
    })
}

fn child_config<'a>(
    config: &'a ConfigNode,
    field: &str,
    occurrence: usize,
) -> Cow<'a, ConfigNode> {
    match config.child(field, occurrence) {
        Some(child) => Cow::Borrowed(child),
        None => Cow::Owned(config.inherited()),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use verax_core::{Condition, FilterValue};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn status_of<'a>(root: &'a ComparisonNode, field: &str) -> Status {
        root.child(field).unwrap().status.unwrap()
    }

    #[test]
    fn exact_match_passes() {
        let actual = Message::new().with("Side", Value::Str("1".to_string()));
        let expected = Message::new().with("Side", Value::Str("1".to_string()));
        let root = compare_messages(&actual, &expected, &ConfigNode::new()).unwrap();
        assert_eq!(status_of(&root, "Side"), Status::Passed);
        assert!(root.status.is_none());
    }

    #[test]
    fn cross_kind_equality_via_promotion() {
        let actual = Message::new().with("Qty", Value::Str("100".to_string()));
        let expected = Message::new().with("Qty", Value::I64(100));
        let root = compare_messages(&actual, &expected, &ConfigNode::new()).unwrap();
        assert_eq!(status_of(&root, "Qty"), Status::Passed);
    }

    #[test]
    fn tolerance_pass_is_conditional() {
        let actual = Message::new().with("Qty", Value::F64(100.004));
        let expected = Message::new().with("Qty", Value::F64(100.0));
        let mut config = ConfigNode::new();
        config.add_precision("Qty", dec("0.01"));
        let root = compare_messages(&actual, &expected, &config).unwrap();
        assert_eq!(status_of(&root, "Qty"), Status::ConditionallyPassed);
    }

    #[test]
    fn tolerance_exceeded_fails() {
        let actual = Message::new().with("Qty", Value::F64(100.004));
        let expected = Message::new().with("Qty", Value::F64(100.0));
        let mut config = ConfigNode::new();
        config.add_precision("Qty", dec("0.001"));
        let root = compare_messages(&actual, &expected, &config).unwrap();
        assert_eq!(status_of(&root, "Qty"), Status::Failed);
    }

    #[test]
    fn exact_match_under_tolerance_still_plain_pass() {
        let actual = Message::new().with("Qty", Value::I64(100));
        let expected = Message::new().with("Qty", Value::I64(100));
        let mut config = ConfigNode::new();
        config.add_precision("Qty", dec("5"));
        let root = compare_messages(&actual, &expected, &config).unwrap();
        assert_eq!(status_of(&root, "Qty"), Status::Passed);
    }

    #[test]
    fn system_precision_applies_when_no_user_precision() {
        let actual = Message::new().with("Px", Value::Decimal(dec("9.74")));
        let expected = Message::new().with("Px", Value::Decimal(dec("9.75")));
        let mut config = ConfigNode::new();
        config.add_system_precision("Px", dec("0.05"));
        let root = compare_messages(&actual, &expected, &config).unwrap();
        assert_eq!(status_of(&root, "Px"), Status::ConditionallyPassed);
    }

    #[test]
    fn filter_condition_without_literal() {
        let expected = Message::new().with(
            "Qty",
            Value::Filter(FilterValue::condition(Condition::new("Qty > 50", |v| {
                matches!(v, Some(Value::I64(q)) if *q > 50)
            }))),
        );
        let passing = Message::new().with("Qty", Value::I64(60));
        let failing = Message::new().with("Qty", Value::I64(40));

        let root = compare_messages(&passing, &expected, &ConfigNode::new()).unwrap();
        assert_eq!(status_of(&root, "Qty"), Status::Passed);
        let root = compare_messages(&failing, &expected, &ConfigNode::new()).unwrap();
        assert_eq!(status_of(&root, "Qty"), Status::Failed);
    }

    #[test]
    fn filter_condition_sees_absent_field() {
        let expected = Message::new().with(
            "MaybeGone",
            Value::Filter(FilterValue::condition(Condition::new(
                "absent or positive",
                |v| match v {
                    None => true,
                    Some(Value::I64(i)) => *i > 0,
                    _ => false,
                },
            ))),
        );
        let empty = Message::new();
        let root = compare_messages(&empty, &expected, &ConfigNode::new()).unwrap();
        assert_eq!(status_of(&root, "MaybeGone"), Status::Passed);
    }

    #[test]
    fn filter_with_literal_uses_tolerance() {
        let expected = Message::new().with(
            "Qty",
            Value::Filter(FilterValue::literal(Value::F64(100.0))),
        );
        let actual = Message::new().with("Qty", Value::F64(100.004));
        let mut config = ConfigNode::new();
        config.add_precision("Qty", dec("0.01"));
        let root = compare_messages(&actual, &expected, &config).unwrap();
        assert_eq!(status_of(&root, "Qty"), Status::ConditionallyPassed);
        // Node keeps the filter on the expected side.
        assert!(matches!(
            root.child("Qty").unwrap().expected,
            Some(Value::Filter(_))
        ));
    }

    #[test]
    fn missing_expected_field_fails() {
        let actual = Message::new();
        let expected = Message::new().with("Side", Value::Str("1".to_string()));
        let root = compare_messages(&actual, &expected, &ConfigNode::new()).unwrap();
        let node = root.child("Side").unwrap();
        assert_eq!(node.status, Some(Status::Failed));
        assert!(node.actual.is_none());
    }

    #[test]
    fn alternate_value_substitutes_for_missing_field() {
        let actual = Message::new();
        let expected = Message::new().with("Qty", Value::I64(100));
        let mut config = ConfigNode::new();
        config.set_alternate_value("100");
        let root = compare_messages(&actual, &expected, &config).unwrap();
        assert_eq!(status_of(&root, "Qty"), Status::Passed);
    }

    #[test]
    fn alternate_value_mismatch_is_conditionally_failed() {
        let actual = Message::new();
        let expected = Message::new().with("Qty", Value::I64(100));
        let mut config = ConfigNode::new();
        config.set_alternate_value("99");
        let root = compare_messages(&actual, &expected, &config).unwrap();
        assert_eq!(status_of(&root, "Qty"), Status::ConditionallyFailed);
    }

    #[test]
    fn key_field_mismatch_always_fails() {
        let actual = Message::new();
        let expected = Message::new().with("Qty", Value::I64(100));
        let mut config = ConfigNode::new();
        config.set_alternate_value("99");
        config.set_key_fields(["Qty"]);
        let root = compare_messages(&actual, &expected, &config).unwrap();
        assert_eq!(status_of(&root, "Qty"), Status::Failed);
    }

    #[test]
    fn unexpected_field_ignored_by_default() {
        let actual = Message::new()
            .with("Side", Value::Str("1".to_string()))
            .with("Extra", Value::I64(7));
        let expected = Message::new().with("Side", Value::Str("1".to_string()));
        let root = compare_messages(&actual, &expected, &ConfigNode::new()).unwrap();
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn unexpected_field_fails_when_policy_set() {
        let actual = Message::new()
            .with("Side", Value::Str("1".to_string()))
            .with("Extra", Value::I64(7));
        let expected = Message::new().with("Side", Value::Str("1".to_string()));
        let mut config = ConfigNode::new();
        config.set_fail_unexpected("y");
        let root = compare_messages(&actual, &expected, &config).unwrap();
        let extra = root.child("Extra").unwrap();
        assert_eq!(extra.status, Some(Status::Failed));
        assert!(extra.expected.is_none());
    }

    #[test]
    fn nested_message_uses_child_config() {
        let actual = Message::new().with(
            "Leg",
            Value::Message(Message::new().with("Px", Value::F64(10.02))),
        );
        let expected = Message::new().with(
            "Leg",
            Value::Message(Message::new().with("Px", Value::F64(10.0))),
        );
        let mut leg_cfg = ConfigNode::new();
        leg_cfg.add_precision("Px", dec("0.05"));
        let mut config = ConfigNode::new();
        config.add("Leg", leg_cfg);
        config.propagate();

        let root = compare_messages(&actual, &expected, &config).unwrap();
        let leg = root.child("Leg").unwrap();
        assert!(leg.status.is_none());
        assert_eq!(
            leg.child("Px").unwrap().status,
            Some(Status::ConditionallyPassed)
        );
    }

    #[test]
    fn nested_message_shape_mismatch_fails() {
        let actual = Message::new().with("Leg", Value::I64(1));
        let expected = Message::new().with("Leg", Value::Message(Message::new()));
        let root = compare_messages(&actual, &expected, &ConfigNode::new()).unwrap();
        assert_eq!(status_of(&root, "Leg"), Status::Failed);
    }

    #[test]
    fn list_elements_compared_by_position() {
        let actual = Message::new().with(
            "Px",
            Value::List(vec![Value::I64(1), Value::I64(2), Value::I64(3)]),
        );
        let expected = Message::new().with(
            "Px",
            Value::List(vec![Value::I64(1), Value::I64(9), Value::I64(3)]),
        );
        let root = compare_messages(&actual, &expected, &ConfigNode::new()).unwrap();
        let list = root.child("Px").unwrap();
        assert_eq!(list.child("0").unwrap().status, Some(Status::Passed));
        assert_eq!(list.child("1").unwrap().status, Some(Status::Failed));
        assert_eq!(list.child("2").unwrap().status, Some(Status::Passed));
    }

    #[test]
    fn expected_only_list_tail_fails() {
        let actual = Message::new().with("Px", Value::List(vec![Value::I64(1)]));
        let expected = Message::new().with(
            "Px",
            Value::List(vec![Value::I64(1), Value::I64(2)]),
        );
        let root = compare_messages(&actual, &expected, &ConfigNode::new()).unwrap();
        let list = root.child("Px").unwrap();
        assert_eq!(list.children.len(), 2);
        assert_eq!(list.child("1").unwrap().status, Some(Status::Failed));
        assert!(list.child("1").unwrap().actual.is_none());
    }

    #[test]
    fn actual_only_list_tail_ignored_unless_policy() {
        let actual = Message::new().with(
            "Px",
            Value::List(vec![Value::I64(1), Value::I64(2)]),
        );
        let expected = Message::new().with("Px", Value::List(vec![Value::I64(1)]));

        let root = compare_messages(&actual, &expected, &ConfigNode::new()).unwrap();
        assert_eq!(root.child("Px").unwrap().children.len(), 1);

        let mut config = ConfigNode::new();
        config.set_fail_unexpected("y");
        let root = compare_messages(&actual, &expected, &config).unwrap();
        let list = root.child("Px").unwrap();
        assert_eq!(list.children.len(), 2);
        assert_eq!(list.child("1").unwrap().status, Some(Status::Failed));
    }

    #[test]
    fn repeated_group_selects_config_by_occurrence() {
        let leg = |px: f64| Value::Message(Message::new().with("Px", Value::F64(px)));
        let actual = Message::new().with("Legs", Value::List(vec![leg(10.04), leg(10.04)]));
        let expected = Message::new().with("Legs", Value::List(vec![leg(10.0), leg(10.0)]));

        let mut strict = ConfigNode::new();
        strict.add_precision("Px", dec("0.001"));
        let mut loose = ConfigNode::new();
        loose.add_precision("Px", dec("0.1"));
        let mut config = ConfigNode::new();
        config.add("Legs", strict);
        config.add("Legs", loose);
        config.propagate();

        let root = compare_messages(&actual, &expected, &config).unwrap();
        let legs = root.child("Legs").unwrap();
        assert_eq!(
            legs.child("0").unwrap().child("Px").unwrap().status,
            Some(Status::Failed)
        );
        assert_eq!(
            legs.child("1").unwrap().child("Px").unwrap().status,
            Some(Status::ConditionallyPassed)
        );
    }

    #[test]
    fn conversion_failure_surfaces_as_error() {
        let actual = Message::new().with("Qty", Value::Str("abc".to_string()));
        let expected = Message::new().with("Qty", Value::I64(100));
        let result = compare_messages(&actual, &expected, &ConfigNode::new());
        assert!(matches!(result, Err(VerifyError::Order(_))));
    }

    #[test]
    fn unparseable_alternate_value_surfaces() {
        let actual = Message::new();
        let expected = Message::new().with("Qty", Value::I64(100));
        let mut config = ConfigNode::new();
        config.set_alternate_value("not-a-number");
        let result = compare_messages(&actual, &expected, &config);
        assert!(matches!(result, Err(VerifyError::Alternate { .. })));
    }
}
