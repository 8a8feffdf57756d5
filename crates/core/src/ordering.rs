//! Total-ordering comparator over heterogeneous scalar values.
//!
//! Each scalar kind has a fixed priority; two values of different kinds are
//! both promoted (via the conversion registry) to the higher-priority kind
//! before comparing. Kinds outside the priority table are not comparable.

use std::cmp::Ordering;

use crate::convert::{convert, to_decimal};
use crate::error::OrderError;
use crate::value::{Value, ValueKind};

/// Priority of a kind in the promotion table; `None` for kinds that cannot
/// be ordered (`Message`, `List`, `Filter`).
pub fn priority(kind: ValueKind) -> Option<usize> {
    const ORDER: [ValueKind; 13] = [
        ValueKind::Str,
        ValueKind::Bool,
        ValueKind::I8,
        ValueKind::I16,
        ValueKind::I32,
        ValueKind::I64,
        ValueKind::F32,
        ValueKind::F64,
        ValueKind::Decimal,
        ValueKind::Char,
        ValueKind::Date,
        ValueKind::Time,
        ValueKind::DateTime,
    ];
    ORDER.iter().position(|k| *k == kind)
}

/// Compare two scalar values, promoting across kinds as needed.
pub fn compare(a: &Value, b: &Value) -> Result<Ordering, OrderError> {
    if a.kind() == b.kind() {
        return compare_same_kind(a, b);
    }
    let pa = priority(a.kind());
    let pb = priority(b.kind());
    let (pa, pb) = match (pa, pb) {
        (Some(pa), Some(pb)) => (pa, pb),
        _ => {
            return Err(OrderError::Incomparable {
                left: a.kind(),
                right: b.kind(),
            })
        }
    };
    let target = if pa >= pb { a.kind() } else { b.kind() };
    let ca = convert(a, target)?;
    let cb = convert(b, target)?;
    compare_same_kind(&ca, &cb)
}

/// Null-aware comparison: `None == None`, and `None` sorts before any value.
pub fn compare_opt(a: Option<&Value>, b: Option<&Value>) -> Result<Ordering, OrderError> {
    match (a, b) {
        (None, None) => Ok(Ordering::Equal),
        (None, Some(_)) => Ok(Ordering::Less),
        (Some(_), None) => Ok(Ordering::Greater),
        (Some(a), Some(b)) => compare(a, b),
    }
}

fn compare_same_kind(a: &Value, b: &Value) -> Result<Ordering, OrderError> {
    match (a, b) {
        (Value::Str(l), Value::Str(r)) => Ok(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Ok(l.cmp(r)),
        (Value::I8(l), Value::I8(r)) => Ok(l.cmp(r)),
        (Value::I16(l), Value::I16(r)) => Ok(l.cmp(r)),
        (Value::I32(l), Value::I32(r)) => Ok(l.cmp(r)),
        (Value::I64(l), Value::I64(r)) => Ok(l.cmp(r)),
        // Floats go through decimal so the order stays total (no NaN holes).
        (Value::F32(_), Value::F32(_)) | (Value::F64(_), Value::F64(_)) => {
            Ok(to_decimal(a)?.cmp(&to_decimal(b)?))
        }
        (Value::Decimal(l), Value::Decimal(r)) => Ok(l.cmp(r)),
        (Value::Char(l), Value::Char(r)) => Ok(l.cmp(r)),
        (Value::Date(l), Value::Date(r)) => Ok(l.cmp(r)),
        (Value::Time(l), Value::Time(r)) => Ok(l.cmp(r)),
        (Value::DateTime(l), Value::DateTime(r)) => Ok(l.cmp(r)),
        _ => Err(OrderError::Incomparable {
            left: a.kind(),
            right: b.kind(),
        }),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
