//! Scalar conversion registry.
//!
//! Converts among the scalar value kinds with loss detection: numeric
//! widening/narrowing and string⇄numeric conversions route through a
//! `Decimal` intermediate, and the original and converted values are both
//! rendered to decimal and compared by value. A mismatch fails the
//! conversion instead of returning a silently-altered value.
//!
//! Temporal⇄numeric conversions use milliseconds since epoch (time-of-day
//! milliseconds for `Time`). Temporal⇄string conversions use ISO-8601
//! profiles rendered in UTC.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::error::ConvertError;
use crate::value::{Value, ValueKind};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Convert a scalar value to the target kind.
///
/// Identity conversions return the value unchanged. `Message`, `List`, and
/// `Filter` are not scalar targets; requesting them fails with
/// `ConvertError::Unsupported`.
pub fn convert(value: &Value, target: ValueKind) -> Result<Value, ConvertError> {
    if value.kind() == target {
        return Ok(value.clone());
    }
    match target {
        ValueKind::Bool => to_bool(value),
        ValueKind::I8 => {
            let i = to_i64_checked(value)?;
            let narrowed = i8::try_from(i).map_err(|_| out_of_range_int(value, ValueKind::I8))?;
            Ok(Value::I8(narrowed))
        }
        ValueKind::I16 => {
            let i = to_i64_checked(value)?;
            let narrowed =
                i16::try_from(i).map_err(|_| out_of_range_int(value, ValueKind::I16))?;
            Ok(Value::I16(narrowed))
        }
        ValueKind::I32 => {
            let i = to_i64_checked(value)?;
            let narrowed =
                i32::try_from(i).map_err(|_| out_of_range_int(value, ValueKind::I32))?;
            Ok(Value::I32(narrowed))
        }
        ValueKind::I64 => Ok(Value::I64(to_i64_checked(value)?)),
        ValueKind::F32 => to_f32(value),
        ValueKind::F64 => to_f64(value),
        ValueKind::Decimal => Ok(Value::Decimal(to_decimal(value)?)),
        ValueKind::Char => to_char(value),
        ValueKind::Str => Ok(Value::Str(to_plain_string(value)?)),
        ValueKind::Date => to_date(value),
        ValueKind::Time => to_time(value),
        ValueKind::DateTime => to_datetime(value),
        ValueKind::Message | ValueKind::List | ValueKind::Filter => {
            Err(ConvertError::Unsupported { kind: target })
        }
    }
}

/// Null-aware conversion: absent input converts to absent output, never an
/// error. (A present zero-length string still fails char conversion -- that
/// is a shape error on a present value, not absence.)
pub fn convert_opt(
    value: Option<&Value>,
    target: ValueKind,
) -> Result<Option<Value>, ConvertError> {
    value.map(|v| convert(v, target)).transpose()
}

// ──────────────────────────────────────────────
// Decimal intermediate
// ──────────────────────────────────────────────

/// Render any scalar value to its decimal form. This is the intermediate
/// every numeric conversion routes through, and the basis of loss
/// detection. Temporal values render as their millisecond count; chars as
/// their code point.
pub fn to_decimal(value: &Value) -> Result<Decimal, ConvertError> {
    match value {
        Value::Bool(b) => Ok(if *b { Decimal::ONE } else { Decimal::ZERO }),
        Value::I8(i) => Ok(Decimal::from(*i)),
        Value::I16(i) => Ok(Decimal::from(*i)),
        Value::I32(i) => Ok(Decimal::from(*i)),
        Value::I64(i) => Ok(Decimal::from(*i)),
        Value::F32(x) => {
            Decimal::from_f32(*x).ok_or_else(|| bad_shape(value, ValueKind::Decimal))
        }
        Value::F64(x) => {
            Decimal::from_f64(*x).ok_or_else(|| bad_shape(value, ValueKind::Decimal))
        }
        Value::Decimal(d) => Ok(*d),
        Value::Char(c) => Ok(Decimal::from(*c as u32)),
        Value::Str(s) => Decimal::from_str_exact(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| ConvertError::Unparseable {
                value: s.clone(),
                to: ValueKind::Decimal,
            }),
        Value::Date(_) | Value::Time(_) | Value::DateTime(_) => {
            Ok(Decimal::from(temporal_millis(value)))
        }
        Value::Message(_) | Value::List(_) | Value::Filter(_) => {
            Err(bad_shape(value, ValueKind::Decimal))
        }
    }
}

/// Milliseconds since epoch for dates and date-times; milliseconds since
/// midnight for times.
fn temporal_millis(value: &Value) -> i64 {
    match value {
        Value::Date(d) => d.midnight().assume_utc().unix_timestamp() * 1_000,
        Value::Time(t) => {
            (t.hour() as i64 * 3_600 + t.minute() as i64 * 60 + t.second() as i64) * 1_000
                + t.millisecond() as i64
        }
        Value::DateTime(dt) => (dt.unix_timestamp_nanos() / 1_000_000) as i64,
        _ => unreachable!("temporal_millis called on non-temporal value"),
    }
}

fn to_i64_checked(value: &Value) -> Result<i64, ConvertError> {
    let d0 = to_decimal(value)?;
    if d0 != d0.trunc() {
        return Err(lossy(value, ValueKind::I64));
    }
    d0.trunc()
        .to_i64()
        .ok_or_else(|| out_of_range_int(value, ValueKind::I64))
}

fn to_f64(value: &Value) -> Result<Value, ConvertError> {
    let d0 = to_decimal(value)?;
    let x = d0
        .to_f64()
        .ok_or_else(|| bad_shape(value, ValueKind::F64))?;
    let d1 = Decimal::from_f64(x).ok_or_else(|| bad_shape(value, ValueKind::F64))?;
    if d1 != d0 {
        return Err(lossy(value, ValueKind::F64));
    }
    Ok(Value::F64(x))
}

fn to_f32(value: &Value) -> Result<Value, ConvertError> {
    let d0 = to_decimal(value)?;
    let x = d0
        .to_f32()
        .ok_or_else(|| bad_shape(value, ValueKind::F32))?;
    let d1 = Decimal::from_f32(x).ok_or_else(|| bad_shape(value, ValueKind::F32))?;
    if d1 != d0 {
        return Err(lossy(value, ValueKind::F32));
    }
    Ok(Value::F32(x))
}

// ──────────────────────────────────────────────
// Non-numeric targets
// ──────────────────────────────────────────────

fn to_bool(value: &Value) -> Result<Value, ConvertError> {
    match value {
        Value::Str(s) => match s.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(ConvertError::Unparseable {
                value: s.clone(),
                to: ValueKind::Bool,
            }),
        },
        _ if value.is_numeric() => {
            let d = to_decimal(value)?;
            if d == Decimal::ONE {
                Ok(Value::Bool(true))
            } else if d == Decimal::ZERO {
                Ok(Value::Bool(false))
            } else {
                Err(ConvertError::OutOfRange {
                    value: value.to_string(),
                    to: ValueKind::Bool,
                    range: "0..=1".to_string(),
                })
            }
        }
        _ => Err(bad_shape(value, ValueKind::Bool)),
    }
}

fn to_char(value: &Value) -> Result<Value, ConvertError> {
    match value {
        Value::Str(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(bad_shape(value, ValueKind::Char)),
            }
        }
        _ if value.is_numeric() => {
            let d = to_decimal(value)?;
            if d != d.trunc() {
                return Err(lossy(value, ValueKind::Char));
            }
            let code = d
                .trunc()
                .to_u32()
                .and_then(char::from_u32)
                .ok_or_else(|| ConvertError::OutOfRange {
                    value: value.to_string(),
                    to: ValueKind::Char,
                    range: "0..=0x10FFFF excluding surrogates".to_string(),
                })?;
            Ok(Value::Char(code))
        }
        _ => Err(bad_shape(value, ValueKind::Char)),
    }
}

/// The canonical string profile: floats route through decimal with trailing
/// zeros stripped and plain (non-exponential) notation; temporals render as
/// ISO-8601 in UTC; decimals keep their declared scale.
fn to_plain_string(value: &Value) -> Result<String, ConvertError> {
    match value {
        Value::Bool(b) => Ok(b.to_string()),
        Value::I8(i) => Ok(i.to_string()),
        Value::I16(i) => Ok(i.to_string()),
        Value::I32(i) => Ok(i.to_string()),
        Value::I64(i) => Ok(i.to_string()),
        Value::F32(_) | Value::F64(_) => {
            let d = to_decimal(value)?;
            Ok(d.normalize().to_string())
        }
        Value::Decimal(d) => Ok(d.to_string()),
        Value::Char(c) => Ok(c.to_string()),
        Value::Str(s) => Ok(s.clone()),
        Value::Date(d) => d
            .format(&format_description!("[year]-[month]-[day]"))
            .map_err(|_| bad_shape(value, ValueKind::Str)),
        Value::Time(t) => t
            .format(&format_description!(
                "[hour]:[minute]:[second].[subsecond digits:3]"
            ))
            .map_err(|_| bad_shape(value, ValueKind::Str)),
        Value::DateTime(dt) => dt
            .to_offset(UtcOffset::UTC)
            .format(&format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
            ))
            .map_err(|_| bad_shape(value, ValueKind::Str)),
        Value::Message(_) | Value::List(_) | Value::Filter(_) => {
            Err(bad_shape(value, ValueKind::Str))
        }
    }
}

// ──────────────────────────────────────────────
// Temporal targets
// ──────────────────────────────────────────────

fn to_date(value: &Value) -> Result<Value, ConvertError> {
    match value {
        Value::Str(s) => Date::parse(s, &format_description!("[year]-[month]-[day]"))
            .map(Value::Date)
            .map_err(|_| ConvertError::Unparseable {
                value: s.clone(),
                to: ValueKind::Date,
            }),
        Value::DateTime(dt) => Ok(Value::Date(dt.to_offset(UtcOffset::UTC).date())),
        _ if value.is_numeric() => {
            let ms = to_i64_checked(value)?;
            let dt = epoch_millis_to_datetime(value, ms)?;
            Ok(Value::Date(dt.date()))
        }
        _ => Err(bad_shape(value, ValueKind::Date)),
    }
}

fn to_time(value: &Value) -> Result<Value, ConvertError> {
    match value {
        Value::Str(s) => {
            let with_millis = Time::parse(
                s,
                &format_description!("[hour]:[minute]:[second].[subsecond digits:3]"),
            );
            with_millis
                .or_else(|_| Time::parse(s, &format_description!("[hour]:[minute]:[second]")))
                .map(Value::Time)
                .map_err(|_| ConvertError::Unparseable {
                    value: s.clone(),
                    to: ValueKind::Time,
                })
        }
        Value::DateTime(dt) => Ok(Value::Time(dt.to_offset(UtcOffset::UTC).time())),
        _ if value.is_numeric() => {
            let ms = to_i64_checked(value)?;
            if !(0..MILLIS_PER_DAY).contains(&ms) {
                return Err(ConvertError::OutOfRange {
                    value: value.to_string(),
                    to: ValueKind::Time,
                    range: format!("0..{}", MILLIS_PER_DAY),
                });
            }
            let t = Time::from_hms_milli(
                (ms / 3_600_000) as u8,
                (ms / 60_000 % 60) as u8,
                (ms / 1_000 % 60) as u8,
                (ms % 1_000) as u16,
            )
            .map_err(|_| bad_shape(value, ValueKind::Time))?;
            Ok(Value::Time(t))
        }
        _ => Err(bad_shape(value, ValueKind::Time)),
    }
}

fn to_datetime(value: &Value) -> Result<Value, ConvertError> {
    match value {
        Value::Str(s) => {
            let with_millis = PrimitiveDateTime::parse(
                s,
                &format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
                ),
            );
            with_millis
                .or_else(|_| {
                    PrimitiveDateTime::parse(
                        s,
                        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z"),
                    )
                })
                .or_else(|_| {
                    PrimitiveDateTime::parse(
                        s,
                        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
                    )
                })
                .map(|pdt| Value::DateTime(pdt.assume_utc()))
                .map_err(|_| ConvertError::Unparseable {
                    value: s.clone(),
                    to: ValueKind::DateTime,
                })
        }
        Value::Date(d) => Ok(Value::DateTime(d.midnight().assume_utc())),
        Value::Time(t) => {
            let epoch = Date::from_ordinal_date(1970, 1)
                .map_err(|_| bad_shape(value, ValueKind::DateTime))?;
            Ok(Value::DateTime(epoch.with_time(*t).assume_utc()))
        }
        _ if value.is_numeric() => {
            let ms = to_i64_checked(value)?;
            Ok(Value::DateTime(epoch_millis_to_datetime(value, ms)?))
        }
        _ => Err(bad_shape(value, ValueKind::DateTime)),
    }
}

fn epoch_millis_to_datetime(value: &Value, ms: i64) -> Result<OffsetDateTime, ConvertError> {
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000).map_err(|_| {
        ConvertError::OutOfRange {
            value: value.to_string(),
            to: ValueKind::DateTime,
            range: "representable OffsetDateTime".to_string(),
        }
    })
}

// ──────────────────────────────────────────────
// Error helpers
// ──────────────────────────────────────────────

fn bad_shape(value: &Value, to: ValueKind) -> ConvertError {
    ConvertError::BadShape {
        value: value.to_string(),
        from: value.kind(),
        to,
    }
}

fn lossy(value: &Value, to: ValueKind) -> ConvertError {
    ConvertError::Lossy {
        value: value.to_string(),
        from: value.kind(),
        to,
    }
}

fn out_of_range_int(value: &Value, to: ValueKind) -> ConvertError {
    let range = match to {
        ValueKind::I8 => format!("{}..={}", i8::MIN, i8::MAX),
        ValueKind::I16 => format!("{}..={}", i16::MIN, i16::MAX),
        ValueKind::I32 => format!("{}..={}", i32::MIN, i32::MAX),
        _ => format!("{}..={}", i64::MIN, i64::MAX),
    };
    ConvertError::OutOfRange {
        value: value.to_string(),
        to,
        range,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
