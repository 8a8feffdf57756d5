//! Error types for the verax data model.

use crate::value::ValueKind;

/// All errors that can be returned by the scalar conversion registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    /// The conversion would change the represented value -- detected by
    /// rendering original and converted to decimal and comparing by value.
    #[error("conversion of {value} from {from} to {to} changes the value")]
    Lossy {
        value: String,
        from: ValueKind,
        to: ValueKind,
    },

    /// The source value has the wrong shape for the target kind
    /// (e.g. a multi-character string converted to a char).
    #[error("cannot convert {from} value '{value}' to {to}")]
    BadShape {
        value: String,
        from: ValueKind,
        to: ValueKind,
    },

    /// The source value falls outside the representable range of the target.
    #[error("value {value} is outside the {to} range {range}")]
    OutOfRange {
        value: String,
        to: ValueKind,
        range: String,
    },

    /// A string could not be parsed as the target kind.
    #[error("cannot parse '{value}' as {to}")]
    Unparseable { value: String, to: ValueKind },

    /// No converter registered for the requested target kind.
    #[error("no converter registered for target kind {kind}")]
    Unsupported { kind: ValueKind },
}

/// Errors from the total-ordering comparator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    /// Neither operand kind appears in the priority table.
    #[error("cannot order {left} against {right}: kind is not in the priority table")]
    Incomparable { left: ValueKind, right: ValueKind },

    /// Promotion to the dominating kind failed.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// Errors raised while building dictionary schema structures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// A field name was declared twice within one message schema.
    #[error("duplicate field '{name}' in message schema")]
    DuplicateField { name: String },
}
