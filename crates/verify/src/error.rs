//! Error types for the verification layer.

use verax_core::{ConvertError, OrderError};

/// Errors raised while building comparison configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A tolerance declaration fragment did not parse as `field=value`.
    #[error("malformed tolerance declaration '{fragment}': expected field=decimal")]
    MalformedPrecision { fragment: String },
}

/// Errors surfaced from a comparison walk. Structural divergences are never
/// errors -- they are recorded in the result tree; only value-level
/// conversion and ordering failures abort a call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VerifyError {
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Order(#[from] OrderError),

    /// The configured alternate value could not stand in for an absent field.
    #[error("alternate value '{value}' cannot substitute for field '{field}': {source}")]
    Alternate {
        field: String,
        value: String,
        source: ConvertError,
    },
}
