//! Verax verification layer -- compares an actual message against an
//! expected template under a propagated configuration tree, producing a
//! typed per-field comparison tree and an aggregate verdict.
//!
//! The companion `verax-core` crate supplies the value model, the scalar
//! conversion registry, and the ordering comparator; this crate owns the
//! configuration tree, the comparison walk, status aggregation, report
//! serialization, and enum validation.

pub mod config;
pub mod engine;
pub mod enums;
pub mod error;
pub mod report;
pub mod result;
pub mod status;

pub use config::{parse_precision, ConfigNode};
pub use engine::compare_messages;
pub use enums::validate;
pub use error::{ConfigError, VerifyError};
pub use report::{to_report_map, ReportMap, ReportValue};
pub use result::ComparisonNode;
pub use status::{aggregate, count_by_status, status_for, Status};

/// Result of verifying one message pair: the comparison tree plus its
/// aggregate verdict.
pub struct Verification {
    pub root: ComparisonNode,
    pub status: Status,
}

/// Compare `actual` against `expected` under `config` and aggregate the
/// verdict. This is the top-level entry point for callers that do not need
/// to post-process the tree between the two steps.
pub fn verify(
    actual: &verax_core::Message,
    expected: &verax_core::Message,
    config: &ConfigNode,
) -> Result<Verification, VerifyError> {
    let root = engine::compare_messages(actual, expected, config)?;
    let status = status::aggregate(&root);
    Ok(Verification { root, status })
}
