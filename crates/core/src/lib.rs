//! Verax message data model: the value tagged union, scalar conversion
//! registry, total-ordering comparator, and dictionary schema boundary
//! types shared by the comparison and validation layers.

pub mod convert;
pub mod error;
pub mod ordering;
pub mod schema;
pub mod value;

pub use convert::{convert, convert_opt, to_decimal};
pub use error::{ConvertError, OrderError, SchemaError};
pub use ordering::{compare, compare_opt, priority};
pub use schema::{EnumItem, FieldSchema, MessageSchema};
pub use value::{Condition, FilterValue, Message, Value, ValueKind};
