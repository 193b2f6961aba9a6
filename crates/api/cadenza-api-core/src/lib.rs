//! cadenza-api-core: property values, typed property paths and field access
//! shared by the animation crates (engine-agnostic).

pub mod blend;
pub mod coercion;
pub mod error;
pub mod field;
pub mod json;
pub mod typed_path;
pub mod value;

pub use error::PathError;
pub use field::{FieldPath, FieldSel};
pub use typed_path::TypedPath;
pub use value::{Value, ValueKind};
