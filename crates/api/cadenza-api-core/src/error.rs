//! Error types shared by path parsing and field access.

use thiserror::Error;

use crate::ValueKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("invalid typed path: empty {0} segment")]
    EmptySegment(&'static str),
    #[error("invalid typed path: {0} contains whitespace")]
    Whitespace(&'static str),
    #[error("unknown field '{field}' on {kind:?} value")]
    UnknownField { field: String, kind: ValueKind },
    #[error("field '{field}' selects into a {kind:?} value, which has no fields")]
    NotComposite { field: String, kind: ValueKind },
}
