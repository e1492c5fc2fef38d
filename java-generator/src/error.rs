use thiserror::Error;

use crate::printer::PrintError;

/// Failures of a generation run. All of them abort the run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("parse error: {0}")]
    Parse(#[from] parser::ParseError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("message `{0}` is not in the descriptor model")]
    MissingMessage(String),

    #[error("message `{message}` has no field `{field}`")]
    MissingField { message: String, field: String },

    #[error("cannot resolve `{0}` to a Java type")]
    UnresolvedType(String),

    #[error("region tag `{0}` is generated more than once")]
    DuplicateRegionTag(String),

    #[error(transparent)]
    Print(#[from] PrintError),
}
