use super::super::table_layer::error::RowError;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    #[error("Unrecognized keyword at start of '{0}'.")]
    UnrecognizedStatement(String),

    #[error("Unrecognized command '{0}'")]
    UnrecognizedCommand(String),

    #[error("{0}")]
    InvalidArgument(#[from] ArgumentError),
}

/// A malformed insert
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Syntax error. Could not parse statement.")]
    Syntax,

    #[error("ID must be positive.")]
    NegativeId,

    #[error("ID is out of range: {0}")]
    IdOutOfRange(String),

    #[error("String is too long.")]
    StringTooLong,

    #[error("Strings must not contain NUL bytes.")]
    NulByte,
}

impl From<RowError> for ArgumentError {
    fn from(error: RowError) -> Self {
        match error {
            RowError::FieldTooLong { .. } => Self::StringTooLong,
            RowError::NulByte { .. } => Self::NulByte,
        }
    }
}
