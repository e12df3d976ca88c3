use super::super::storage_layer::error::StorageError;
use super::node::Key;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("{field} is too long: {len} bytes, at most {max} allowed")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{field} contains a NUL byte")]
    NulByte { field: &'static str },
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Duplicate key: {0}")]
    DuplicateKey(Key),

    #[error("Table full")]
    TableFull,

    #[error("Invalid row: {0}")]
    InvalidRow(#[from] RowError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Corrupted table: {0}")]
    Corrupted(String),

    #[error("Underlying error: {0}")]
    StorageError(StorageError),
}

impl<T: Into<StorageError>> From<T> for TableError {
    fn from(item: T) -> Self {
        let storage_err: StorageError = item.into();
        Self::StorageError(storage_err)
    }
}
