use super::super::table_layer::error::{RowError, TableError};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Invalid row: {0}")]
    InvalidRow(#[from] RowError),

    #[error("Could not write output: {0}")]
    Output(std::io::Error),

    #[error("{0}")]
    TableError(#[from] TableError),
}
