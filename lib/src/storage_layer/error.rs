use super::page::PageId;

use bincode::error::{DecodeError, EncodeError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    EncodeError(#[from] EncodeError),

    #[error("Deserialization error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("Page {page} is out of bounds, the table holds at most {max_pages} pages")]
    OutOfBounds { page: PageId, max_pages: u32 },

    #[error("Page not resident: {0}")]
    NotResident(PageId),

    #[error("Page full: {0}")]
    PageFull(PageId),

    #[error("Database file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
}
