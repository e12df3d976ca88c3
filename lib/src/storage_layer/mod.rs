pub mod buffer_pool;
pub mod error;
pub mod indices;
pub mod page;
pub mod storage;
pub mod utils;
