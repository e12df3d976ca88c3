pub mod btree;
pub mod config;
pub mod cursor;
pub mod error;
pub mod node;
pub mod row;
