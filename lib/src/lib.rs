pub mod executor_layer;
pub mod parser_layer;
pub mod storage_layer;
pub mod table_layer;
