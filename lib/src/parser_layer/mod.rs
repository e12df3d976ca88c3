pub mod ast;
pub mod error;
pub mod prepare;

use lalrpop_util::lalrpop_mod;
lalrpop_mod!(pub statement, "/parser_layer/statement.rs");
