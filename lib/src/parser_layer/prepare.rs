use tracing::debug;

use super::super::table_layer::row::{self, Row};
use super::ast::{MetaCommand, RawStatement, Statement};
use super::error::{ArgumentError, PrepareError};
use super::statement::StatementParser;

pub fn is_meta_command(input: &str) -> bool {
    input.starts_with('.')
}

pub fn parse_meta_command(input: &str) -> Result<MetaCommand, PrepareError> {
    match input.trim() {
        ".exit" => Ok(MetaCommand::Exit),
        ".btree" => Ok(MetaCommand::BTree),
        ".constants" => Ok(MetaCommand::Constants),
        other => Err(PrepareError::UnrecognizedCommand(other.to_owned())),
    }
}

/// Turns one line of input into a `Statement`
pub struct StatementPreparer {
    parser: StatementParser,
}

impl Default for StatementPreparer {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementPreparer {
    pub fn new() -> Self {
        Self {
            parser: StatementParser::new(),
        }
    }

    pub fn prepare(&self, input: &str) -> Result<Statement, PrepareError> {
        let input = input.trim();

        // Only lines starting with a known keyword reach the grammar
        match input.split_whitespace().next() {
            Some("insert") | Some("select") => {}
            _ => return Err(PrepareError::UnrecognizedStatement(input.to_owned())),
        }

        let raw = self.parser.parse(input).map_err(|e| {
            debug!(error = ?e, "statement did not parse");
            ArgumentError::Syntax
        })?;

        match raw {
            RawStatement::Select => Ok(Statement::Select),
            RawStatement::Insert {
                id,
                username,
                email,
            } => {
                let id: i32 = id
                    .parse()
                    .map_err(|_| ArgumentError::IdOutOfRange(id.to_owned()))?;
                if id < 0 {
                    return Err(ArgumentError::NegativeId.into());
                }

                let row = Row::new(id, username, email);
                row::validate(&row).map_err(ArgumentError::from)?;

                Ok(Statement::Insert(row))
            }
        }
    }
}
