use std::io::Write;

use tracing::debug;

use super::super::parser_layer::ast::Statement;
use super::super::table_layer::{
    btree::Table,
    error::TableError,
    row::{self, Row},
};
use super::error::ExecutorError;

/// Outcome of a statement the user should hear about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteResult {
    Success,
    DuplicateKey,
    TableFull,
}

/// Runs prepared statements against the one table of a session
pub struct Executor {
    table: Table,
}

impl Executor {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Execute `statement`; a select writes its rows to `out`, one per line
    pub fn execute<W: Write>(
        &mut self,
        statement: &Statement,
        out: &mut W,
    ) -> Result<ExecuteResult, ExecutorError> {
        match statement {
            Statement::Insert(row) => self.execute_insert(row),
            Statement::Select => self.execute_select(out),
        }
    }

    fn execute_insert(&mut self, row: &Row) -> Result<ExecuteResult, ExecutorError> {
        row::validate(row)?;

        match self.table.insert(row) {
            Ok(()) => Ok(ExecuteResult::Success),
            Err(TableError::DuplicateKey(id)) => {
                debug!(id, "insert rejected, duplicate key");
                Ok(ExecuteResult::DuplicateKey)
            }
            Err(TableError::TableFull) => {
                debug!(id = row.id, "insert rejected, table full");
                Ok(ExecuteResult::TableFull)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn execute_select<W: Write>(&self, out: &mut W) -> Result<ExecuteResult, ExecutorError> {
        for row in self.table.select() {
            writeln!(out, "{}", row?).map_err(ExecutorError::Output)?;
        }

        Ok(ExecuteResult::Success)
    }

    /// Close the table, flushing every page
    pub fn close(self) -> Result<(), ExecutorError> {
        self.table.close()?;
        Ok(())
    }
}
