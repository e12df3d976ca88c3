use super::btree::Table;
use super::error::TableError;
use super::node::LeafNode;
use super::row::{self, Row};

enum Position {
    Unstarted,
    Leaf { node: LeafNode, cell: usize },
    Finished,
}

/// In-order scan over a table: starts at the leftmost leaf and follows the
/// next-leaf links. One pass only, call `Table::select` again to rescan.
pub struct Cursor<'a> {
    table: &'a Table,
    position: Position,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(table: &'a Table) -> Self {
        Self {
            table,
            position: Position::Unstarted,
        }
    }

    fn fail(&mut self, error: TableError) -> Option<Result<Row, TableError>> {
        self.position = Position::Finished;
        Some(Err(error))
    }
}

impl Iterator for Cursor<'_> {
    type Item = Result<Row, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = match &mut self.position {
                Position::Finished => return None,
                Position::Unstarted => self.table.leftmost_leaf().map(Some),
                Position::Leaf { node, cell } => {
                    if let Some(found) = node.cells.get(*cell) {
                        *cell += 1;
                        return Some(Ok(row::decode(&found.value)));
                    }
                    self.table.next_leaf(node)
                }
            };

            match next {
                Ok(Some(node)) => self.position = Position::Leaf { node, cell: 0 },
                Ok(None) => self.position = Position::Finished,
                Err(e) => return self.fail(e),
            }
        }
    }
}
