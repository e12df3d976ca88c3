use super::super::table_layer::row::Row;

/// A statement ready for the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

/// What the grammar hands back, before the insert arguments are checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawStatement<'input> {
    Insert {
        id: &'input str,
        username: &'input str,
        email: &'input str,
    },
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    BTree,
    Constants,
}
