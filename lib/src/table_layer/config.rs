use super::error::TableError;
use super::node::{INTERNAL_NODE_MAX_CELLS, LEAF_NODE_MAX_CELLS};

pub const TABLE_MAX_PAGES: u32 = 100;

/// Size limits of a table. Small node capacities are handy for exercising splits.
/// The file does not record them: reopening checks every node against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    pub max_pages: u32,
    pub leaf_max_cells: usize,
    /// Keyed cells per internal node, the right child not counted
    pub internal_max_cells: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_pages: TABLE_MAX_PAGES,
            leaf_max_cells: LEAF_NODE_MAX_CELLS,
            internal_max_cells: INTERNAL_NODE_MAX_CELLS,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), TableError> {
        if self.max_pages == 0 {
            return Err(TableError::InvalidConfig(
                "max_pages must be at least 1".to_owned(),
            ));
        }

        if !(2..=LEAF_NODE_MAX_CELLS).contains(&self.leaf_max_cells) {
            return Err(TableError::InvalidConfig(format!(
                "leaf_max_cells must be between 2 and {LEAF_NODE_MAX_CELLS}, got {}",
                self.leaf_max_cells
            )));
        }

        if !(2..=INTERNAL_NODE_MAX_CELLS).contains(&self.internal_max_cells) {
            return Err(TableError::InvalidConfig(format!(
                "internal_max_cells must be between 2 and {INTERNAL_NODE_MAX_CELLS}, got {}",
                self.internal_max_cells
            )));
        }

        Ok(())
    }
}
