use std::path::Path;

use tracing::{debug, info};

use super::super::storage_layer::{
    buffer_pool::BufferPool,
    indices::LEFTMOST_LEAF_INDEX,
    page::PageId,
    utils::{load, save},
};
use super::config::TableConfig;
use super::cursor::Cursor;
use super::error::TableError;
use super::node::*;
use super::row::{self, ROW_SIZE, Row};

/// Where a key sits, or would sit, inside a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Occupied(usize),
    Vacant(usize),
}

/// A single table of rows keyed by id, stored as a B-tree of pages
#[derive(Debug)]
pub struct Table {
    pager: BufferPool,
    root_page: PageId,
    config: TableConfig,
}

fn corrupted(message: impl Into<String>) -> TableError {
    TableError::Corrupted(message.into())
}

impl Table {
    pub fn open<P: AsRef<Path>>(path: P, config: TableConfig) -> Result<Self, TableError> {
        config.validate()?;

        let pager = BufferPool::new(path, config.max_pages)?;
        let mut table = Self {
            pager,
            root_page: LEFTMOST_LEAF_INDEX,
            config,
        };

        if table.pager.num_pages() == 0 {
            let root_page = table.pager.allocate_page()?;
            table.write_node(root_page, &Node::Leaf(LeafNode::new_root()))?;
        } else {
            table.root_page = table.find_root()?;
            table.check_capacity()?;
        }

        info!(
            root = table.root_page,
            pages = table.pager.num_pages(),
            "table opened"
        );
        Ok(table)
    }

    /// Flush everything and release the file
    pub fn close(self) -> Result<(), TableError> {
        self.pager.close()?;
        Ok(())
    }

    pub fn root_page(&self) -> PageId {
        self.root_page
    }

    pub fn num_pages(&self) -> u32 {
        self.pager.num_pages()
    }

    pub fn node(&self, page: PageId) -> Result<Node, TableError> {
        let page = self.pager.get_page(page)?;
        Ok(load(&page)?)
    }

    pub fn root_node(&self) -> Result<Node, TableError> {
        self.node(self.root_page)
    }

    fn write_node(&mut self, page: PageId, node: &Node) -> Result<(), TableError> {
        let page = self.pager.get_page_mut(page)?;
        save(node, page)?;
        Ok(())
    }

    fn leaf(&self, page: PageId) -> Result<LeafNode, TableError> {
        match self.node(page)? {
            Node::Leaf(leaf) => Ok(leaf),
            Node::Internal(_) => Err(corrupted(format!("page {page} is not a leaf"))),
        }
    }

    fn internal(&self, page: PageId) -> Result<InternalNode, TableError> {
        match self.node(page)? {
            Node::Internal(internal) => Ok(internal),
            Node::Leaf(_) => Err(corrupted(format!("page {page} is not an internal node"))),
        }
    }

    // No header page: page 0 is always part of the tree, so its parent chain ends at the root
    fn find_root(&self) -> Result<PageId, TableError> {
        let mut page = LEFTMOST_LEAF_INDEX;

        for _ in 0..=self.pager.num_pages() {
            let node = self.node(page)?;
            if node.is_root() {
                return Ok(page);
            }
            page = node.parent();
        }

        Err(corrupted("parent pointers never reach a root"))
    }

    // Capacities are not stored in the file, so a tree built with larger nodes
    // cannot be opened with smaller limits
    fn check_capacity(&self) -> Result<(), TableError> {
        let mut stack = vec![(self.root_page, 0usize)];

        while let Some((page, depth)) = stack.pop() {
            if depth > self.pager.num_pages() as usize {
                return Err(corrupted("tree contains a cycle"));
            }

            let (kind, cells, max) = match self.node(page)? {
                Node::Leaf(leaf) => ("leaf", leaf.cells.len(), self.config.leaf_max_cells),
                Node::Internal(internal) => {
                    stack.extend(internal.children().map(|child| (child, depth + 1)));
                    ("internal", internal.cells.len(), self.config.internal_max_cells)
                }
            };

            if cells > max {
                return Err(TableError::InvalidConfig(format!(
                    "{kind} page {page} holds {cells} cells, the limit is {max}"
                )));
            }
        }

        Ok(())
    }

    /// Walk from the root to a leaf, picking the child index with `choose` at every internal node
    fn descend(
        &self,
        choose: impl Fn(&InternalNode) -> usize,
    ) -> Result<(PageId, LeafNode), TableError> {
        let mut page = self.root_page;

        for _ in 0..=self.pager.num_pages() {
            match self.node(page)? {
                Node::Leaf(leaf) => return Ok((page, leaf)),
                Node::Internal(internal) => page = internal.child_at(choose(&internal)),
            }
        }

        Err(corrupted("descent does not reach a leaf"))
    }

    fn find_leaf(&self, key: Key) -> Result<(PageId, LeafNode), TableError> {
        self.descend(|internal| internal.find_child_index(key))
    }

    pub(crate) fn leftmost_leaf(&self) -> Result<LeafNode, TableError> {
        self.descend(|_| 0).map(|(_, leaf)| leaf)
    }

    pub(crate) fn next_leaf(&self, leaf: &LeafNode) -> Result<Option<LeafNode>, TableError> {
        if leaf.next_leaf == LEFTMOST_LEAF_INDEX {
            return Ok(None);
        }
        self.leaf(leaf.next_leaf).map(Some)
    }

    /// Locate the leaf and slot for `key`
    pub fn find(&self, key: Key) -> Result<(PageId, Slot), TableError> {
        let (page, leaf) = self.find_leaf(key)?;

        let slot = match leaf.find(key) {
            Ok(index) => Slot::Occupied(index),
            Err(index) => Slot::Vacant(index),
        };

        Ok((page, slot))
    }

    pub fn get(&self, id: Key) -> Result<Option<Row>, TableError> {
        let (_, leaf) = self.find_leaf(id)?;

        Ok(leaf
            .find(id)
            .ok()
            .map(|index| row::decode(&leaf.cells[index].value)))
    }

    /// All rows in ascending id order, read lazily
    pub fn select(&self) -> Cursor<'_> {
        Cursor::new(self)
    }

    pub fn insert(&mut self, row: &Row) -> Result<(), TableError> {
        let value = row::encode(row)?;

        let (page, mut leaf) = self.find_leaf(row.id)?;
        let index = match leaf.find(row.id) {
            Ok(_) => return Err(TableError::DuplicateKey(row.id)),
            Err(index) => index,
        };

        let cell = LeafCell { key: row.id, value };

        if leaf.cells.len() < self.config.leaf_max_cells {
            leaf.cells.insert(index, cell);
            return self.write_node(page, &Node::Leaf(leaf));
        }

        // Fail before touching anything if the split cascade cannot get its pages
        let needed = self.pages_needed_for_split(&leaf)?;
        if needed > self.pager.free_pages() {
            debug!(needed, free = self.pager.free_pages(), "table full");
            return Err(TableError::TableFull);
        }

        self.split_leaf_and_insert(page, leaf, index, cell)
    }

    /// New pages a split of the full `leaf` allocates, counting every ancestor it overflows
    fn pages_needed_for_split(&self, leaf: &LeafNode) -> Result<u32, TableError> {
        let mut needed = 1;
        if leaf.is_root {
            return Ok(needed + 1);
        }

        let mut parent = leaf.parent;
        for _ in 0..=self.pager.num_pages() {
            let node = self.internal(parent)?;
            if node.cells.len() < self.config.internal_max_cells {
                return Ok(needed);
            }

            needed += 1;
            if node.is_root {
                return Ok(needed + 1);
            }
            parent = node.parent;
        }

        Err(corrupted("parent pointers never reach a root"))
    }

    fn split_leaf_and_insert(
        &mut self,
        page: PageId,
        mut leaf: LeafNode,
        index: usize,
        cell: LeafCell,
    ) -> Result<(), TableError> {
        let new_page = self.pager.allocate_page()?;

        let mut cells = std::mem::take(&mut leaf.cells);
        cells.insert(index, cell);

        // The old leaf keeps the larger half
        let split_at = cells.len() - cells.len() / 2;

        let right = LeafNode {
            is_root: false,
            parent: leaf.parent,
            next_leaf: leaf.next_leaf,
            cells: cells.split_off(split_at),
        };
        leaf.cells = cells;
        leaf.next_leaf = new_page;

        let left_max = leaf
            .max_key()
            .ok_or_else(|| corrupted(format!("split of page {page} left it empty")))?;

        debug!(page, new_page, left_max, "leaf split");

        if leaf.is_root {
            return self.create_new_root(page, Node::Leaf(leaf), left_max, new_page, Node::Leaf(right));
        }

        let parent = leaf.parent;
        self.write_node(page, &Node::Leaf(leaf))?;
        self.write_node(new_page, &Node::Leaf(right))?;

        self.insert_into_parent(parent, page, left_max, new_page)
    }

    /// Put a new internal root above `left` and `right`. The old root keeps its page.
    fn create_new_root(
        &mut self,
        left_page: PageId,
        mut left: Node,
        left_max: Key,
        right_page: PageId,
        mut right: Node,
    ) -> Result<(), TableError> {
        let root_page = self.pager.allocate_page()?;

        left.set_root(false);
        left.set_parent(root_page);
        right.set_root(false);
        right.set_parent(root_page);

        self.write_node(left_page, &left)?;
        self.write_node(right_page, &right)?;

        let root = InternalNode {
            is_root: true,
            parent: 0,
            cells: vec![InternalCell {
                child: left_page,
                key: left_max,
            }],
            right_child: right_page,
        };
        self.write_node(root_page, &Node::Internal(root))?;

        debug!(old_root = self.root_page, new_root = root_page, "root split");
        self.root_page = root_page;
        Ok(())
    }

    /// Register `right_page` next to its freshly split sibling `left_page`,
    /// splitting ancestors for as long as they overflow
    fn insert_into_parent(
        &mut self,
        mut parent_page: PageId,
        mut left_page: PageId,
        mut left_max: Key,
        mut right_page: PageId,
    ) -> Result<(), TableError> {
        loop {
            let mut parent = self.internal(parent_page)?;

            match parent.index_of_child(left_page) {
                Some(index) if index < parent.cells.len() => {
                    // right took over the upper part of left's range, and with it left's old key
                    let old_key = parent.cells[index].key;
                    parent.cells[index].key = left_max;
                    parent.cells.insert(
                        index + 1,
                        InternalCell {
                            child: right_page,
                            key: old_key,
                        },
                    );
                }
                Some(_) => {
                    parent.cells.push(InternalCell {
                        child: left_page,
                        key: left_max,
                    });
                    parent.right_child = right_page;
                }
                None => {
                    return Err(corrupted(format!(
                        "page {left_page} is missing from its parent {parent_page}"
                    )));
                }
            }

            if parent.cells.len() <= self.config.internal_max_cells {
                return self.write_node(parent_page, &Node::Internal(parent));
            }

            let new_page = self.pager.allocate_page()?;

            let mid = parent.cells.len() / 2;
            let mut right_cells = parent.cells.split_off(mid);
            let separator = right_cells.remove(0);

            let right = InternalNode {
                is_root: false,
                parent: parent.parent,
                cells: right_cells,
                right_child: parent.right_child,
            };
            parent.right_child = separator.child;

            let moved: Vec<PageId> = right.children().collect();
            for child in moved {
                self.set_parent(child, new_page)?;
            }

            debug!(page = parent_page, new_page, separator = separator.key, "internal split");

            if parent.is_root {
                return self.create_new_root(
                    parent_page,
                    Node::Internal(parent),
                    separator.key,
                    new_page,
                    Node::Internal(right),
                );
            }

            let grandparent = parent.parent;
            self.write_node(parent_page, &Node::Internal(parent))?;
            self.write_node(new_page, &Node::Internal(right))?;

            left_page = parent_page;
            left_max = separator.key;
            right_page = new_page;
            parent_page = grandparent;
        }
    }

    fn set_parent(&mut self, page: PageId, parent: PageId) -> Result<(), TableError> {
        let mut node = self.node(page)?;
        node.set_parent(parent);
        self.write_node(page, &node)
    }

    /// Depth of every leaf, left to right; a balanced tree gives one distinct value
    pub fn depth_of_leaves(&self) -> Result<Vec<usize>, TableError> {
        let mut depths = vec![];
        let mut stack = vec![(self.root_page, 0usize)];

        while let Some((page, depth)) = stack.pop() {
            if depth > self.pager.num_pages() as usize {
                return Err(corrupted("tree contains a cycle"));
            }

            match self.node(page)? {
                Node::Leaf(_) => depths.push(depth),
                Node::Internal(internal) => {
                    let children: Vec<PageId> = internal.children().collect();
                    stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
                }
            }
        }

        Ok(depths)
    }

    /// Indented dump of the tree, one node or key per line
    pub fn render_tree(&self) -> Result<String, TableError> {
        let mut lines = vec![];
        self.render_node(self.root_page, 0, &mut lines)?;
        Ok(lines.join("\n"))
    }

    fn render_node(
        &self,
        page: PageId,
        level: usize,
        lines: &mut Vec<String>,
    ) -> Result<(), TableError> {
        if level > self.pager.num_pages() as usize {
            return Err(corrupted("tree contains a cycle"));
        }

        let indent = "  ".repeat(level);
        match self.node(page)? {
            Node::Leaf(leaf) => {
                lines.push(format!("{indent}- leaf (size {})", leaf.cells.len()));
                for cell in leaf.cells.iter() {
                    lines.push(format!("{indent}  - {}", cell.key));
                }
            }
            Node::Internal(internal) => {
                lines.push(format!("{indent}- internal (size {})", internal.cells.len()));
                for cell in internal.cells.iter() {
                    self.render_node(cell.child, level + 1, lines)?;
                    lines.push(format!("{indent}  - key {}", cell.key));
                }
                self.render_node(internal.right_child, level + 1, lines)?;
            }
        }

        Ok(())
    }

    /// Layout sizes and configured limits, as shown by `.constants`
    pub fn constants(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("ROW_SIZE", ROW_SIZE),
            ("COMMON_NODE_HEADER_SIZE", COMMON_NODE_HEADER_SIZE),
            ("LEAF_NODE_HEADER_SIZE", LEAF_NODE_HEADER_SIZE),
            ("LEAF_NODE_CELL_SIZE", LEAF_NODE_CELL_SIZE),
            ("LEAF_NODE_SPACE_FOR_CELLS", LEAF_NODE_SPACE_FOR_CELLS),
            ("LEAF_NODE_MAX_CELLS", self.config.leaf_max_cells),
            ("INTERNAL_NODE_MAX_CELLS", self.config.internal_max_cells),
            ("TABLE_MAX_PAGES", self.config.max_pages as usize),
        ]
    }
}
