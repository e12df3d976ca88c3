use bincode::{Decode, Encode};

use super::super::storage_layer::page::{PAGE_SIZE, PageId};
use super::row::{ROW_SIZE, RowBytes};

pub type Key = i32;

/*
 * Page layout, as produced by bincode with fixed-width integers.
 * The enum tag comes first, then the header fields, then the cells.
 */
pub const NODE_TYPE_SIZE: usize = size_of::<u32>();
pub const IS_ROOT_SIZE: usize = size_of::<u8>();
pub const PARENT_POINTER_SIZE: usize = size_of::<PageId>();
pub const COMMON_NODE_HEADER_SIZE: usize = NODE_TYPE_SIZE + IS_ROOT_SIZE + PARENT_POINTER_SIZE;
pub const CELL_COUNT_SIZE: usize = size_of::<u64>();

pub const LEAF_NODE_NEXT_LEAF_SIZE: usize = size_of::<PageId>();
pub const LEAF_NODE_HEADER_SIZE: usize =
    COMMON_NODE_HEADER_SIZE + LEAF_NODE_NEXT_LEAF_SIZE + CELL_COUNT_SIZE;
pub const LEAF_NODE_CELL_SIZE: usize = size_of::<Key>() + ROW_SIZE;
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;
pub const LEAF_NODE_MAX_CELLS: usize = LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE;

pub const INTERNAL_NODE_RIGHT_CHILD_SIZE: usize = size_of::<PageId>();
pub const INTERNAL_NODE_HEADER_SIZE: usize =
    COMMON_NODE_HEADER_SIZE + CELL_COUNT_SIZE + INTERNAL_NODE_RIGHT_CHILD_SIZE;
pub const INTERNAL_NODE_CELL_SIZE: usize = size_of::<PageId>() + size_of::<Key>();
pub const INTERNAL_NODE_MAX_CELLS: usize =
    (PAGE_SIZE - INTERNAL_NODE_HEADER_SIZE) / INTERNAL_NODE_CELL_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct LeafCell {
    pub key: Key,
    pub value: RowBytes,
}

/// Holds rows, ordered by key
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct LeafNode {
    pub is_root: bool,
    pub parent: PageId,
    /// Right sibling, 0 on the rightmost leaf
    pub next_leaf: PageId,
    pub cells: Vec<LeafCell>,
}

/// Routing entry: every key under `child` is <= `key`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct InternalCell {
    pub child: PageId,
    pub key: Key,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct InternalNode {
    pub is_root: bool,
    pub parent: PageId,
    pub cells: Vec<InternalCell>,
    /// Holds every key greater than the last cell's key
    pub right_child: PageId,
}

// Leaf must stay the first variant: a zeroed page then decodes as an empty leaf
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Node {
    Leaf(LeafNode),
    Internal(InternalNode),
}

impl LeafNode {
    pub fn new_root() -> Self {
        Self {
            is_root: true,
            parent: 0,
            next_leaf: 0,
            cells: vec![],
        }
    }

    /// `Ok` with the slot holding `key`, or `Err` with the slot it would be inserted at
    pub fn find(&self, key: Key) -> Result<usize, usize> {
        self.cells.binary_search_by_key(&key, |cell| cell.key)
    }

    pub fn max_key(&self) -> Option<Key> {
        self.cells.last().map(|cell| cell.key)
    }
}

impl InternalNode {
    /// Index of the child whose range holds `key`; `cells.len()` means the right child
    pub fn find_child_index(&self, key: Key) -> usize {
        self.cells.partition_point(|cell| cell.key < key)
    }

    pub fn child_at(&self, index: usize) -> PageId {
        match self.cells.get(index) {
            Some(cell) => cell.child,
            None => self.right_child,
        }
    }

    pub fn index_of_child(&self, child: PageId) -> Option<usize> {
        if self.right_child == child {
            return Some(self.cells.len());
        }

        self.cells.iter().position(|cell| cell.child == child)
    }

    pub fn children(&self) -> impl Iterator<Item = PageId> + '_ {
        self.cells
            .iter()
            .map(|cell| cell.child)
            .chain(std::iter::once(self.right_child))
    }
}

impl Node {
    pub fn is_root(&self) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.is_root,
            Node::Internal(internal) => internal.is_root,
        }
    }

    pub fn set_root(&mut self, is_root: bool) {
        match self {
            Node::Leaf(leaf) => leaf.is_root = is_root,
            Node::Internal(internal) => internal.is_root = is_root,
        }
    }

    pub fn parent(&self) -> PageId {
        match self {
            Node::Leaf(leaf) => leaf.parent,
            Node::Internal(internal) => internal.parent,
        }
    }

    pub fn set_parent(&mut self, parent: PageId) {
        match self {
            Node::Leaf(leaf) => leaf.parent = parent,
            Node::Internal(internal) => internal.parent = parent,
        }
    }
}
