use super::page::PageId;

/// Root leaf of a fresh table. It never moves, so it stays the leftmost leaf
/// for the lifetime of the file and a next-leaf link can never point at it.
pub const LEFTMOST_LEAF_INDEX: PageId = 0;
