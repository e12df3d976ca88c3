pub type PageId = u32;

pub const PAGE_SIZE: usize = 4096;

/// A fixed-size block of the database file, stored at `id * PAGE_SIZE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub id: PageId,
    /// Raw page bytes, always exactly `PAGE_SIZE` long
    pub data: Vec<u8>,
}

impl Page {
    pub fn zeroed(id: PageId) -> Self {
        Self {
            id,
            data: vec![0u8; PAGE_SIZE],
        }
    }

    pub fn file_offset(&self) -> u64 {
        file_offset(self.id)
    }
}

pub fn file_offset(id: PageId) -> u64 {
    u64::from(id) * PAGE_SIZE as u64
}
