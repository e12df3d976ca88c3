use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use super::error::StorageError;
use super::page::{PAGE_SIZE, Page, PageId};

/// Page-granular access to the database file.
/// Owns the one file handle of a session, it is closed when this is dropped.
#[derive(Debug)]
pub struct Storage {
    file: File,
    /// Pages present on disk, a trailing partial page included
    file_pages: u32,
}

impl Storage {
    /// Open the database file, creating it if missing
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let file_len = file.metadata()?.len();
        let file_pages = u32::try_from(file_len.div_ceil(PAGE_SIZE as u64))
            .map_err(|_| StorageError::FileTooLarge(file_len))?;

        if file_len % PAGE_SIZE as u64 != 0 {
            debug!(file_len, "database file ends in a partial page");
        }

        Ok(Self { file, file_pages })
    }

    pub fn file_pages(&self) -> u32 {
        self.file_pages
    }

    /// Fill `page` from disk. Pages past the end of the file are left as they are,
    /// a short final page only overwrites its prefix.
    pub fn read_page(&self, page: &mut Page) -> Result<(), StorageError> {
        if page.id >= self.file_pages {
            return Ok(());
        }

        let mut file = &self.file;
        file.seek(SeekFrom::Start(page.file_offset()))?;

        let mut buffer = Vec::with_capacity(PAGE_SIZE);
        file.take(PAGE_SIZE as u64).read_to_end(&mut buffer)?;
        page.data[..buffer.len()].copy_from_slice(&buffer);

        debug!(page = page.id, bytes = buffer.len(), "read page");
        Ok(())
    }

    /// Write a whole page at its file offset
    pub fn write_page(&mut self, page: &Page) -> Result<(), StorageError> {
        self.file.seek(SeekFrom::Start(page.file_offset()))?;
        self.file.write_all(&page.data)?;

        if page.id >= self.file_pages {
            self.file_pages = page.id + 1;
        }

        debug!(page = page.id, "wrote page");
        Ok(())
    }

    pub fn sync(&self) -> Result<(), StorageError> {
        self.file.sync_all()?;
        Ok(())
    }

    pub fn contains(&self, id: PageId) -> bool {
        id < self.file_pages
    }
}
