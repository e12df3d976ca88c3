use super::error::StorageError;
use super::page::{Page, PageId};
use super::storage::Storage;

use tracing::{debug, info, warn};

use std::path::Path;

use std::cell::{Cell, Ref, RefCell};

#[derive(Debug)]
struct Frame {
    page: Page,
    dirty: bool,
}

/// The page store: every page a table touches lives here, loaded lazily and
/// written back on `flush`/`close`. Nothing is evicted, so the pool holds at
/// most `max_pages` pages.
#[derive(Debug)]
pub struct BufferPool {
    storage: Storage,
    //pages are refcell bc they are a cache that is filled by read ops
    pages: RefCell<Vec<Option<Frame>>>,
    num_pages: Cell<u32>,
    max_pages: u32,
    closed: bool,
}

impl BufferPool {
    pub fn new<P: AsRef<Path>>(path: P, max_pages: u32) -> Result<Self, StorageError> {
        let storage = Storage::new(path)?;

        let num_pages = storage.file_pages();
        if num_pages > max_pages {
            return Err(StorageError::OutOfBounds {
                page: num_pages - 1,
                max_pages,
            });
        }

        Ok(Self {
            storage,
            pages: RefCell::new(Vec::new()),
            num_pages: Cell::new(num_pages),
            max_pages,
            closed: false,
        })
    }

    /// Pages handed out so far, flushed or not
    pub fn num_pages(&self) -> u32 {
        self.num_pages.get()
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    pub fn free_pages(&self) -> u32 {
        self.max_pages - self.num_pages.get()
    }

    //place page into cache
    fn bump_page(&self, id: PageId) -> Result<(), StorageError> {
        if id >= self.max_pages {
            return Err(StorageError::OutOfBounds {
                page: id,
                max_pages: self.max_pages,
            });
        }

        let mut pages = self.pages.borrow_mut();
        let index = id as usize;
        if pages.get(index).is_some_and(Option::is_some) {
            return Ok(());
        }

        let mut page = Page::zeroed(id);
        self.storage.read_page(&mut page)?;

        // Pages past the end of the file only exist in memory until flushed
        let dirty = !self.storage.contains(id);

        if index >= pages.len() {
            pages.resize_with(index + 1, || None);
        }
        pages[index] = Some(Frame { page, dirty });

        if id >= self.num_pages.get() {
            self.num_pages.set(id + 1);
        }

        debug!(page = id, "page loaded");
        Ok(())
    }

    /// Get a page from the cache or load it from storage
    pub fn get_page(&self, id: PageId) -> Result<Ref<'_, Page>, StorageError> {
        self.bump_page(id)?;

        Ref::filter_map(self.pages.borrow(), |pages| {
            pages
                .get(id as usize)
                .and_then(Option::as_ref)
                .map(|frame| &frame.page)
        })
        .map_err(|_| StorageError::NotResident(id))
    }

    /// Get a mutable page, marking it dirty
    pub fn get_page_mut(&mut self, id: PageId) -> Result<&mut Page, StorageError> {
        self.bump_page(id)?;

        let frame = self
            .pages
            .get_mut()
            .get_mut(id as usize)
            .and_then(Option::as_mut)
            .ok_or(StorageError::NotResident(id))?;

        frame.dirty = true;
        Ok(&mut frame.page)
    }

    /// Hand out the next unused page number as a zeroed page
    pub fn allocate_page(&mut self) -> Result<PageId, StorageError> {
        let id = self.num_pages.get();
        self.get_page_mut(id)?;

        debug!(page = id, "page allocated");
        Ok(id)
    }

    /// Write one resident page to disk
    pub fn flush(&mut self, id: PageId) -> Result<(), StorageError> {
        let frame = self
            .pages
            .get_mut()
            .get_mut(id as usize)
            .and_then(Option::as_mut)
            .ok_or(StorageError::NotResident(id))?;

        self.storage.write_page(&frame.page)?;
        frame.dirty = false;

        Ok(())
    }

    /// Write every dirty page to disk
    pub fn flush_all(&mut self) -> Result<(), StorageError> {
        for frame in self.pages.get_mut().iter_mut().flatten() {
            if frame.dirty {
                self.storage.write_page(&frame.page)?;
                frame.dirty = false;
            }
        }

        Ok(())
    }

    /// Flush, sync and release the file. Consuming `self` makes a second close
    /// impossible to write.
    pub fn close(mut self) -> Result<(), StorageError> {
        self.flush_all()?;
        self.storage.sync()?;
        self.closed = true;

        info!(pages = self.num_pages.get(), "page store closed");
        Ok(())
    }
}

impl Drop for BufferPool {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        if let Err(e) = self.flush_all() {
            warn!(error = %e, "failed to flush pages on drop");
        }
    }
}
