//! Paged Program Reader
//!
//! Random-addressable byte access over a seekable source, one fixed-size
//! page at a time. Only the most recently loaded page is kept.

use std::io::{Read, Seek, SeekFrom};

use tracing::{trace, warn};

/// Default page size in bytes
pub const PAGE_SIZE: usize = 256;

/// Largest accepted page size; bigger requests are clamped
pub const MAX_PAGE_SIZE: usize = 64 * 1024;

/// A loaded run of bytes; `data.len()` is the valid size
#[derive(Debug)]
struct Page {
    start: u64,
    data: Vec<u8>,
}

impl Page {
    fn get(&self, address: u64) -> Option<u8> {
        let offset = address.checked_sub(self.start)?;
        self.data.get(usize::try_from(offset).ok()?).copied()
    }
}

/// Single-page cache over a `Read + Seek` program source
#[derive(Debug)]
pub struct PagedReader<R> {
    source: R,
    page_size: usize,
    page: Option<Page>,
}

impl<R: Read + Seek> PagedReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_page_size(source, PAGE_SIZE)
    }

    pub fn with_page_size(source: R, page_size: usize) -> Self {
        PagedReader {
            source,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            page: None,
        }
    }

    /// Byte at `address`, or `None` when the address is negative or lies
    /// past the end of the source.
    pub fn at(&mut self, address: i64) -> Option<u8> {
        let address = u64::try_from(address).ok()?;

        if let Some(byte) = self.page.as_ref().and_then(|page| page.get(address)) {
            return Some(byte);
        }

        let size = self.page_size as u64;
        let page = self.load_page(address / size * size);
        let byte = page.get(address);
        self.page = Some(page);
        byte
    }

    /// Drop the cached page; the next lookup reloads from the source.
    pub fn invalidate(&mut self) {
        self.page = None;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Start address and valid size of the cached page
    pub fn cached_page(&self) -> Option<(u64, usize)> {
        self.page.as_ref().map(|page| (page.start, page.data.len()))
    }

    /// Release the backing source
    pub fn into_inner(self) -> R {
        self.source
    }

    fn load_page(&mut self, start: u64) -> Page {
        let mut data = Vec::with_capacity(self.page_size.min(PAGE_SIZE));

        if let Err(e) = self.source.seek(SeekFrom::Start(start)) {
            warn!(start, error = %e, "seek failed, treating page as empty");
            return Page { start, data };
        }

        // read_to_end keeps whatever was read before an error
        if let Err(e) = (&mut self.source)
            .take(self.page_size as u64)
            .read_to_end(&mut data)
        {
            warn!(start, read = data.len(), error = %e, "read failed, truncating page");
        }

        trace!(start, size = data.len(), "page loaded");
        Page { start, data }
    }
}
