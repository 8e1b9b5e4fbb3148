//! A minimal paged file store.
//!
//! This is the "out of scope" collaborator a disk-resident index consults:
//! a byte-addressable store of uniformly sized pages identified by a dense
//! page id. It does no caching, no journaling, and no free-list reuse —
//! every new page is appended at `end_pid()` and pages are never reclaimed.
//! Everything above this module (buffering, latching, recovery) is the
//! caller's problem.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use log::{debug, trace, warn};

/// Size of a single page, in bytes.
pub const PAGE_SIZE: usize = 4096;

/// A dense page identifier. Negative values are reserved as sentinels by
/// callers (e.g. `INVALID_PID`); the store itself only ever hands out and
/// accepts ids in `0..end_pid()`.
pub type PageId = i32;

/// How a store is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Reject any `write` call.
    ReadOnly,
    /// Allow `write`; if the file is empty, callers may bootstrap it.
    ReadWrite,
}

/// Errors a page store can surface.
#[derive(Debug, thiserror::Error)]
pub enum PageStoreError {
    #[error("I/O error on page store: {0}")]
    Io(#[from] std::io::Error),

    #[error("page id {0} is out of range (end_pid = {1})")]
    OutOfRange(PageId, PageId),

    #[error("store opened read-only, write to page {0} rejected")]
    ReadOnly(PageId),
}

/// A single-file, positioned-I/O paged store.
///
/// Reads and writes use `read_at`/`write_at` rather than seeking a shared
/// file cursor, so the store needs no internal lock around the file handle
/// itself — only the page-id counter is shared mutable state.
#[derive(Debug)]
pub struct PageStore {
    file: File,
    next_pid: AtomicU32,
    mode: OpenMode,
}

impl PageStore {
    /// Opens (creating if absent) a paged file store backed by `path`.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self, PageStoreError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(mode == OpenMode::ReadWrite)
            .create(mode == OpenMode::ReadWrite)
            .open(path)?;

        let len = file.metadata()?.len();
        let next_pid = (len / PAGE_SIZE as u64) as u32;
        debug!(
            "opened page store at {:?} ({:?}), end_pid={}",
            path, mode, next_pid
        );

        Ok(Self {
            file,
            next_pid: AtomicU32::new(next_pid),
            mode,
        })
    }

    /// One past the largest allocated page id.
    pub fn end_pid(&self) -> PageId {
        self.next_pid.load(Ordering::SeqCst) as PageId
    }

    /// Reads page `pid` into `buf`.
    pub fn read(&self, pid: PageId, buf: &mut [u8; PAGE_SIZE]) -> Result<(), PageStoreError> {
        self.check_range(pid)?;
        trace!("read page {}", pid);
        let offset = pid as u64 * PAGE_SIZE as u64;
        self.file.read_exact_at(buf, offset).map_err(|e| {
            warn!("read of page {} failed: {}", pid, e);
            PageStoreError::Io(e)
        })
    }

    /// Writes `buf` to page `pid`. Writing to `pid == end_pid()` extends the
    /// store by one page and advances the counter.
    pub fn write(&self, pid: PageId, buf: &[u8; PAGE_SIZE]) -> Result<(), PageStoreError> {
        if self.mode == OpenMode::ReadOnly {
            return Err(PageStoreError::ReadOnly(pid));
        }
        if pid < 0 {
            return Err(PageStoreError::OutOfRange(pid, self.end_pid()));
        }
        trace!("write page {}", pid);
        let offset = pid as u64 * PAGE_SIZE as u64;
        self.file.write_all_at(buf, offset).map_err(|e| {
            warn!("write of page {} failed: {}", pid, e);
            PageStoreError::Io(e)
        })?;

        // Appending past the current tail extends the store.
        let next = pid as u32 + 1;
        let mut current = self.next_pid.load(Ordering::SeqCst);
        while next > current {
            match self.next_pid.compare_exchange(
                current,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
        Ok(())
    }

    fn check_range(&self, pid: PageId) -> Result<(), PageStoreError> {
        if pid < 0 || pid >= self.end_pid() {
            return Err(PageStoreError::OutOfRange(pid, self.end_pid()));
        }
        Ok(())
    }
}
