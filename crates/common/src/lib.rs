//! Shared identifiers, error handling and configuration for the paged
//! storage substrate: the fixed-size page file plus the write-back buffer
//! pool that sits in front of it.
//!
//! This crate carries nothing higher-level than that: no rows, no records,
//! no SQL. It is the vocabulary the `storage` (disk) and `buffer` (cache)
//! layers share so that one can decorate the other behind a single trait.

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::{io, path::PathBuf};
use thiserror::Error;

/// Page size in bytes. Every page read from or written to disk is exactly
/// one `PAGE_SIZE` transfer at offset `page_number * PAGE_SIZE`.
pub const PAGE_SIZE: usize = 4096;

/// Page count a freshly created database file starts with.
pub const INITIAL_PAGES_NUMBER: u64 = 256;

/// Default number of frames the buffer pool preallocates.
pub const DEFAULT_BUFFER_POOL_PAGES: usize = 2048;

/// Raw contents of a single page, always exactly [`PAGE_SIZE`] bytes.
pub type PageBuf = [u8; PAGE_SIZE];

/// Logical identifier for a page within a table's page file.
///
/// Page `0` is overloaded: it names the header page, doubles as the
/// "invalid page" sentinel, and also as "no free page" when found in a
/// `free_page_number` slot. This is safe only because the header page is
/// never itself placed on the free list.
///
/// Examples:
/// - `let header = PageId::HEADER;`
/// - `let tenth = PageId(10);`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(pub u64);

impl PageId {
    /// Page 0: the header page, and the free-list terminator / invalid sentinel.
    pub const HEADER: PageId = PageId(0);

    pub fn is_header(self) -> bool {
        self.0 == 0
    }
}

/// Opaque handle returned by `open_database`, identifying one open page
/// file. Assigned from an internal counter starting at `1`, independent of
/// any OS file descriptor, so it can never collide with the `TableId(0)`
/// that would otherwise be confused with an unused/sentinel slot.
///
/// Examples:
/// - `let t = TableId(1); // first table opened this process`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableId(pub u64);

/// Canonical error type shared across the storage substrate.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("failed to open database file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create database file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to grow database file: {0}")]
    Grow(#[source] io::Error),
    #[error("invalid database file: bad magic number (expected {expected:#x}, found {found:#x})")]
    Validate { expected: u64, found: u64 },
    #[error("unknown table id {0:?}")]
    UnknownTable(TableId),
    #[error("buffer pool exhausted: every frame is pinned")]
    PoolExhausted,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias that carries a [`DbError`].
pub type DbResult<T> = Result<T, DbError>;

/// Legacy numeric status codes from the original page-manager contract.
///
/// The Rust API reports these conditions through [`DbError`] variants
/// instead of sentinel integers; the constants are kept only as documented
/// compatibility markers for readers of the original interface.
pub mod codes {
    pub const F_SUCCESS: i64 = 1;
    pub const F_OPENFAIL: i64 = -1;
    pub const F_CREATEFAIL: i64 = -2;
    pub const F_TRUNCATEFAIL: i64 = -3;
    pub const F_VALIDATEFAIL: i64 = -4;
}

/// Shared contract implemented by both the disk layer and the buffer layer
/// that decorates it. Callers are written against this trait so the two
/// are interchangeable.
pub trait PageManager {
    /// Opens or creates the page file at `path`. Returns a handle usable as
    /// the first argument of every other method.
    fn open_database(&mut self, path: &std::path::Path) -> DbResult<TableId>;

    /// Returns a page number for exclusive use by the caller. The page's
    /// contents are not initialised; callers must overwrite them.
    fn alloc_page(&mut self, table: TableId) -> DbResult<PageId>;

    /// Returns a page to the free list. After this call the caller must
    /// not use `page` again until it is handed back by `alloc_page`.
    fn free_page(&mut self, table: TableId, page: PageId) -> DbResult<()>;

    /// Copies `PAGE_SIZE` bytes from `page` into `dest`.
    fn read_page(&mut self, table: TableId, page: PageId, dest: &mut PageBuf) -> DbResult<()>;

    /// Copies `PAGE_SIZE` bytes from `src` into `page`.
    fn write_page(&mut self, table: TableId, page: PageId, src: &PageBuf) -> DbResult<()>;
}

/// Runtime configuration for the storage substrate.
///
/// # Example
/// ```
/// use common::Config;
///
/// let config = Config::builder().buffer_pool_pages(512).build();
/// assert_eq!(config.buffer_pool_pages, 512);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, bon::Builder)]
pub struct Config {
    /// Directory table page files live in, for callers that lay out
    /// multiple tables under one root.
    #[builder(default = PathBuf::from("./db_data"))]
    pub data_dir: PathBuf,
    /// Number of frames the buffer pool keeps resident.
    #[builder(default = DEFAULT_BUFFER_POOL_PAGES)]
    pub buffer_pool_pages: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./db_data"),
            buffer_pool_pages: DEFAULT_BUFFER_POOL_PAGES,
        }
    }
}

impl Config {
    /// Resolves a table's page-file path under `data_dir`.
    ///
    /// # Example
    /// ```
    /// use common::Config;
    ///
    /// let config = Config::builder()
    ///     .data_dir(std::path::PathBuf::from("/var/db"))
    ///     .build();
    /// assert_eq!(config.table_path("users.db"), std::path::PathBuf::from("/var/db/users.db"));
    /// ```
    pub fn table_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }
}
