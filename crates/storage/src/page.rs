//! On-disk layout of the header page and free-list pages.
//!
//! Fields are read and written at explicit byte offsets with an explicit
//! byte order, rather than overlaying a typed struct onto the raw frame.
//! That keeps the format portable and avoids the alignment and
//! strict-aliasing hazards of a pointer cast.

use byteorder::{ByteOrder, LittleEndian};
use common::{PageBuf, PageId};

/// Magic number that must be present in a valid page file's header page.
pub const MAGIC_NUMBER: u64 = 0x1234_1234;

const OFFSET_MAGIC: usize = 0;
const OFFSET_FREE_PAGE: usize = 8;
const OFFSET_NUM_PAGES: usize = 16;

/// Decoded contents of the header page (page 0).
///
/// Bytes beyond `number_of_pages` are reserved and left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub magic_number: u64,
    pub free_page_number: PageId,
    pub number_of_pages: u64,
}

impl Header {
    pub fn new(number_of_pages: u64, free_page_number: PageId) -> Self {
        Self {
            magic_number: MAGIC_NUMBER,
            free_page_number,
            number_of_pages,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic_number == MAGIC_NUMBER
    }

    pub fn read(buf: &PageBuf) -> Self {
        Self {
            magic_number: LittleEndian::read_u64(&buf[OFFSET_MAGIC..OFFSET_MAGIC + 8]),
            free_page_number: PageId(LittleEndian::read_u64(
                &buf[OFFSET_FREE_PAGE..OFFSET_FREE_PAGE + 8],
            )),
            number_of_pages: LittleEndian::read_u64(
                &buf[OFFSET_NUM_PAGES..OFFSET_NUM_PAGES + 8],
            ),
        }
    }

    pub fn write(&self, buf: &mut PageBuf) {
        LittleEndian::write_u64(&mut buf[OFFSET_MAGIC..OFFSET_MAGIC + 8], self.magic_number);
        LittleEndian::write_u64(
            &mut buf[OFFSET_FREE_PAGE..OFFSET_FREE_PAGE + 8],
            self.free_page_number.0,
        );
        LittleEndian::write_u64(
            &mut buf[OFFSET_NUM_PAGES..OFFSET_NUM_PAGES + 8],
            self.number_of_pages,
        );
    }
}

/// Reads the `next_free_page_number` link out of a free-page frame.
pub fn free_next(buf: &PageBuf) -> PageId {
    PageId(LittleEndian::read_u64(&buf[0..8]))
}

/// Writes the `next_free_page_number` link into a free-page frame. The
/// remainder of the page is left untouched.
pub fn set_free_next(buf: &mut PageBuf, next: PageId) {
    LittleEndian::write_u64(&mut buf[0..8], next.0);
}

/// A zeroed page buffer, the starting point for every frame.
pub fn zeroed() -> PageBuf {
    [0u8; common::PAGE_SIZE]
}
