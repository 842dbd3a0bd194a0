pub mod header;
pub mod reader;

pub use header::{validate_header, EXPECTED_HEADER, HEADER_LENGTH};
pub use reader::{PagedReader, MAX_PAGE_SIZE, PAGE_SIZE};
