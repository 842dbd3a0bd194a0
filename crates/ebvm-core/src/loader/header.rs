//! Program Header
//!
//! Layout and validation of the fixed 16-byte file header.
//! This layer performs structural validation only.

use std::io::{Read, Seek};

use tracing::debug;

use crate::error::{VmError, VmResult};
use super::reader::PagedReader;

/// Header length; the code region starts here
pub const HEADER_LENGTH: usize = 16;

/// Magic bytes at offsets 0..3
pub const MAGIC: [u8; 3] = [0x27, 0x26, 0x4A];

/// Supported format version (offset 3)
pub const VERSION: u8 = 0x00;

/// The only header this engine accepts
pub const EXPECTED_HEADER: [u8; HEADER_LENGTH] = [
    MAGIC[0], MAGIC[1], MAGIC[2],
    VERSION,
    0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00,
];

fn field_name(offset: usize) -> &'static str {
    match offset {
        0..=2 => "magic",
        3 => "version",
        _ => "reserved",
    }
}

/// Check the header byte-for-byte through the reader.
pub fn validate_header<R: Read + Seek>(reader: &mut PagedReader<R>) -> VmResult<()> {
    for (offset, &expected) in EXPECTED_HEADER.iter().enumerate() {
        let found = reader
            .at(offset as i64)
            .ok_or(VmError::UnexpectedEof { offset })?;

        if found != expected {
            return Err(VmError::HeaderMismatch {
                field: field_name(offset),
                offset,
                expected,
                found,
            });
        }
    }

    debug!(version = VERSION, "header accepted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn check(bytes: Vec<u8>) -> VmResult<()> {
        validate_header(&mut PagedReader::new(Cursor::new(bytes)))
    }

    #[test]
    fn accepts_exact_header() {
        assert!(check(EXPECTED_HEADER.to_vec()).is_ok());

        let mut with_code = EXPECTED_HEADER.to_vec();
        with_code.extend([0xFF, 0xFF]);
        assert!(check(with_code).is_ok());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = EXPECTED_HEADER.to_vec();
        bytes[0] = 0x28;
        match check(bytes) {
            Err(VmError::HeaderMismatch { field, offset, expected, found }) => {
                assert_eq!(field, "magic");
                assert_eq!(offset, 0);
                assert_eq!(expected, 0x27);
                assert_eq!(found, 0x28);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = EXPECTED_HEADER.to_vec();
        bytes[3] = 0x01;
        match check(bytes) {
            Err(VmError::HeaderMismatch { field, offset, .. }) => {
                assert_eq!(field, "version");
                assert_eq!(offset, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_nonzero_reserved() {
        let mut bytes = EXPECTED_HEADER.to_vec();
        bytes[15] = 0x01;
        assert!(matches!(
            check(bytes),
            Err(VmError::HeaderMismatch { field: "reserved", offset: 15, .. })
        ));
    }

    #[test]
    fn short_header_is_eof() {
        let bytes = EXPECTED_HEADER[..7].to_vec();
        assert!(matches!(check(bytes), Err(VmError::UnexpectedEof { offset: 7 })));
        assert!(matches!(check(Vec::new()), Err(VmError::UnexpectedEof { offset: 0 })));
    }
}
