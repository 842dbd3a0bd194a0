//! EBVM Error Types
//!
//! Defines every fatal condition produced by the engine.
//! Nothing here is recovered locally: an error ends the run.

use std::io;

use thiserror::Error;

use crate::bytecode::opcode::ExtOpCode;
use crate::vm::stack::StackKind;

#[derive(Debug, Error)]
pub enum VmError {
    // Format errors (raised before any instruction runs)
    #[error("unexpected eof at 0x{offset:X} while reading the header")]
    UnexpectedEof { offset: usize },

    #[error("unexpected {field} byte 0x{found:02X} (expected 0x{expected:02X}) at 0x{offset:X}")]
    HeaderMismatch {
        field: &'static str,
        offset: usize,
        expected: u8,
        found: u8,
    },

    // Decode errors
    #[error("unknown instruction at 0x{address:X}: 0x{opcode:02X}")]
    InvalidOpcode { opcode: u8, address: usize },

    #[error("undefined extended command 0x{opcode:02X} at 0x{address:X}")]
    UndefinedExtendedCommand { opcode: u8, address: usize },

    #[error("reserved extended command 0x{opcode:02X} at 0x{address:X}")]
    ReservedExtendedCommand { opcode: u8, address: usize },

    #[error("extended command {command:?} at 0x{address:X} takes {expected} argument(s), got {found}")]
    ExtendedArity {
        command: ExtOpCode,
        expected: usize,
        found: usize,
        address: usize,
    },

    #[error("extended instruction at 0x{address:X} truncated: {missing} byte(s) missing")]
    TruncatedExtendedInstruction { address: usize, missing: usize },

    // Stack discipline errors
    #[error("{stack} stack empty")]
    StackUnderflow { stack: StackKind },

    /// A popped loop or call entry that is not a code address. Stack
    /// entries are signed; the engine itself only pushes addresses.
    #[error("invalid jump target: {0}")]
    InvalidJumpTarget(i64),

    // IO boundary
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl VmError {
    /// True for errors raised while validating the program header.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            VmError::UnexpectedEof { .. } | VmError::HeaderMismatch { .. }
        )
    }
}

pub type VmResult<T> = Result<T, VmError>;
