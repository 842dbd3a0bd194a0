//! Bytecode Opcode Definitions
//!
//! Defines the raw opcode set of the program format.
//! This file contains no execution semantics.
//! Opcode values are an eternal contract.

/// Single-byte opcodes, decoded while the dispatcher is in the Normal state
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Nop = 0x00,

    // Native brainfuck instructions
    Output     = 0x18,
    Input      = 0x19,
    Increase   = 0x1A,
    Decrease   = 0x1B,
    PointerR   = 0x1C,
    PointerL   = 0x1D,
    Flag       = 0x1E,
    JumpToFlag = 0x1F,

    // Extensions
    RandomNum = 0x20,
    ExitProg  = 0x21,
    Call      = 0x22,
    Return    = 0x23,
    Push      = 0x24,
    Pop       = 0x25,

    // Debug
    Breakpoint = 0x30,

    MultibytePrefix = 0xE0,
}

impl OpCode {
    /// Convert raw byte to opcode
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(OpCode::Nop),

            0x18 => Some(OpCode::Output),
            0x19 => Some(OpCode::Input),
            0x1A => Some(OpCode::Increase),
            0x1B => Some(OpCode::Decrease),
            0x1C => Some(OpCode::PointerR),
            0x1D => Some(OpCode::PointerL),
            0x1E => Some(OpCode::Flag),
            0x1F => Some(OpCode::JumpToFlag),

            0x20 => Some(OpCode::RandomNum),
            0x21 => Some(OpCode::ExitProg),
            0x22 => Some(OpCode::Call),
            0x23 => Some(OpCode::Return),
            0x24 => Some(OpCode::Push),
            0x25 => Some(OpCode::Pop),

            0x30 => Some(OpCode::Breakpoint),

            0xE0 => Some(OpCode::MultibytePrefix),

            _ => None,
        }
    }
}

/// Sub-opcodes of the extended namespace (the byte after the length byte).
/// Values overlap the single-byte space on purpose.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtOpCode {
    Add    = 0x1A,
    Sub    = 0x1B,
    Assign = 0x1C,

    // Reserved by the format, no defined behavior
    JumpBack      = 0x1D,
    JumpImmediate = 0x1E,
}

impl ExtOpCode {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x1A => Some(ExtOpCode::Add),
            0x1B => Some(ExtOpCode::Sub),
            0x1C => Some(ExtOpCode::Assign),
            0x1D => Some(ExtOpCode::JumpBack),
            0x1E => Some(ExtOpCode::JumpImmediate),
            _ => None,
        }
    }

    /// Number of argument bytes the command requires
    pub fn arity(self) -> usize {
        match self {
            ExtOpCode::Add
            | ExtOpCode::Sub
            | ExtOpCode::Assign
            | ExtOpCode::JumpBack
            | ExtOpCode::JumpImmediate => 1,
        }
    }
}
