//! Dispatch State
//!
//! How the next fetched code byte is interpreted, plus the
//! machine-state snapshot used for diagnostic dumps.
//!
//! An extended instruction is laid out as
//! `prefix, N, sub-opcode, arg1 .. argN`: the length byte counts the
//! arguments after the sub-opcode, so `N + 1` payload bytes follow it.

use std::fmt;
use std::mem;

use crate::bytecode::instruction::ExtendedCommand;

/// Decoder state; `start` is the code address of the prefix byte
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DispatchState {
    /// Next byte is a single-byte opcode
    #[default]
    Normal,

    /// Next byte is the argument count
    ReadLength { start: usize },

    /// Next `remaining` bytes belong to the pending command
    ReadPayload {
        start: usize,
        remaining: usize,
        command: ExtendedCommand,
    },

    /// Pending command is complete; executes without a fetch
    Dispatch {
        start: usize,
        command: ExtendedCommand,
    },
}

impl DispatchState {
    /// Consume one code byte of an extended instruction.
    /// `Normal` and `Dispatch` are returned unchanged.
    pub fn feed(self, byte: u8) -> Self {
        match self {
            DispatchState::ReadLength { start } => {
                let remaining = usize::from(byte) + 1;
                DispatchState::ReadPayload {
                    start,
                    remaining,
                    command: ExtendedCommand::with_capacity(remaining),
                }
            }
            DispatchState::ReadPayload {
                start,
                remaining,
                mut command,
            } => {
                command.push(byte);
                match remaining - 1 {
                    0 => DispatchState::Dispatch { start, command },
                    remaining => DispatchState::ReadPayload {
                        start,
                        remaining,
                        command,
                    },
                }
            }
            other => other,
        }
    }

    /// Replace with `Normal`, returning the previous state
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Numeric state code shown in dumps
    pub fn code(&self) -> u8 {
        match self {
            DispatchState::Normal => 0,
            DispatchState::ReadLength { .. } => 1,
            DispatchState::ReadPayload { .. } => 2,
            DispatchState::Dispatch { .. } => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DispatchState::Normal => "normal",
            DispatchState::ReadLength { .. } => "read-length",
            DispatchState::ReadPayload { .. } => "read-payload",
            DispatchState::Dispatch { .. } => "dispatch",
        }
    }
}

/// Owned copy of everything the dump shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineState {
    pub cells: Vec<u8>,
    pub cursor: usize,
    pub state: DispatchState,
    pub loop_stack: Vec<i64>,
    pub user_stack: Vec<i64>,
    pub call_stack: Vec<i64>,
    pub pc: usize,
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.cells.get(self.cursor).copied().unwrap_or_default();
        writeln!(f, "========MACHINE STATE========")?;
        writeln!(f, "Buffer[size:{}]: {:?}", self.cells.len(), self.cells)?;
        writeln!(f, "^(0x{:02X} at 0x{:X})", cell, self.cursor)?;
        writeln!(f, "PSC: 0x{:X} ({})", self.state.code(), self.state.label())?;
        writeln!(f, "Loop Stack: {:?}", self.loop_stack)?;
        writeln!(f, "User Stack: {:?}", self.user_stack)?;
        writeln!(f, "Call Stack: {:?}", self.call_stack)?;
        writeln!(f, "Program Counter: 0x{:X}", self.pc)?;
        writeln!(f, "=============================")
    }
}
