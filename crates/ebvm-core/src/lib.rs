//! Extended Brainfuck VM - Core Library
//!
//! Public API surface for the engine: the paged program reader, the
//! tape and stacks, the opcode tables and the execution loop.

pub mod error;
pub mod config;
pub mod bytecode;
pub mod loader;
pub mod vm;

// Re-export commonly used types
pub use error::{VmError, VmResult};
pub use config::VmConfig;
pub use bytecode::opcode::{ExtOpCode, OpCode};
pub use loader::{PagedReader, EXPECTED_HEADER, HEADER_LENGTH};
pub use vm::{Halt, MachineState, StackKind, Step, VirtualMachine};
