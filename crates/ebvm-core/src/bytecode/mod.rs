pub mod instruction;
pub mod opcode;

pub use instruction::ExtendedCommand;
pub use opcode::{ExtOpCode, OpCode};
