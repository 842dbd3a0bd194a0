pub mod memory;
pub mod stack;
pub mod state;
pub mod vm;

pub use memory::Tape;
pub use stack::{Stack, StackKind};
pub use state::{DispatchState, MachineState};
pub use vm::{Halt, Step, VirtualMachine};
