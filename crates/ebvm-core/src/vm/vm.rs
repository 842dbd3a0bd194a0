//! Virtual Machine Core
//!
//! Owns the tape, the three stacks, the program counter and the
//! dispatch state, and drives fetch -> decode -> execute over the
//! paged program reader.
//!
//! Termination is returned, never performed here: `execute` yields a
//! `Halt` on a clean stop and a `VmError` on any fatal condition, and
//! the caller decides what to do with the process.

use std::io::{self, Read, Seek, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument, trace, warn};

use crate::bytecode::instruction::ExtendedCommand;
use crate::bytecode::opcode::{ExtOpCode, OpCode};
use crate::config::VmConfig;
use crate::error::{VmError, VmResult};
use crate::loader::header::{validate_header, HEADER_LENGTH};
use crate::loader::reader::PagedReader;

use super::memory::Tape;
use super::stack::{Stack, StackKind};
use super::state::{DispatchState, MachineState};

/// Why a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// Ran off the end of the code region
    EndOfProgram,
    /// Explicit ExitProg instruction
    Exit,
}

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halt(Halt),
}

/// What a native instruction does to the program counter
enum Flow {
    Next,
    Jump(usize),
    Halt(Halt),
}

/// Extended Brainfuck Virtual Machine
#[derive(Debug)]
pub struct VirtualMachine<R, I, O> {
    config: VmConfig,
    reader: PagedReader<R>,
    input: I,
    output: O,

    tape: Tape,
    loop_stack: Stack,
    call_stack: Stack,
    user_stack: Stack,

    pc: usize,
    state: DispatchState,
    rng: StdRng,
    header_checked: bool,
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// The single argument of an Add/Sub/Assign command
fn single_arg(opcode: ExtOpCode, args: &[u8], address: usize) -> VmResult<u8> {
    match args {
        [arg] => Ok(*arg),
        _ => Err(VmError::ExtendedArity {
            command: opcode,
            expected: opcode.arity(),
            found: args.len(),
            address,
        }),
    }
}

/// Popped stack values are code addresses
fn jump_target(value: i64) -> VmResult<usize> {
    usize::try_from(value).map_err(|_| VmError::InvalidJumpTarget(value))
}

impl<R, I, O> VirtualMachine<R, I, O>
where
    R: Read + Seek,
    I: Read,
    O: Write,
{
    /// Create a new VM bound to a program source and I/O streams
    pub fn new(config: VmConfig, program: R, input: I, output: O) -> Self {
        VirtualMachine {
            reader: PagedReader::with_page_size(program, config.page_size),
            input,
            output,
            tape: Tape::new(),
            loop_stack: Stack::new(StackKind::Loop),
            call_stack: Stack::new(StackKind::Call),
            user_stack: Stack::new(StackKind::User),
            pc: 0,
            state: DispatchState::Normal,
            rng: make_rng(config.rng_seed),
            header_checked: false,
            config,
        }
    }

    /// Validate the header and run until halt or error.
    ///
    /// Decode and stack errors write the machine state to the output
    /// first (unless `dump_on_fatal` is off). Header errors do not, since
    /// no instruction has run.
    #[instrument(skip_all)]
    pub fn execute(&mut self) -> VmResult<Halt> {
        self.load()?;

        let result = loop {
            match self.step() {
                Ok(Step::Continue) => continue,
                Ok(Step::Halt(halt)) => break Ok(halt),
                Err(err) => break Err(err),
            }
        };

        match result {
            Ok(halt) => {
                debug!(?halt, pc = self.pc, "halted");
                self.output.flush()?;
                Ok(halt)
            }
            Err(err) => {
                if self.config.dump_on_fatal {
                    if let Err(e) = self.dump() {
                        warn!(error = %e, "failed to write machine state");
                    }
                }
                Err(err)
            }
        }
    }

    /// Validate the program header. Idempotent until `reset`.
    pub fn load(&mut self) -> VmResult<()> {
        if !self.header_checked {
            validate_header(&mut self.reader)?;
            self.header_checked = true;
        }
        Ok(())
    }

    /// Execute one fetch/decode unit.
    pub fn step(&mut self) -> VmResult<Step> {
        self.load()?;

        if let DispatchState::Dispatch { .. } = self.state {
            if let DispatchState::Dispatch { start, command } = self.state.take() {
                self.dispatch_extended(start, &command)?;
            }
            return Ok(Step::Continue);
        }

        let address = (self.pc + HEADER_LENGTH) as i64;
        let Some(byte) = self.reader.at(address) else {
            return match &self.state {
                DispatchState::ReadLength { start } => Err(VmError::TruncatedExtendedInstruction {
                    address: *start,
                    missing: 2,
                }),
                DispatchState::ReadPayload { start, remaining, .. } => {
                    Err(VmError::TruncatedExtendedInstruction {
                        address: *start,
                        missing: *remaining,
                    })
                }
                _ => Ok(Step::Halt(Halt::EndOfProgram)),
            };
        };

        trace!(pc = self.pc, byte, state = self.state.label(), "fetch");

        if self.state != DispatchState::Normal {
            self.state = self.state.take().feed(byte);
            self.pc += 1;
            return Ok(Step::Continue);
        }

        match self.execute_native(byte)? {
            Flow::Next => self.pc += 1,
            Flow::Jump(target) => self.pc = target,
            Flow::Halt(halt) => return Ok(Step::Halt(halt)),
        }
        Ok(Step::Continue)
    }

    fn execute_native(&mut self, byte: u8) -> VmResult<Flow> {
        let opcode = OpCode::from_u8(byte).ok_or(VmError::InvalidOpcode {
            opcode: byte,
            address: self.pc,
        })?;

        match opcode {
            OpCode::Nop => {}

            OpCode::Output => self.output.write_all(&[self.tape.read()])?,
            OpCode::Input => {
                // end of input leaves the cell unchanged
                if let Some(value) = self.read_input_byte() {
                    self.tape.write(value);
                }
            }
            OpCode::Increase => self.tape.increment(1),
            OpCode::Decrease => self.tape.decrement(1),
            OpCode::PointerR => self.tape.move_right(),
            OpCode::PointerL => self.tape.move_left(),
            OpCode::Flag => self.loop_stack.push(self.pc as i64),
            OpCode::JumpToFlag => {
                self.loop_stack.peek()?;
                if self.tape.read() != 0 {
                    let target = jump_target(self.loop_stack.pop()?)?;
                    return Ok(Flow::Jump(target));
                }
            }

            OpCode::RandomNum => {
                let value: u8 = self.rng.gen();
                self.tape.write(value);
            }
            OpCode::ExitProg => return Ok(Flow::Halt(Halt::Exit)),
            OpCode::Call => {
                self.call_stack.push(self.pc as i64);
                return Ok(Flow::Jump(usize::from(self.tape.read())));
            }
            OpCode::Return => {
                let target = jump_target(self.call_stack.pop()?)?;
                return Ok(Flow::Jump(target));
            }
            OpCode::Push => self.user_stack.push(i64::from(self.tape.read())),
            OpCode::Pop => {
                let value = self.user_stack.pop()?;
                self.tape.write(value as u8);
            }

            OpCode::Breakpoint => {
                self.dump()?;
                self.read_input_byte();
            }

            OpCode::MultibytePrefix => {
                self.state = DispatchState::ReadLength { start: self.pc };
            }
        }

        Ok(Flow::Next)
    }

    /// Run a completed extended command. Does not touch pc.
    fn dispatch_extended(&mut self, start: usize, command: &ExtendedCommand) -> VmResult<()> {
        // a command without its sub-opcode never finished reading
        let (&byte, args) = command.as_bytes().split_first().ok_or(
            VmError::TruncatedExtendedInstruction {
                address: start,
                missing: 1,
            },
        )?;
        let opcode = ExtOpCode::from_u8(byte).ok_or(VmError::UndefinedExtendedCommand {
            opcode: byte,
            address: start,
        })?;

        debug!(?opcode, ?args, address = start, "extended command");

        match opcode {
            ExtOpCode::Add => self.tape.increment(single_arg(opcode, args, start)?),
            ExtOpCode::Sub => self.tape.decrement(single_arg(opcode, args, start)?),
            ExtOpCode::Assign => self.tape.write(single_arg(opcode, args, start)?),
            ExtOpCode::JumpBack | ExtOpCode::JumpImmediate => {
                return Err(VmError::ReservedExtendedCommand {
                    opcode: byte,
                    address: start,
                });
            }
        }
        Ok(())
    }

    /// Blocking single-byte read; `None` at end of input or on error.
    fn read_input_byte(&mut self) -> Option<u8> {
        if let Err(e) = self.output.flush() {
            warn!(error = %e, "output flush failed before read");
        }

        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return None,
                Ok(_) => return Some(buf[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "input read failed");
                    return None;
                }
            }
        }
    }

    /// Write the machine state to the output
    pub fn dump(&mut self) -> io::Result<()> {
        let snapshot = self.snapshot();
        write!(self.output, "{}", snapshot)?;
        self.output.flush()
    }

    /// Return to the initial machine state. The program stays bound;
    /// the header is validated again on the next run.
    pub fn reset(&mut self) {
        self.tape.reset();
        self.loop_stack.clear();
        self.call_stack.clear();
        self.user_stack.clear();
        self.pc = 0;
        self.state = DispatchState::Normal;
        self.rng = make_rng(self.config.rng_seed);
        self.reader.invalidate();
        self.header_checked = false;
        debug!("machine reset");
    }

    /// Release the program source and I/O streams
    pub fn into_parts(self) -> (R, I, O) {
        (self.reader.into_inner(), self.input, self.output)
    }
}

impl<R, I, O> VirtualMachine<R, I, O> {
    pub fn snapshot(&self) -> MachineState {
        MachineState {
            cells: self.tape.cells().to_vec(),
            cursor: self.tape.cursor(),
            state: self.state.clone(),
            loop_stack: self.loop_stack.as_slice().to_vec(),
            user_stack: self.user_stack.as_slice().to_vec(),
            call_stack: self.call_stack.as_slice().to_vec(),
            pc: self.pc,
        }
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    pub fn stack(&self, kind: StackKind) -> &Stack {
        match kind {
            StackKind::Loop => &self.loop_stack,
            StackKind::Call => &self.call_stack,
            StackKind::User => &self.user_stack,
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }
}
