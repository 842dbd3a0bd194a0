use std::fs::{self, File};
use std::io::{Cursor, Write};

use ebvm_core::{
    ExtOpCode, Halt, OpCode, StackKind, VirtualMachine, VmConfig, VmError, EXPECTED_HEADER,
};
use tempfile::tempdir;

// Write header + code to a temp file and run it against a byte input.
fn run_file(code: &[u8], input: &[u8]) -> (Result<Halt, VmError>, Vec<u8>) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("program.ebf");
    let mut file = File::create(&path).unwrap();
    file.write_all(&EXPECTED_HEADER).unwrap();
    file.write_all(code).unwrap();
    drop(file);

    let program = File::open(&path).unwrap();
    let mut vm = VirtualMachine::new(
        VmConfig::new().with_seed(1),
        program,
        Cursor::new(input.to_vec()),
        Vec::new(),
    );
    let result = vm.execute();
    let (_, _, output) = vm.into_parts();
    (result, output)
}

fn text(bytes: &[u8]) -> Vec<u8> {
    // emit each byte with one Assign + Output pair
    let mut code = Vec::new();
    for &b in bytes {
        code.extend([
            OpCode::MultibytePrefix as u8,
            0x01,
            ExtOpCode::Assign as u8,
            b,
            OpCode::Output as u8,
        ]);
    }
    code
}

#[test]
fn hello_from_file() {
    let mut code = text(b"Hello, world!\n");
    code.push(OpCode::ExitProg as u8);
    // never reached
    code.push(0xFF);

    let (result, output) = run_file(&code, b"");
    assert_eq!(result.unwrap(), Halt::Exit);
    assert_eq!(output, b"Hello, world!\n");
}

#[test]
fn echo_until_zero_byte() {
    // read a byte, echo it, loop while nonzero
    let code = [
        OpCode::Input as u8,      // 0
        OpCode::Flag as u8,       // 1
        OpCode::Output as u8,     // 2
        OpCode::Input as u8,      // 3
        OpCode::JumpToFlag as u8, // 4
    ];
    let (result, output) = run_file(&code, b"abc\0rest");
    assert_eq!(result.unwrap(), Halt::EndOfProgram);
    assert_eq!(output, b"abc");
}

#[test]
fn program_larger_than_one_page() {
    let mut code = text(&[b'x'; 120]);
    code.extend(text(b"!"));
    assert!(code.len() > 2 * 256);

    let (result, output) = run_file(&code, b"");
    assert!(result.is_ok());
    assert_eq!(output.len(), 121);
    assert_eq!(output.last(), Some(&b'!'));
}

#[test]
fn wrong_version_is_rejected_before_execution() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("future.ebf");
    let mut bytes = EXPECTED_HEADER.to_vec();
    bytes[3] = 0x02;
    bytes.extend(text(b"no"));
    fs::write(&path, bytes).unwrap();

    let mut vm = VirtualMachine::new(
        VmConfig::new(),
        File::open(&path).unwrap(),
        std::io::empty(),
        Vec::new(),
    );
    match vm.execute() {
        Err(VmError::HeaderMismatch { field, offset, expected, found }) => {
            assert_eq!(field, "version");
            assert_eq!(offset, 3);
            assert_eq!(expected, 0x00);
            assert_eq!(found, 0x02);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(vm.output().is_empty());
}

#[test]
fn truncated_header_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.ebf");
    fs::write(&path, &EXPECTED_HEADER[..10]).unwrap();

    let mut vm = VirtualMachine::new(
        VmConfig::new(),
        File::open(&path).unwrap(),
        std::io::empty(),
        Vec::new(),
    );
    let err = vm.execute().unwrap_err();
    assert!(matches!(err, VmError::UnexpectedEof { offset: 10 }));
    assert_eq!(err.to_string(), "unexpected eof at 0xA while reading the header");
}

#[test]
fn user_stack_reverses_input() {
    // push three input bytes, pop and print them
    let mut code = Vec::new();
    for _ in 0..3 {
        code.extend([OpCode::Input as u8, OpCode::Push as u8]);
    }
    for _ in 0..3 {
        code.extend([OpCode::Pop as u8, OpCode::Output as u8]);
    }
    let (result, output) = run_file(&code, b"xyz");
    assert!(result.is_ok());
    assert_eq!(output, b"zyx");
}

#[test]
fn fatal_error_dumps_all_stacks() {
    let code = [
        OpCode::Increase as u8,
        OpCode::Flag as u8,
        OpCode::Push as u8,
        OpCode::PointerR as u8,
        OpCode::Return as u8,
    ];
    let (result, output) = run_file(&code, b"");
    let err = result.unwrap_err();
    assert!(matches!(err, VmError::StackUnderflow { stack: StackKind::Call }));
    assert_eq!(err.to_string(), "call stack empty");

    let dump = String::from_utf8(output).unwrap();
    assert!(dump.contains("Buffer[size:2]: [1, 0]"));
    assert!(dump.contains("^(0x00 at 0x1)"));
    assert!(dump.contains("Loop Stack: [1]"));
    assert!(dump.contains("User Stack: [1]"));
    assert!(dump.contains("Call Stack: []"));
    assert!(dump.contains("Program Counter: 0x4"));
}
