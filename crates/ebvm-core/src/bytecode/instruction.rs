//! Extended Instruction Representation
//!
//! The pending command assembled by the multi-byte protocol:
//! a sub-opcode followed by its raw argument bytes.
//! This layer contains no execution semantics.

/// Raw extended command (`[sub-opcode, args...]`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedCommand {
    bytes: Vec<u8>,
}

impl ExtendedCommand {
    /// Create an empty command with room for `len` payload bytes
    pub fn with_capacity(len: usize) -> Self {
        ExtendedCommand {
            bytes: Vec::with_capacity(len),
        }
    }

    /// Append one payload byte
    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Sub-opcode byte, if any payload was read
    pub fn opcode(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    /// Argument bytes after the sub-opcode
    pub fn args(&self) -> &[u8] {
        self.bytes.get(1..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for ExtendedCommand {
    fn from(bytes: Vec<u8>) -> Self {
        ExtendedCommand { bytes }
    }
}
