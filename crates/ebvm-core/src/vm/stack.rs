//! VM Stack Implementation
//!
//! Integer stack used for loop flags, return addresses and user data.
//! No execution semantics.

use std::fmt;

use crate::error::{VmError, VmResult};

/// Which of the three machine stacks a `Stack` serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Loop,
    Call,
    User,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKind::Loop => write!(f, "loop"),
            StackKind::Call => write!(f, "call"),
            StackKind::User => write!(f, "user"),
        }
    }
}

/// LIFO of signed integers
#[derive(Debug, Clone)]
pub struct Stack {
    kind: StackKind,
    values: Vec<i64>,
}

impl Stack {
    pub fn new(kind: StackKind) -> Self {
        Stack {
            kind,
            values: Vec::new(),
        }
    }

    pub fn kind(&self) -> StackKind {
        self.kind
    }

    /// Push value onto stack
    pub fn push(&mut self, value: i64) {
        self.values.push(value);
    }

    /// Pop value from stack
    pub fn pop(&mut self) -> VmResult<i64> {
        self.values
            .pop()
            .ok_or(VmError::StackUnderflow { stack: self.kind })
    }

    /// Peek at top of stack without removing
    pub fn peek(&self) -> VmResult<i64> {
        self.values
            .last()
            .copied()
            .ok_or(VmError::StackUnderflow { stack: self.kind })
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Bottom-to-top view
    pub fn as_slice(&self) -> &[i64] {
        &self.values
    }
}
