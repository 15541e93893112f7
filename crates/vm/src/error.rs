//! Machine status and runtime faults.
//!
//! A fault never unwinds past [`Cpu::step`](crate::Cpu::step): it is
//! recorded as the machine's terminal [`Status`] and every later step is a
//! no-op until the machine is reset. Every fault carries the address of the
//! instruction that raised it (`at`).

use std::fmt;

use thiserror::Error;

/// Machine status. Codes are stable and start at 0 for the running state.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// Running; the next step will execute an instruction.
    #[default]
    Ok = 0,
    /// A `halt` instruction was executed.
    Halted = 1,
    IllegalInstruction = 2,
    IllegalOperand = 3,
    InvalidAddress = 4,
    InvalidStackOperation = 5,
    DivByZero = 6,
    IoError = 7,
}

impl Status {
    /// Numeric status code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Returns true while the machine accepts further steps.
    pub fn is_running(self) -> bool {
        self == Status::Ok
    }

    /// Returns true for the fault states (everything except running and halted).
    pub fn is_fault(self) -> bool {
        !matches!(self, Status::Ok | Status::Halted)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Status::Ok => "running",
            Status::Halted => "halted",
            Status::IllegalInstruction => "illegal instruction",
            Status::IllegalOperand => "illegal operand",
            Status::InvalidAddress => "invalid address",
            Status::InvalidStackOperation => "invalid stack operation",
            Status::DivByZero => "division by zero",
            Status::IoError => "I/O error",
        };
        f.write_str(text)
    }
}

/// Errors that stop execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    /// Unknown opcode word, or an opcode from a disabled extension.
    #[error("illegal instruction {word} at address {at}")]
    IllegalInstruction { at: i32, word: i32 },

    /// Register index out of range, or an unprintable `put` value.
    #[error("illegal operand {operand} at address {at}")]
    IllegalOperand { at: i32, operand: i32 },

    /// Fetch outside the program zone.
    #[error("invalid address {address} at address {at}")]
    InvalidAddress { at: i32, address: i64 },

    /// Push on a full stack, pop on an empty one, or a stack offset out of range.
    #[error("invalid stack operation at address {at}")]
    InvalidStackOperation { at: i32 },

    /// `div` with a zero divisor.
    #[error("division by zero at address {at}")]
    DivisionByZero { at: i32 },

    /// Malformed integer input, or the output sink failed.
    #[error("I/O error at address {at}")]
    Io { at: i32 },
}

impl Fault {
    /// The terminal status this fault puts the machine in.
    pub fn status(&self) -> Status {
        match self {
            Fault::IllegalInstruction { .. } => Status::IllegalInstruction,
            Fault::IllegalOperand { .. } => Status::IllegalOperand,
            Fault::InvalidAddress { .. } => Status::InvalidAddress,
            Fault::InvalidStackOperation { .. } => Status::InvalidStackOperation,
            Fault::DivisionByZero { .. } => Status::DivByZero,
            Fault::Io { .. } => Status::IoError,
        }
    }

    /// Address of the faulting instruction.
    pub fn at(&self) -> i32 {
        match *self {
            Fault::IllegalInstruction { at, .. }
            | Fault::IllegalOperand { at, .. }
            | Fault::InvalidAddress { at, .. }
            | Fault::InvalidStackOperation { at }
            | Fault::DivisionByZero { at }
            | Fault::Io { at } => at,
        }
    }
}
