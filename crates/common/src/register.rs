//! Register addressing.
//!
//! Operand words name registers by index: 0-3 are the general-purpose
//! registers A-D. With the jump extension enabled, index 4 names the result
//! register R, which instructions may read but never write directly.

use std::fmt;

use crate::capability::{Extension, Extensions};

/// Operand index that names the result register.
pub const RESULT_INDEX: i32 = 4;

/// A general-purpose register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
}

/// All general-purpose registers in index order.
pub const ALL_REGISTERS: [Register; 4] = [Register::A, Register::B, Register::C, Register::D];

impl Register {
    /// Decode a writable register operand. Only 0-3 are accepted.
    pub fn from_operand(word: i32) -> Option<Self> {
        usize::try_from(word)
            .ok()
            .and_then(|index| ALL_REGISTERS.get(index))
            .copied()
    }

    /// Index into the register file.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Single-letter register name.
    pub fn name(self) -> char {
        match self {
            Register::A => 'A',
            Register::B => 'B',
            Register::C => 'C',
            Register::D => 'D',
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Anything an instruction can read a value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// One of A-D.
    Register(Register),
    /// The result register R.
    Result,
}

impl Location {
    /// Decode a readable operand. Index 4 is accepted only when the jump
    /// extension is enabled.
    pub fn from_operand(word: i32, extensions: Extensions) -> Option<Self> {
        if word == RESULT_INDEX && extensions.contains(Extension::Jumps) {
            return Some(Location::Result);
        }
        Register::from_operand(word).map(Location::Register)
    }
}

impl From<Register> for Location {
    fn from(register: Register) -> Self {
        Location::Register(register)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Register(register) => register.fmt(f),
            Location::Result => f.write_str("R"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_operands_in_range() {
        for (word, expected) in (0..4).zip(ALL_REGISTERS) {
            assert_eq!(Register::from_operand(word), Some(expected));
            assert_eq!(expected.index() as i32, word);
        }
    }

    #[test]
    fn register_operands_out_of_range() {
        for word in [-1, 4, 5, 9, i32::MIN, i32::MAX] {
            assert_eq!(Register::from_operand(word), None, "word {word}");
        }
    }

    #[test]
    fn result_register_needs_jump_extension() {
        assert_eq!(Location::from_operand(4, Extensions::NONE), None);
        assert_eq!(Location::from_operand(4, Extensions::CALLS), None);
        assert_eq!(
            Location::from_operand(4, Extensions::JUMPS),
            Some(Location::Result)
        );
        assert_eq!(Location::from_operand(5, Extensions::ALL), None);
        assert_eq!(
            Location::from_operand(2, Extensions::NONE),
            Some(Location::Register(Register::C))
        );
    }

    #[test]
    fn display_names() {
        assert_eq!(Register::D.to_string(), "D");
        assert_eq!(Location::Result.to_string(), "R");
        assert_eq!(Location::from(Register::B).to_string(), "B");
    }
}
