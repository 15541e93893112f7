//! Opcode definitions and the instruction table for the stackcpu machine.
//!
//! An instruction is one opcode word followed by zero, one or two operand
//! words. The table below is the single source of truth for how many words
//! each instruction occupies and which extension (if any) must be enabled
//! for the opcode to decode.

use crate::capability::{Extension, Extensions};

/// Identifies the operation to perform.
///
/// The `#[repr(i32)]` attribute pins each variant to its word value in the
/// binary program format.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Do nothing.
    Nop = 0,
    /// Stop the machine with status `Halted`.
    Halt = 1,

    // Arithmetic on register A
    /// `A := A + reg`.
    Add = 2,
    /// `A := A - reg`.
    Sub = 3,
    /// `A := A * reg`.
    Mul = 4,
    /// `A := A / reg`. Division by zero is a fault.
    Div = 5,
    /// `reg := reg + 1`.
    Inc = 6,
    /// `reg := reg - 1`.
    Dec = 7,

    // Control
    /// Jump to the operand address while C is non-zero.
    Loop = 8,

    // Data movement
    /// `reg := immediate`.
    Mov = 9,
    /// Read a stack slot relative to the top (offset `imm + D`) into a register.
    Load = 10,
    /// Write a register into a stack slot relative to the top.
    Store = 11,

    // I/O
    /// Read a whitespace-delimited decimal integer.
    In = 12,
    /// Read one raw byte.
    Get = 13,
    /// Write a register as decimal text.
    Out = 14,
    /// Write a register as a single byte.
    Put = 15,

    // Registers and stack
    /// Exchange two registers.
    Swap = 16,
    /// Push a register onto the stack.
    Push = 17,
    /// Pop the top of the stack into a register.
    Pop = 18,

    // Jump extension
    /// `R := a - b`.
    Cmp = 19,
    /// Unconditional jump.
    Jmp = 20,
    /// Jump if R is zero.
    Jz = 21,
    /// Jump if R is non-zero.
    Jnz = 22,
    /// Jump if R is greater than zero.
    Jgt = 23,

    // Call extension
    /// Push the return address and jump.
    Call = 24,
    /// Pop the return address into the instruction pointer.
    Ret = 25,
}

/// Static facts about one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// The opcode this entry describes.
    pub opcode: Opcode,
    /// Lowercase assembly mnemonic.
    pub mnemonic: &'static str,
    /// Total instruction width in words, opcode word included.
    pub width: u8,
    /// Extension that must be enabled for the opcode to decode.
    pub requires: Option<Extension>,
}

const fn entry(
    opcode: Opcode,
    mnemonic: &'static str,
    width: u8,
    requires: Option<Extension>,
) -> OpcodeInfo {
    OpcodeInfo {
        opcode,
        mnemonic,
        width,
        requires,
    }
}

/// The instruction table, indexed by opcode word value.
pub const OPCODE_TABLE: [OpcodeInfo; 26] = [
    entry(Opcode::Nop, "nop", 1, None),
    entry(Opcode::Halt, "halt", 1, None),
    entry(Opcode::Add, "add", 2, None),
    entry(Opcode::Sub, "sub", 2, None),
    entry(Opcode::Mul, "mul", 2, None),
    entry(Opcode::Div, "div", 2, None),
    entry(Opcode::Inc, "inc", 2, None),
    entry(Opcode::Dec, "dec", 2, None),
    entry(Opcode::Loop, "loop", 2, None),
    entry(Opcode::Mov, "mov", 3, None),
    entry(Opcode::Load, "load", 3, None),
    entry(Opcode::Store, "store", 3, None),
    entry(Opcode::In, "in", 2, None),
    entry(Opcode::Get, "get", 2, None),
    entry(Opcode::Out, "out", 2, None),
    entry(Opcode::Put, "put", 2, None),
    entry(Opcode::Swap, "swap", 3, None),
    entry(Opcode::Push, "push", 2, None),
    entry(Opcode::Pop, "pop", 2, None),
    entry(Opcode::Cmp, "cmp", 3, Some(Extension::Jumps)),
    entry(Opcode::Jmp, "jmp", 2, Some(Extension::Jumps)),
    entry(Opcode::Jz, "jz", 2, Some(Extension::Jumps)),
    entry(Opcode::Jnz, "jnz", 2, Some(Extension::Jumps)),
    entry(Opcode::Jgt, "jgt", 2, Some(Extension::Jumps)),
    entry(Opcode::Call, "call", 2, Some(Extension::Calls)),
    entry(Opcode::Ret, "ret", 1, Some(Extension::Calls)),
];

impl Opcode {
    /// Look up the table entry for a raw word, ignoring extensions.
    ///
    /// Returns `None` for any word outside the table.
    pub fn lookup(word: i32) -> Option<&'static OpcodeInfo> {
        usize::try_from(word)
            .ok()
            .and_then(|index| OPCODE_TABLE.get(index))
    }

    /// Decode a raw word against an enabled extension set.
    ///
    /// Opcodes belonging to a disabled extension decode as `None`, exactly
    /// like unknown words.
    pub fn decode(word: i32, extensions: Extensions) -> Option<&'static OpcodeInfo> {
        Self::lookup(word).filter(|info| match info.requires {
            Some(extension) => extensions.contains(extension),
            None => true,
        })
    }

    /// Table entry for this opcode.
    pub fn info(self) -> &'static OpcodeInfo {
        &OPCODE_TABLE[self as usize]
    }

    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(self) -> &'static str {
        self.info().mnemonic
    }

    /// Instruction width in words.
    pub fn width(self) -> u8 {
        self.info().width
    }

    /// The opcode's word value.
    pub fn word(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_word_value() {
        for (index, info) in OPCODE_TABLE.iter().enumerate() {
            assert_eq!(
                info.opcode as usize, index,
                "table slot {index} holds {:?}",
                info.opcode
            );
        }
    }

    #[test]
    fn widths_are_between_one_and_three() {
        for info in &OPCODE_TABLE {
            assert!((1..=3).contains(&info.width), "{}", info.mnemonic);
        }
    }

    #[test]
    fn unknown_words_do_not_decode() {
        assert_eq!(Opcode::lookup(-1), None);
        assert_eq!(Opcode::lookup(26), None);
        assert_eq!(Opcode::lookup(i32::MAX), None);
        assert_eq!(Opcode::decode(i32::MIN, Extensions::ALL), None);
    }

    #[test]
    fn base_opcodes_decode_without_extensions() {
        for word in 0..=18 {
            let info = Opcode::decode(word, Extensions::NONE).unwrap();
            assert_eq!(info.opcode.word(), word);
        }
    }

    #[test]
    fn jump_opcodes_require_jump_extension() {
        for word in 19..=23 {
            assert_eq!(Opcode::decode(word, Extensions::NONE), None);
            assert_eq!(Opcode::decode(word, Extensions::CALLS), None);
            assert!(Opcode::decode(word, Extensions::JUMPS).is_some());
        }
    }

    #[test]
    fn call_opcodes_require_call_extension() {
        for word in [24, 25] {
            assert_eq!(Opcode::decode(word, Extensions::JUMPS), None);
            assert!(Opcode::decode(word, Extensions::CALLS).is_some());
        }
    }

    #[test]
    fn mnemonics_are_lowercase_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for info in &OPCODE_TABLE {
            assert_eq!(info.mnemonic, info.mnemonic.to_lowercase());
            assert!(seen.insert(info.mnemonic), "duplicate {}", info.mnemonic);
        }
        assert_eq!(Opcode::Halt.mnemonic(), "halt");
        assert_eq!(Opcode::Mov.width(), 3);
    }
}
