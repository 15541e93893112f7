//! Program word streams.
//!
//! A binary program file is a raw concatenation of big-endian 32-bit words
//! with no header.

use crate::error::LoadError;
use crate::opcode::Opcode;

/// Size of one word in the binary format.
pub const WORD_BYTES: usize = 4;

/// Pack one word, most significant byte first.
pub(crate) fn pack_word(bytes: [u8; WORD_BYTES]) -> i32 {
    i32::from_be_bytes(bytes)
}

/// A program: a sequence of instruction and operand words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// The word stream.
    pub words: Vec<i32>,
}

impl Program {
    /// Create a new program from raw words.
    pub fn new(words: Vec<i32>) -> Self {
        Self { words }
    }

    /// Append an opcode followed by its operand words.
    ///
    /// Operand count is not checked against the opcode's width so that
    /// deliberately malformed programs can still be built.
    pub fn push(&mut self, opcode: Opcode, operands: &[i32]) -> &mut Self {
        self.words.push(opcode.word());
        self.words.extend_from_slice(operands);
        self
    }

    /// Encode the entire program to bytes.
    ///
    /// The result length is always `words.len() * 4`.
    pub fn encode(&self) -> Vec<u8> {
        self.words.iter().flat_map(|word| word.to_be_bytes()).collect()
    }

    /// Decode a byte slice into a program.
    ///
    /// The byte slice length must be a multiple of 4.
    pub fn decode(bytes: &[u8]) -> Result<Self, LoadError> {
        if bytes.len() % WORD_BYTES != 0 {
            return Err(LoadError::TruncatedWord(bytes.len()));
        }

        let words = bytes
            .chunks_exact(WORD_BYTES)
            .map(|chunk| pack_word([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Ok(Self { words })
    }

    /// Number of words in the program.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the program has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl From<Vec<i32>> for Program {
    fn from(words: Vec<i32>) -> Self {
        Self::new(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program() {
        let program = Program::default();
        assert!(program.is_empty());
        assert_eq!(program.len(), 0);
        assert_eq!(program.encode(), Vec::<u8>::new());
    }

    #[test]
    fn encode_is_big_endian() {
        let program = Program::new(vec![1, -2, 0x0102_0304]);
        assert_eq!(
            program.encode(),
            vec![0, 0, 0, 1, 0xFF, 0xFF, 0xFF, 0xFE, 1, 2, 3, 4]
        );
    }

    #[test]
    fn decode_packs_most_significant_byte_first() {
        let program = Program::decode(&[0x80, 0, 0, 0, 0, 0, 0x01, 0x00]).unwrap();
        assert_eq!(program.words, vec![i32::MIN, 256]);
    }

    #[test]
    fn decode_invalid_length() {
        for len in [1, 2, 3, 5, 7, 13] {
            let bytes = vec![0; len];
            assert!(
                matches!(Program::decode(&bytes), Err(LoadError::TruncatedWord(n)) if n == len),
                "length {len}"
            );
        }
    }

    #[test]
    fn push_appends_opcode_and_operands() {
        let mut program = Program::default();
        program
            .push(Opcode::Mov, &[0, 10])
            .push(Opcode::Out, &[0])
            .push(Opcode::Halt, &[]);
        assert_eq!(program.words, vec![9, 0, 10, 14, 0, 1]);
    }
}
