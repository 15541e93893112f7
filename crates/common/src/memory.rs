//! The memory region: program words followed by the stack zone.
//!
//! ```text
//! 0                 program_len        stack_zone_start         stack_bottom
//! | program words   | zero fill ...    | stack zone (capacity words)       |
//! ```
//!
//! The region always spans a whole number of [`BLOCK_WORDS`] blocks. The
//! stack grows from `stack_bottom` (the last word) towards lower addresses;
//! every word below `stack_zone_start` is fetchable as code.

use std::io::Read;
use std::ops::Range;

use crate::error::LoadError;
use crate::program::{pack_word, Program, WORD_BYTES};

/// Allocation granularity of the memory region, in words.
pub const BLOCK_WORDS: usize = 1024;

/// A loaded memory region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    words: Vec<i32>,
    program_len: usize,
    stack_capacity: usize,
}

impl Memory {
    /// Load a program from a byte stream.
    ///
    /// Every four bytes are packed most-significant byte first into one
    /// word. The region is grown one block at a time while the program is
    /// read, then extended until at least `stack_capacity` words remain
    /// after the program.
    ///
    /// The stream is consumed byte by byte; wrap slow readers in a
    /// `BufReader`.
    ///
    /// # Errors
    ///
    /// [`LoadError::TruncatedWord`] if the stream length is not a multiple
    /// of 4, [`LoadError::Empty`] for an empty stream with a zero stack,
    /// [`LoadError::Allocation`] if the region cannot be grown and
    /// [`LoadError::Io`] if reading fails.
    pub fn load<R: Read>(reader: R, stack_capacity: usize) -> Result<Self, LoadError> {
        let mut words = Vec::new();
        let mut blocks = 1;
        reserve_blocks(&mut words, blocks)?;

        let mut word = [0u8; WORD_BYTES];
        let mut filled = 0;
        let mut byte_count = 0usize;

        for byte in reader.bytes() {
            word[filled] = byte?;
            filled += 1;
            byte_count += 1;

            if filled == WORD_BYTES {
                if words.len() == blocks * BLOCK_WORDS {
                    blocks += 1;
                    reserve_blocks(&mut words, blocks)?;
                }
                words.push(pack_word(word));
                filled = 0;
            }
        }

        if filled != 0 {
            return Err(LoadError::TruncatedWord(byte_count));
        }

        Self::finish(words, blocks, stack_capacity)
    }

    /// Build a region from an already decoded program.
    ///
    /// Sizing and failure rules are the same as [`Memory::load`].
    pub fn from_program(program: &Program, stack_capacity: usize) -> Result<Self, LoadError> {
        let blocks = program.len().div_ceil(BLOCK_WORDS).max(1);
        let mut words = Vec::new();
        reserve_blocks(&mut words, blocks)?;
        words.extend_from_slice(&program.words);
        Self::finish(words, blocks, stack_capacity)
    }

    fn finish(
        mut words: Vec<i32>,
        blocks: usize,
        stack_capacity: usize,
    ) -> Result<Self, LoadError> {
        let program_len = words.len();
        if program_len == 0 && stack_capacity == 0 {
            return Err(LoadError::Empty);
        }

        let needed = program_len
            .checked_add(stack_capacity)
            .ok_or(LoadError::Allocation {
                words: usize::MAX,
                source: None,
            })?;
        let blocks = blocks.max(needed.div_ceil(BLOCK_WORDS));
        reserve_blocks(&mut words, blocks)?;
        words.resize(blocks * BLOCK_WORDS, 0);

        tracing::info!(
            program_words = program_len,
            region_words = words.len(),
            stack_capacity,
            "program loaded"
        );

        Ok(Self {
            words,
            program_len,
            stack_capacity,
        })
    }

    /// All words of the region.
    pub fn words(&self) -> &[i32] {
        &self.words
    }

    /// Total region size in words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false for a successfully loaded region.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of words decoded from the program stream.
    pub fn program_len(&self) -> usize {
        self.program_len
    }

    /// Requested stack capacity in words.
    pub fn stack_capacity(&self) -> usize {
        self.stack_capacity
    }

    /// Address of the first stack slot (the last word of the region).
    pub fn stack_bottom(&self) -> usize {
        self.words.len() - 1
    }

    /// First address of the stack zone. Every lower address is code.
    pub fn stack_zone_start(&self) -> usize {
        self.words.len() - self.stack_capacity
    }

    /// Address range of the stack zone.
    pub fn stack_zone(&self) -> Range<usize> {
        self.stack_zone_start()..self.words.len()
    }

    /// Read a word, or `None` past the end of the region.
    pub fn get(&self, address: usize) -> Option<i32> {
        self.words.get(address).copied()
    }

    /// Mutable access to a word, or `None` past the end of the region.
    pub fn get_mut(&mut self, address: usize) -> Option<&mut i32> {
        self.words.get_mut(address)
    }

    /// Zero every word of the stack zone. Program words are untouched.
    pub fn clear_stack(&mut self) {
        let zone = self.stack_zone();
        self.words[zone].fill(0);
    }
}

/// Make sure `words` can hold `blocks` whole blocks without reallocating.
fn reserve_blocks(words: &mut Vec<i32>, blocks: usize) -> Result<(), LoadError> {
    let total = blocks.checked_mul(BLOCK_WORDS).ok_or(LoadError::Allocation {
        words: usize::MAX,
        source: None,
    })?;
    let additional = total.saturating_sub(words.len());
    words
        .try_reserve_exact(additional)
        .map_err(|source| LoadError::Allocation {
            words: total,
            source: Some(source),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn bytes_of(words: &[i32]) -> Vec<u8> {
        Program::new(words.to_vec()).encode()
    }

    #[test]
    fn small_program_fits_one_block() {
        let memory = Memory::load(&bytes_of(&[1, 2, 3])[..], 16).unwrap();
        assert_eq!(memory.len(), BLOCK_WORDS);
        assert_eq!(memory.program_len(), 3);
        assert_eq!(&memory.words()[..3], &[1, 2, 3]);
        assert_eq!(memory.stack_bottom(), BLOCK_WORDS - 1);
        assert_eq!(memory.stack_zone_start(), BLOCK_WORDS - 16);
    }

    #[test]
    fn trailing_region_is_zero_filled() {
        let memory = Memory::load(&bytes_of(&[-1; 10])[..], 1).unwrap();
        assert!(memory.words()[10..].iter().all(|&w| w == 0));
    }

    #[test]
    fn program_larger_than_a_block_grows_region() {
        let words: Vec<i32> = (0..1500).collect();
        let memory = Memory::load(&bytes_of(&words)[..], 0).unwrap();
        assert_eq!(memory.len(), 2 * BLOCK_WORDS);
        assert_eq!(&memory.words()[..1500], &words[..]);
    }

    #[test]
    fn program_exactly_one_block() {
        let words = vec![7; BLOCK_WORDS];
        let memory = Memory::load(&bytes_of(&words)[..], 0).unwrap();
        assert_eq!(memory.len(), BLOCK_WORDS);
        assert_eq!(memory.stack_zone_start(), BLOCK_WORDS);
    }

    #[test]
    fn stack_that_does_not_fit_adds_blocks() {
        let memory = Memory::load(&bytes_of(&[0; 1000])[..], 100).unwrap();
        assert_eq!(memory.len(), 2 * BLOCK_WORDS);
        assert_eq!(memory.stack_zone_start(), 2 * BLOCK_WORDS - 100);

        let memory = Memory::load(&bytes_of(&[0; 10])[..], 3000).unwrap();
        assert_eq!(memory.len(), 3 * BLOCK_WORDS);
        assert!(memory.stack_zone_start() >= memory.program_len());
    }

    #[test]
    fn stack_filling_the_rest_exactly_needs_no_extra_block() {
        let memory = Memory::load(&bytes_of(&[0; 24])[..], 1000).unwrap();
        assert_eq!(memory.len(), BLOCK_WORDS);
        assert_eq!(memory.stack_zone_start(), 24);
    }

    #[test]
    fn empty_program_with_stack_is_allowed() {
        let memory = Memory::load(io::empty(), 1024).unwrap();
        assert_eq!(memory.len(), BLOCK_WORDS);
        assert_eq!(memory.program_len(), 0);
        assert_eq!(memory.stack_zone_start(), 0);
    }

    #[test]
    fn empty_program_without_stack_fails() {
        assert!(matches!(
            Memory::load(io::empty(), 0),
            Err(LoadError::Empty)
        ));
        assert!(matches!(
            Memory::from_program(&Program::default(), 0),
            Err(LoadError::Empty)
        ));
    }

    #[test]
    fn partial_trailing_word_fails() {
        let mut bytes = bytes_of(&[1, 2]);
        bytes.push(0xAB);
        assert!(matches!(
            Memory::load(&bytes[..], 8),
            Err(LoadError::TruncatedWord(9))
        ));
    }

    #[test]
    fn huge_stack_request_fails_without_panicking() {
        assert!(matches!(
            Memory::load(&bytes_of(&[1])[..], usize::MAX),
            Err(LoadError::Allocation { .. })
        ));
    }

    #[test]
    fn read_errors_propagate() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "boom"))
            }
        }
        assert!(matches!(Memory::load(Broken, 4), Err(LoadError::Io(_))));
    }

    #[test]
    fn from_program_matches_load() {
        let program = Program::new((0..2100).collect());
        let streamed = Memory::load(&program.encode()[..], 500).unwrap();
        let direct = Memory::from_program(&program, 500).unwrap();
        assert_eq!(streamed, direct);
    }

    #[test]
    fn decoded_program_loads_like_the_stream() {
        let mut bytes = Vec::new();
        for i in 0..1100u32 {
            bytes.extend_from_slice(&(i.wrapping_mul(0x9E37_79B9)).to_be_bytes());
        }
        let program = Program::decode(&bytes).unwrap();
        let streamed = Memory::load(&bytes[..], 64).unwrap();
        let direct = Memory::from_program(&program, 64).unwrap();
        assert_eq!(streamed, direct);
        assert_eq!(&streamed.words()[..program.len()], &program.words[..]);
    }

    #[test]
    fn clear_stack_leaves_program_words() {
        let mut memory = Memory::load(&bytes_of(&[5, 6])[..], 4).unwrap();
        let bottom = memory.stack_bottom();
        *memory.get_mut(bottom).unwrap() = 99;
        *memory.get_mut(bottom - 3).unwrap() = 98;
        memory.clear_stack();
        assert_eq!(memory.get(bottom), Some(0));
        assert_eq!(memory.get(bottom - 3), Some(0));
        assert_eq!(&memory.words()[..2], &[5, 6]);
        assert_eq!(memory.get(memory.len()), None);
    }
}
