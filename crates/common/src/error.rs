//! Errors raised while turning a byte stream into a memory region.

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Errors that occur while loading a program.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The byte stream ended in the middle of a word.
    #[error("program is {0} bytes long (must be a multiple of 4)")]
    TruncatedWord(usize),

    /// Nothing to load and no stack requested.
    #[error("empty program with zero stack capacity")]
    Empty,

    /// The memory region could not be grown.
    #[error("cannot allocate {words} words of memory")]
    Allocation {
        words: usize,
        #[source]
        source: Option<TryReserveError>,
    },

    /// Reading the program stream failed.
    #[error("cannot read program: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_truncated_word() {
        assert_eq!(
            LoadError::TruncatedWord(7).to_string(),
            "program is 7 bytes long (must be a multiple of 4)"
        );
    }

    #[test]
    fn display_empty() {
        assert_eq!(
            LoadError::Empty.to_string(),
            "empty program with zero stack capacity"
        );
    }

    #[test]
    fn display_allocation() {
        let err = LoadError::Allocation {
            words: 2048,
            source: None,
        };
        assert_eq!(err.to_string(), "cannot allocate 2048 words of memory");
    }
}
