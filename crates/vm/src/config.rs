//! Engine configuration.

use std::io::Read;

use stackcpu_common::{Extensions, LoadError, Memory};

/// Stack capacity used when none is configured, in words.
pub const DEFAULT_STACK_CAPACITY: usize = 1024;

/// How to build a machine: stack size and enabled extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Stack capacity in words.
    pub stack_capacity: usize,
    /// Enabled instruction-set extensions.
    pub extensions: Extensions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stack_capacity: DEFAULT_STACK_CAPACITY,
            extensions: Extensions::ALL,
        }
    }
}

impl Config {
    /// Set the stack capacity.
    #[must_use]
    pub fn with_stack_capacity(mut self, stack_capacity: usize) -> Self {
        self.stack_capacity = stack_capacity;
        self
    }

    /// Set the enabled extensions.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Load a program stream with this configuration's stack capacity.
    pub fn load<R: Read>(&self, program: R) -> Result<Memory, LoadError> {
        Memory::load(program, self.stack_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_everything() {
        let config = Config::default();
        assert_eq!(config.stack_capacity, 1024);
        assert_eq!(config.extensions, Extensions::ALL);
    }

    #[test]
    fn builders_override_fields() {
        let config = Config::default()
            .with_stack_capacity(16)
            .with_extensions(Extensions::NONE);
        assert_eq!(config.stack_capacity, 16);
        assert_eq!(config.extensions, Extensions::NONE);
    }

    #[test]
    fn load_uses_configured_capacity() {
        let memory = Config::default()
            .with_stack_capacity(2000)
            .load(&[0u8, 0, 0, 1][..])
            .unwrap();
        assert_eq!(memory.stack_capacity(), 2000);
        assert_eq!(memory.len(), 2 * 1024);
    }
}
