//! Optional instruction-set extensions.

/// An optional group of instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// `cmp`, `jmp`, `jz`, `jnz`, `jgt` and the result register R.
    Jumps,
    /// `call` and `ret`.
    Calls,
}

/// A set of enabled extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extensions {
    jumps: bool,
    calls: bool,
}

impl Extensions {
    /// The base instruction set only.
    pub const NONE: Self = Self {
        jumps: false,
        calls: false,
    };
    /// Base set plus the jump extension.
    pub const JUMPS: Self = Self {
        jumps: true,
        calls: false,
    };
    /// Base set plus the call extension.
    pub const CALLS: Self = Self {
        jumps: false,
        calls: true,
    };
    /// Every extension.
    pub const ALL: Self = Self {
        jumps: true,
        calls: true,
    };

    /// Returns true if `extension` is enabled.
    pub fn contains(self, extension: Extension) -> bool {
        match extension {
            Extension::Jumps => self.jumps,
            Extension::Calls => self.calls,
        }
    }

    /// Returns a copy with `extension` enabled.
    #[must_use]
    pub fn with(mut self, extension: Extension) -> Self {
        match extension {
            Extension::Jumps => self.jumps = true,
            Extension::Calls => self.calls = true,
        }
        self
    }
}

impl FromIterator<Extension> for Extensions {
    fn from_iter<T: IntoIterator<Item = Extension>>(iter: T) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}
