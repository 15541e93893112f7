//! stackcpu common types and program loading.
//!
//! This crate provides the data side of the stackcpu machine:
//!
//! - [`Opcode`] and [`OPCODE_TABLE`]: opcode values, widths and the
//!   extension each one requires
//! - [`Extension`] / [`Extensions`]: optional instruction groups
//! - [`Register`] / [`Location`]: operand register addressing
//! - [`Program`]: a big-endian word stream
//! - [`Memory`]: the program + stack memory region built by the loader
//! - [`LoadError`]: errors from loading a program

pub mod capability;
pub mod error;
pub mod memory;
pub mod opcode;
pub mod program;
pub mod register;

// Re-export commonly used types at the crate root.
pub use capability::{Extension, Extensions};
pub use error::LoadError;
pub use memory::{Memory, BLOCK_WORDS};
pub use opcode::{Opcode, OpcodeInfo, OPCODE_TABLE};
pub use program::Program;
pub use register::{Location, Register, ALL_REGISTERS, RESULT_INDEX};
