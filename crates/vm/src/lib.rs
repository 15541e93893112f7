//! stackcpu virtual machine: executes big-endian word programs.
//!
//! The machine has:
//! - Four general-purpose 32-bit registers A-D
//! - An instruction pointer into the program zone of a flat memory region
//! - An operand stack carved out of the end of the same region
//! - Optional jump/compare (with a result register R) and call/return
//!   extensions, enabled at runtime
//!
//! # Usage
//!
//! ```
//! use stackcpu_common::{Opcode, Program, Register};
//! use stackcpu_vm::{load_and_run, Config, Status};
//!
//! let mut program = Program::default();
//! program
//!     .push(Opcode::Mov, &[0, 42])
//!     .push(Opcode::Out, &[0])
//!     .push(Opcode::Halt, &[]);
//!
//! let (cpu, steps) = load_and_run(
//!     &program.encode()[..],
//!     &Config::default(),
//!     100,
//!     &b""[..],
//!     Vec::new(),
//! )
//! .unwrap();
//! assert_eq!(steps, 3);
//! assert_eq!(cpu.status(), Status::Halted);
//! assert_eq!(cpu.register(Register::A), 42);
//! assert_eq!(cpu.output(), b"42");
//! ```

pub mod config;
pub mod error;
mod execute;
mod input;
pub mod machine;

pub use config::{Config, DEFAULT_STACK_CAPACITY};
pub use error::{Fault, Status};
pub use machine::Cpu;

use std::io::{BufRead, Read, Write};

use stackcpu_common::LoadError;

/// Load a program and run it for at most `steps` steps.
///
/// Returns the machine, for inspection, together with the value of
/// [`Cpu::run`].
///
/// # Errors
///
/// Returns [`LoadError`] if the program cannot be loaded.
pub fn load_and_run<P, R, W>(
    program: P,
    config: &Config,
    steps: usize,
    input: R,
    output: W,
) -> Result<(Cpu<R, W>, i64), LoadError>
where
    P: Read,
    R: BufRead,
    W: Write,
{
    let memory = config.load(program)?;
    let mut cpu = Cpu::with_io(memory, config.extensions, input, output);
    let executed = cpu.run(steps);
    Ok((cpu, executed))
}
