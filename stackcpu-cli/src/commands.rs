//! CLI command implementations.

use std::fs;
use std::io::{BufRead, Write};

use stackcpu_common::{Extension, Location, Register, ALL_REGISTERS};
use stackcpu_vm::Cpu;

use crate::cli::RunArgs;

/// Load and execute a binary program.
///
/// Exit codes: 1 for unreadable or malformed programs, 3 for runtime faults.
pub fn run(args: &RunArgs) -> Result<(), i32> {
    let path = args.program.display();
    let bytes = fs::read(&args.program).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    let config = args.config();
    let memory = config.load(&bytes[..]).map_err(|e| {
        eprintln!("error: {path}: {e}");
        1
    })?;

    let mut cpu = Cpu::new(memory, config.extensions);
    let executed = cpu.run(args.steps.unwrap_or(usize::MAX));

    if let Err(e) = cpu.output_mut().flush() {
        eprintln!("error: cannot write output: {e}");
        return Err(1);
    }

    if args.dump {
        eprint!("{}", dump(&cpu, executed));
    }

    match cpu.last_fault() {
        Some(fault) => {
            eprintln!("runtime error: {fault}");
            Err(3)
        }
        None => {
            if cpu.status().is_running() {
                tracing::warn!(executed, "step budget exhausted before halt");
            }
            Ok(())
        }
    }
}

/// Render the machine state for `--dump`.
fn dump<R: BufRead, W: Write>(cpu: &Cpu<R, W>, executed: i64) -> String {
    let mut registers: Vec<String> = ALL_REGISTERS
        .iter()
        .map(|&register: &Register| format!("{register}={}", cpu.register(register)))
        .collect();
    registers.push(format!("{}={}", Location::Result, cpu.result()));

    let enabled: Vec<&str> = [(Extension::Jumps, "jumps"), (Extension::Calls, "calls")]
        .into_iter()
        .filter(|&(extension, _)| cpu.extensions().contains(extension))
        .map(|(_, name)| name)
        .collect();
    let extensions = if enabled.is_empty() {
        "none".to_string()
    } else {
        enabled.join(" ")
    };

    format!(
        "status: {} ({})\nsteps: {executed}\n{}\nip={} stack={}\nextensions: {extensions}\n",
        cpu.status(),
        cpu.status().code(),
        registers.join(" "),
        cpu.instruction_pointer(),
        cpu.stack_size(),
    )
}
