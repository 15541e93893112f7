//! Machine state: register file, stack bounds, status and I/O endpoints.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use stackcpu_common::{Extension, Extensions, Location, Memory, Register};

use crate::error::{Fault, Status};

/// The stackcpu machine.
///
/// Owns its memory region for the lifetime of a run. The program zone is
/// every address below [`Memory::stack_zone_start`]; the stack occupies the
/// rest and grows from [`Memory::stack_bottom`] towards lower addresses.
#[derive(Debug)]
pub struct Cpu<R = StdinLock<'static>, W = Stdout> {
    /// General-purpose registers A-D.
    pub(crate) registers: [i32; 4],
    /// Result register R (jump extension).
    pub(crate) result: i32,
    /// Number of words currently on the stack.
    pub(crate) stack_size: usize,
    /// Address of the next instruction.
    pub(crate) ip: i32,
    pub(crate) status: Status,
    /// The fault that ended execution, if any.
    pub(crate) fault: Option<Fault>,
    pub(crate) memory: Memory,
    pub(crate) extensions: Extensions,
    pub(crate) input: R,
    pub(crate) output: W,
}

impl Cpu {
    /// Create a machine wired to the process stdin and stdout.
    pub fn new(memory: Memory, extensions: Extensions) -> Self {
        Self::with_io(memory, extensions, io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Cpu<R, W> {
    /// Create a machine over a loaded memory region.
    ///
    /// All registers, the stack size, the instruction pointer and the
    /// status start at zero.
    pub fn with_io(memory: Memory, extensions: Extensions, input: R, output: W) -> Self {
        Self {
            registers: [0; 4],
            result: 0,
            stack_size: 0,
            ip: 0,
            status: Status::Ok,
            fault: None,
            memory,
            extensions,
            input,
            output,
        }
    }

    /// Rerun from scratch: zero the stack zone and every register.
    ///
    /// Program words are left intact.
    pub fn reset(&mut self) {
        self.memory.clear_stack();
        self.registers = [0; 4];
        self.result = 0;
        self.stack_size = 0;
        self.ip = 0;
        self.status = Status::Ok;
        self.fault = None;
        tracing::debug!("machine reset");
    }

    /// Release the machine, handing back memory and I/O endpoints.
    pub fn into_parts(self) -> (Memory, R, W) {
        (self.memory, self.input, self.output)
    }

    // ---- Inspection ----

    /// Current status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The fault that ended execution, if the machine is in a fault state.
    pub fn last_fault(&self) -> Option<Fault> {
        self.fault
    }

    /// Value of a general-purpose register.
    pub fn register(&self, register: Register) -> i32 {
        self.registers[register.index()]
    }

    /// All general-purpose registers, A first.
    pub fn registers(&self) -> [i32; 4] {
        self.registers
    }

    /// Value of the result register R.
    pub fn result(&self) -> i32 {
        self.result
    }

    /// Value of any readable location.
    pub fn peek(&self, location: Location) -> i32 {
        match location {
            Location::Register(register) => self.register(register),
            Location::Result => self.result,
        }
    }

    /// Number of words on the stack.
    pub fn stack_size(&self) -> usize {
        self.stack_size
    }

    /// Address of the next instruction.
    pub fn instruction_pointer(&self) -> i32 {
        self.ip
    }

    /// Enabled extensions.
    pub fn extensions(&self) -> Extensions {
        self.extensions
    }

    /// The memory region.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// The output sink.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Mutable access to the output sink, e.g. to flush it.
    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    // ---- Operand access ----

    /// Fetch the word `offset` words past the instruction pointer.
    ///
    /// Only the program zone is fetchable.
    pub(crate) fn fetch(&self, offset: i32) -> Result<i32, Fault> {
        let address = i64::from(self.ip) + i64::from(offset);
        let invalid = Fault::InvalidAddress {
            at: self.ip,
            address,
        };
        let index = usize::try_from(address).map_err(|_| invalid)?;
        if index >= self.memory.stack_zone_start() {
            return Err(invalid);
        }
        self.memory.get(index).ok_or(invalid)
    }

    /// Decode a writable register operand.
    pub(crate) fn register_operand(&self, word: i32) -> Result<Register, Fault> {
        Register::from_operand(word).ok_or(Fault::IllegalOperand {
            at: self.ip,
            operand: word,
        })
    }

    /// Decode a readable operand; R is accepted when jumps are enabled.
    pub(crate) fn source_operand(&self, word: i32) -> Result<Location, Fault> {
        Location::from_operand(word, self.extensions).ok_or(Fault::IllegalOperand {
            at: self.ip,
            operand: word,
        })
    }

    pub(crate) fn set(&mut self, register: Register, value: i32) {
        self.registers[register.index()] = value;
    }

    /// Mirror a freshly computed value into R when the jump extension is on.
    pub(crate) fn mirror_result(&mut self, value: i32) {
        if self.extensions.contains(Extension::Jumps) {
            self.result = value;
        }
    }

    // ---- Stack ----

    /// Address of stack slot `slot`, counted from the bottom (0 = first pushed).
    fn slot_address(&self, slot: usize) -> usize {
        self.memory.stack_bottom() - slot
    }

    fn stack_fault(&self) -> Fault {
        Fault::InvalidStackOperation { at: self.ip }
    }

    /// Push a word, failing if the stack is full.
    pub(crate) fn push_word(&mut self, value: i32) -> Result<(), Fault> {
        if self.stack_size >= self.memory.stack_capacity() {
            return Err(self.stack_fault());
        }
        self.write_slot(self.stack_size, value)?;
        self.stack_size += 1;
        Ok(())
    }

    /// Fail unless at least one word is on the stack.
    pub(crate) fn ensure_not_empty(&self) -> Result<(), Fault> {
        if self.stack_size == 0 {
            return Err(self.stack_fault());
        }
        Ok(())
    }

    /// Pop the top word, failing if the stack is empty.
    pub(crate) fn pop_word(&mut self) -> Result<i32, Fault> {
        self.ensure_not_empty()?;
        let value = self.read_slot(self.stack_size - 1)?;
        self.stack_size -= 1;
        Ok(value)
    }

    /// Resolve a frame-relative offset (`imm + D`, 0 = top) to a slot index.
    pub(crate) fn indexed_slot(&self, immediate: i32) -> Result<usize, Fault> {
        let offset = i64::from(immediate) + i64::from(self.register(Register::D));
        let slot = self.stack_size as i64 - offset - 1;
        if offset < 0 || slot < 0 {
            return Err(self.stack_fault());
        }
        usize::try_from(slot).map_err(|_| self.stack_fault())
    }

    pub(crate) fn read_slot(&self, slot: usize) -> Result<i32, Fault> {
        self.memory
            .get(self.slot_address(slot))
            .ok_or_else(|| self.stack_fault())
    }

    pub(crate) fn write_slot(&mut self, slot: usize, value: i32) -> Result<(), Fault> {
        let address = self.slot_address(slot);
        let fault = self.stack_fault();
        *self.memory.get_mut(address).ok_or(fault)? = value;
        Ok(())
    }
}
