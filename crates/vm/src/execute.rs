//! Fetch-decode-execute loop and instruction handlers.

use std::io::{BufRead, Write};

use stackcpu_common::{Opcode, Register};

use crate::error::{Fault, Status};
use crate::input;
use crate::machine::Cpu;

/// What a handler wants done with the instruction pointer.
enum Flow {
    /// Advance by the instruction's width.
    Next,
    /// Continue at an absolute address.
    Jump(i32),
    /// Stop the machine, then advance by the instruction's width.
    Halt,
}

/// Operation applied to register A by `add`, `sub`, `mul` and `div`.
#[derive(Clone, Copy)]
enum Arith {
    Add,
    Sub,
    Mul,
    Div,
}

/// Condition tested against R by the jump instructions.
#[derive(Clone, Copy)]
enum Condition {
    Always,
    Zero,
    NonZero,
    Positive,
}

impl<R: BufRead, W: Write> Cpu<R, W> {
    /// Execute one instruction.
    ///
    /// Does nothing and returns false if the machine is not running.
    /// Otherwise returns true if the instruction completed and the machine
    /// is still running, and false if it halted or faulted.
    pub fn step(&mut self) -> bool {
        if !self.status.is_running() {
            return false;
        }

        match self.execute_one() {
            Ok(()) => self.status.is_running(),
            Err(fault) => {
                tracing::debug!(%fault, "machine fault");
                self.status = fault.status();
                self.fault = Some(fault);
                false
            }
        }
    }

    /// Step until `steps` instructions have run, the machine halts, or it
    /// faults.
    ///
    /// Returns the number of steps executed, counting a final `halt`. A run
    /// that ends in a fault returns the negated count instead, the faulting
    /// step included. Returns 0 without stepping if the machine was not
    /// running.
    pub fn run(&mut self, steps: usize) -> i64 {
        if !self.status.is_running() {
            return 0;
        }

        let mut executed: i64 = 0;
        for _ in 0..steps {
            self.step();
            executed = executed.saturating_add(1);

            match self.status {
                Status::Ok => {}
                Status::Halted => break,
                _ => return -executed,
            }
        }
        executed
    }

    fn execute_one(&mut self) -> Result<(), Fault> {
        let word = self.fetch(0)?;
        let info = Opcode::decode(word, self.extensions).ok_or(Fault::IllegalInstruction {
            at: self.ip,
            word,
        })?;

        tracing::trace!(
            op = info.mnemonic,
            ip = self.ip,
            regs = ?self.registers,
            r = self.result,
            sp = self.stack_size,
            "step"
        );

        match self.dispatch(info.opcode)? {
            Flow::Next => self.ip = self.ip.wrapping_add(i32::from(info.width)),
            Flow::Jump(target) => self.ip = target,
            Flow::Halt => {
                self.status = Status::Halted;
                self.ip = self.ip.wrapping_add(i32::from(info.width));
                tracing::debug!(ip = self.ip, "machine halted");
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, opcode: Opcode) -> Result<Flow, Fault> {
        match opcode {
            Opcode::Nop => Ok(Flow::Next),
            Opcode::Halt => Ok(Flow::Halt),

            Opcode::Add => self.exec_arith(Arith::Add),
            Opcode::Sub => self.exec_arith(Arith::Sub),
            Opcode::Mul => self.exec_arith(Arith::Mul),
            Opcode::Div => self.exec_arith(Arith::Div),
            Opcode::Inc => self.exec_step_register(1),
            Opcode::Dec => self.exec_step_register(-1),
            Opcode::Loop => self.exec_loop(),

            Opcode::Mov => self.exec_mov(),
            Opcode::Load => self.exec_load(),
            Opcode::Store => self.exec_store(),

            Opcode::In => self.exec_in(),
            Opcode::Get => self.exec_get(),
            Opcode::Out => self.exec_out(),
            Opcode::Put => self.exec_put(),

            Opcode::Swap => self.exec_swap(),
            Opcode::Push => self.exec_push(),
            Opcode::Pop => self.exec_pop(),

            Opcode::Cmp => self.exec_cmp(),
            Opcode::Jmp => self.exec_jump(Condition::Always),
            Opcode::Jz => self.exec_jump(Condition::Zero),
            Opcode::Jnz => self.exec_jump(Condition::NonZero),
            Opcode::Jgt => self.exec_jump(Condition::Positive),

            Opcode::Call => self.exec_call(),
            Opcode::Ret => self.exec_ret(),
        }
    }

    // ---- Arithmetic ----

    fn exec_arith(&mut self, op: Arith) -> Result<Flow, Fault> {
        let register = self.register_operand(self.fetch(1)?)?;
        let rhs = self.register(register);
        let lhs = self.register(Register::A);

        let value = match op {
            Arith::Add => lhs.wrapping_add(rhs),
            Arith::Sub => lhs.wrapping_sub(rhs),
            Arith::Mul => lhs.wrapping_mul(rhs),
            Arith::Div if rhs == 0 => return Err(Fault::DivisionByZero { at: self.ip }),
            Arith::Div => lhs.wrapping_div(rhs),
        };

        self.set(Register::A, value);
        self.mirror_result(value);
        Ok(Flow::Next)
    }

    fn exec_step_register(&mut self, delta: i32) -> Result<Flow, Fault> {
        let register = self.register_operand(self.fetch(1)?)?;
        let value = self.register(register).wrapping_add(delta);
        self.set(register, value);
        self.mirror_result(value);
        Ok(Flow::Next)
    }

    fn exec_loop(&mut self) -> Result<Flow, Fault> {
        if self.register(Register::C) == 0 {
            return Ok(Flow::Next);
        }
        Ok(Flow::Jump(self.fetch(1)?))
    }

    // ---- Data movement ----

    fn exec_mov(&mut self) -> Result<Flow, Fault> {
        let target = self.fetch(1)?;
        let value = self.fetch(2)?;
        let register = self.register_operand(target)?;
        self.set(register, value);
        Ok(Flow::Next)
    }

    fn exec_load(&mut self) -> Result<Flow, Fault> {
        let target = self.fetch(1)?;
        let immediate = self.fetch(2)?;
        let register = self.register_operand(target)?;
        let slot = self.indexed_slot(immediate)?;
        let value = self.read_slot(slot)?;
        self.set(register, value);
        Ok(Flow::Next)
    }

    fn exec_store(&mut self) -> Result<Flow, Fault> {
        let source = self.fetch(1)?;
        let immediate = self.fetch(2)?;
        let location = self.source_operand(source)?;
        let slot = self.indexed_slot(immediate)?;
        self.write_slot(slot, self.peek(location))?;
        Ok(Flow::Next)
    }

    // ---- I/O ----

    /// End of input: C is cleared, then the target gets the -1 sentinel.
    fn end_of_input(&mut self, register: Register) {
        self.set(Register::C, 0);
        self.set(register, -1);
    }

    fn exec_in(&mut self) -> Result<Flow, Fault> {
        let register = self.register_operand(self.fetch(1)?)?;
        match input::read_integer(&mut self.input) {
            Ok(Some(value)) => self.set(register, value),
            Ok(None) => self.end_of_input(register),
            Err(e) => {
                tracing::debug!(error = %e, "integer input rejected");
                return Err(Fault::Io { at: self.ip });
            }
        }
        Ok(Flow::Next)
    }

    fn exec_get(&mut self) -> Result<Flow, Fault> {
        let register = self.register_operand(self.fetch(1)?)?;
        // A failed read counts as end of input; `get` never faults on input.
        match input::read_byte(&mut self.input) {
            Ok(Some(byte)) => self.set(register, i32::from(byte)),
            Ok(None) => self.end_of_input(register),
            Err(e) => {
                tracing::debug!(error = %e, "byte input failed, treating as end of input");
                self.end_of_input(register);
            }
        }
        Ok(Flow::Next)
    }

    fn exec_out(&mut self) -> Result<Flow, Fault> {
        let location = self.source_operand(self.fetch(1)?)?;
        let value = self.peek(location);
        write!(self.output, "{value}").map_err(|_| Fault::Io { at: self.ip })?;
        Ok(Flow::Next)
    }

    fn exec_put(&mut self) -> Result<Flow, Fault> {
        let location = self.source_operand(self.fetch(1)?)?;
        let value = self.peek(location);
        let byte = u8::try_from(value).map_err(|_| Fault::IllegalOperand {
            at: self.ip,
            operand: value,
        })?;
        self.output
            .write_all(&[byte])
            .map_err(|_| Fault::Io { at: self.ip })?;
        Ok(Flow::Next)
    }

    // ---- Registers and stack ----

    fn exec_swap(&mut self) -> Result<Flow, Fault> {
        let first = self.fetch(1)?;
        let second = self.fetch(2)?;
        let first = self.register_operand(first)?;
        let second = self.register_operand(second)?;
        self.registers.swap(first.index(), second.index());
        Ok(Flow::Next)
    }

    fn exec_push(&mut self) -> Result<Flow, Fault> {
        let location = self.source_operand(self.fetch(1)?)?;
        self.push_word(self.peek(location))?;
        Ok(Flow::Next)
    }

    fn exec_pop(&mut self) -> Result<Flow, Fault> {
        self.ensure_not_empty()?;
        let register = self.register_operand(self.fetch(1)?)?;
        let value = self.pop_word()?;
        self.set(register, value);
        Ok(Flow::Next)
    }

    // ---- Jump extension ----

    fn exec_cmp(&mut self) -> Result<Flow, Fault> {
        let first = self.fetch(1)?;
        let second = self.fetch(2)?;
        let first = self.source_operand(first)?;
        let second = self.source_operand(second)?;
        self.result = self.peek(first).wrapping_sub(self.peek(second));
        Ok(Flow::Next)
    }

    fn exec_jump(&mut self, condition: Condition) -> Result<Flow, Fault> {
        let target = self.fetch(1)?;
        let taken = match condition {
            Condition::Always => true,
            Condition::Zero => self.result == 0,
            Condition::NonZero => self.result != 0,
            Condition::Positive => self.result > 0,
        };
        Ok(if taken { Flow::Jump(target) } else { Flow::Next })
    }

    // ---- Call extension ----

    fn exec_call(&mut self) -> Result<Flow, Fault> {
        let target = self.fetch(1)?;
        let return_address = self.ip.wrapping_add(i32::from(Opcode::Call.width()));
        self.push_word(return_address)?;
        Ok(Flow::Jump(target))
    }

    fn exec_ret(&mut self) -> Result<Flow, Fault> {
        Ok(Flow::Jump(self.pop_word()?))
    }
}
