use crate::config::VmConfig;
use crate::labels::LabelTable;
use crate::memory::{MemOp, Memory};
use crate::opcode::Opcode;
use crate::operand::{Operand, RawOperand};
use crate::program::{Decoded, Program};
use crate::register::{Register, RegisterBank};
use crate::streams::{InputQueue, OutputSequence};
use crate::validate;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("no instruction at ip={ip}")]
    MissingInstruction { ip: i64 },
    #[error("at '{instr}': register '{name}' does not exist")]
    UndefinedRegister { instr: String, name: String },
    #[error("at '{instr}': label '{label}' does not exist")]
    UnresolvedLabel { instr: String, label: String },
    #[error("unrecognized instruction '{instr}'")]
    UnrecognizedOpcode { instr: String, opcode: String },
    #[error("at '{instr}': division by zero")]
    DivisionByZero { instr: String },
    #[error("at '{instr}': memory has no cells")]
    EmptyMemory { instr: String },
    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: u64 },
}

/// Why a run stopped successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    Halt,
    InputExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub step: u64,
    pub ip: usize,
    pub instr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VmOutcome {
    pub output: Vec<i64>,
    pub memory: Vec<i64>,
    pub registers: RegisterBank,
    pub halt: HaltReason,
    pub steps: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceStep>,
}

/// What the loop does after an instruction.
enum Flow {
    Next,
    Jump(usize),
    Stop(HaltReason),
}

pub struct Vm<'p> {
    cfg: VmConfig,
    program: &'p Program,
    labels: LabelTable,
    registers: RegisterBank,
    memory: Memory,
    input: InputQueue,
    output: OutputSequence,
    steps: u64,
    trace: Vec<TraceStep>,
}

impl<'p> Vm<'p> {
    pub fn new(
        cfg: VmConfig,
        program: &'p Program,
        memory_size: usize,
        input: impl IntoIterator<Item = i64>,
    ) -> Self {
        let memory = Memory::with_seed(memory_size, cfg.seed);
        Self {
            labels: LabelTable::build(program),
            registers: RegisterBank::new(memory_size),
            memory,
            input: InputQueue::new(input),
            output: OutputSequence::default(),
            steps: 0,
            trace: Vec::new(),
            cfg,
            program,
        }
    }

    pub fn registers(&self) -> &RegisterBank {
        &self.registers
    }

    pub fn memory(&self) -> &[i64] {
        self.memory.cells()
    }

    pub fn output(&self) -> &[i64] {
        self.output.as_slice()
    }

    fn charge(&mut self) -> Result<(), ExecError> {
        if let Some(limit) = self.cfg.step_limit {
            if self.steps >= limit {
                return Err(ExecError::StepLimitExceeded { limit });
            }
        }
        self.steps += 1;
        Ok(())
    }

    /// Runs to a terminal state, consuming the machine.
    pub fn run(mut self) -> Result<VmOutcome, ExecError> {
        if self.cfg.strict {
            if let Some(err) = validate::validate(self.program).into_first_fault() {
                warn!(error = %err, "program rejected by strict validation");
                return Err(err);
            }
        }
        debug!(
            instructions = self.program.len(),
            labels = self.labels.len(),
            memory = self.memory.len(),
            input = self.input.remaining(),
            "run start"
        );
        match self.run_loop() {
            Ok(halt) => {
                debug!(steps = self.steps, outputs = self.output.as_slice().len(), ?halt, "run halted");
                Ok(VmOutcome {
                    output: self.output.into_vec(),
                    memory: self.memory.into_cells(),
                    registers: self.registers,
                    halt,
                    steps: self.steps,
                    trace: self.trace,
                })
            }
            Err(err) => {
                warn!(steps = self.steps, error = %err, "run faulted");
                Err(err)
            }
        }
    }

    fn run_loop(&mut self) -> Result<HaltReason, ExecError> {
        loop {
            let ip = self.registers.get(Register::Ip);
            let at = usize::try_from(ip)
                .ok()
                .filter(|i| *i < self.program.len())
                .ok_or(ExecError::MissingInstruction { ip })?;
            let program = self.program;
            let ins = program
                .decoded(at)
                .ok_or(ExecError::MissingInstruction { ip })?;
            self.charge()?;

            let (flow, note) = self.execute(at, ins)?;
            if self.cfg.trace {
                self.trace.push(TraceStep {
                    step: self.steps,
                    ip: at,
                    instr: program.render(at),
                    note,
                });
            }
            match flow {
                Flow::Next => {
                    // Re-read: the instruction may have written ip itself.
                    let ip = self.registers.get(Register::Ip).saturating_add(1);
                    self.registers.set(Register::Ip, ip);
                }
                Flow::Jump(target) => {
                    self.registers.set(Register::Ip, target as i64);
                }
                Flow::Stop(reason) => return Ok(reason),
            }
        }
    }

    fn execute(&mut self, at: usize, ins: &Decoded) -> Result<(Flow, Option<String>), ExecError> {
        let Some(op) = ins.opcode else {
            let source = self.program.instruction(at);
            return Err(ExecError::UnrecognizedOpcode {
                instr: self.program.render(at),
                opcode: source.map(|s| s.opcode.clone()).unwrap_or_default(),
            });
        };
        let mut note = None;
        let flow = match op {
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod | Opcode::Or => {
                let a = self.value(at, ins.operand(0))?;
                let b = self.value(at, ins.operand(1))?;
                let dst = self.dest(at, ins.operand(2))?;
                let r = match op {
                    Opcode::Add => a.saturating_add(b),
                    Opcode::Sub => a.saturating_sub(b),
                    Opcode::Mul => a.saturating_mul(b),
                    Opcode::Div => floor_div(a, b).ok_or_else(|| self.div_by_zero(at))?,
                    Opcode::Mod => trunc_rem(a, b).ok_or_else(|| self.div_by_zero(at))?,
                    _ => a | b,
                };
                self.registers.set(dst, r);
                Flow::Next
            }
            Opcode::Cmp => {
                let a = self.value(at, ins.operand(0))?;
                let b = self.value(at, ins.operand(1))?;
                let dst = self.dest(at, ins.operand(2))?;
                let r = match a.cmp(&b) {
                    Ordering::Greater => 1,
                    Ordering::Equal => 0,
                    Ordering::Less => -1,
                };
                self.registers.set(dst, r);
                Flow::Next
            }
            Opcode::Je | Opcode::Jne => {
                let a = self.value(at, ins.operand(0))?;
                let b = self.value(at, ins.operand(1))?;
                if (a == b) == (op == Opcode::Je) {
                    Flow::Jump(self.target(at, ins.operand(2))?)
                } else {
                    Flow::Next
                }
            }
            Opcode::Jmp => Flow::Jump(self.target(at, ins.operand(0))?),
            Opcode::Mov => {
                let v = self.value(at, ins.operand(0))?;
                let dst = self.dest(at, ins.operand(1))?;
                self.registers.set(dst, v);
                Flow::Next
            }
            Opcode::Load => {
                let dst = self.dest(at, ins.operand(0))?;
                let mem_op = self.memory.load().ok_or_else(|| self.empty_memory(at))?;
                self.registers.set(dst, mem_op.val());
                note = self.note(mem_op);
                Flow::Next
            }
            Opcode::Store => {
                let v = self.value(at, ins.operand(0))?;
                let mem_op = self.memory.store(v).ok_or_else(|| self.empty_memory(at))?;
                note = self.note(mem_op);
                Flow::Next
            }
            Opcode::In => match self.input.pop() {
                // An empty queue ends the run before the destination is touched.
                None => Flow::Stop(HaltReason::InputExhausted),
                Some(v) => {
                    let dst = self.dest(at, ins.operand(0))?;
                    self.registers.set(dst, v);
                    Flow::Next
                }
            },
            Opcode::Out => {
                let v = self.value(at, ins.operand(0))?;
                self.output.push(v);
                Flow::Next
            }
            Opcode::Halt => Flow::Stop(HaltReason::Halt),
            Opcode::Label => Flow::Next,
            Opcode::Debug => {
                let source = self.program.instruction(at);
                let values: Vec<String> = source
                    .map(|s| s.operands.iter().map(|raw| self.debug_value(raw)).collect())
                    .unwrap_or_default();
                debug!(target: "hole_vm::diag", ip = at, values = ?values, "DEBUG");
                Flow::Next
            }
            Opcode::PrintMem => {
                debug!(target: "hole_vm::diag", ip = at, memory = ?self.memory.cells(), "PRINTMEM");
                Flow::Next
            }
        };
        Ok((flow, note))
    }

    fn value(&self, at: usize, operand: &Operand) -> Result<i64, ExecError> {
        match operand {
            Operand::Literal(v) => Ok(*v),
            Operand::Register(r) => Ok(self.registers.get(*r)),
            other => Err(self.undefined_register(at, other)),
        }
    }

    fn dest(&self, at: usize, operand: &Operand) -> Result<Register, ExecError> {
        match operand {
            Operand::Register(r) => Ok(*r),
            other => Err(self.undefined_register(at, other)),
        }
    }

    fn target(&self, at: usize, operand: &Operand) -> Result<usize, ExecError> {
        let resolved = match operand {
            Operand::Label(name) => self.labels.resolve(name),
            _ => None,
        };
        resolved.ok_or_else(|| ExecError::UnresolvedLabel {
            instr: self.program.render(at),
            label: operand.ident(),
        })
    }

    /// Operands of `debug` print their value when they name a register and
    /// their own text otherwise.
    fn debug_value(&self, raw: &RawOperand) -> String {
        match raw {
            RawOperand::Int(v) => v.to_string(),
            RawOperand::Name(name) => self
                .registers
                .get_named(name)
                .map(|v| v.to_string())
                .unwrap_or_else(|| name.clone()),
        }
    }

    fn note(&self, mem_op: MemOp) -> Option<String> {
        self.cfg.trace.then(|| mem_op.to_string())
    }

    fn undefined_register(&self, at: usize, operand: &Operand) -> ExecError {
        ExecError::UndefinedRegister {
            instr: self.program.render(at),
            name: operand.ident(),
        }
    }

    fn div_by_zero(&self, at: usize) -> ExecError {
        ExecError::DivisionByZero {
            instr: self.program.render(at),
        }
    }

    fn empty_memory(&self, at: usize) -> ExecError {
        ExecError::EmptyMemory {
            instr: self.program.render(at),
        }
    }
}

/// Quotient rounded toward negative infinity. `None` on a zero divisor;
/// `i64::MIN / -1` saturates.
pub fn floor_div(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    let q = a.saturating_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

/// Remainder with the sign of the dividend. `None` on a zero divisor.
pub fn trunc_rem(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    Some(a.wrapping_rem(b))
}
