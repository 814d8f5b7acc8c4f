//! hole-vm - register machine with random-address memory
//!
//! - Sixteen named `i64` registers (`ip`, `hole`, `holedata`, `a`..`d`, ...)
//! - Memory cells are never addressed: `load` and `store` each hit a
//!   uniformly random cell
//! - Labels resolve once per program; unresolved targets fault only when a
//!   jump reaches them
//! - Programs arrive as JSON instruction records, e.g. `[["mov", 5, "a"]]`
//! - Optional step limit, seeded RNG, execution trace and strict validation

pub mod config;
pub mod disasm;
pub mod exec;
pub mod labels;
pub mod memory;
pub mod opcode;
pub mod operand;
pub mod program;
pub mod register;
pub mod streams;
pub mod validate;

pub use config::{ConfigError, VmConfig};
pub use disasm::disassemble;
pub use exec::{ExecError, HaltReason, TraceStep, Vm, VmOutcome};
pub use labels::LabelTable;
pub use memory::{MemOp, Memory};
pub use opcode::Opcode;
pub use operand::{Operand, RawOperand};
pub use program::{DecodeError, Instruction, Program};
pub use register::{Register, RegisterBank};
pub use validate::{validate, Diagnostic, Report};

/// Runs `program` to completion with default configuration.
pub fn run(
    program: &Program,
    memory_size: usize,
    input: impl IntoIterator<Item = i64>,
) -> Result<VmOutcome, ExecError> {
    run_with(VmConfig::default(), program, memory_size, input)
}

pub fn run_with(
    cfg: VmConfig,
    program: &Program,
    memory_size: usize,
    input: impl IntoIterator<Item = i64>,
) -> Result<VmOutcome, ExecError> {
    Vm::new(cfg, program, memory_size, input).run()
}
