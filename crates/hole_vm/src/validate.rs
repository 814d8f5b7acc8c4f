//! Load-time checks.
//!
//! Finds every fault the loop could raise from the program text alone,
//! without running anything. A normal run reports these only when the
//! offending instruction is reached. Strict runs and `holex check` report
//! them all up front.

use crate::exec::ExecError;
use crate::labels::{self, LabelTable};
use crate::opcode::Slot;
use crate::operand::Operand;
use crate::program::Program;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Executing the instruction at `index` would fault with `error`.
    Fault { index: usize, error: ExecError },
    /// `name` was first defined at `previous`; the last definition wins.
    DuplicateLabel {
        index: usize,
        name: String,
        previous: usize,
    },
}

impl Diagnostic {
    pub fn index(&self) -> usize {
        match self {
            Diagnostic::Fault { index, .. } | Diagnostic::DuplicateLabel { index, .. } => *index,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Diagnostic::Fault { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Fault { index, error } => write!(f, "{index:04}  error: {error}"),
            Diagnostic::DuplicateLabel {
                index,
                name,
                previous,
            } => write!(
                f,
                "{index:04}  warning: label '{name}' redefined (first at {previous:04})"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    /// The fault at the lowest instruction index, if any.
    pub fn into_first_fault(self) -> Option<ExecError> {
        self.diagnostics.into_iter().find_map(|d| match d {
            Diagnostic::Fault { error, .. } => Some(error),
            Diagnostic::DuplicateLabel { .. } => None,
        })
    }
}

pub fn validate(program: &Program) -> Report {
    let table = LabelTable::build(program);
    let mut diagnostics = Vec::new();

    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for (index, name) in labels::definitions(program) {
        match seen.get(name) {
            Some(&previous) => duplicates.push(Diagnostic::DuplicateLabel {
                index,
                name: name.to_string(),
                previous,
            }),
            None => {
                seen.insert(name, index);
            }
        }
    }

    for (index, source, decoded) in program.iter() {
        let instr = || source.to_string();
        let Some(opcode) = decoded.opcode else {
            diagnostics.push(Diagnostic::Fault {
                index,
                error: ExecError::UnrecognizedOpcode {
                    instr: instr(),
                    opcode: source.opcode.clone(),
                },
            });
            continue;
        };
        for (slot, operand) in opcode.signature().iter().zip(&decoded.operands) {
            let error = match (slot, operand) {
                (Slot::Src, Operand::Literal(_) | Operand::Register(_)) => None,
                (Slot::Dst, Operand::Register(_)) => None,
                (Slot::Src | Slot::Dst, other) => Some(ExecError::UndefinedRegister {
                    instr: instr(),
                    name: other.ident(),
                }),
                (Slot::Target, Operand::Label(name)) if table.resolve(name).is_some() => None,
                (Slot::Target, other) => Some(ExecError::UnresolvedLabel {
                    instr: instr(),
                    label: other.ident(),
                }),
                (Slot::Name | Slot::Raw, _) => None,
            };
            if let Some(error) = error {
                diagnostics.push(Diagnostic::Fault { index, error });
            }
        }
    }

    diagnostics.extend(duplicates);
    diagnostics.sort_by_key(Diagnostic::index);
    Report { diagnostics }
}
