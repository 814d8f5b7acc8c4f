//! Human-readable program listing.

use crate::labels::LabelTable;
use crate::opcode::Opcode;
use crate::operand::Operand;
use crate::program::{Decoded, Program};

/// One line per instruction: index, source text, and a note for jumps and
/// unknown opcodes.
pub fn disassemble(program: &Program) -> String {
    let labels = LabelTable::build(program);
    let mut out = String::new();

    for (index, source, decoded) in program.iter() {
        let detail = format_detail(decoded, &labels);
        let line = if detail.is_empty() {
            format!("{:04}  {}", index, source)
        } else {
            format!("{:04}  {:<24}; {}", index, source.to_string(), detail)
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if out.is_empty() {
        out.push_str("(empty program)\n");
    }

    out
}

fn format_detail(decoded: &Decoded, labels: &LabelTable) -> String {
    let Some(op) = decoded.opcode else {
        return "unrecognized opcode".to_string();
    };
    if !op.is_jump() {
        return String::new();
    }
    let target = match op {
        Opcode::Jmp => decoded.operand(0),
        _ => decoded.operand(2),
    };
    match target {
        Operand::Label(name) => match labels.resolve(name) {
            Some(to) => format!("-> {:04}", to),
            None => format!("-> ? ({})", name),
        },
        other => format!("-> ? ({})", other.ident()),
    }
}
