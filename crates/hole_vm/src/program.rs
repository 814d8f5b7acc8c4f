//! Program model and the JSON interchange decoder.
//!
//! A program arrives as an array of instruction records, each record an array
//! whose first element is the opcode and whose remaining elements (at most
//! three) are numbers or names: `[["mov", 5, "a"], ["out", "a"], ["halt"]]`.

use crate::opcode::Opcode;
use crate::operand::{Operand, RawOperand};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_OPERANDS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("instruction {index}: empty record")]
    EmptyRecord { index: usize },
    #[error("instruction {index}: '{opcode}' has {count} operands, at most 3 allowed")]
    TooManyOperands {
        index: usize,
        opcode: String,
        count: usize,
    },
}

/// One instruction record in source form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "Vec<RawOperand>")]
pub struct Instruction {
    pub opcode: String,
    pub operands: Vec<RawOperand>,
}

impl Instruction {
    pub fn new(opcode: impl Into<String>, operands: impl IntoIterator<Item = RawOperand>) -> Self {
        Self {
            opcode: opcode.into(),
            operands: operands.into_iter().collect(),
        }
    }

    fn from_record(index: usize, record: Vec<RawOperand>) -> Result<Self, DecodeError> {
        let mut parts = record.into_iter();
        let opcode = parts
            .next()
            .ok_or(DecodeError::EmptyRecord { index })?
            .to_string();
        let operands: Vec<RawOperand> = parts.collect();
        if operands.len() > MAX_OPERANDS {
            return Err(DecodeError::TooManyOperands {
                index,
                opcode,
                count: operands.len(),
            });
        }
        Ok(Self { opcode, operands })
    }
}

impl From<Instruction> for Vec<RawOperand> {
    fn from(ins: Instruction) -> Self {
        std::iter::once(RawOperand::Name(ins.opcode))
            .chain(ins.operands)
            .collect()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.opcode)?;
        for op in &self.operands {
            write!(f, " {op}")?;
        }
        Ok(())
    }
}

/// An instruction with its opcode looked up and operands classified.
/// `opcode` is `None` for a mnemonic outside the instruction set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub opcode: Option<Opcode>,
    pub operands: Vec<Operand>,
}

impl Decoded {
    fn decode(ins: &Instruction) -> Self {
        let Some(opcode) = Opcode::from_mnemonic(&ins.opcode) else {
            return Self {
                opcode: None,
                operands: Vec::new(),
            };
        };
        let operands = opcode
            .signature()
            .iter()
            .enumerate()
            .map(|(i, slot)| Operand::classify(*slot, ins.operands.get(i)))
            .collect();
        Self {
            opcode: Some(opcode),
            operands,
        }
    }

    /// Operand in position `i`, `Missing` past the end of the signature.
    pub fn operand(&self, i: usize) -> &Operand {
        self.operands.get(i).unwrap_or(&Operand::Missing)
    }
}

/// An immutable, 0-indexed instruction sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    source: Vec<Instruction>,
    decoded: Vec<Decoded>,
}

impl Program {
    pub fn new(source: Vec<Instruction>) -> Self {
        let decoded = source.iter().map(Decoded::decode).collect();
        Self { source, decoded }
    }

    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        let records: Vec<Vec<RawOperand>> = serde_json::from_str(text)?;
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<Vec<RawOperand>>) -> Result<Self, DecodeError> {
        let source = records
            .into_iter()
            .enumerate()
            .map(|(i, r)| Instruction::from_record(i, r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(source))
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn instruction(&self, index: usize) -> Option<&Instruction> {
        self.source.get(index)
    }

    pub fn decoded(&self, index: usize) -> Option<&Decoded> {
        self.decoded.get(index)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.source
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Instruction, &Decoded)> {
        self.source
            .iter()
            .zip(&self.decoded)
            .enumerate()
            .map(|(i, (s, d))| (i, s, d))
    }

    /// Source text of instruction `index`, empty when out of range.
    pub fn render(&self, index: usize) -> String {
        self.instruction(index)
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::Register;

    #[test]
    fn decodes_json_records() {
        let p = Program::from_json(r#"[["mov", 5, "a"], ["out", "a"], ["halt"]]"#).unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(p.render(0), "mov 5 a");
        assert_eq!(p.render(2), "halt");
        let d = p.decoded(0).unwrap();
        assert_eq!(d.opcode, Some(Opcode::Mov));
        assert_eq!(
            d.operands,
            vec![Operand::Literal(5), Operand::Register(Register::A)]
        );
    }

    #[test]
    fn rejects_empty_record() {
        let err = Program::from_json(r#"[["halt"], []]"#).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyRecord { index: 1 }));
    }

    #[test]
    fn rejects_fourth_operand() {
        let err = Program::from_json(r#"[["add", 1, 2, "a", "b"]]"#).unwrap_err();
        match err {
            DecodeError::TooManyOperands { index, opcode, count } => {
                assert_eq!((index, opcode.as_str(), count), (0, "add", 4));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_fractional_numbers() {
        assert!(matches!(
            Program::from_json(r#"[["mov", 1.5, "a"]]"#),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn unknown_opcode_decodes_without_operands() {
        let p = Program::from_json(r#"[["foo", "a"]]"#).unwrap();
        assert_eq!(p.decoded(0).unwrap().opcode, None);
        assert_eq!(p.render(0), "foo a");
    }

    #[test]
    fn numeric_opcode_is_kept_as_text() {
        let p = Program::from_json(r#"[[5]]"#).unwrap();
        assert_eq!(p.instruction(0).unwrap().opcode, "5");
        assert_eq!(p.decoded(0).unwrap().opcode, None);
    }

    #[test]
    fn missing_operands_are_padded() {
        let p = Program::new(vec![Instruction::new("mov", [RawOperand::Int(1)])]);
        let d = p.decoded(0).unwrap();
        assert_eq!(d.operand(1), &Operand::Missing);
        assert_eq!(d.operand(7), &Operand::Missing);
    }

    #[test]
    fn serializes_back_to_records() {
        let ins = Instruction::new("je", ["a".into(), RawOperand::Int(0), "end".into()]);
        assert_eq!(serde_json::to_string(&ins).unwrap(), r#"["je","a",0,"end"]"#);
    }
}
