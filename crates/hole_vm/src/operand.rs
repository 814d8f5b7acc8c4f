use crate::opcode::Slot;
use crate::register::Register;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An operand exactly as it appears in the interchange format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOperand {
    Int(i64),
    Name(String),
}

impl From<i64> for RawOperand {
    fn from(v: i64) -> Self {
        RawOperand::Int(v)
    }
}

impl From<&str> for RawOperand {
    fn from(s: &str) -> Self {
        RawOperand::Name(s.to_string())
    }
}

impl From<String> for RawOperand {
    fn from(s: String) -> Self {
        RawOperand::Name(s)
    }
}

impl fmt::Display for RawOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawOperand::Int(v) => write!(f, "{v}"),
            RawOperand::Name(s) => f.write_str(s),
        }
    }
}

/// Operand after load-time classification.
///
/// `Invalid` and `Missing` are kept rather than rejected so that a bad
/// operand only faults when its instruction actually executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Literal(i64),
    Register(Register),
    Label(String),
    Raw(RawOperand),
    Invalid(String),
    Missing,
}

/// Placeholder identifier reported for an operand the instruction lacks.
pub const MISSING: &str = "(missing)";

impl Operand {
    pub fn classify(slot: Slot, raw: Option<&RawOperand>) -> Self {
        let Some(raw) = raw else {
            return Operand::Missing;
        };
        match (slot, raw) {
            (Slot::Src, RawOperand::Int(v)) => Operand::Literal(*v),
            (Slot::Src | Slot::Dst, RawOperand::Name(name)) => match name.parse::<Register>() {
                Ok(reg) => Operand::Register(reg),
                Err(()) => Operand::Invalid(name.clone()),
            },
            (Slot::Dst, RawOperand::Int(v)) => Operand::Invalid(v.to_string()),
            (Slot::Target | Slot::Name, raw) => Operand::Label(raw.to_string()),
            (Slot::Raw, raw) => Operand::Raw(raw.clone()),
        }
    }

    /// Identifier to report when this operand fails to resolve.
    pub fn ident(&self) -> String {
        match self {
            Operand::Literal(v) => v.to_string(),
            Operand::Register(r) => r.name().to_string(),
            Operand::Label(s) | Operand::Invalid(s) => s.clone(),
            Operand::Raw(raw) => raw.to_string(),
            Operand::Missing => MISSING.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_in_source_position_are_literals() {
        let op = Operand::classify(Slot::Src, Some(&RawOperand::Int(-3)));
        assert_eq!(op, Operand::Literal(-3));
    }

    #[test]
    fn register_names_resolve_in_both_directions() {
        let raw = RawOperand::from("holedata");
        assert_eq!(Operand::classify(Slot::Src, Some(&raw)), Operand::Register(Register::HoleData));
        assert_eq!(Operand::classify(Slot::Dst, Some(&raw)), Operand::Register(Register::HoleData));
    }

    #[test]
    fn numeric_destination_is_invalid() {
        let op = Operand::classify(Slot::Dst, Some(&RawOperand::Int(6)));
        assert_eq!(op, Operand::Invalid("6".into()));
    }

    #[test]
    fn unknown_name_is_invalid() {
        let op = Operand::classify(Slot::Src, Some(&"e".into()));
        assert_eq!(op, Operand::Invalid("e".into()));
        assert_eq!(op.ident(), "e");
    }

    #[test]
    fn numeric_labels_key_by_text() {
        let op = Operand::classify(Slot::Target, Some(&RawOperand::Int(5)));
        assert_eq!(op, Operand::Label("5".into()));
    }

    #[test]
    fn absent_operand_is_missing() {
        let op = Operand::classify(Slot::Dst, None);
        assert_eq!(op, Operand::Missing);
        assert_eq!(op.ident(), MISSING);
    }

    #[test]
    fn raw_operand_json_shapes() {
        let ops: Vec<RawOperand> = serde_json::from_str(r#"[1, "a", -20]"#).unwrap();
        assert_eq!(ops, vec![RawOperand::Int(1), "a".into(), RawOperand::Int(-20)]);
        assert!(serde_json::from_str::<RawOperand>("1.5").is_err());
    }
}
