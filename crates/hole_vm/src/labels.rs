use crate::opcode::Opcode;
use crate::operand::Operand;
use crate::program::Program;
use std::collections::HashMap;

/// Label name to instruction index. Built once per program; a later
/// definition of the same name replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    locations: HashMap<String, usize>,
}

impl LabelTable {
    pub fn build(program: &Program) -> Self {
        let mut locations = HashMap::new();
        for (index, name) in definitions(program) {
            locations.insert(name.to_string(), index);
        }
        Self { locations }
    }

    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.locations.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Every `label` definition in program order, duplicates included.
pub fn definitions(program: &Program) -> impl Iterator<Item = (usize, &str)> {
    program.iter().filter_map(|(index, _, decoded)| {
        match (decoded.opcode, decoded.operand(0)) {
            (Some(Opcode::Label), Operand::Label(name)) => Some((index, name.as_str())),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(json: &str) -> Program {
        Program::from_json(json).unwrap()
    }

    #[test]
    fn records_label_indices() {
        let p = program(r#"[["jmp","end"],["label","loop"],["halt"],["label","end"]]"#);
        let t = LabelTable::build(&p);
        assert_eq!(t.resolve("loop"), Some(1));
        assert_eq!(t.resolve("end"), Some(3));
        assert_eq!(t.resolve("nope"), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn last_duplicate_wins() {
        let p = program(r#"[["label","x"],["halt"],["label","x"]]"#);
        assert_eq!(LabelTable::build(&p).resolve("x"), Some(2));
        assert_eq!(definitions(&p).count(), 2);
    }

    #[test]
    fn numeric_label_names() {
        let p = program(r#"[["label", 7],["jmp", 7]]"#);
        assert_eq!(LabelTable::build(&p).resolve("7"), Some(0));
    }

    #[test]
    fn nameless_label_is_ignored() {
        let p = program(r#"[["label"],["halt"]]"#);
        assert!(LabelTable::build(&p).is_empty());
    }
}
