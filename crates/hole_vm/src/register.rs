use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    Ip = 0,
    Hole,
    HoleData,
    Min,
    Max,
    Read,
    Acc,
    A,
    B,
    C,
    D,
    Checksum,
    Checksum2,
    Min2,
    Max2,
    Tmp,
}

pub const NUM_REGISTERS: usize = 16;

impl Register {
    pub const ALL: [Register; NUM_REGISTERS] = [
        Register::Ip,
        Register::Hole,
        Register::HoleData,
        Register::Min,
        Register::Max,
        Register::Read,
        Register::Acc,
        Register::A,
        Register::B,
        Register::C,
        Register::D,
        Register::Checksum,
        Register::Checksum2,
        Register::Min2,
        Register::Max2,
        Register::Tmp,
    ];

    pub fn name(self) -> &'static str {
        use Register::*;
        match self {
            Ip => "ip",
            Hole => "hole",
            HoleData => "holedata",
            Min => "min",
            Max => "max",
            Read => "read",
            Acc => "acc",
            A => "a",
            B => "b",
            C => "c",
            D => "d",
            Checksum => "checksum",
            Checksum2 => "checksum2",
            Min2 => "min2",
            Max2 => "max2",
            Tmp => "tmp",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Register {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Register::ALL
            .into_iter()
            .find(|r| r.name() == s)
            .ok_or(())
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The closed register file. Every cell is always present, so reads and
/// writes through a [`Register`] cannot fail; unknown names are rejected when
/// operands are classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBank {
    regs: [i64; NUM_REGISTERS],
}

impl RegisterBank {
    /// All registers zero except `hole`, which starts one past the last
    /// memory tag.
    pub fn new(memory_size: usize) -> Self {
        let mut bank = Self {
            regs: [0; NUM_REGISTERS],
        };
        bank.set(Register::Hole, i64::try_from(memory_size).unwrap_or(i64::MAX));
        bank
    }

    pub fn get(&self, reg: Register) -> i64 {
        self.regs[reg.index()]
    }

    pub fn set(&mut self, reg: Register, value: i64) {
        self.regs[reg.index()] = value;
    }

    /// Looks a register up by name; `None` if the name is outside the set.
    pub fn get_named(&self, name: &str) -> Option<i64> {
        name.parse::<Register>().ok().map(|r| self.get(r))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Register, i64)> + '_ {
        Register::ALL.into_iter().map(|r| (r, self.get(r)))
    }
}

impl Serialize for RegisterBank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(NUM_REGISTERS))?;
        for (reg, value) in self.iter() {
            map.serialize_entry(reg.name(), &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for reg in Register::ALL {
            assert_eq!(reg.name().parse::<Register>(), Ok(reg));
        }
        assert!("r0".parse::<Register>().is_err());
        assert!("IP".parse::<Register>().is_err());
    }

    #[test]
    fn enum_order_matches_index() {
        for (i, reg) in Register::ALL.into_iter().enumerate() {
            assert_eq!(reg.index(), i);
        }
    }

    #[test]
    fn new_bank_seeds_hole_with_memory_size() {
        let bank = RegisterBank::new(16);
        for (reg, value) in bank.iter() {
            let expected = if reg == Register::Hole { 16 } else { 0 };
            assert_eq!(value, expected, "{reg}");
        }
    }

    #[test]
    fn set_then_get_negative() {
        let mut bank = RegisterBank::new(1);
        bank.set(Register::Checksum2, -9_007_199_254_740_993);
        assert_eq!(bank.get(Register::Checksum2), -9_007_199_254_740_993);
        assert_eq!(bank.get_named("checksum2"), Some(-9_007_199_254_740_993));
        assert_eq!(bank.get_named("nope"), None);
    }

    #[test]
    fn serializes_as_ordered_map() {
        let bank = RegisterBank::new(4);
        let json = serde_json::to_string(&bank).unwrap();
        assert!(json.starts_with(r#"{"ip":0,"hole":4,"holedata":0"#));
        assert!(json.ends_with(r#""tmp":0}"#));
    }
}
