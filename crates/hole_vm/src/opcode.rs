use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Or,
    Cmp,
    Je,
    Jne,
    Jmp,
    Mov,
    Load,
    Store,
    In,
    Out,
    Halt,
    Label,
    Debug,
    PrintMem,
}

/// Role an operand plays for its opcode. Decides how a raw operand is
/// classified when the program is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Literal or register read.
    Src,
    /// Register write.
    Dst,
    /// Jump target.
    Target,
    /// Name introduced by `label`.
    Name,
    /// Free-form diagnostic argument.
    Raw,
}

impl Opcode {
    pub const ALL: [Opcode; 19] = [
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Mod,
        Opcode::Or,
        Opcode::Cmp,
        Opcode::Je,
        Opcode::Jne,
        Opcode::Jmp,
        Opcode::Mov,
        Opcode::Load,
        Opcode::Store,
        Opcode::In,
        Opcode::Out,
        Opcode::Halt,
        Opcode::Label,
        Opcode::Debug,
        Opcode::PrintMem,
    ];

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        use Opcode::*;
        Some(match s {
            "add" => Add,
            "sub" => Sub,
            "mul" => Mul,
            "div" => Div,
            "mod" => Mod,
            "or" => Or,
            "cmp" => Cmp,
            "je" => Je,
            "jne" => Jne,
            "jmp" => Jmp,
            "mov" => Mov,
            "load" => Load,
            "store" => Store,
            "in" => In,
            "out" => Out,
            "halt" => Halt,
            "label" => Label,
            "debug" => Debug,
            "printmem" => PrintMem,
            _ => return None,
        })
    }

    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Add => "add",
            Sub => "sub",
            Mul => "mul",
            Div => "div",
            Mod => "mod",
            Or => "or",
            Cmp => "cmp",
            Je => "je",
            Jne => "jne",
            Jmp => "jmp",
            Mov => "mov",
            Load => "load",
            Store => "store",
            In => "in",
            Out => "out",
            Halt => "halt",
            Label => "label",
            Debug => "debug",
            PrintMem => "printmem",
        }
    }

    /// Operand roles in positional order. Operands past the end of the
    /// signature are carried along for rendering but never evaluated.
    pub fn signature(self) -> &'static [Slot] {
        use Opcode::*;
        use Slot::*;
        match self {
            Add | Sub | Mul | Div | Mod | Or | Cmp => &[Src, Src, Dst],
            Je | Jne => &[Src, Src, Target],
            Jmp => &[Target],
            Mov => &[Src, Dst],
            Load | In => &[Dst],
            Store | Out => &[Src],
            Label => &[Name],
            Debug => &[Raw, Raw, Raw],
            Halt | PrintMem => &[],
        }
    }

    pub fn is_jump(self) -> bool {
        matches!(self, Opcode::Je | Opcode::Jne | Opcode::Jmp)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
