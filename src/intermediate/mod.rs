use std::collections::HashMap;
use thiserror::Error;

mod format;
pub mod generate;

// IR: a flat list of three-address instructions, control flow is done with
// labels and jumps

pub type IR = Vec<Instruction>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Label(pub usize);

/// Argument of an instruction: an immediate or the name of a symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Constant(i64),
    Name(String),
}

impl From<i64> for Operand {
    fn from(constant: i64) -> Self {
        Self::Constant(constant)
    }
}

impl From<String> for Operand {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&str> for Operand {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Label,
    Goto,
    IfFalse,
    IfTrue,
}

/// The opcodes that combine two operands into a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOpcode {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl From<BinaryOpcode> for Opcode {
    fn from(op: BinaryOpcode) -> Self {
        match op {
            BinaryOpcode::Add => Self::Add,
            BinaryOpcode::Sub => Self::Sub,
            BinaryOpcode::Mul => Self::Mul,
            BinaryOpcode::Div => Self::Div,
            BinaryOpcode::Eq => Self::Eq,
            BinaryOpcode::Ne => Self::Ne,
            BinaryOpcode::Lt => Self::Lt,
            BinaryOpcode::Gt => Self::Gt,
            BinaryOpcode::Le => Self::Le,
            BinaryOpcode::Ge => Self::Ge,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// `result = value`
    Assign { result: String, value: Operand },
    /// `result = lhs op rhs`
    Binary {
        opcode: BinaryOpcode,
        lhs: Operand,
        rhs: Operand,
        result: String,
    },
    Label(Label),
    Goto(Label),
    IfFalse { condition: Operand, target: Label },
    IfTrue { condition: Operand, target: Label },
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Assign { .. } => Opcode::Assign,
            Self::Binary { opcode, .. } => Opcode::from(*opcode),
            Self::Label(_) => Opcode::Label,
            Self::Goto(_) => Opcode::Goto,
            Self::IfFalse { .. } => Opcode::IfFalse,
            Self::IfTrue { .. } => Opcode::IfTrue,
        }
    }

    /// Label this instruction may jump to.
    pub const fn jump_target(&self) -> Option<Label> {
        match self {
            Self::Goto(target)
            | Self::IfFalse { target, .. }
            | Self::IfTrue { target, .. } => Some(*target),
            Self::Assign { .. } | Self::Binary { .. } | Self::Label(_) => None,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("label {0} is not defined")]
pub struct LabelError(pub Label);

/// Maps every label to the index of its `LABEL` instruction.
pub fn label_map(code: &[Instruction]) -> HashMap<Label, usize> {
    code.iter()
        .enumerate()
        .filter_map(|(index, instr)| match instr {
            Instruction::Label(label) => Some((*label, index)),
            _ => None,
        })
        .collect()
}

/// Checks that every jump in `code` has a matching `LABEL`. Reports the first
/// dangling jump in program order.
pub fn validate_labels(code: &[Instruction]) -> Result<(), LabelError> {
    let labels = label_map(code);
    code.iter()
        .filter_map(Instruction::jump_target)
        .find(|target| !labels.contains_key(target))
        .map_or(Ok(()), |target| Err(LabelError(target)))
}
