use std::fmt;

use super::{BinaryOpcode, Instruction, Label, Opcode, Operand};

// format impls
impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(constant) => constant.fmt(f),
            Operand::Name(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Assign => "ASSIGN",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Lt => "LT",
            Self::Gt => "GT",
            Self::Le => "LE",
            Self::Ge => "GE",
            Self::Label => "LABEL",
            Self::Goto => "GOTO",
            Self::IfFalse => "IF_FALSE",
            Self::IfTrue => "IF_TRUE",
        })
    }
}

impl BinaryOpcode {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign { result, value } => write!(f, "{} = {}", result, value),
            Instruction::Binary {
                opcode,
                lhs,
                rhs,
                result,
            } => write!(f, "{} = {} {} {}", result, lhs, opcode.symbol(), rhs),
            Instruction::Label(label) => write!(f, "{}:", label),
            Instruction::Goto(label) => write!(f, "goto {}", label),
            Instruction::IfFalse { condition, target } => {
                write!(f, "if_false {} goto {}", condition, target)
            }
            Instruction::IfTrue { condition, target } => {
                write!(f, "if_true {} goto {}", condition, target)
            }
        }
    }
}
