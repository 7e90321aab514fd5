//! Syntax tree produced by the parser. Names keep their [`Source`] so later
//! phases can point back at them.
use crate::grammar::lexer::{Operator, Source, TokenKind};

use std::fmt;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Program<'source>(pub Vec<Statement<'source>>);

#[derive(PartialEq, Eq)]
pub struct Block<'source>(pub Vec<Statement<'source>>);

impl fmt::Debug for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg_struct = f.debug_struct("Block");
        for (i, stmt) in self.0.iter().enumerate() {
            dbg_struct.field(&i.to_string(), stmt);
        }
        dbg_struct.finish()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Statement<'source> {
    /// `var name = init;`
    VarDecl {
        name: Source<'source>,
        init: Expr<'source>,
        line: usize,
    },
    /// `name = value;`
    Assign {
        name: Source<'source>,
        value: Expr<'source>,
        line: usize,
    },
    If {
        condition: Expr<'source>,
        true_branch: Box<Statement<'source>>,
        false_branch: Option<Box<Statement<'source>>>,
        line: usize,
    },
    While {
        condition: Expr<'source>,
        body: Box<Statement<'source>>,
        line: usize,
    },
    Block(Block<'source>),
}

#[derive(Debug, PartialEq, Eq)]
pub struct Identifier<'source>(pub Source<'source>);

#[derive(Debug, PartialEq, Eq)]
pub enum Expr<'source> {
    Binary {
        operator: BinaryOp,
        lhs: Box<Expr<'source>>,
        rhs: Box<Expr<'source>>,
    },
    Number(i64),
    Identifier(Source<'source>),
}

impl<'source> Expr<'source> {
    pub fn binary(operator: BinaryOp, lhs: Self, rhs: Self) -> Self {
        Self::Binary {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

/// Binary operators, grouped by the precedence level that parses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Arithmetic(ArithmeticOp),
    Relational(RelationalOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    /// `+` operator
    Add,
    /// `-` (binary) operator
    Subtract,
    /// `*` operator
    Multiply,
    /// `/` operator, floored
    Divide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    /// `==`
    Equals,
    /// `!=`
    NotEquals,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
}

impl ArithmeticOp {
    /// `+ -`
    pub const fn term_from_token(kind: TokenKind) -> Option<Self> {
        match kind.as_operator() {
            Some((Operator::Plus, false)) => Some(Self::Add),
            Some((Operator::Minus, false)) => Some(Self::Subtract),
            _ => None,
        }
    }
    /// `* /`
    pub const fn factor_from_token(kind: TokenKind) -> Option<Self> {
        match kind.as_operator() {
            Some((Operator::Star, false)) => Some(Self::Multiply),
            Some((Operator::Slash, false)) => Some(Self::Divide),
            _ => None,
        }
    }
}

impl RelationalOp {
    pub const fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind.as_operator() {
            Some((Operator::Equals, true)) => Self::Equals,
            Some((Operator::ExclamationMark, true)) => Self::NotEquals,
            Some((Operator::AngleLeft, false)) => Self::LessThan,
            Some((Operator::AngleRight, false)) => Self::GreaterThan,
            Some((Operator::AngleLeft, true)) => Self::LessEqual,
            Some((Operator::AngleRight, true)) => Self::GreaterEqual,
            _ => return None,
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arithmetic(op) => op.fmt(f),
            Self::Relational(op) => op.fmt(f),
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        })
    }
}

impl fmt::Display for RelationalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
        })
    }
}
