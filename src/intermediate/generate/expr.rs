use super::*;
use crate::ast::{self, ArithmeticOp, RelationalOp};
use crate::intermediate::{BinaryOpcode, Operand};

impl From<ast::BinaryOp> for BinaryOpcode {
    fn from(op: ast::BinaryOp) -> Self {
        match op {
            ast::BinaryOp::Arithmetic(op) => match op {
                ArithmeticOp::Add => Self::Add,
                ArithmeticOp::Subtract => Self::Sub,
                ArithmeticOp::Multiply => Self::Mul,
                ArithmeticOp::Divide => Self::Div,
            },
            ast::BinaryOp::Relational(op) => match op {
                RelationalOp::Equals => Self::Eq,
                RelationalOp::NotEquals => Self::Ne,
                RelationalOp::LessThan => Self::Lt,
                RelationalOp::GreaterThan => Self::Gt,
                RelationalOp::LessEqual => Self::Le,
                RelationalOp::GreaterEqual => Self::Ge,
            },
        }
    }
}

/// Emits the code computing `expr` and returns the operand holding its value.
/// Constants and variables emit nothing.
pub fn compile_expr(
    state: &mut IRGenState,
    symbols: &mut SymbolTable,
    expr: &ast::Expr,
    source_meta: &SourceMetadata,
) -> Result<Operand, GenError> {
    match expr {
        ast::Expr::Number(constant) => Ok(Operand::Constant(*constant)),
        ast::Expr::Identifier(name) => {
            if symbols.exists(name.source) {
                Ok(Operand::Name(name.source.to_string()))
            } else {
                Err(
                    GenError::new(SymbolError::Undeclared(name.source.to_string()))
                        .with_source(name.span, source_meta),
                )
            }
        }
        ast::Expr::Binary { operator, lhs, rhs } => {
            // compute first lhs, then rhs
            let lhs = compile_expr(state, symbols, lhs, source_meta)?;
            let rhs = compile_expr(state, symbols, rhs, source_meta)?;
            let result = symbols.fresh_temporary().name.clone();
            state.emit(Instruction::Binary {
                opcode: (*operator).into(),
                lhs,
                rhs,
                result: result.clone(),
            });
            Ok(Operand::Name(result))
        }
    }
}
