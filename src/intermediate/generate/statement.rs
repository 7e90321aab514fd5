use super::*;
use crate::ast;
use crate::symbols::SymbolKind;

pub fn compile_statement(
    state: &mut IRGenState,
    symbols: &mut SymbolTable,
    statement: &ast::Statement,
    source_meta: &SourceMetadata,
) -> Result<(), GenError> {
    match statement {
        ast::Statement::VarDecl { name, init, line } => {
            // the name goes into the table before the initializer is compiled
            symbols
                .insert(name.source, SymbolKind::Variable, None, Some(*line))
                .map_err(|e| GenError::new(e).with_source(name.span, source_meta))?;
            let value = expr::compile_expr(state, symbols, init, source_meta)?;
            state.emit(Instruction::Assign {
                result: name.source.to_string(),
                value,
            });
            Ok(())
        }
        ast::Statement::Assign { name, value, .. } => {
            if !symbols.exists(name.source) {
                return Err(
                    GenError::new(SymbolError::Undeclared(name.source.to_string()))
                        .with_source(name.span, source_meta),
                );
            }
            let value = expr::compile_expr(state, symbols, value, source_meta)?;
            state.emit(Instruction::Assign {
                result: name.source.to_string(),
                value,
            });
            Ok(())
        }
        ast::Statement::Block(ast::Block(statements)) => {
            for statement in statements {
                compile_statement(state, symbols, statement, source_meta)?;
            }
            Ok(())
        }
        ast::Statement::If {
            condition,
            true_branch,
            false_branch,
            ..
        } => {
            let condition = expr::compile_expr(state, symbols, condition, source_meta)?;
            let else_label = state.new_label();
            let end_label = false_branch.as_ref().map(|_| state.new_label());
            state.emit(Instruction::IfFalse {
                condition,
                target: else_label,
            });
            compile_statement(state, symbols, true_branch, source_meta)
                .map_err(|e| e.add_context("compiling if branch"))?;
            match (false_branch, end_label) {
                (Some(false_branch), Some(end_label)) => {
                    state.emit(Instruction::Goto(end_label));
                    state.emit(Instruction::Label(else_label));
                    compile_statement(state, symbols, false_branch, source_meta)
                        .map_err(|e| e.add_context("compiling else branch"))?;
                    state.emit(Instruction::Label(end_label));
                }
                _ => state.emit(Instruction::Label(else_label)),
            }
            Ok(())
        }
        ast::Statement::While {
            condition, body, ..
        } => {
            let start_label = state.new_label();
            let end_label = state.new_label();
            state.emit(Instruction::Label(start_label));
            let condition = expr::compile_expr(state, symbols, condition, source_meta)?;
            state.emit(Instruction::IfFalse {
                condition,
                target: end_label,
            });
            compile_statement(state, symbols, body, source_meta)
                .map_err(|e| e.add_context("compiling loop body"))?;
            state.emit(Instruction::Goto(start_label));
            state.emit(Instruction::Label(end_label));
            Ok(())
        }
    }
}
