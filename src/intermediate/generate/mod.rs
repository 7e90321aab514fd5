use super::{Instruction, Label, IR};
use crate::ast;
use crate::error::{self, SourceMetadata};
use crate::symbols::{SymbolError, SymbolTable};
use std::fmt;
mod expr;
mod statement;

pub type GenError = error::Error<SymbolError>;

/// Translates `program` into three-address code. Every declared variable and
/// every temporary ends up in `symbols`.
pub fn generate(
    program: &ast::Program,
    symbols: &mut SymbolTable,
    source_meta: &SourceMetadata,
) -> Result<IR, GenError> {
    let ast::Program(statements) = program;
    let mut state = IRGenState::default();
    for statement in statements {
        statement::compile_statement(&mut state, symbols, statement, source_meta)?;
    }
    tracing::debug!(target: "irgen", "generated code: {state:?}");
    Ok(state.release())
}

#[repr(transparent)]
#[derive(Default)]
pub struct LabelCounter {
    latest_label: usize,
}

impl LabelCounter {
    pub fn next_label(&mut self) -> Label {
        let current = self.latest_label;
        self.latest_label += 1;
        Label(current)
    }
}

/// Instructions emitted so far plus the label counter. One per generation
/// run, so label names are unique across the whole program.
#[derive(Default)]
pub struct IRGenState {
    code: IR,
    labels: LabelCounter,
}

impl fmt::Debug for IRGenState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        struct DoDisplay<'a>(&'a Instruction);

        impl<'a> fmt::Debug for DoDisplay<'a> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
        f.debug_list()
            .entries(self.code.iter().map(DoDisplay))
            .finish()
    }
}

impl IRGenState {
    pub fn emit(&mut self, instr: Instruction) {
        tracing::trace!(target: "irgen::emit", "{instr}");
        self.code.push(instr)
    }
    pub fn new_label(&mut self) -> Label {
        self.labels.next_label()
    }
    fn release(self) -> IR {
        self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{lexer, parse_program};
    use crate::symbols::SymbolKind;

    fn gen(input: &'static str) -> (Result<Vec<String>, GenError>, SymbolTable) {
        let meta = SourceMetadata::new(input);
        let tokens = lexer::analyze(&meta).unwrap();
        let program = parse_program(&tokens, &meta).unwrap();
        let mut symbols = SymbolTable::new();
        let code = generate(&program, &mut symbols, &meta)
            .map(|code| code.iter().map(ToString::to_string).collect());
        (code, symbols)
    }

    fn lines(input: &'static str) -> Vec<String> {
        gen(input).0.unwrap()
    }

    #[test]
    fn declaration_with_constant() {
        assert_eq!(lines("var a = 5;"), vec!["a = 5"]);
    }

    #[test]
    fn binary_expression_uses_temporaries_left_first() {
        assert_eq!(
            lines("var a = 2 + 3 * 4;"),
            vec!["%t0 = 3 * 4", "%t1 = 2 + %t0", "a = %t1"]
        );
        assert_eq!(
            lines("var a = (1 - 2) - (3 - 4);"),
            vec!["%t0 = 1 - 2", "%t1 = 3 - 4", "%t2 = %t0 - %t1", "a = %t2"]
        );
    }

    #[test]
    fn if_without_else_has_no_end_label() {
        assert_eq!(
            lines("var a = 0; if (a > 0) a = 1;"),
            vec![
                "a = 0",
                "%t0 = a > 0",
                "if_false %t0 goto L0",
                "a = 1",
                "L0:",
            ]
        );
    }

    #[test]
    fn if_else() {
        assert_eq!(
            lines("var a = 0; if (a > 0) { a = 1; } else { a = 2; }"),
            vec![
                "a = 0",
                "%t0 = a > 0",
                "if_false %t0 goto L0",
                "a = 1",
                "goto L1",
                "L0:",
                "a = 2",
                "L1:",
            ]
        );
    }

    #[test]
    fn while_loop_reevaluates_condition() {
        assert_eq!(
            lines("var c = 3; while (c > 0) { c = c - 1; }"),
            vec![
                "c = 3",
                "L0:",
                "%t0 = c > 0",
                "if_false %t0 goto L1",
                "%t1 = c - 1",
                "c = %t1",
                "goto L0",
                "L1:",
            ]
        );
    }

    #[test]
    fn labels_are_numbered_across_the_whole_program() {
        let code = lines("var a = 1; if (a) a = 2; while (a) a = 0; if (a) a = 3; else a = 4;");
        let labels: Vec<_> = code.iter().filter(|l| l.ends_with(':')).collect();
        assert_eq!(labels, vec!["L0:", "L1:", "L2:", "L3:", "L4:"]);
    }

    #[test]
    fn declaration_inserts_before_initializer() {
        // the name is visible in its own initializer
        assert_eq!(lines("var a = a + 1;"), vec!["%t0 = a + 1", "a = %t0"]);
    }

    #[test]
    fn symbols_record_declarations_and_temporaries() {
        let (code, symbols) = gen("var x = 1;\nvar y = x * 2;");
        assert!(code.is_ok());
        let x = symbols.get("x").unwrap();
        assert_eq!(x.kind, SymbolKind::Variable);
        assert_eq!(x.line, Some(1));
        assert!(!x.initialized);
        assert_eq!(symbols.get("y").unwrap().line, Some(2));
        assert_eq!(symbols.temporaries().count(), 1);
    }

    #[test]
    fn redeclaration() {
        let (code, _) = gen("var a = 1;\nvar a = 2;");
        let err = code.unwrap_err();
        assert_eq!(
            err.kind,
            SymbolError::Redeclared {
                name: "a".into(),
                line: Some(2)
            }
        );
        assert_eq!(err.position().map(|p| p.line), Some(2));
    }

    #[test]
    fn blocks_do_not_scope() {
        let (code, _) = gen("{ var a = 1; } var a = 2;");
        assert!(matches!(
            code.unwrap_err().kind,
            SymbolError::Redeclared { .. }
        ));
        assert_eq!(lines("{ var a = 1; } a = 2;"), vec!["a = 1", "a = 2"]);
    }

    #[test]
    fn assignment_to_undeclared() {
        let (code, _) = gen("x = 1;");
        assert_eq!(code.unwrap_err().kind, SymbolError::Undeclared("x".into()));
    }

    #[test]
    fn use_of_undeclared() {
        let (code, _) = gen("var a = 1;\nvar b = a + c;");
        let err = code.unwrap_err();
        assert_eq!(err.kind, SymbolError::Undeclared("c".into()));
        let position = err.position().unwrap();
        assert_eq!((position.line, position.col), (2, 13));
    }

    #[test]
    fn generation_is_deterministic() {
        let source = "var i = 0; var s = 0; while (i < 10) { s = s + i * i; i = i + 1; }";
        assert_eq!(lines(source), lines(source));
    }
}
