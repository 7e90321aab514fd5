use super::{
    lexer::{Keyword, Operator, TokenKind},
    Parse, ParseRes, Parser,
};
use crate::{
    ast::{Block, Expr, Identifier, Statement},
    error::WantedSpec,
};

impl<'source> Parse<'source> for Statement<'source> {
    fn parse(parser: &mut Parser<'_, 'source>) -> ParseRes<Self> {
        parser.with_context("parsing statement", |parser| parser.nested(parse_statement))
    }
}

fn parse_statement<'source>(parser: &mut Parser<'_, 'source>) -> ParseRes<Statement<'source>> {
    let line = parser.current_line();
    match parser.peek_token() {
        TokenKind::Keyword(Keyword::Var) => {
            parser.keyword(Keyword::Var)?;
            let (name, init) = assignment(parser)?;
            Ok(Statement::VarDecl { name, init, line })
        }
        TokenKind::Identifier => {
            let (name, value) = assignment(parser)?;
            Ok(Statement::Assign { name, value, line })
        }
        TokenKind::Keyword(Keyword::If) => {
            parser.keyword(Keyword::If)?;
            parser.with_context("parsing if statement", |parser| {
                let condition = parenthesized_condition(parser)?;
                let true_branch = Box::new(parser.parse()?);
                let false_branch = if parser.peek_token() == TokenKind::Keyword(Keyword::Else) {
                    parser.keyword(Keyword::Else)?;
                    Some(Box::new(parser.parse()?))
                } else {
                    None
                };
                Ok(Statement::If {
                    condition,
                    true_branch,
                    false_branch,
                    line,
                })
            })
        }
        TokenKind::Keyword(Keyword::While) => {
            parser.keyword(Keyword::While)?;
            parser.with_context("parsing while loop", |parser| {
                let condition = parenthesized_condition(parser)?;
                let body = Box::new(parser.parse()?);
                Ok(Statement::While {
                    condition,
                    body,
                    line,
                })
            })
        }
        TokenKind::OpenBrace => parser.parse().map(Statement::Block),
        _ => parser.reject_current_token(WantedSpec::Description("statement")),
    }
}

// IDENT '=' expr ';', shared by declarations and assignments
fn assignment<'source>(
    parser: &mut Parser<'_, 'source>,
) -> ParseRes<(crate::grammar::lexer::Source<'source>, Expr<'source>)> {
    let Identifier(name) = parser.parse()?;
    parser.eat_token(TokenKind::operator(Operator::Equals))?;
    let value = parser.parse()?;
    parser.eat_token(TokenKind::Semicolon)?;
    Ok((name, value))
}

fn parenthesized_condition<'source>(parser: &mut Parser<'_, 'source>) -> ParseRes<Expr<'source>> {
    parser.with_context("parsing condition", |parser| {
        parser.eat_token(TokenKind::OpenParen)?;
        let condition = parser.parse()?;
        parser.eat_token(TokenKind::CloseParen)?;
        Ok(condition)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ArithmeticOp, BinaryOp, Program, RelationalOp};
    use crate::error::SourceMetadata;
    use crate::grammar::{lexer, parse_program, ParseError, ParseErrorKind};

    fn parse(input: &'static str) -> Result<Program<'static>, ParseError> {
        let meta = SourceMetadata::new(input);
        let tokens = lexer::analyze(&meta).unwrap();
        parse_program(&tokens, &meta)
    }

    #[test]
    fn declaration_and_assignment() {
        let Program(statements) = parse("var a = 1;\na = a + 2;").unwrap();
        assert_eq!(statements.len(), 2);
        assert!(matches!(
            &statements[0],
            Statement::VarDecl { name, init: Expr::Number(1), line: 1 } if name.source == "a"
        ));
        match &statements[1] {
            Statement::Assign { name, value, line } => {
                assert_eq!(name.source, "a");
                assert_eq!(*line, 2);
                assert!(matches!(
                    value,
                    Expr::Binary {
                        operator: BinaryOp::Arithmetic(ArithmeticOp::Add),
                        ..
                    }
                ));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn if_without_braces_and_else() {
        let Program(statements) = parse("if (a == 1) a = 2; else { a = 3; }").unwrap();
        match &statements[0] {
            Statement::If {
                condition,
                true_branch,
                false_branch: Some(false_branch),
                ..
            } => {
                assert!(matches!(
                    condition,
                    Expr::Binary {
                        operator: BinaryOp::Relational(RelationalOp::Equals),
                        ..
                    }
                ));
                assert!(matches!(**true_branch, Statement::Assign { .. }));
                assert!(matches!(**false_branch, Statement::Block(_)));
            }
            other => panic!("expected if/else, got {other:?}"),
        }
    }

    #[test]
    fn dangling_else_binds_to_nearest_if() {
        let Program(statements) = parse("if (a) if (b) a = 1; else a = 2;").unwrap();
        match &statements[0] {
            Statement::If {
                true_branch,
                false_branch: None,
                ..
            } => assert!(matches!(
                **true_branch,
                Statement::If {
                    false_branch: Some(_),
                    ..
                }
            )),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn while_with_block() {
        let Program(statements) = parse("while (c > 0) { c = c - 1; }").unwrap();
        match &statements[0] {
            Statement::While { body, line: 1, .. } => {
                assert!(matches!(&**body, Statement::Block(Block(inner)) if inner.len() == 1))
            }
            other => panic!("expected while, got {other:?}"),
        }
    }

    #[test]
    fn empty_program_and_empty_block() {
        assert_eq!(parse("").unwrap(), Program(vec![]));
        let Program(statements) = parse("{ }").unwrap();
        assert_eq!(statements, vec![Statement::Block(Block(vec![]))]);
    }

    #[test]
    fn initializer_is_mandatory() {
        let err = parse("var a;").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::Expected {
                wanted: WantedSpec::Specific(TokenKind::Operator {
                    kind: Operator::Equals,
                    has_equal: false
                }),
                found: TokenKind::Semicolon,
                line: 1,
            }
        ));
    }

    #[test]
    fn missing_semicolon_reports_line() {
        let err = parse("var a = 1;\nvar b = 2\nvar c = 3;").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::Expected {
                found: TokenKind::Keyword(Keyword::Var),
                line: 3,
                ..
            }
        ));
        assert_eq!(err.kind.line(), 3);
        assert!(err.contexts().contains(&"parsing statement"));
    }

    #[test]
    fn unclosed_block_hits_eof() {
        let err = parse("{ var a = 1;").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::Expected {
                wanted: WantedSpec::Specific(TokenKind::CloseBrace),
                found: TokenKind::Eof,
                ..
            }
        ));
    }

    #[test]
    fn stray_else_is_not_a_statement() {
        let err = parse("else a = 1;").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::Expected {
                wanted: WantedSpec::Description("statement"),
                found: TokenKind::Keyword(Keyword::Else),
                ..
            }
        ));
    }

    #[test]
    fn expression_statement_is_rejected() {
        assert!(parse("1 + 2;").is_err());
    }

    #[test]
    fn deeply_nested_blocks_are_rejected() {
        let source = format!("{}{}", "{".repeat(10_000), "}".repeat(10_000));
        let err = parse(Box::leak(source.into_boxed_str())).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::NestingTooDeep { line: 1 }));

        let source = "if (a) ".repeat(50) + "a = 1;";
        assert!(parse(Box::leak(source.into_boxed_str())).is_ok());
    }
}
