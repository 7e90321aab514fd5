use super::{lexer::TokenKind, Parse, ParseErrorKind, ParseRes, Parser, WantedSpec};
use crate::ast::{ArithmeticOp, BinaryOp, Expr, RelationalOp};

impl<'source> Parse<'source> for Expr<'source> {
    fn parse(parser: &mut Parser<'_, 'source>) -> ParseRes<Self> {
        parse_comparison(parser).map_err(|x| x.add_context("parsing expression"))
    }
}

// Every level folds to the left, so `a < b < c` is `(a < b) < c`.
fn parse_left_assoc<'source, N, O>(
    parser: &mut Parser<'_, 'source>,
    next_level: N,
    operator: O,
) -> ParseRes<Expr<'source>>
where
    N: Fn(&mut Parser<'_, 'source>) -> ParseRes<Expr<'source>>,
    O: Fn(TokenKind) -> Option<BinaryOp>,
{
    let depth = parser.depth();
    let mut lhs = next_level(parser)?;
    while let Some(op) = operator(parser.peek_token()) {
        // each link nests the tree built so far one level deeper
        parser.enter()?;
        parser.accept_current();
        let rhs = next_level(parser)?;
        lhs = Expr::binary(op, lhs, rhs);
    }
    parser.leave_to(depth);
    Ok(lhs)
}

// == != < > <= >=
fn parse_comparison<'source>(parser: &mut Parser<'_, 'source>) -> ParseRes<Expr<'source>> {
    parse_left_assoc(parser, parse_term, |kind| {
        RelationalOp::from_token(kind).map(BinaryOp::Relational)
    })
}

// + -
fn parse_term<'source>(parser: &mut Parser<'_, 'source>) -> ParseRes<Expr<'source>> {
    parse_left_assoc(parser, parse_factor, |kind| {
        ArithmeticOp::term_from_token(kind).map(BinaryOp::Arithmetic)
    })
}

// * /
fn parse_factor<'source>(parser: &mut Parser<'_, 'source>) -> ParseRes<Expr<'source>> {
    parse_left_assoc(parser, parse_primary, |kind| {
        ArithmeticOp::factor_from_token(kind).map(BinaryOp::Arithmetic)
    })
}

// number, identifier or parenthesis
fn parse_primary<'source>(parser: &mut Parser<'_, 'source>) -> ParseRes<Expr<'source>> {
    parser.with_context("parsing primary expression", |parser| {
        match parser.peek_token() {
            TokenKind::OpenParen => {
                parser.accept_current();
                let e = parser.nested(parse_comparison)?;
                parser
                    .eat_token(TokenKind::CloseParen)
                    .map_err(|x| x.add_context("as the end of the expression"))?;
                Ok(e)
            }
            TokenKind::Number => {
                let source = parser.current_token_source();
                let line = parser.current_line();
                let num = match source.source.parse() {
                    Ok(num) => num,
                    Err(_) => {
                        return parser.emit_error_at(
                            source.span,
                            ParseErrorKind::IntegerOutOfRange {
                                literal: source.source.to_string(),
                                line,
                            },
                        )
                    }
                };
                parser.accept_current();
                Ok(Expr::Number(num))
            }
            TokenKind::Identifier => {
                let source = parser.current_token_source();
                parser.accept_current();
                Ok(Expr::Identifier(source))
            }
            _ => parser.reject_current_token(WantedSpec::Description(
                "open paren, identifier or number",
            )),
        }
    })
}
