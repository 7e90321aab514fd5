use super::{lexer::TokenKind, Parse, ParseRes, Parser};
use crate::ast::Identifier;

impl<'source> Parse<'source> for Identifier<'source> {
    fn parse(parser: &mut Parser<'_, 'source>) -> ParseRes<Self> {
        parser.with_context("parsing identifier", |parser| {
            parser.eat_token(TokenKind::Identifier).map(Identifier)
        })
    }
}
