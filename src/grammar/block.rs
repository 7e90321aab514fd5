use super::{lexer::TokenKind, Parse, ParseRes, Parser};
use crate::ast::Block;

impl<'source> Parse<'source> for Block<'source> {
    fn parse(parser: &mut Parser<'_, 'source>) -> ParseRes<Self> {
        parser.with_context("parsing statement block", |parser| {
            parser.eat_token(TokenKind::OpenBrace)?;

            let mut statements = Vec::new();

            // an unterminated block reports the missing brace, not a bad statement
            while !matches!(
                parser.peek_token(),
                TokenKind::CloseBrace | TokenKind::Eof
            ) {
                statements.push(parser.parse()?);
            }

            parser.eat_token(TokenKind::CloseBrace)?;

            Ok(Self(statements))
        })
    }
}
