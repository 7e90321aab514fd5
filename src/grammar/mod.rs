use crate::ast::Program;
use crate::error::*;

mod block;
mod expr;
mod identifier;
pub mod lexer;
mod program;
mod statement;

use lexer::*;
use thiserror::Error;

/// Deepest syntax tree the parser builds. Every later phase walks the tree
/// recursively, so this bounds their stack use too.
pub const MAX_NESTING: usize = 200;

/// Recursive descent parser over an EOF-terminated token slice, with one
/// token of lookahead.
pub struct Parser<'t, 'source> {
    tokens: &'t [Token<'source>],
    current: usize,
    metadata: &'t SourceMetadata<'source>,
    depth: usize,
}

impl<'t, 'source> Parser<'t, 'source> {
    pub fn new(tokens: &'t [Token<'source>], metadata: &'t SourceMetadata<'source>) -> Self {
        Self {
            tokens,
            current: 0,
            metadata,
            depth: 0,
        }
    }

    /// Kind of the current token. Running off the end of the slice is seen as
    /// [`TokenKind::Eof`].
    pub fn peek_token(&self) -> TokenKind {
        self.tokens
            .get(self.current)
            .map_or(TokenKind::Eof, |tok| tok.kind)
    }

    pub fn current_token_span(&self) -> Span {
        self.tokens.get(self.current).map_or_else(
            || Span {
                offset: self.metadata.input().len(),
                len: 0,
            },
            |tok| tok.source.span,
        )
    }

    pub fn current_token_source(&self) -> Source<'source> {
        self.tokens.get(self.current).map_or_else(
            || Source {
                span: self.current_token_span(),
                source: "",
            },
            |tok| tok.source,
        )
    }

    pub fn current_line(&self) -> usize {
        self.tokens
            .get(self.current)
            .or_else(|| self.tokens.last())
            .map_or(1, Token::line)
    }

    pub fn accept_current(&mut self) {
        if self.current < self.tokens.len() {
            self.current += 1;
        }
    }

    pub fn emit_error_at<T>(&self, span: Span, kind: ParseErrorKind) -> ParseRes<T> {
        Err(ParseError::new(kind).with_source(span, self.metadata))
    }

    pub fn reject_current_token<T>(&self, wanted: WantedSpec<TokenKind>) -> ParseRes<T> {
        let span = self.current_token_span();
        self.emit_error_at(
            span,
            ParseErrorKind::Expected {
                wanted,
                found: self.peek_token(),
                line: self.current_line(),
            },
        )
    }

    pub fn expect_token(&mut self, kind: TokenKind) -> ParseRes<()> {
        if self.peek_token() != kind {
            self.reject_current_token(WantedSpec::Specific(kind))
        } else {
            Ok(())
        }
    }

    /// Expects `kind` and consumes it.
    pub fn eat_token(&mut self, kind: TokenKind) -> ParseRes<Source<'source>> {
        self.expect_token(kind)?;
        let source = self.current_token_source();
        self.accept_current();
        Ok(source)
    }

    pub fn keyword(&mut self, kw: Keyword) -> ParseRes<()> {
        self.eat_token(TokenKind::Keyword(kw))
            .map(|_| ())
            .map_err(|e| e.add_context("parsing keyword"))
    }

    /// Goes one level deeper into the tree, failing past [`MAX_NESTING`].
    pub fn enter(&mut self) -> ParseRes<()> {
        if self.depth >= MAX_NESTING {
            let span = self.current_token_span();
            return self.emit_error_at(
                span,
                ParseErrorKind::NestingTooDeep {
                    line: self.current_line(),
                },
            );
        }
        self.depth += 1;
        Ok(())
    }

    pub const fn depth(&self) -> usize {
        self.depth
    }

    pub fn leave_to(&mut self, depth: usize) {
        self.depth = depth;
    }

    /// Runs `cont` one nesting level deeper.
    pub fn nested<F, T>(&mut self, cont: F) -> ParseRes<T>
    where
        F: FnOnce(&mut Self) -> ParseRes<T>,
    {
        let depth = self.depth;
        self.enter()?;
        let res = cont(self);
        self.leave_to(depth);
        res
    }

    pub fn parse<T>(&mut self) -> ParseRes<T>
    where
        T: Parse<'source>,
    {
        T::parse(self)
    }

    pub fn with_context<F, T>(&mut self, context: &'static str, mut cont: F) -> ParseRes<T>
    where
        F: FnMut(&mut Self) -> ParseRes<T>,
    {
        cont(self).map_err(|x| x.add_context(context))
    }
}

pub type ParseRes<T> = Result<T, ParseError>;
pub type ParseError = Error<ParseErrorKind>;

#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("expected {wanted}, but found instead {found} at line {line}")]
    Expected {
        wanted: WantedSpec<TokenKind>,
        found: TokenKind,
        line: usize,
    },
    #[error("integer literal {literal} is out of range at line {line}")]
    IntegerOutOfRange { literal: String, line: usize },
    #[error("program nests deeper than {} levels at line {line}", MAX_NESTING)]
    NestingTooDeep { line: usize },
}

impl ParseErrorKind {
    pub const fn line(&self) -> usize {
        match self {
            Self::Expected { line, .. }
            | Self::IntegerOutOfRange { line, .. }
            | Self::NestingTooDeep { line } => *line,
        }
    }
}

pub trait Parse<'source>: Sized {
    fn parse(parser: &mut Parser<'_, 'source>) -> ParseRes<Self>;
}

/// Parses a whole program out of `tokens`.
pub fn parse_program<'source>(
    tokens: &[Token<'source>],
    metadata: &SourceMetadata<'source>,
) -> ParseRes<Program<'source>> {
    let program: Program = Parser::new(tokens, metadata).parse()?;
    tracing::debug!(target: "parser", "parsed {} top level statements", program.0.len());
    Ok(program)
}
