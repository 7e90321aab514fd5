use crate::error::{self, Position, SourceMetadata, Span};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, Keyword> = {
        let mut map = HashMap::new();
        map.insert("var", Keyword::Var);
        map.insert("if", Keyword::If);
        map.insert("else", Keyword::Else);
        map.insert("while", Keyword::While);
        map
    };
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::CloseBrace => write!(f, "closing brace '}}'"),
            Self::OpenBrace => write!(f, "opening brace '{{'"),
            Self::Identifier => write!(f, "identifier"),
            Self::Number => write!(f, "number"),
            Self::OpenParen => write!(f, "opening parentheses '('"),
            Self::CloseParen => write!(f, "closing parentheses ')'"),
            Self::Semicolon => write!(f, "semicolon ';'"),
            Self::Keyword(kw) => write!(f, "keyword `{}`", kw),
            Self::Operator { kind, has_equal } => write!(
                f,
                "operator `{}{}`",
                kind,
                if *has_equal { "=" } else { "" }
            ),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::ExclamationMark => "!",
            Operator::AngleRight => ">",
            Operator::AngleLeft => "<",
            Operator::Equals => "=",
        })
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct LexerIter<'m, 'a> {
    lexer: Lexer<'m, 'a>,
    eof: bool,
}

pub type LexError = error::Error<LexErrorKind>;

impl<'a> Iterator for LexerIter<'_, 'a> {
    type Item = Result<Token<'a>, LexError>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.eof {
            None
        } else {
            let next = self.lexer.next_token();
            if matches!(next, Ok(None) | Err(_)) {
                self.eof = true;
            }
            next.transpose()
        }
    }
}

impl std::iter::FusedIterator for LexerIter<'_, '_> {}

impl<'m, 'a> IntoIterator for Lexer<'m, 'a> {
    type IntoIter = LexerIter<'m, 'a>;
    type Item = <Self::IntoIter as Iterator>::Item;
    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            eof: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub source: Source<'a>,
    pub position: Position,
}

impl<'a> Token<'a> {
    pub const fn new(kind: TokenKind, source: Source<'a>, position: Position) -> Self {
        Self {
            kind,
            source,
            position,
        }
    }
    /// The literal text of the token (empty for the end of input).
    pub const fn literal(&self) -> &'a str {
        self.source.source
    }
    pub const fn line(&self) -> usize {
        self.position.line
    }
    pub const fn column(&self) -> usize {
        self.position.col
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "{}:{}\tEOF", self.line(), self.column()),
            kind => write!(
                f,
                "{}:{}\t{:?}\t{}",
                self.line(),
                self.column(),
                kind,
                self.literal()
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    Number,
    Identifier,
    Keyword(Keyword),
    Semicolon,
    Operator { kind: Operator, has_equal: bool },
    Eof,
}

impl TokenKind {
    pub const fn as_operator(self) -> Option<(Operator, bool)> {
        if let TokenKind::Operator { kind, has_equal } = self {
            Some((kind, has_equal))
        } else {
            None
        }
    }
    pub const fn operator(kind: Operator) -> Self {
        Self::Operator {
            kind,
            has_equal: false,
        }
    }
    /// The two-character form, e.g. `<=` for [`Operator::AngleLeft`].
    pub const fn operator_with_equal(kind: Operator) -> Self {
        Self::Operator {
            kind,
            has_equal: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    ExclamationMark,
    AngleRight,
    AngleLeft,
    Equals,
}

impl Operator {
    /// Only these may be followed by `=` to form a two-character operator.
    const fn accepts_equal(self) -> bool {
        matches!(
            self,
            Self::Equals | Self::ExclamationMark | Self::AngleLeft | Self::AngleRight
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Var,
    If,
    Else,
    While,
}

impl Keyword {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
        }
    }
    pub fn from_identifier(ident: &str) -> Option<Self> {
        KEYWORDS.get(ident).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source<'source> {
    pub span: Span,
    pub source: &'source str,
}

impl From<Source<'_>> for Span {
    fn from(s: Source<'_>) -> Self {
        s.span
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("unexpected character {ch:?} at line {line}, column {col}")]
    UnexpectedChar { ch: char, line: usize, col: usize },
}

pub struct Lexer<'m, 'a> {
    input: std::iter::Peekable<std::str::CharIndices<'a>>,
    metadata: &'m SourceMetadata<'a>,
    line: usize,
    col: usize,
}

impl<'m, 'source> Lexer<'m, 'source> {
    pub fn new(input: &'m SourceMetadata<'source>) -> Self {
        Self {
            input: input.input().char_indices().peekable(),
            metadata: input,
            line: 1,
            col: 1,
        }
    }

    /// Lexes the whole input. The returned vector always ends with a
    /// [`TokenKind::Eof`] token.
    pub fn analyze(mut self) -> Result<Vec<Token<'source>>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tracing::trace!(target: "lexer", "token: {token}");
            tokens.push(token);
        }
        let offset = self.current_offset();
        tokens.push(Token::new(
            TokenKind::Eof,
            self.source_from(offset, offset),
            self.position(),
        ));
        tracing::debug!(target: "lexer", "produced {} tokens", tokens.len());
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<Option<Token<'source>>, LexError> {
        self.skip_trivia();
        let position = self.position();
        let start = self.current_offset();

        let delimiter = match self.input.peek().map(|(_, ch)| *ch) {
            None => return Ok(None),
            Some('(') => Some(TokenKind::OpenParen),
            Some(')') => Some(TokenKind::CloseParen),
            Some('{') => Some(TokenKind::OpenBrace),
            Some('}') => Some(TokenKind::CloseBrace),
            Some(';') => Some(TokenKind::Semicolon),
            Some(_) => None,
        };
        if let Some(kind) = delimiter {
            self.advance();
            return Ok(Some(Token::new(
                kind,
                self.source_until_current(start),
                position,
            )));
        }

        if let Some(src) = self.identifier() {
            let kind = Keyword::from_identifier(src.source)
                .map_or(TokenKind::Identifier, TokenKind::Keyword);
            return Ok(Some(Token::new(kind, src, position)));
        }
        if let Some(src) = self.number() {
            return Ok(Some(Token::new(TokenKind::Number, src, position)));
        }
        if let Some(kind) = self.operator() {
            let has_equal = kind.accepts_equal() && self.skip_if(|x| x == '=').is_some();
            if kind == Operator::ExclamationMark && !has_equal {
                // `!` only exists as part of `!=`
                return Err(self.error(
                    start,
                    LexErrorKind::UnexpectedChar {
                        ch: '!',
                        line: position.line,
                        col: position.col,
                    },
                ));
            }
            return Ok(Some(Token::new(
                TokenKind::Operator { kind, has_equal },
                self.source_until_current(start),
                position,
            )));
        }
        match self.input.peek().copied() {
            None => Ok(None),
            Some((pos, ch)) => Err(self.error(
                pos,
                LexErrorKind::UnexpectedChar {
                    ch,
                    line: position.line,
                    col: position.col,
                },
            )),
        }
    }

    fn operator(&mut self) -> Option<Operator> {
        let op = match self.input.peek()?.1 {
            '<' => Operator::AngleLeft,
            '>' => Operator::AngleRight,
            '=' => Operator::Equals,
            '!' => Operator::ExclamationMark,
            '+' => Operator::Plus,
            '-' => Operator::Minus,
            '/' => Operator::Slash,
            '*' => Operator::Star,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn identifier(&mut self) -> Option<Source<'source>> {
        let (start, _) = self.skip_if(|c| c.is_ascii_alphabetic() || c == '_')?;
        self.skip_while(|c| c.is_ascii_alphanumeric() || c == '_');
        Some(self.source_until_current(start))
    }

    fn number(&mut self) -> Option<Source<'source>> {
        let (start, _) = self.skip_if(|c| c.is_ascii_digit())?;
        self.skip_while(|c| c.is_ascii_digit());
        Some(self.source_until_current(start))
    }

    fn skip_while<F>(&mut self, filter: F) -> Source<'source>
    where
        F: Fn(char) -> bool,
    {
        let current = self.current_offset();
        while self.input.peek().filter(|(_, ch)| filter(*ch)).is_some() {
            self.advance();
        }
        self.source_until_current(current)
    }

    fn skip_if<F>(&mut self, filter: F) -> Option<(usize, char)>
    where
        F: Fn(char) -> bool,
    {
        let (pos, ch) = *self.input.peek()?;
        if filter(ch) {
            self.advance();
            Some((pos, ch))
        } else {
            None
        }
    }

    // whitespace and `//` comments, in any order
    fn skip_trivia(&mut self) {
        loop {
            self.skip_while(char::is_whitespace);
            if self.rest().starts_with("//") {
                self.skip_while(|ch| ch != '\n');
            } else {
                break;
            }
        }
    }

    fn advance(&mut self) {
        if let Some((_, ch)) = self.input.next() {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    fn rest(&mut self) -> &'source str {
        let offset = self.current_offset();
        &self.metadata.input()[offset..]
    }

    fn source_until_current(&mut self, start: usize) -> Source<'source> {
        let current = self.current_offset();
        self.source_from(start, current)
    }

    fn source_from(&self, start: usize, end: usize) -> Source<'source> {
        Source {
            span: Span {
                offset: start,
                len: end - start,
            },
            source: &self.metadata.input()[start..end],
        }
    }

    fn error(&self, position: usize, kind: LexErrorKind) -> LexError {
        LexError::new(kind).with_source(Span::new(position), self.metadata)
    }

    pub const fn position(&self) -> Position {
        Position {
            line: self.line,
            col: self.col,
        }
    }

    fn current_offset(&mut self) -> usize {
        self.input
            .peek()
            .map(|(x, _)| *x)
            .unwrap_or_else(|| self.metadata.input().len())
    }
}

/// Lexes `meta`'s input into an EOF-terminated token vector.
pub fn analyze<'source>(meta: &SourceMetadata<'source>) -> Result<Vec<Token<'source>>, LexError> {
    Lexer::new(meta).analyze()
}
