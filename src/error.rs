use std::error;
use std::fmt;

/// An error of kind `T`, optionally located in the source.
#[derive(Debug, Clone)]
pub struct Error<T> {
    pub kind: T,
    file: Option<std::path::PathBuf>,
    snippet: Option<Snippet>,
    contexts: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub const fn new(offset: usize) -> Self {
        Self { offset, len: 1 }
    }
    pub fn snippet_from_source(&self, source: &SourceMetadata) -> Option<Snippet> {
        let input = source.input();
        let mut offset = 0;
        let mut lines = 0;
        for (i, line) in input.split_terminator('\n').enumerate() {
            let next_offset = offset + line.len() + 1;
            if next_offset > self.offset {
                // offset is somewhere in the current line
                let col = input.get(offset..self.offset)?.chars().count();
                return Some(Snippet {
                    position: Position {
                        line: i + 1,
                        col: col + 1,
                    },
                    line: line.to_string(),
                });
            }
            offset = next_offset;
            lines = i + 1;
        }
        // end of input right after a trailing newline
        (self.offset == input.len()).then(|| Snippet {
            position: Position {
                line: lines + 1,
                col: 1,
            },
            line: String::new(),
        })
    }
}

#[derive(Debug)]
pub struct SourceMetadata<'a> {
    file: Option<std::path::PathBuf>,
    source: &'a str,
}

impl<'a> SourceMetadata<'a> {
    pub const fn input(&self) -> &'a str {
        self.source
    }
    pub const fn new(source: &'a str) -> Self {
        Self { file: None, source }
    }
    #[must_use]
    pub fn with_file(mut self, file: std::path::PathBuf) -> Self {
        self.file = Some(file);
        self
    }
}

impl<T> Error<T> {
    pub const fn new(kind: T) -> Self {
        Self {
            kind,
            snippet: None,
            file: None,
            contexts: Vec::new(),
        }
    }
    #[must_use]
    pub fn with_source(mut self, span: Span, source: &SourceMetadata) -> Self {
        self.file = source.file.clone();
        self.snippet = span.snippet_from_source(source);
        self
    }
    #[must_use]
    pub fn add_context(mut self, ctx: &'static str) -> Self {
        self.contexts.push(ctx);
        self
    }
    /// 1-based line and column of the error, if it has been located.
    pub fn position(&self) -> Option<Position> {
        self.snippet.as_ref().map(|snip| snip.position)
    }
    pub fn contexts(&self) -> &[&'static str] {
        &self.contexts
    }
}

#[derive(Debug, Clone)]
pub struct Snippet {
    position: Position,
    line: String,
}

#[derive(Debug)]
pub enum WantedSpec<T> {
    Specific(T),
    Description(&'static str),
}

impl<T: fmt::Display> fmt::Display for WantedSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Description(desc) => f.write_str(desc),
            Self::Specific(t) => write!(f, "{}", t),
        }
    }
}

/// 1-based position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl<T: error::Error + 'static> error::Error for Error<T> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl<T: fmt::Display> fmt::Display for Error<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let whiles = self
            .contexts
            .iter()
            .copied()
            .fold(String::new(), |acc, next| acc + "\nwhile " + next);
        let snippet = if let Some(snip) = &self.snippet {
            snip
        } else {
            return write!(f, "{}{}", self.kind, whiles);
        };
        let file = self
            .file
            .as_ref()
            .and_then(|x| x.to_str())
            .unwrap_or("<unknown source>");

        write!(
            f,
            "\
{kind}
   --> {file}:{line}:{col}
    |
{line:3} | {snippet}
    | {marker:>0$}{whiles}",
            snippet.position.col,
            marker = '^',
            line = snippet.position.line,
            col = snippet.position.col,
            file = file,
            kind = self.kind,
            snippet = snippet.line,
            whiles = whiles,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_points_at_second_line() {
        let meta = SourceMetadata::new("var a = 1;\nvar b = @;\n");
        let snippet = Span::new(19).snippet_from_source(&meta).unwrap();
        assert_eq!(snippet.position, Position { line: 2, col: 9 });
        assert_eq!(snippet.line, "var b = @;");
    }

    #[test]
    fn offset_at_line_start_belongs_to_that_line() {
        let meta = SourceMetadata::new("a\nb");
        let snippet = Span::new(2).snippet_from_source(&meta).unwrap();
        assert_eq!(snippet.position, Position { line: 2, col: 1 });
    }

    #[test]
    fn unlocated_error_prints_kind_and_contexts() {
        let err = Error::new("boom").add_context("doing things");
        assert_eq!(err.to_string(), "boom\nwhile doing things");
        assert!(err.position().is_none());
    }

    #[test]
    fn located_error_renders_caret() {
        let meta = SourceMetadata::new("x = 1;").with_file("main.ml".into());
        let err = Error::new("unknown").with_source(Span::new(0), &meta);
        let text = err.to_string();
        assert!(text.contains("--> main.ml:1:1"));
        assert!(text.contains("  1 | x = 1;"));
        assert_eq!(err.position(), Some(Position { line: 1, col: 1 }));
    }
}
