use std::ops::Range;

/// Half-open range of character indices into the source text.
pub type Span = Range<usize>;

/// A 1-based line/column pair, resolved from a span for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Resolve the start of `span` against `source`.
    ///
    /// Spans produced past the end of the source (e.g. the EOF token)
    /// resolve to one past the last character.
    pub fn of(source: &[char], span: &Span) -> Position {
        let mut line = 1;
        let mut column = 1;

        for &c in source.iter().take(span.start) {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        Position { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
