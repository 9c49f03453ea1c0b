use thiserror::Error;

use crate::common::{Position, Span};

/// Lexical error: unrecognized character, unterminated string, bad escape,
/// integer overflow. Aborts the whole tokenize pass.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    pub fn new(message: impl Into<String>, span: Span) -> LexError {
        LexError {
            message: message.into(),
            span,
        }
    }
}

/// Syntax error raised by the parser. Parsing stops at the first one.
///
/// `at_eof` is set when the error was caused by running out of input, which
/// the REPL uses to switch into multi-line continuation instead of failing.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub at_eof: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    #[error("undefined variable '{0}'")]
    Name(String),

    #[error("{0}")]
    Type(String),

    #[error("expected {expected} argument(s), got {got}")]
    Arity { expected: usize, got: usize },

    #[error("{0}")]
    Index(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("'return' outside of a function")]
    ReturnOutsideFunction,

    #[error("maximum call depth ({0}) exceeded")]
    RecursionLimit(usize),

    #[error("{0}")]
    Io(String),
}

/// Position-tagged runtime error. Unwinds to the session driver boundary:
/// one file run, or one REPL line.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, span: Span) -> RuntimeError {
        RuntimeError { kind, span }
    }
}

/// Any error the pipeline can produce for one evaluation unit.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("{0}")]
    Lex(#[from] LexError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn span(&self) -> &Span {
        match self {
            Error::Lex(err) => &err.span,
            Error::Parse(err) => &err.span,
            Error::Runtime(err) => &err.span,
        }
    }

    /// Taxonomy label shown in diagnostics.
    pub fn class(&self) -> &'static str {
        match self {
            Error::Lex(_) => "lex error",
            Error::Parse(_) => "parse error",
            Error::Runtime(err) => match err.kind {
                RuntimeErrorKind::Name(_) => "name error",
                RuntimeErrorKind::Type(_) => "type error",
                RuntimeErrorKind::Arity { .. } => "arity error",
                RuntimeErrorKind::Index(_) => "index error",
                _ => "runtime error",
            },
        }
    }

    /// Render a full diagnostic line: `path:line:col: class: message`.
    pub fn report(&self, source: &[char], path: &str) -> String {
        let position = Position::of(source, self.span());
        format!("{}:{}: {}: {}", path, position, self.class(), self)
    }
}
