use crate::common::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
pub enum TokenKind {
    Str,
    Int,
    Float,
    Ident,
    Eof,

    // keywords
    Let,
    Fn,
    Return,
    True,
    False,
    Null,
    If,
    Else,
    While,
    For,
    In,

    // symbols
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    Comma,
    Dot,
    Colon,
    Bang,

    // binary operators, kept contiguous for `is_binary_op`
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    Lesser,
    Greater,
    LesserEqual,
    GreaterEqual,
    EqualEqual,
    BangEqual,

    AndAnd,
    OrOr,

    Equal,

    Semicolon,
}

impl TokenKind {
    pub fn from_keyword_str(name: &str) -> Option<TokenKind> {
        match name {
            "let" => Some(TokenKind::Let),
            "fn" => Some(TokenKind::Fn),
            "return" => Some(TokenKind::Return),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "null" => Some(TokenKind::Null),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "for" => Some(TokenKind::For),
            "in" => Some(TokenKind::In),
            _ => None,
        }
    }

    pub fn is_prefix_op(&self) -> bool {
        matches!(*self, Self::Minus | Self::Bang)
    }

    /// Binary operators handled by the precedence climber. Assignment is
    /// included; it is the loosest-binding, right-associative level.
    pub fn is_binary_op(&self) -> bool {
        *self >= Self::Plus && *self <= Self::Equal
    }

    /// Human-readable name used in "expected X, found Y" parse errors.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Str => "string literal",
            TokenKind::Int => "integer literal",
            TokenKind::Float => "float literal",
            TokenKind::Ident => "identifier",
            TokenKind::Eof => "end of input",
            TokenKind::Let => "'let'",
            TokenKind::Fn => "'fn'",
            TokenKind::Return => "'return'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::While => "'while'",
            TokenKind::For => "'for'",
            TokenKind::In => "'in'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Colon => "':'",
            TokenKind::Bang => "'!'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Lesser => "'<'",
            TokenKind::Greater => "'>'",
            TokenKind::LesserEqual => "'<='",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::EqualEqual => "'=='",
            TokenKind::BangEqual => "'!='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Equal => "'='",
            TokenKind::Semicolon => "';'",
        }
    }
}

/// Literal payload decoded by the lexer. Strings have their escape
/// sequences resolved; numbers are parsed at lex time so overflow
/// surfaces as a `LexError` instead of a panic during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub lexeme: String,
    pub literal: Option<Literal>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, lexeme: String) -> Token {
        Token {
            kind,
            span,
            lexeme,
            literal: None,
        }
    }
}
