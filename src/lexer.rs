use crate::{
    common::Span,
    error::LexError,
    token::{Literal, Token, TokenKind},
};

use unicode_xid::UnicodeXID;

/// One-pass lexer over the source characters. Pure with respect to its
/// input: lexing the same source twice yields the same tokens.
#[derive(Debug, Clone)]
pub struct Lexer {
    pub source: Vec<char>,

    start: usize,
    current: usize,
}

/// Tokenize a whole source string, appending the final EOF token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::from_str(source).lex()
}

impl Lexer {
    pub fn from_str(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            start: 0,
            current: 0,
        }
    }

    pub fn from_chars(chars: Vec<char>) -> Self {
        Lexer {
            source: chars,
            start: 0,
            current: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) {
        self.current += 1;
    }

    fn get_span(&self) -> Span {
        self.start..self.current
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    /// Consume the next character if it equals `expected`.
    fn match_next(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn create_token(&self, kind: TokenKind) -> Token {
        let lexeme = self.source[self.start..self.current].iter().collect();
        Token::new(kind, self.get_span(), lexeme)
    }

    fn error(&self, message: &str) -> LexError {
        LexError::new(message, self.get_span())
    }

    fn lex_string(&mut self, quote: char) -> Result<Token, LexError> {
        let mut decoded = String::new();

        loop {
            let c = match self.peek() {
                Some(c) => c,
                None => return Err(self.error("unterminated string literal")),
            };

            if c == quote {
                break;
            }

            if c == '\n' {
                return Err(self.error("strings must be on a single line"));
            }

            if c == '\\' {
                self.advance();
                let escaped = match self.peek() {
                    Some('n') => '\n',
                    Some('r') => '\r',
                    Some('t') => '\t',
                    Some('\'') => '\'',
                    Some('"') => '"',
                    Some('\\') => '\\',
                    Some(_) => return Err(self.error("unrecognized escape sequence")),
                    None => return Err(self.error("unterminated string literal")),
                };
                decoded.push(escaped);
                self.advance();
                continue;
            }

            decoded.push(c);
            self.advance();
        }

        self.advance(); // skip the closing quote

        let mut token = self.create_token(TokenKind::Str);
        token.literal = Some(Literal::Str(decoded));
        Ok(token)
    }

    fn lex_number(&mut self) -> Result<Token, LexError> {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        let mut is_float = false;
        if self.peek() == Some('.') {
            // Only a fraction if a digit follows; `1.foo` is member access.
            if self
                .source
                .get(self.current + 1)
                .is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                self.advance();
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let lexeme: String = self.source[self.start..self.current].iter().collect();

        if is_float {
            let value = lexeme
                .parse::<f64>()
                .map_err(|_| self.error("invalid float literal"))?;
            let mut token = self.create_token(TokenKind::Float);
            token.literal = Some(Literal::Float(value));
            Ok(token)
        } else {
            let value = lexeme
                .parse::<i64>()
                .map_err(|_| self.error("integer literal out of range"))?;
            let mut token = self.create_token(TokenKind::Int);
            token.literal = Some(Literal::Int(value));
            Ok(token)
        }
    }

    fn lex_ident(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_xid_continue()) {
            self.advance();
        }

        let lexeme: String = self.source[self.start..self.current].iter().collect();

        self.create_token(TokenKind::from_keyword_str(&lexeme).unwrap_or(TokenKind::Ident))
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        // The opening `/*` has been consumed.
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek() {
                Some('*') => {
                    self.advance();
                    if self.match_next('/') {
                        depth -= 1;
                    }
                }
                Some('/') => {
                    self.advance();
                    if self.match_next('*') {
                        depth += 1;
                    }
                }
                Some(_) => self.advance(),
                None => return Err(self.error("unterminated block comment")),
            }
        }
        Ok(())
    }

    pub fn lex(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while !self.at_end() {
            let c = self.source[self.current];
            self.advance();

            match c {
                '(' => tokens.push(self.create_token(TokenKind::LeftParen)),
                ')' => tokens.push(self.create_token(TokenKind::RightParen)),
                '{' => tokens.push(self.create_token(TokenKind::LeftBrace)),
                '}' => tokens.push(self.create_token(TokenKind::RightBrace)),
                '[' => tokens.push(self.create_token(TokenKind::LeftBracket)),
                ']' => tokens.push(self.create_token(TokenKind::RightBracket)),
                ',' => tokens.push(self.create_token(TokenKind::Comma)),
                '.' => tokens.push(self.create_token(TokenKind::Dot)),
                ':' => tokens.push(self.create_token(TokenKind::Colon)),
                ';' => tokens.push(self.create_token(TokenKind::Semicolon)),
                '+' => tokens.push(self.create_token(TokenKind::Plus)),
                '-' => tokens.push(self.create_token(TokenKind::Minus)),
                '*' => tokens.push(self.create_token(TokenKind::Star)),
                '%' => tokens.push(self.create_token(TokenKind::Percent)),

                '&' => {
                    if self.match_next('&') {
                        tokens.push(self.create_token(TokenKind::AndAnd));
                    } else {
                        return Err(self.error("expected '&' after '&'"));
                    }
                }
                '|' => {
                    if self.match_next('|') {
                        tokens.push(self.create_token(TokenKind::OrOr));
                    } else {
                        return Err(self.error("expected '|' after '|'"));
                    }
                }
                '=' => {
                    if self.match_next('=') {
                        tokens.push(self.create_token(TokenKind::EqualEqual));
                    } else {
                        tokens.push(self.create_token(TokenKind::Equal));
                    }
                }
                '!' => {
                    if self.match_next('=') {
                        tokens.push(self.create_token(TokenKind::BangEqual));
                    } else {
                        tokens.push(self.create_token(TokenKind::Bang));
                    }
                }
                '<' => {
                    if self.match_next('=') {
                        tokens.push(self.create_token(TokenKind::LesserEqual));
                    } else {
                        tokens.push(self.create_token(TokenKind::Lesser));
                    }
                }
                '>' => {
                    if self.match_next('=') {
                        tokens.push(self.create_token(TokenKind::GreaterEqual));
                    } else {
                        tokens.push(self.create_token(TokenKind::Greater));
                    }
                }

                '/' => {
                    if self.match_next('/') {
                        while self.peek().is_some_and(|c| c != '\n') {
                            self.advance();
                        }
                    } else if self.match_next('*') {
                        self.skip_block_comment()?;
                    } else {
                        tokens.push(self.create_token(TokenKind::Slash));
                    }
                }

                '"' | '\'' => tokens.push(self.lex_string(c)?),

                _ if c.is_whitespace() => {
                    // skipped
                }

                _ => {
                    if c.is_ascii_digit() {
                        tokens.push(self.lex_number()?);
                    } else if c.is_xid_start() {
                        tokens.push(self.lex_ident());
                    } else {
                        return Err(self.error(&format!("unexpected character '{}'", c)));
                    }
                }
            }

            self.start = self.current;
        }

        tokens.push(Token::new(
            TokenKind::Eof,
            self.source.len()..self.source.len(),
            String::new(),
        ));

        Ok(tokens)
    }
}
