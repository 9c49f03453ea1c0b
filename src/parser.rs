use crate::{
    ast,
    error::ParseError,
    token::{Token, TokenKind},
};

#[derive(Debug, Clone)]
struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Assoc {
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy)]
struct OpInfo {
    prec: u8,
    assoc: Assoc,
}

impl TokenKind {
    fn op_info(&self) -> OpInfo {
        match self {
            Self::Star | Self::Slash | Self::Percent => OpInfo {
                prec: 7,
                assoc: Assoc::Ltr,
            },

            Self::Plus | Self::Minus => OpInfo {
                prec: 6,
                assoc: Assoc::Ltr,
            },

            // Comparisons do not chain: `a < b < c` groups as `(a < b) < c`
            // and the evaluator rejects ordering booleans.
            Self::Lesser | Self::LesserEqual | Self::Greater | Self::GreaterEqual => OpInfo {
                prec: 5,
                assoc: Assoc::Ltr,
            },

            Self::EqualEqual | Self::BangEqual => OpInfo {
                prec: 4,
                assoc: Assoc::Ltr,
            },

            Self::AndAnd => OpInfo {
                prec: 3,
                assoc: Assoc::Ltr,
            },
            Self::OrOr => OpInfo {
                prec: 2,
                assoc: Assoc::Ltr,
            },

            Self::Equal => OpInfo {
                prec: 1,
                assoc: Assoc::Rtl,
            },

            _ => {
                panic!("`op_info()` has not been implemented for token: {:?}", self)
            }
        }
    }
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Parser { tokens, current: 0 }
    }

    /// The token under the cursor. The lexer always terminates the stream
    /// with EOF, so this clamps to the last token instead of failing.
    fn peek(&self) -> &Token {
        let idx = self.current.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn error_at(&self, token: &Token, expected: &str) -> ParseError {
        ParseError {
            message: format!("expected {}, found {}", expected, token.kind.describe()),
            span: token.span.clone(),
            at_eof: token.kind == TokenKind::Eof,
        }
    }

    fn error_at_current(&self, expected: &str) -> ParseError {
        self.error_at(self.peek(), expected)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.current < self.tokens.len() - 1 {
            self.current += 1;
        }
        token
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(expected))
        }
    }

    fn parse_block(&mut self) -> Result<(ast::Block, usize), ParseError> {
        self.expect(TokenKind::LeftBrace, "'{' to open a block")?;

        let mut stmts = Vec::new();
        while self.peek().kind != TokenKind::RightBrace && self.peek().kind != TokenKind::Eof {
            stmts.push(self.parse_stmt()?);
        }

        let rbrace = self.expect(TokenKind::RightBrace, "'}' to close the block")?;
        Ok((ast::Block { stmts }, rbrace.span.end))
    }

    fn parse_params(&mut self) -> Result<Vec<Token>, ParseError> {
        self.expect(TokenKind::LeftParen, "'(' before parameter list")?;

        let mut params = Vec::new();
        if self.peek().kind != TokenKind::RightParen {
            loop {
                params.push(self.expect(TokenKind::Ident, "parameter name")?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
                if self.peek().kind == TokenKind::RightParen {
                    break; // trailing comma
                }
            }
        }

        self.expect(TokenKind::RightParen, "')' after parameter list")?;
        Ok(params)
    }

    fn parse_fun_tail(&mut self, name: Option<String>) -> Result<(ast::FunLit, usize), ParseError> {
        let params = self.parse_params()?;
        let (body, end) = self.parse_block()?;

        Ok((
            ast::FunLit {
                name,
                params,
                body: std::rc::Rc::new(body),
            },
            end,
        ))
    }

    fn parse_object_literal(&mut self, start: usize) -> Result<ast::Expr, ParseError> {
        // The '{' has been consumed.
        let mut inits = Vec::new();

        if self.peek().kind != TokenKind::RightBrace {
            loop {
                let key = self.peek().clone();
                if key.kind != TokenKind::Ident && key.kind != TokenKind::Str {
                    return Err(self.error_at(&key, "identifier or string key in object literal"));
                }
                self.advance();
                self.expect(TokenKind::Colon, "':' after key in object literal")?;
                let value = self.parse_expr()?;
                inits.push((key, value));

                if !self.matches(TokenKind::Comma) {
                    break;
                }
                if self.peek().kind == TokenKind::RightBrace {
                    break; // trailing comma
                }
            }
        }

        let rbrace = self.expect(TokenKind::RightBrace, "'}' to close the object literal")?;
        Ok(ast::Expr {
            kind: ast::ObjLit { inits }.into(),
            span: start..rbrace.span.end,
        })
    }

    fn parse_primary(&mut self) -> Result<ast::Expr, ParseError> {
        let token = self.peek().clone();

        let mut expr = match &token.kind {
            TokenKind::LeftParen => {
                self.advance();
                let grouped = self.parse_expr()?;
                self.expect(TokenKind::RightParen, "')' to close the grouping")?;
                grouped
            }

            TokenKind::Fn => {
                self.advance();
                let (fun, end) = self.parse_fun_tail(None)?;
                ast::Expr {
                    kind: fun.into(),
                    span: token.span.start..end,
                }
            }

            TokenKind::LeftBrace => {
                self.advance();
                self.parse_object_literal(token.span.start)?
            }

            TokenKind::LeftBracket => {
                self.advance();

                let mut elements = Vec::new();
                if self.peek().kind != TokenKind::RightBracket {
                    loop {
                        elements.push(self.parse_expr()?);
                        if !self.matches(TokenKind::Comma) {
                            break;
                        }
                        if self.peek().kind == TokenKind::RightBracket {
                            break; // trailing comma
                        }
                    }
                }

                let rbracket = self.expect(TokenKind::RightBracket, "']' to close the array literal")?;
                ast::Expr {
                    kind: ast::ArrLit { elements }.into(),
                    span: token.span.start..rbracket.span.end,
                }
            }

            TokenKind::Int
            | TokenKind::Float
            | TokenKind::Str
            | TokenKind::Null
            | TokenKind::True
            | TokenKind::False => {
                self.advance();
                ast::Expr {
                    span: token.span.clone(),
                    kind: ast::Lit { token }.into(),
                }
            }

            TokenKind::Ident => {
                self.advance();
                ast::Expr {
                    span: token.span.clone(),
                    kind: ast::VarExpr { ident: token }.into(),
                }
            }

            _ if token.kind.is_prefix_op() => {
                self.advance();
                let target = self.parse_primary()?;
                ast::Expr {
                    span: token.span.start..target.span.end,
                    kind: ast::UnaryExpr {
                        op: token,
                        expr: Box::new(target),
                    }
                    .into(),
                }
            }

            _ => return Err(self.error_at_current("expression")),
        };

        // Postfix chain: calls, indexing, member access.
        loop {
            match self.peek().kind {
                TokenKind::LeftParen => {
                    self.advance();

                    let mut args = Vec::new();
                    if self.peek().kind != TokenKind::RightParen {
                        loop {
                            args.push(self.parse_expr()?);
                            if !self.matches(TokenKind::Comma) {
                                break;
                            }
                            if self.peek().kind == TokenKind::RightParen {
                                break; // trailing comma
                            }
                        }
                    }

                    let rparen =
                        self.expect(TokenKind::RightParen, "')' to close the call")?;
                    expr = ast::Expr {
                        span: expr.span.start..rparen.span.end,
                        kind: ast::CallExpr {
                            callee: Box::new(expr),
                            args,
                        }
                        .into(),
                    };
                }
                TokenKind::LeftBracket => {
                    self.advance();

                    let idx = self.parse_expr()?;
                    let rbracket =
                        self.expect(TokenKind::RightBracket, "']' to close the index")?;

                    expr = ast::Expr {
                        span: expr.span.start..rbracket.span.end,
                        kind: ast::IdxExpr {
                            target: Box::new(expr),
                            idx: Box::new(idx),
                        }
                        .into(),
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let field = self.expect(TokenKind::Ident, "identifier after '.'")?;

                    expr = ast::Expr {
                        span: expr.span.start..field.span.end,
                        kind: ast::MemberExpr {
                            target: Box::new(expr),
                            field,
                        }
                        .into(),
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn build_binary(&self, op: Token, lhs: ast::Expr, rhs: ast::Expr) -> Result<ast::Expr, ParseError> {
        let span = lhs.span.start..rhs.span.end;

        if op.kind == TokenKind::Equal {
            match lhs.kind {
                ast::ExprKind::Var(_) | ast::ExprKind::Idx(_) | ast::ExprKind::Member(_) => {}
                _ => {
                    return Err(ParseError {
                        message: "invalid assignment target".to_string(),
                        span: lhs.span,
                        at_eof: false,
                    })
                }
            }
            return Ok(ast::Expr {
                span,
                kind: ast::AssignExpr {
                    target: Box::new(lhs),
                    value: Box::new(rhs),
                }
                .into(),
            });
        }

        Ok(ast::Expr {
            span,
            kind: ast::BinaryExpr {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            }
            .into(),
        })
    }

    fn parse_prec_expr(&mut self, mut lhs: ast::Expr, min_prec: u8) -> Result<ast::Expr, ParseError> {
        let mut lookahead = self.peek().clone();

        while lookahead.kind.is_binary_op() && lookahead.kind.op_info().prec >= min_prec {
            let op = lookahead;
            self.advance();
            let mut rhs = self.parse_primary()?;
            lookahead = self.peek().clone();

            while lookahead.kind.is_binary_op()
                && ((lookahead.kind.op_info().assoc == Assoc::Ltr
                    && lookahead.kind.op_info().prec > op.kind.op_info().prec)
                    || (lookahead.kind.op_info().assoc == Assoc::Rtl
                        && lookahead.kind.op_info().prec == op.kind.op_info().prec))
            {
                let next_min = if lookahead.kind.op_info().prec > op.kind.op_info().prec {
                    op.kind.op_info().prec + 1
                } else {
                    op.kind.op_info().prec
                };
                rhs = self.parse_prec_expr(rhs, next_min)?;
                lookahead = self.peek().clone();
            }

            lhs = self.build_binary(op, lhs, rhs)?;
        }

        Ok(lhs)
    }

    fn parse_expr(&mut self) -> Result<ast::Expr, ParseError> {
        let primary = self.parse_primary()?;
        self.parse_prec_expr(primary, 0)
    }

    fn parse_stmt(&mut self) -> Result<ast::Stmt, ParseError> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Let => {
                self.advance();
                let ident = self.expect(TokenKind::Ident, "variable name after 'let'")?;
                self.expect(TokenKind::Equal, "'=' after variable name")?;
                let init = self.parse_expr()?;
                let semi = self.expect(TokenKind::Semicolon, "';' after declaration")?;

                Ok(ast::Stmt {
                    span: token.span.start..semi.span.end,
                    kind: ast::LetStmt { ident, init }.into(),
                })
            }

            // `fn` followed by a name is a declaration; otherwise it is a
            // function literal and falls through to the expression path.
            TokenKind::Fn
                if self
                    .tokens
                    .get(self.current + 1)
                    .is_some_and(|t| t.kind == TokenKind::Ident) =>
            {
                self.advance();
                let ident = self.expect(TokenKind::Ident, "function name")?;
                let (fun, end) = self.parse_fun_tail(Some(ident.lexeme.clone()))?;

                Ok(ast::Stmt {
                    span: token.span.start..end,
                    kind: ast::FunDecl { ident, fun }.into(),
                })
            }

            TokenKind::Return => {
                self.advance();
                let value = if self.peek().kind == TokenKind::Semicolon {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                let semi = self.expect(TokenKind::Semicolon, "';' after return")?;

                Ok(ast::Stmt {
                    span: token.span.start..semi.span.end,
                    kind: ast::ReturnStmt { value }.into(),
                })
            }

            TokenKind::If => {
                self.advance();

                let condition = self.parse_expr()?;
                let (then_block, mut end) = self.parse_block()?;
                let mut elif_stmts = Vec::new();
                let mut else_block = None;

                while self.peek().kind == TokenKind::Else {
                    self.advance();
                    if self.peek().kind == TokenKind::If {
                        if else_block.is_some() {
                            return Err(self.error_at_current("no 'else if' after a final 'else'"));
                        }

                        self.advance();
                        let elif_cond = self.parse_expr()?;
                        let (elif_block, elif_end) = self.parse_block()?;
                        end = elif_end;
                        elif_stmts.push((elif_cond, elif_block));
                    } else {
                        let (block, else_end) = self.parse_block()?;
                        end = else_end;
                        else_block = Some(block);
                        break;
                    }
                }

                Ok(ast::Stmt {
                    span: token.span.start..end,
                    kind: ast::IfStmt {
                        condition,
                        then_block,
                        elif_stmts,
                        else_block,
                    }
                    .into(),
                })
            }

            TokenKind::While => {
                self.advance();

                let condition = self.parse_expr()?;
                let (block, end) = self.parse_block()?;

                Ok(ast::Stmt {
                    span: token.span.start..end,
                    kind: ast::WhileStmt { condition, block }.into(),
                })
            }

            TokenKind::For => {
                self.advance();

                let ident = self.expect(TokenKind::Ident, "loop variable after 'for'")?;
                self.expect(TokenKind::In, "'in' after loop variable")?;
                let iterable = self.parse_expr()?;
                let (block, end) = self.parse_block()?;

                Ok(ast::Stmt {
                    span: token.span.start..end,
                    kind: ast::ForStmt {
                        ident,
                        iterable,
                        block,
                    }
                    .into(),
                })
            }

            // A '{' in statement position is a block, never an object
            // literal; parenthesize an object literal to use it as a
            // statement.
            TokenKind::LeftBrace => {
                let (block, end) = self.parse_block()?;
                Ok(ast::Stmt {
                    span: token.span.start..end,
                    kind: block.into(),
                })
            }

            _ => {
                let expr = self.parse_expr()?;
                let semi = self.expect(TokenKind::Semicolon, "';' after expression")?;
                Ok(ast::Stmt {
                    span: expr.span.start..semi.span.end,
                    kind: expr.into(),
                })
            }
        }
    }
}

/// Parse a whole program (or one REPL unit) into statements. Consumes
/// every token; a well-formed input leaves nothing but EOF behind.
pub fn parse(tokens: &[Token]) -> Result<Vec<ast::Stmt>, ParseError> {
    let mut stmts = Vec::new();

    if !tokens.is_empty() {
        let mut parser = Parser::new(tokens);
        while parser.peek().kind != TokenKind::Eof {
            stmts.push(parser.parse_stmt()?);
        }
    }

    Ok(stmts)
}
