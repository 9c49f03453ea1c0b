use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use unicode_segmentation::UnicodeSegmentation;

use crate::{
    ast,
    builtins,
    common::Span,
    env::{EnvRef, Environment},
    error::{RuntimeError, RuntimeErrorKind},
    token::{Literal, TokenKind},
    value::{Function, Value},
};

/// Guards against unbounded recursion blowing the native stack.
const MAX_CALL_DEPTH: usize = 1000;

/// Non-local exits threaded through `Result`, so `?` unwinds both errors
/// and `return` statements. A `Return` stops exactly at the enclosing call
/// frame; at the top level it becomes a runtime error.
#[derive(Debug)]
pub enum Interrupt {
    Return(Value, Span),
    Failure(RuntimeError),
}

impl From<RuntimeError> for Interrupt {
    fn from(err: RuntimeError) -> Interrupt {
        Interrupt::Failure(err)
    }
}

type Exec<T> = Result<T, Interrupt>;

pub struct Interpreter {
    pub globals: EnvRef,
    out: Box<dyn Write>,
    depth: usize,
}

impl Interpreter {
    /// Fresh interpreter: new global environment with the builtins
    /// installed, printing to stdout.
    pub fn new() -> Interpreter {
        Interpreter::with_output(Box::new(std::io::stdout()))
    }

    /// Same, but `print`/`println` write into the given sink. Used by the
    /// integration tests to capture output.
    pub fn with_output(out: Box<dyn Write>) -> Interpreter {
        let globals = Environment::global();
        builtins::install(&globals);

        Interpreter {
            globals,
            out,
            depth: 0,
        }
    }

    /// Write through the interpreter's output sink (stdout by default).
    pub fn write_out(&mut self, text: &str, newline: bool, span: &Span) -> Result<(), RuntimeError> {
        let io_err =
            |err: std::io::Error| RuntimeError::new(RuntimeErrorKind::Io(err.to_string()), span.clone());

        if newline {
            writeln!(self.out, "{}", text).map_err(io_err)?;
        } else {
            write!(self.out, "{}", text).map_err(io_err)?;
            self.out.flush().map_err(io_err)?;
        }
        Ok(())
    }

    /// Run a sequence of top-level statements against the global
    /// environment, returning the value of the last statement (`null` for
    /// an empty program or a non-expression tail).
    pub fn run(&mut self, stmts: &[ast::Stmt]) -> Result<Value, RuntimeError> {
        let globals = Rc::clone(&self.globals);
        let mut last = Value::Null;

        for stmt in stmts {
            match self.exec_stmt(stmt, &globals) {
                Ok(value) => last = value,
                Err(Interrupt::Return(_, span)) => {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::ReturnOutsideFunction,
                        span,
                    ))
                }
                Err(Interrupt::Failure(err)) => return Err(err),
            }
        }

        Ok(last)
    }

    fn exec_block(&mut self, block: &ast::Block, env: &EnvRef) -> Exec<()> {
        for stmt in &block.stmts {
            self.exec_stmt(stmt, env)?;
        }
        Ok(())
    }

    /// Execute one statement; expression statements produce their value,
    /// everything else produces `null`.
    fn exec_stmt(&mut self, stmt: &ast::Stmt, env: &EnvRef) -> Exec<Value> {
        match &stmt.kind {
            ast::StmtKind::Let(decl) => {
                let value = self.eval_expr(&decl.init, env)?;
                env.borrow_mut().define(decl.ident.lexeme.clone(), value);
                Ok(Value::Null)
            }

            ast::StmtKind::Fun(decl) => {
                let closure = Value::Fun(Rc::new(Function {
                    decl: decl.fun.clone(),
                    env: Rc::clone(env),
                }));
                env.borrow_mut().define(decl.ident.lexeme.clone(), closure);
                Ok(Value::Null)
            }

            ast::StmtKind::If(if_stmt) => {
                if self.eval_expr(&if_stmt.condition, env)?.is_truthy() {
                    let child = Environment::nested(env);
                    self.exec_block(&if_stmt.then_block, &child)?;
                    return Ok(Value::Null);
                }

                for (elif_cond, elif_block) in &if_stmt.elif_stmts {
                    if self.eval_expr(elif_cond, env)?.is_truthy() {
                        let child = Environment::nested(env);
                        self.exec_block(elif_block, &child)?;
                        return Ok(Value::Null);
                    }
                }

                if let Some(else_block) = &if_stmt.else_block {
                    let child = Environment::nested(env);
                    self.exec_block(else_block, &child)?;
                }

                Ok(Value::Null)
            }

            ast::StmtKind::While(while_stmt) => {
                // The condition is re-evaluated every iteration; no
                // implicit iteration bound.
                while self.eval_expr(&while_stmt.condition, env)?.is_truthy() {
                    let child = Environment::nested(env);
                    self.exec_block(&while_stmt.block, &child)?;
                }
                Ok(Value::Null)
            }

            ast::StmtKind::For(for_stmt) => self.exec_for(for_stmt, env),

            ast::StmtKind::Return(ret) => {
                let value = match &ret.value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Null,
                };
                Err(Interrupt::Return(value, stmt.span.clone()))
            }

            ast::StmtKind::Block(block) => {
                let child = Environment::nested(env);
                self.exec_block(block, &child)?;
                Ok(Value::Null)
            }

            ast::StmtKind::Expr(expr) => self.eval_expr(expr, env),
        }
    }

    fn exec_for(&mut self, for_stmt: &ast::ForStmt, env: &EnvRef) -> Exec<Value> {
        let iterable = self.eval_expr(&for_stmt.iterable, env)?;
        let name = for_stmt.ident.lexeme.clone();

        let items: Vec<Value> = match &iterable {
            Value::Str(s) => s
                .graphemes(true)
                .map(|g| Value::Str(g.to_string()))
                .collect(),
            // Snapshot the elements so mutating the array inside the loop
            // body cannot invalidate the iteration.
            Value::Arr(arr) => arr.borrow().clone(),
            Value::Obj(obj) => obj
                .borrow()
                .iter()
                .map(|(key, value)| Value::arr(vec![Value::Str(key.clone()), value.clone()]))
                .collect(),
            other => {
                return Err(self
                    .type_error(
                        format!("type '{}' is not iterable", other.type_name()),
                        &for_stmt.iterable.span,
                    )
                    .into())
            }
        };

        for item in items {
            let child = Environment::nested(env);
            child.borrow_mut().define(name.clone(), item);
            self.exec_block(&for_stmt.block, &child)?;
        }

        Ok(Value::Null)
    }

    fn type_error(&self, message: String, span: &Span) -> RuntimeError {
        RuntimeError::new(RuntimeErrorKind::Type(message), span.clone())
    }

    fn eval_expr(&mut self, expr: &ast::Expr, env: &EnvRef) -> Exec<Value> {
        match &expr.kind {
            ast::ExprKind::Lit(lit) => Ok(match (&lit.token.kind, &lit.token.literal) {
                (TokenKind::Null, _) => Value::Null,
                (TokenKind::True, _) => Value::Bool(true),
                (TokenKind::False, _) => Value::Bool(false),
                (_, Some(Literal::Int(n))) => Value::Int(*n),
                (_, Some(Literal::Float(n))) => Value::Float(*n),
                (_, Some(Literal::Str(s))) => Value::Str(s.clone()),
                // The parser only builds `Lit` from literal tokens.
                _ => unreachable!("literal token without payload"),
            }),

            ast::ExprKind::Var(var) => match env.borrow().get(&var.ident.lexeme) {
                Some(value) => Ok(value),
                None => Err(RuntimeError::new(
                    RuntimeErrorKind::Name(var.ident.lexeme.clone()),
                    expr.span.clone(),
                )
                .into()),
            },

            ast::ExprKind::Unary(unary) => {
                let value = self.eval_expr(&unary.expr, env)?;
                match unary.op.kind {
                    TokenKind::Minus => match value {
                        Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
                        Value::Float(n) => Ok(Value::Float(-n)),
                        other => Err(self
                            .type_error(
                                format!("bad operand type for unary '-': {}", other.type_name()),
                                &expr.span,
                            )
                            .into()),
                    },
                    TokenKind::Bang => Ok(Value::Bool(!value.is_truthy())),
                    _ => unreachable!("parser only builds '-' and '!' unaries"),
                }
            }

            ast::ExprKind::Binary(binary) => self.eval_binary(binary, &expr.span, env),

            ast::ExprKind::Assign(assign) => self.eval_assign(assign, &expr.span, env),

            ast::ExprKind::Idx(idx_expr) => {
                let target = self.eval_expr(&idx_expr.target, env)?;
                let idx = self.eval_expr(&idx_expr.idx, env)?;
                self.eval_index(&target, &idx, &expr.span).map_err(Into::into)
            }

            ast::ExprKind::Member(member) => {
                let target = self.eval_expr(&member.target, env)?;
                match target {
                    // A missing key reads as null, same as `obj["k"]`.
                    Value::Obj(obj) => Ok(obj
                        .borrow()
                        .get(&member.field.lexeme)
                        .cloned()
                        .unwrap_or(Value::Null)),
                    other => Err(self
                        .type_error(
                            format!("type '{}' has no members", other.type_name()),
                            &expr.span,
                        )
                        .into()),
                }
            }

            ast::ExprKind::Call(call) => {
                let callee = self.eval_expr(&call.callee, env)?;

                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(self.eval_expr(arg, env)?);
                }

                self.call_value(&callee, args, &expr.span)
            }

            ast::ExprKind::FunLit(fun_lit) => Ok(Value::Fun(Rc::new(Function {
                decl: fun_lit.clone(),
                env: Rc::clone(env),
            }))),

            ast::ExprKind::ObjLit(obj_lit) => {
                let mut map = HashMap::new();
                for (key_token, value_expr) in &obj_lit.inits {
                    let key = match &key_token.literal {
                        Some(Literal::Str(s)) => s.clone(),
                        _ => key_token.lexeme.clone(),
                    };
                    let value = self.eval_expr(value_expr, env)?;
                    map.insert(key, value);
                }
                Ok(Value::obj(map))
            }

            ast::ExprKind::ArrLit(arr_lit) => {
                let mut elements = Vec::with_capacity(arr_lit.elements.len());
                for element in &arr_lit.elements {
                    elements.push(self.eval_expr(element, env)?);
                }
                Ok(Value::arr(elements))
            }
        }
    }

    /// Call any callable value with already-evaluated arguments.
    /// Arity is checked before a frame is created, so a failed call leaves
    /// no bindings behind.
    pub fn call_value(&mut self, callee: &Value, args: Vec<Value>, span: &Span) -> Exec<Value> {
        match callee {
            Value::Fun(fun) => {
                if args.len() != fun.decl.params.len() {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::Arity {
                            expected: fun.decl.params.len(),
                            got: args.len(),
                        },
                        span.clone(),
                    )
                    .into());
                }

                if self.depth >= MAX_CALL_DEPTH {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::RecursionLimit(MAX_CALL_DEPTH),
                        span.clone(),
                    )
                    .into());
                }

                // The call frame is parented to the closure's captured
                // environment, not the caller's.
                let frame = Environment::nested(&fun.env);
                for (param, arg) in fun.decl.params.iter().zip(args) {
                    frame.borrow_mut().define(param.lexeme.clone(), arg);
                }

                self.depth += 1;
                let result = self.exec_block(&fun.decl.body, &frame);
                self.depth -= 1;

                match result {
                    Ok(()) => Ok(Value::Null),
                    Err(Interrupt::Return(value, _)) => Ok(value),
                    Err(failure) => Err(failure),
                }
            }

            Value::Native(native) => {
                if args.len() != native.arity {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::Arity {
                            expected: native.arity,
                            got: args.len(),
                        },
                        span.clone(),
                    )
                    .into());
                }

                (native.f)(self, args, span).map_err(Into::into)
            }

            other => Err(self
                .type_error(
                    format!("type '{}' is not callable", other.type_name()),
                    span,
                )
                .into()),
        }
    }

    fn eval_assign(&mut self, assign: &ast::AssignExpr, span: &Span, env: &EnvRef) -> Exec<Value> {
        // Right side first, then the target; assignment evaluates to the
        // assigned value.
        let value = self.eval_expr(&assign.value, env)?;

        match &assign.target.kind {
            ast::ExprKind::Var(var) => {
                if !env.borrow_mut().assign(&var.ident.lexeme, value.clone()) {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::Name(var.ident.lexeme.clone()),
                        assign.target.span.clone(),
                    )
                    .into());
                }
                Ok(value)
            }

            ast::ExprKind::Idx(idx_expr) => {
                let target = self.eval_expr(&idx_expr.target, env)?;
                let idx = self.eval_expr(&idx_expr.idx, env)?;

                match &target {
                    Value::Arr(arr) => {
                        let len = arr.borrow().len();
                        let slot = self.resolve_array_index(&idx, len, span)?;
                        arr.borrow_mut()[slot] = value.clone();
                        Ok(value)
                    }
                    Value::Obj(obj) => match idx {
                        Value::Str(key) => {
                            obj.borrow_mut().insert(key, value.clone());
                            Ok(value)
                        }
                        other => Err(self
                            .type_error(
                                format!("object key must be a string, not {}", other.type_name()),
                                span,
                            )
                            .into()),
                    },
                    other => Err(self
                        .type_error(
                            format!("cannot assign into type '{}'", other.type_name()),
                            span,
                        )
                        .into()),
                }
            }

            ast::ExprKind::Member(member) => {
                let target = self.eval_expr(&member.target, env)?;
                match target {
                    Value::Obj(obj) => {
                        obj.borrow_mut()
                            .insert(member.field.lexeme.clone(), value.clone());
                        Ok(value)
                    }
                    other => Err(self
                        .type_error(
                            format!("type '{}' has no members", other.type_name()),
                            span,
                        )
                        .into()),
                }
            }

            _ => unreachable!("parser validates assignment targets"),
        }
    }

    /// Resolve a (possibly negative) array index, per-use; negative
    /// indices count from the end.
    fn resolve_array_index(
        &self,
        idx: &Value,
        len: usize,
        span: &Span,
    ) -> Result<usize, RuntimeError> {
        let raw = match idx {
            Value::Int(n) => *n,
            other => {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::Index(format!(
                        "array index must be an int, not {}",
                        other.type_name()
                    )),
                    span.clone(),
                ))
            }
        };

        let resolved = if raw < 0 { raw + len as i64 } else { raw };
        if resolved < 0 || resolved as usize >= len {
            return Err(RuntimeError::new(
                RuntimeErrorKind::Index(format!(
                    "index {} out of range for length {}",
                    raw, len
                )),
                span.clone(),
            ));
        }

        Ok(resolved as usize)
    }

    fn eval_index(
        &self,
        target: &Value,
        idx: &Value,
        span: &Span,
    ) -> Result<Value, RuntimeError> {
        match target {
            Value::Arr(arr) => {
                let len = arr.borrow().len();
                let slot = self.resolve_array_index(idx, len, span)?;
                Ok(arr.borrow()[slot].clone())
            }

            Value::Obj(obj) => match idx {
                Value::Str(key) => Ok(obj.borrow().get(key).cloned().unwrap_or(Value::Null)),
                other => Err(RuntimeError::new(
                    RuntimeErrorKind::Type(format!(
                        "object key must be a string, not {}",
                        other.type_name()
                    )),
                    span.clone(),
                )),
            },

            Value::Str(s) => {
                let graphemes: Vec<&str> = s.graphemes(true).collect();
                let slot = self.resolve_array_index(idx, graphemes.len(), span)?;
                Ok(Value::Str(graphemes[slot].to_string()))
            }

            other => Err(RuntimeError::new(
                RuntimeErrorKind::Type(format!("type '{}' is not indexable", other.type_name())),
                span.clone(),
            )),
        }
    }

    fn eval_binary(&mut self, binary: &ast::BinaryExpr, span: &Span, env: &EnvRef) -> Exec<Value> {
        // Short-circuit operators evaluate the right side lazily.
        match binary.op.kind {
            TokenKind::AndAnd => {
                let left = self.eval_expr(&binary.left, env)?;
                if !left.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let right = self.eval_expr(&binary.right, env)?;
                return Ok(Value::Bool(right.is_truthy()));
            }
            TokenKind::OrOr => {
                let left = self.eval_expr(&binary.left, env)?;
                if left.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                let right = self.eval_expr(&binary.right, env)?;
                return Ok(Value::Bool(right.is_truthy()));
            }
            _ => {}
        }

        let left = self.eval_expr(&binary.left, env)?;
        let right = self.eval_expr(&binary.right, env)?;
        let op = binary.op.kind;

        match op {
            TokenKind::EqualEqual => return Ok(Value::Bool(left == right)),
            TokenKind::BangEqual => return Ok(Value::Bool(left != right)),
            _ => {}
        }

        // String operands: concatenation and lexicographic ordering.
        if let (Value::Str(a), Value::Str(b)) = (&left, &right) {
            return match op {
                TokenKind::Plus => Ok(Value::Str(format!("{}{}", a, b))),
                TokenKind::Lesser => Ok(Value::Bool(a < b)),
                TokenKind::LesserEqual => Ok(Value::Bool(a <= b)),
                TokenKind::Greater => Ok(Value::Bool(a > b)),
                TokenKind::GreaterEqual => Ok(Value::Bool(a >= b)),
                _ => Err(self
                    .type_error(
                        format!("unsupported operand type for {}: string", op.describe()),
                        span,
                    )
                    .into()),
            };
        }

        self.eval_numeric_binary(op, &left, &right, span)
            .map_err(Into::into)
    }

    fn eval_numeric_binary(
        &self,
        op: TokenKind,
        left: &Value,
        right: &Value,
        span: &Span,
    ) -> Result<Value, RuntimeError> {
        let mismatch = || {
            RuntimeError::new(
                RuntimeErrorKind::Type(format!(
                    "unsupported operand types for {}: {} and {}",
                    op.describe(),
                    left.type_name(),
                    right.type_name()
                )),
                span.clone(),
            )
        };

        // Int op Int stays integral; any float operand promotes both.
        match (left, right) {
            (Value::Int(a), Value::Int(b)) => {
                let (a, b) = (*a, *b);
                match op {
                    TokenKind::Plus => Ok(Value::Int(a.wrapping_add(b))),
                    TokenKind::Minus => Ok(Value::Int(a.wrapping_sub(b))),
                    TokenKind::Star => Ok(Value::Int(a.wrapping_mul(b))),
                    TokenKind::Slash => {
                        if b == 0 {
                            Err(RuntimeError::new(
                                RuntimeErrorKind::DivisionByZero,
                                span.clone(),
                            ))
                        } else {
                            Ok(Value::Int(a.wrapping_div(b)))
                        }
                    }
                    TokenKind::Percent => {
                        if b == 0 {
                            Err(RuntimeError::new(
                                RuntimeErrorKind::DivisionByZero,
                                span.clone(),
                            ))
                        } else {
                            Ok(Value::Int(a.wrapping_rem(b)))
                        }
                    }
                    TokenKind::Lesser => Ok(Value::Bool(a < b)),
                    TokenKind::LesserEqual => Ok(Value::Bool(a <= b)),
                    TokenKind::Greater => Ok(Value::Bool(a > b)),
                    TokenKind::GreaterEqual => Ok(Value::Bool(a >= b)),
                    _ => Err(mismatch()),
                }
            }

            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                let a = match left {
                    Value::Int(n) => *n as f64,
                    Value::Float(n) => *n,
                    _ => unreachable!(),
                };
                let b = match right {
                    Value::Int(n) => *n as f64,
                    Value::Float(n) => *n,
                    _ => unreachable!(),
                };

                match op {
                    TokenKind::Plus => Ok(Value::Float(a + b)),
                    TokenKind::Minus => Ok(Value::Float(a - b)),
                    // Float division by zero follows IEEE 754 (inf/nan).
                    TokenKind::Star => Ok(Value::Float(a * b)),
                    TokenKind::Slash => Ok(Value::Float(a / b)),
                    TokenKind::Percent => Ok(Value::Float(a % b)),
                    TokenKind::Lesser => Ok(Value::Bool(a < b)),
                    TokenKind::LesserEqual => Ok(Value::Bool(a <= b)),
                    TokenKind::Greater => Ok(Value::Bool(a > b)),
                    TokenKind::GreaterEqual => Ok(Value::Bool(a >= b)),
                    _ => Err(mismatch()),
                }
            }

            _ => Err(mismatch()),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Interpreter {
        Interpreter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::tokenize, parser::parse};
    use pretty_assertions::assert_eq;

    fn eval(source: &str) -> Result<Value, RuntimeError> {
        let tokens = tokenize(source).unwrap();
        let stmts = parse(&tokens).unwrap();
        Interpreter::with_output(Box::new(Vec::new())).run(&stmts)
    }

    #[test]
    fn precedence_respected() {
        assert_eq!(eval("1 + 2 * 3;").unwrap(), Value::Int(7));
    }

    #[test]
    fn arithmetic_is_deterministic() {
        assert_eq!(eval("(1 + 2) * 4 - 5;").unwrap(), eval("(1 + 2) * 4 - 5;").unwrap());
    }

    #[test]
    fn mixed_arithmetic_promotes_to_float() {
        assert_eq!(eval("1 + 2.5;").unwrap(), Value::Float(3.5));
        assert_eq!(eval("4 / 2;").unwrap(), Value::Int(2));
        assert_eq!(eval("7 / 2;").unwrap(), Value::Int(3));
        assert_eq!(eval("7.0 / 2;").unwrap(), Value::Float(3.5));
    }

    #[test]
    fn float_division_by_zero_is_infinite() {
        assert_eq!(eval("1.0 / 0.0;").unwrap(), Value::Float(f64::INFINITY));
    }

    #[test]
    fn int_division_by_zero_is_an_error() {
        let err = eval("1 / 0;").unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::DivisionByZero);
        let err = eval("1 % 0;").unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::DivisionByZero);
    }

    #[test]
    fn closures_see_live_bindings() {
        let result = eval("let x = 10; fn f() { return x; } x = 20; f();").unwrap();
        assert_eq!(result, Value::Int(20));
    }

    #[test]
    fn closures_capture_their_defining_scope() {
        let result = eval(
            "fn counter() { let n = 0; return fn() { n = n + 1; return n; }; } \
             let tick = counter(); tick(); tick();",
        )
        .unwrap();
        assert_eq!(result, Value::Int(2));
    }

    #[test]
    fn arity_mismatch_fails_and_leaves_no_frame() {
        let err = eval("fn two(a, b) { return a; } two(1);").unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::Arity { expected: 2, got: 1 });

        // `a` must not have leaked into the globals.
        let err = eval("fn two(a, b) { return a; } two(1); a;").unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::Arity { expected: 2, got: 1 });
    }

    #[test]
    fn assignment_to_undefined_name_is_a_name_error() {
        let err = eval("missing = 1;").unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::Name("missing".into()));

        let err = eval("{ { missing = 1; } }").unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::Name("missing".into()));
    }

    #[test]
    fn let_shadows_in_inner_scope() {
        let result = eval("let x = 1; { let x = 2; } x;").unwrap();
        assert_eq!(result, Value::Int(1));
    }

    #[test]
    fn comparisons_do_not_chain() {
        let err = eval("1 < 2 < 3;").unwrap_err();
        assert!(matches!(err.kind, RuntimeErrorKind::Type(_)));
    }

    #[test]
    fn return_at_top_level_is_an_error() {
        let err = eval("return 1;").unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::ReturnOutsideFunction);
    }

    #[test]
    fn function_without_return_yields_null() {
        assert_eq!(eval("fn f() { 1 + 1; } f();").unwrap(), Value::Null);
    }

    #[test]
    fn while_loop_runs_to_completion() {
        let result = eval("let n = 0; while n < 5 { n = n + 1; } n;").unwrap();
        assert_eq!(result, Value::Int(5));
    }

    #[test]
    fn for_loop_over_array_and_string() {
        let result = eval("let sum = 0; for x in [1, 2, 3] { sum = sum + x; } sum;").unwrap();
        assert_eq!(result, Value::Int(6));

        let result = eval("let n = 0; for c in \"héllo\" { n = n + 1; } n;").unwrap();
        assert_eq!(result, Value::Int(5));
    }

    #[test]
    fn arrays_have_reference_semantics() {
        let result = eval("let a = [1]; let b = a; b[0] = 9; a[0];").unwrap();
        assert_eq!(result, Value::Int(9));
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        assert_eq!(eval("[1, 2, 3][-1];").unwrap(), Value::Int(3));
        assert_eq!(eval("\"abc\"[-2];").unwrap(), Value::Str("b".into()));
    }

    #[test]
    fn index_out_of_range_is_an_index_error() {
        let err = eval("[1, 2][5];").unwrap_err();
        assert!(matches!(err.kind, RuntimeErrorKind::Index(_)));
    }

    #[test]
    fn missing_object_key_reads_as_null() {
        assert_eq!(eval("let o = { a: 1 }; o.b;").unwrap(), Value::Null);
        assert_eq!(eval("let o = { a: 1 }; o[\"b\"];").unwrap(), Value::Null);
    }

    #[test]
    fn member_assignment_creates_keys() {
        assert_eq!(eval("let o = {}; o.a = 5; o.a;").unwrap(), Value::Int(5));
    }

    #[test]
    fn type_mismatch_names_operator_and_types() {
        let err = eval("\"a\" + 1;").unwrap_err();
        let RuntimeErrorKind::Type(message) = err.kind else {
            panic!("expected type error");
        };
        assert_eq!(message, "unsupported operand types for '+': string and int");
    }

    #[test]
    fn logical_operators_short_circuit() {
        // The right side would raise a NameError if evaluated.
        assert_eq!(eval("false && missing;").unwrap(), Value::Bool(false));
        assert_eq!(eval("true || missing;").unwrap(), Value::Bool(true));
    }

    #[test]
    fn recursion_limit_is_a_runtime_error() {
        let err = eval("fn loop_forever() { return loop_forever(); } loop_forever();").unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::RecursionLimit(MAX_CALL_DEPTH));
    }

    #[test]
    fn recursion_within_the_limit_works() {
        let result = eval(
            "fn fib(n) { if n < 2 { return n; } return fib(n - 1) + fib(n - 2); } fib(10);",
        )
        .unwrap();
        assert_eq!(result, Value::Int(55));
    }

    #[test]
    fn error_does_not_corrupt_completed_bindings() {
        // First statement completes, second fails; run again with the
        // same interpreter to observe the surviving binding.
        let tokens = tokenize("let x = 1; missing;").unwrap();
        let stmts = parse(&tokens).unwrap();
        let mut interp = Interpreter::with_output(Box::new(Vec::new()));
        assert!(interp.run(&stmts).is_err());

        let tokens = tokenize("x;").unwrap();
        let stmts = parse(&tokens).unwrap();
        assert_eq!(interp.run(&stmts).unwrap(), Value::Int(1));
    }
}
