//! Session driver: one-shot file execution and the interactive session.

use crate::{
    ast,
    error::Error,
    interpreter::Interpreter,
    lexer, parser, repl,
    value::Value,
};

/// Lex and parse one evaluation unit (a whole file, or one REPL input).
pub fn compile(source: &str) -> Result<Vec<ast::Stmt>, Error> {
    let tokens = lexer::tokenize(source)?;
    let stmts = parser::parse(&tokens)?;
    Ok(stmts)
}

/// Run `source` against an existing interpreter, returning the value of
/// the last statement. Used by the REPL and by the integration tests.
pub fn run_source(interp: &mut Interpreter, source: &str) -> Result<Value, Error> {
    let stmts = compile(source)?;
    interp.run(&stmts).map_err(Error::from)
}

/// File mode: fresh global environment, one pass over the whole program.
/// Any lex/parse/runtime error is reported to stderr with `path` and the
/// source position; the return value is the process exit code.
pub fn interpret(source: &str, path: &str) -> i32 {
    let mut interp = Interpreter::new();

    match run_source(&mut interp, source) {
        Ok(_) => 0,
        Err(err) => {
            let chars: Vec<char> = source.chars().collect();
            eprintln!("{}", err.report(&chars, path));
            1
        }
    }
}

/// Interactive mode: blocks until the session ends, returns the exit code.
pub fn interactive() -> i32 {
    repl::start()
}
