//! The interactive Wright REPL.

use derive_more::Display;
use rustyline::{error::ReadlineError, DefaultEditor};

use crate::{
    ast, error::Error, interpreter::Interpreter, lexer, run, value::Value, WRIGHT_VERSION,
};

const HELP_MESSAGE: &str = "
Wright REPL Help:

Built-in commands:
- :?/:h/:help -- Print this help menu.
- :m/:mode -- Print the current mode.
- :e/:eval -- Switch to eval mode.
- :t/:token -- Switch to token mode.
- :a/:ast -- Switch to AST mode.
- :c/:clear -- Clear the terminal window.
- :v/:version -- Print the current Wright version information.
- :q/:quit/:exit -- Quit/Exit the REPL.

Modes:
- eval mode: Evaluate each line of input
- token mode: Print the tokens generated for each line of input.
- AST mode: Print the AST tree/node generated for each line of input.
";

#[derive(Clone, Copy, PartialEq, Debug, Default, Display)]
enum ReplMode {
    /// Default REPL mode -- evaluates and prints results of input.
    #[default]
    Eval,

    /// Print the tokens generated for the input.
    Tokens,

    /// Print the AST generated for the input.
    Ast,
}

/// Outcome of compiling one (possibly still growing) line of input.
enum Unit {
    Complete(String, Vec<ast::Stmt>),
    NeedsMore,
    Failed(Error),
}

/// Compile one unit of input. A parse error at end-of-input normally asks
/// for another line, but a statement that is complete except for its
/// trailing ';' is accepted as typed.
fn classify_unit(source: &str) -> Unit {
    match run::compile(source) {
        Ok(stmts) => Unit::Complete(source.to_string(), stmts),
        Err(Error::Parse(ref parse_err)) if parse_err.at_eof => {
            let terminated = format!("{};", source);
            match run::compile(&terminated) {
                Ok(stmts) => Unit::Complete(terminated, stmts),
                Err(_) => Unit::NeedsMore,
            }
        }
        Err(err) => Unit::Failed(err),
    }
}

/// Whether an evaluated unit's result should be printed back: only when
/// the unit ends in an expression statement and the value is not null.
fn echo_value(stmts: &[ast::Stmt], value: &Value) -> bool {
    stmts.last().is_some_and(ast::Stmt::is_expression) && *value != Value::Null
}

/// Read one evaluation unit, extending over multiple lines while the
/// parser keeps running out of input. `None` means the unit was abandoned
/// (Ctrl-C) or the input ended.
fn read_unit(editor: &mut DefaultEditor, first_line: String) -> Option<(String, Vec<ast::Stmt>)> {
    let mut source = first_line;

    loop {
        match classify_unit(&source) {
            Unit::Complete(source, stmts) => return Some((source, stmts)),
            Unit::NeedsMore => match editor.readline(".. ") {
                Ok(more) => {
                    source.push('\n');
                    source.push_str(&more);
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return None,
                Err(_) => return None,
            },
            Unit::Failed(err) => {
                let chars: Vec<char> = source.chars().collect();
                eprintln!("{}", err.report(&chars, "<repl>"));
                return None;
            }
        }
    }
}

/// Start an interactive session. Blocks until the session ends and
/// returns the exit code for the caller to pass to the process.
pub fn start() -> i32 {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("wright: cannot open terminal: {}", err);
            return 1;
        }
    };

    // One persistent global environment for the whole session.
    let mut interp = Interpreter::new();
    let mut mode = ReplMode::default();
    let mut input_number = 0usize;

    println!("Wright REPL interpreter (wright version {})", WRIGHT_VERSION);

    loop {
        input_number += 1;

        let line = match editor.readline(&format!("[{}]: >> ", input_number)) {
            Ok(line) => line,
            // Ctrl-C abandons the current input and resumes the loop.
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("wright: repl: {}", err);
                return 1;
            }
        };

        match line.trim() {
            "" => continue,

            ":?" | ":h" | ":help" => {
                println!("{}", HELP_MESSAGE);
                continue;
            }

            ":m" | ":mode" => {
                println!("Current mode: {}", mode);
                continue;
            }

            ":e" | ":eval" => {
                mode = ReplMode::Eval;
                continue;
            }

            ":t" | ":token" => {
                mode = ReplMode::Tokens;
                continue;
            }

            ":a" | ":ast" => {
                mode = ReplMode::Ast;
                continue;
            }

            ":c" | ":clear" => {
                print!("\x1B[2J\x1B[1;1H");
                continue;
            }

            ":v" | ":version" => {
                println!("Wright programming language version {}", WRIGHT_VERSION);
                continue;
            }

            ":q" | ":quit" | ":exit" => break,

            _ => {}
        }

        let _ = editor.add_history_entry(line.as_str());

        if mode == ReplMode::Tokens {
            match lexer::tokenize(&line) {
                Ok(tokens) => {
                    for token in tokens {
                        println!("{:?}", token);
                    }
                }
                Err(err) => {
                    let chars: Vec<char> = line.chars().collect();
                    eprintln!("{}", Error::from(err).report(&chars, "<repl>"));
                }
            }
            continue;
        }

        let Some((source, stmts)) = read_unit(&mut editor, line) else {
            continue;
        };

        if mode == ReplMode::Ast {
            for stmt in &stmts {
                println!("{:#?}", stmt);
            }
            continue;
        }

        // Eval mode. Errors are reported and the session continues with
        // its environment intact.
        match interp.run(&stmts) {
            Ok(value) => {
                if echo_value(&stmts, &value) {
                    println!("{}", value);
                }
            }
            Err(err) => {
                let chars: Vec<char> = source.chars().collect();
                eprintln!("{}", Error::from(err).report(&chars, "<repl>"));
            }
        }
    }

    0
}
