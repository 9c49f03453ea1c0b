//! Interpreter core for the BlackRose language ("Wright").
//!
//! The pipeline is source text -> [`lexer`] -> tokens -> [`parser`] ->
//! AST -> [`interpreter`] (with [`value`] and [`env`]). The [`run`]
//! module drives it once per file or repeatedly per REPL line, and
//! [`ffi`] exposes the two launcher entry points `run_file` and
//! `start_prompt`.

pub mod ast;
pub mod builtins;
pub mod common;
pub mod env;
pub mod error;
pub mod ffi;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod run;
pub mod token;
pub mod value;

/// The current Wright version.
pub const WRIGHT_VERSION: &str = env!("CARGO_PKG_VERSION");
