//! Native functions installed into every fresh global environment.

use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    common::Span,
    env::EnvRef,
    error::{RuntimeError, RuntimeErrorKind},
    interpreter::Interpreter,
    lexer, parser,
    value::{NativeFn, Value},
};

fn type_error(message: String, span: &Span) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::Type(message), span.clone())
}

fn io_error(err: impl ToString, span: &Span) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::Io(err.to_string()), span.clone())
}

// print(value) -- no trailing newline
fn print(interp: &mut Interpreter, args: Vec<Value>, span: &Span) -> Result<Value, RuntimeError> {
    interp.write_out(&args[0].to_string(), false, span)?;
    Ok(Value::Null)
}

// println(value)
fn println(interp: &mut Interpreter, args: Vec<Value>, span: &Span) -> Result<Value, RuntimeError> {
    interp.write_out(&args[0].to_string(), true, span)?;
    Ok(Value::Null)
}

// len(string | array | object) -> int; string length is in graphemes
fn len(_: &mut Interpreter, args: Vec<Value>, span: &Span) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Str(s) => Ok(Value::Int(s.graphemes(true).count() as i64)),
        Value::Arr(arr) => Ok(Value::Int(arr.borrow().len() as i64)),
        Value::Obj(obj) => Ok(Value::Int(obj.borrow().len() as i64)),
        other => Err(type_error(
            format!("len() argument must be string, array or object, not {}", other.type_name()),
            span,
        )),
    }
}

// type(value) -> string
fn type_of(_: &mut Interpreter, args: Vec<Value>, _: &Span) -> Result<Value, RuntimeError> {
    Ok(Value::Str(args[0].type_name().to_string()))
}

// str(value) -> string
fn str_of(_: &mut Interpreter, args: Vec<Value>, _: &Span) -> Result<Value, RuntimeError> {
    Ok(Value::Str(args[0].to_string()))
}

// keys(object) -> array
fn keys(_: &mut Interpreter, args: Vec<Value>, span: &Span) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Obj(obj) => Ok(Value::arr(
            obj.borrow().keys().cloned().map(Value::Str).collect(),
        )),
        other => Err(type_error(
            format!("keys() argument must be object, not {}", other.type_name()),
            span,
        )),
    }
}

// values(object) -> array
fn values(_: &mut Interpreter, args: Vec<Value>, span: &Span) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Obj(obj) => Ok(Value::arr(obj.borrow().values().cloned().collect())),
        other => Err(type_error(
            format!("values() argument must be object, not {}", other.type_name()),
            span,
        )),
    }
}

// enumerate(string | array | object) -> array of [index, item] pairs
fn enumerate(_: &mut Interpreter, args: Vec<Value>, span: &Span) -> Result<Value, RuntimeError> {
    let pair = |i: usize, item: Value| Value::arr(vec![Value::Int(i as i64), item]);

    match &args[0] {
        Value::Str(s) => Ok(Value::arr(
            s.graphemes(true)
                .enumerate()
                .map(|(i, g)| pair(i, Value::Str(g.to_string())))
                .collect(),
        )),
        Value::Arr(arr) => Ok(Value::arr(
            arr.borrow()
                .iter()
                .enumerate()
                .map(|(i, item)| pair(i, item.clone()))
                .collect(),
        )),
        Value::Obj(obj) => Ok(Value::arr(
            obj.borrow()
                .iter()
                .enumerate()
                .map(|(i, (key, value))| {
                    pair(i, Value::arr(vec![Value::Str(key.clone()), value.clone()]))
                })
                .collect(),
        )),
        other => Err(type_error(
            format!(
                "enumerate() argument must be string, array or object, not {}",
                other.type_name()
            ),
            span,
        )),
    }
}

// push(array, value)
fn push(_: &mut Interpreter, args: Vec<Value>, span: &Span) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Arr(arr) => {
            arr.borrow_mut().push(args[1].clone());
            Ok(Value::Null)
        }
        other => Err(type_error(
            format!("push() first argument must be array, not {}", other.type_name()),
            span,
        )),
    }
}

// read_file(path) -> string
fn read_file(_: &mut Interpreter, args: Vec<Value>, span: &Span) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Str(path) => fs::read_to_string(path)
            .map(Value::Str)
            .map_err(|err| io_error(err, span)),
        other => Err(type_error(
            format!("read_file() path must be string, not {}", other.type_name()),
            span,
        )),
    }
}

// write_file(path, contents)
fn write_file(_: &mut Interpreter, args: Vec<Value>, span: &Span) -> Result<Value, RuntimeError> {
    match (&args[0], &args[1]) {
        (Value::Str(path), Value::Str(contents)) => {
            fs::write(path, contents).map_err(|err| io_error(err, span))?;
            Ok(Value::Null)
        }
        (Value::Str(_), other) => Err(type_error(
            format!("write_file() contents must be string, not {}", other.type_name()),
            span,
        )),
        (other, _) => Err(type_error(
            format!("write_file() path must be string, not {}", other.type_name()),
            span,
        )),
    }
}

// rand() -> float in [0, 1)
fn rand_float(_: &mut Interpreter, _: Vec<Value>, _: &Span) -> Result<Value, RuntimeError> {
    let mut rng = rand::thread_rng();
    Ok(Value::Float(rng.gen::<f64>()))
}

// clock() -> float seconds since the Unix epoch
fn clock(_: &mut Interpreter, _: Vec<Value>, span: &Span) -> Result<Value, RuntimeError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| Value::Float(elapsed.as_secs_f64()))
        .map_err(|err| io_error(err, span))
}

// eval(code) -> value of the last statement
fn eval(interp: &mut Interpreter, args: Vec<Value>, span: &Span) -> Result<Value, RuntimeError> {
    let code = match &args[0] {
        Value::Str(code) => code,
        other => {
            return Err(type_error(
                format!("eval() argument must be string, not {}", other.type_name()),
                span,
            ))
        }
    };

    let tokens = lexer::tokenize(code)
        .map_err(|err| type_error(format!("eval: {}", err), span))?;
    let stmts = parser::parse(&tokens)
        .map_err(|err| type_error(format!("eval: {}", err), span))?;

    interp.run(&stmts)
}

const NATIVES: &[NativeFn] = &[
    NativeFn { name: "print", arity: 1, f: print },
    NativeFn { name: "println", arity: 1, f: println },
    NativeFn { name: "len", arity: 1, f: len },
    NativeFn { name: "type", arity: 1, f: type_of },
    NativeFn { name: "str", arity: 1, f: str_of },
    NativeFn { name: "keys", arity: 1, f: keys },
    NativeFn { name: "values", arity: 1, f: values },
    NativeFn { name: "enumerate", arity: 1, f: enumerate },
    NativeFn { name: "push", arity: 2, f: push },
    NativeFn { name: "read_file", arity: 1, f: read_file },
    NativeFn { name: "write_file", arity: 2, f: write_file },
    NativeFn { name: "rand", arity: 0, f: rand_float },
    NativeFn { name: "clock", arity: 0, f: clock },
    NativeFn { name: "eval", arity: 1, f: eval },
];

/// Install every builtin into the given (global) environment.
pub fn install(globals: &EnvRef) {
    for native in NATIVES {
        globals
            .borrow_mut()
            .define(native.name, Value::Native(*native));
    }
}
