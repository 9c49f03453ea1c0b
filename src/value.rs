use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::{
    ast,
    common::Span,
    env::EnvRef,
    error::RuntimeError,
    interpreter::Interpreter,
};

/// A user function closed over the environment active at its definition.
/// The captured environment is shared, not snapshotted, so the closure
/// sees later writes to outer bindings.
#[derive(Clone)]
pub struct Function {
    pub decl: ast::FunLit,
    pub env: EnvRef,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.decl.name)
            .field("params", &self.decl.params.len())
            .finish()
    }
}

/// Built-in function: a plain `fn` pointer plus a declared arity, checked
/// like user-function arity before the call.
#[derive(Clone, Copy)]
pub struct NativeFn {
    pub name: &'static str,
    pub arity: usize,
    pub f: fn(&mut Interpreter, Vec<Value>, &Span) -> Result<Value, RuntimeError>,
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}

/// Runtime value. Arrays and objects have reference semantics: cloning a
/// `Value` clones the handle, and mutation is visible through every copy.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Fun(Rc<Function>),
    Native(NativeFn),
    Arr(Rc<RefCell<Vec<Value>>>),
    Obj(Rc<RefCell<HashMap<String, Value>>>),
}

impl Value {
    pub fn arr(elements: Vec<Value>) -> Value {
        Value::Arr(Rc::new(RefCell::new(elements)))
    }

    pub fn obj(map: HashMap<String, Value>) -> Value {
        Value::Obj(Rc::new(RefCell::new(map)))
    }

    /// Truthiness is total: every variant coerces.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Fun(_) | Value::Native(_) => true,
            Value::Arr(arr) => !arr.borrow().is_empty(),
            Value::Obj(obj) => !obj.borrow().is_empty(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Fun(_) | Value::Native(_) => "function",
            Value::Arr(_) => "array",
            Value::Obj(_) => "object",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,

            // Numeric equality promotes, so `1 == 1.0`.
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }

            (Value::Str(a), Value::Str(b)) => a == b,

            (Value::Arr(a), Value::Arr(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Obj(a), Value::Obj(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }

            // Functions are never equal, values of different types never
            // compare equal (equality stays total).
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => {
                // Keep the float-ness visible: `1.0`, not `1`.
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::Fun(fun) => match &fun.decl.name {
                Some(name) => write!(f, "<fn {}>", name),
                None => write!(f, "<fn>"),
            },
            Value::Native(native) => write!(f, "<native fn {}>", native.name),
            Value::Arr(arr) => {
                let rendered = arr
                    .borrow()
                    .iter()
                    .map(|value| value.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{}]", rendered)
            }
            Value::Obj(obj) => {
                let rendered = obj
                    .borrow()
                    .iter()
                    .map(|(key, value)| format!("\"{}\": {}", key, value))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{}}}", rendered)
            }
        }
    }
}
