use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

pub type EnvRef = Rc<RefCell<Environment>>;

/// One scope: bindings plus a shared link to the enclosing scope. The
/// global environment has no parent. Children never own their parent;
/// closures keep captured scopes alive through the same `Rc`.
#[derive(Debug)]
pub struct Environment {
    enclosing: Option<EnvRef>,
    values: HashMap<String, Value>,
}

impl Environment {
    pub fn global() -> EnvRef {
        Rc::new(RefCell::new(Environment {
            enclosing: None,
            values: HashMap::new(),
        }))
    }

    pub fn nested(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            enclosing: Some(Rc::clone(enclosing)),
            values: HashMap::new(),
        }))
    }

    /// Create a fresh binding in this scope. Shadows any outer binding of
    /// the same name; redefining in the same scope replaces the binding.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Look a name up through the scope chain. `None` means undefined
    /// everywhere; the caller turns that into a NameError with a span.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.values.get(name) {
            Some(value) => Some(value.clone()),
            None => match &self.enclosing {
                Some(parent) => parent.borrow().get(name),
                None => None,
            },
        }
    }

    /// Mutate the nearest existing binding. Never creates one: assigning
    /// to an undefined name reports `false` and the caller raises a
    /// NameError.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            true
        } else {
            match &self.enclosing {
                Some(parent) => parent.borrow_mut().assign(name, value),
                None => false,
            }
        }
    }
}
