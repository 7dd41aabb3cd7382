//! Lexical environments
//!
//! An `Env` is a shared handle to one scope in a parent chain. Cloning an
//! `Env` aliases the same scope rather than snapshotting it, which is what
//! lets a closure observe assignments made to a captured binding after the
//! closure was created.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::interpreter::value::Value;

/// One binding: its value plus whether reassignment is allowed
#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    mutable: bool,
}

struct Scope {
    bindings: HashMap<String, Binding>,
    parent: Option<Env>,
}

/// Why an assignment was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    Unknown,
    Immutable,
}

/// A shared, mutable scope chain
#[derive(Clone)]
pub struct Env(Rc<RefCell<Scope>>);

impl Env {
    /// Create a fresh root environment
    pub fn new() -> Self {
        Env(Rc::new(RefCell::new(Scope {
            bindings: HashMap::new(),
            parent: None,
        })))
    }

    /// Create a child scope whose parent is this environment
    pub fn child(&self) -> Self {
        Env(Rc::new(RefCell::new(Scope {
            bindings: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Define a binding in this scope. Shadowing an existing name in the
    /// same scope replaces it.
    pub fn define(&self, name: impl Into<String>, value: Value, mutable: bool) {
        self.0
            .borrow_mut()
            .bindings
            .insert(name.into(), Binding { value, mutable });
    }

    /// Look up a name, walking the parent chain
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let scope = self.0.borrow();
        if let Some(binding) = scope.bindings.get(name) {
            return Some(binding.value.clone());
        }
        scope.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// Assign to an existing binding, walking the parent chain. The binding
    /// is updated in the scope that declared it.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), AssignError> {
        let mut scope = self.0.borrow_mut();
        if let Some(binding) = scope.bindings.get_mut(name) {
            if !binding.mutable {
                return Err(AssignError::Immutable);
            }
            binding.value = value;
            return Ok(());
        }
        match &scope.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(AssignError::Unknown),
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Env::new()
    }
}

// Scope chains can be cyclic (a closure stored in the scope it captures),
// so Debug stays shallow.
impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<env>")
    }
}
