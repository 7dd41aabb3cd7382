//! Runtime values
//!
//! Numbers are a single f64-backed type. Lists and struct instances are
//! reference values: cloning a `Value` aliases the same underlying storage,
//! so mutation through one binding is visible through every other.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::diagnostics::Span;
use crate::interpreter::environment::Env;
use crate::interpreter::error::Exec;
use crate::interpreter::Interpreter;
use crate::parser::ast::{Block, Expr, Param};

/// A runtime value
#[derive(Debug, Clone)]
pub enum Value {
    Unit,
    Number(f64),
    Str(Rc<str>),
    Bool(bool),
    List(Rc<RefCell<Vec<Value>>>),
    Struct(Rc<RefCell<StructInstance>>),
    /// A struct type, bound under its name by a `struct` definition
    StructType(Rc<StructType>),
    Closure(Rc<Closure>),
    Builtin(Rc<Builtin>),
    /// `Ok(v)` result value
    Ok(Rc<Value>),
    /// `Err(v)` result value
    Err(Rc<Value>),
    /// A deferred computation produced by an async call or block
    Pending(Rc<RefCell<PendingAsync>>),
}

/// A user-defined struct type
#[derive(Debug)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<StructFieldSpec>,
}

/// One field slot of a struct type
#[derive(Debug)]
pub struct StructFieldSpec {
    pub name: String,
    pub mutable: bool,
    pub default: Option<Expr>,
}

impl StructType {
    /// Index of a field by name
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// An instance of a struct type; `values` is parallel to `ty.fields`
#[derive(Debug)]
pub struct StructInstance {
    pub ty: Rc<StructType>,
    pub values: Vec<Value>,
}

/// A user-defined function or lambda with its captured environment
pub struct Closure {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: Block,
    pub env: Env,
    pub is_async: bool,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.name)
            .field("params", &self.params.len())
            .field("is_async", &self.is_async)
            .finish()
    }
}

/// A host-provided function
pub struct Builtin {
    pub name: &'static str,
    /// Required argument count; `None` means variadic
    pub arity: Option<usize>,
    pub func: fn(&mut Interpreter, &[Value], &Span) -> Exec<Value>,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// State of a deferred async computation
#[derive(Debug)]
pub enum PendingAsync {
    /// Not yet forced: the body and the environment it closed over
    Body { body: Block, env: Env },
    /// Forced (or created pre-resolved); `await` returns this value
    Resolved(Value),
}

impl Value {
    pub fn str(s: impl AsRef<str>) -> Value {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub fn list(elements: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(elements)))
    }

    /// Runtime type name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "Unit",
            Value::Number(_) => "Number",
            Value::Str(_) => "String",
            Value::Bool(_) => "Bool",
            Value::List(_) => "List",
            Value::Struct(_) => "Struct",
            Value::StructType(_) => "StructType",
            Value::Closure(_) => "Function",
            Value::Builtin(_) => "Function",
            Value::Ok(_) | Value::Err(_) => "Result",
            Value::Pending(_) => "Pending",
        }
    }

    /// Truthiness: `Unit` and `false` are falsy, everything else is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Unit | Value::Bool(false))
    }
}

/// Structural equality. Lists and structs compare element-wise; functions
/// and pending computations compare by identity.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Unit, Value::Unit) => true,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            let x = x.borrow();
            let y = y.borrow();
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| values_equal(a, b))
        }
        (Value::Struct(x), Value::Struct(y)) => {
            let x = x.borrow();
            let y = y.borrow();
            x.ty.name == y.ty.name
                && x.values.len() == y.values.len()
                && x.values
                    .iter()
                    .zip(y.values.iter())
                    .all(|(a, b)| values_equal(a, b))
        }
        (Value::Ok(x), Value::Ok(y)) | (Value::Err(x), Value::Err(y)) => values_equal(x, y),
        (Value::Closure(x), Value::Closure(y)) => Rc::ptr_eq(x, y),
        (Value::Builtin(x), Value::Builtin(y)) => Rc::ptr_eq(x, y),
        (Value::Pending(x), Value::Pending(y)) => Rc::ptr_eq(x, y),
        (Value::StructType(x), Value::StructType(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// Format a number the way the language prints it: integral values drop
/// the decimal point (`42`, not `42.0`)
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::Struct(instance) => {
                let instance = instance.borrow();
                write!(f, "{} {{ ", instance.ty.name)?;
                for (i, (spec, value)) in
                    instance.ty.fields.iter().zip(&instance.values).enumerate()
                {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", spec.name, value)?;
                }
                write!(f, " }}")
            }
            Value::StructType(ty) => write!(f, "<struct {}>", ty.name),
            Value::Closure(c) => match &c.name {
                Some(name) => write!(f, "<fn {}>", name),
                None => write!(f, "<fn>"),
            },
            Value::Builtin(b) => write!(f, "<builtin {}>", b.name),
            Value::Ok(v) => write!(f, "Ok({})", v),
            Value::Err(v) => write!(f, "Err({})", v),
            Value::Pending(_) => write!(f, "<pending>"),
        }
    }
}
