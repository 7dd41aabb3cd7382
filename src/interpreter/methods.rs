//! Method dispatch on receiver values
//!
//! Lists and strings carry a fixed method set. On struct instances a field
//! holding a function doubles as a method, which is how the `http` object
//! exposes `get`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::diagnostics::Span;
use crate::interpreter::error::{raise, ErrorKind, Exec, RuntimeError, Signal};
use crate::interpreter::value::Value;
use crate::interpreter::Interpreter;

pub fn call_method(
    interp: &mut Interpreter,
    receiver: &Value,
    method: &str,
    args: Vec<Value>,
    span: &Span,
) -> Exec<Value> {
    match receiver {
        Value::List(elements) => list_method(interp, elements, method, args, span),
        Value::Str(s) => string_method(s, method, args, span),
        Value::Struct(instance) => {
            let field = {
                let inst = instance.borrow();
                inst.ty.field_index(method).map(|i| inst.values[i].clone())
            };
            match field {
                Some(callable @ (Value::Closure(_) | Value::Builtin(_))) => {
                    interp.call_value(&callable, args, span)
                }
                _ => {
                    let name = instance.borrow().ty.name.clone();
                    raise(
                        ErrorKind::UnknownMethod,
                        format!("no method `{}` on struct {}", method, name),
                        span,
                    )
                }
            }
        }
        other => raise(
            ErrorKind::UnknownMethod,
            format!("no method `{}` on {}", method, other.type_name()),
            span,
        ),
    }
}

/// Collect exactly N arguments or fail with an arity error
fn expect_args<const N: usize>(args: Vec<Value>, method: &str, span: &Span) -> Exec<[Value; N]> {
    let len = args.len();
    args.try_into().map_err(|_| {
        Signal::Error(RuntimeError::new(
            ErrorKind::ArityMismatch,
            format!("`{}` expects {} argument(s), got {}", method, N, len),
            span.clone(),
        ))
    })
}

fn list_method(
    interp: &mut Interpreter,
    elements: &Rc<RefCell<Vec<Value>>>,
    method: &str,
    args: Vec<Value>,
    span: &Span,
) -> Exec<Value> {
    match method {
        "len" => {
            expect_args::<0>(args, "len", span)?;
            Ok(Value::Number(elements.borrow().len() as f64))
        }
        "push" => {
            let [value] = expect_args::<1>(args, "push", span)?;
            elements.borrow_mut().push(value);
            Ok(Value::Unit)
        }
        "map" => {
            let [f] = expect_args::<1>(args, "map", span)?;
            // snapshot first so the callback can touch the list
            let items = elements.borrow().clone();
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(interp.call_value(&f, vec![item], span)?);
            }
            Ok(Value::list(out))
        }
        "filter" => {
            let [f] = expect_args::<1>(args, "filter", span)?;
            let items = elements.borrow().clone();
            let mut out = Vec::new();
            for item in items {
                if interp.call_value(&f, vec![item.clone()], span)?.is_truthy() {
                    out.push(item);
                }
            }
            Ok(Value::list(out))
        }
        "reduce" => {
            let [f, init] = expect_args::<2>(args, "reduce", span)?;
            let items = elements.borrow().clone();
            let mut acc = init;
            for item in items {
                acc = interp.call_value(&f, vec![acc, item], span)?;
            }
            Ok(acc)
        }
        _ => raise(
            ErrorKind::UnknownMethod,
            format!("no method `{}` on List", method),
            span,
        ),
    }
}

fn string_method(s: &Rc<str>, method: &str, args: Vec<Value>, span: &Span) -> Exec<Value> {
    match method {
        "len" => {
            expect_args::<0>(args, "len", span)?;
            Ok(Value::Number(s.chars().count() as f64))
        }
        "to_upper" => {
            expect_args::<0>(args, "to_upper", span)?;
            Ok(Value::str(s.to_uppercase()))
        }
        "to_lower" => {
            expect_args::<0>(args, "to_lower", span)?;
            Ok(Value::str(s.to_lowercase()))
        }
        _ => raise(
            ErrorKind::UnknownMethod,
            format!("no method `{}` on String", method),
            span,
        ),
    }
}
