//! Built-in functions installed into the global environment

use std::cell::RefCell;
use std::rc::Rc;

use crate::diagnostics::Span;
use crate::interpreter::environment::Env;
use crate::interpreter::error::{raise, ErrorKind, Exec};
use crate::interpreter::value::{
    Builtin, PendingAsync, StructFieldSpec, StructInstance, StructType, Value,
};
use crate::interpreter::Interpreter;

fn builtin(
    name: &'static str,
    arity: Option<usize>,
    func: fn(&mut Interpreter, &[Value], &Span) -> Exec<Value>,
) -> Value {
    Value::Builtin(Rc::new(Builtin { name, arity, func }))
}

/// Install the standard built-ins into an environment
pub fn install(env: &Env) {
    env.define("print", builtin("print", None, builtin_print), false);
    env.define("input", builtin("input", None, builtin_input), false);
    env.define("len", builtin("len", Some(1), builtin_len), false);
    env.define("abs", builtin("abs", Some(1), builtin_abs), false);
    env.define("sqrt", builtin("sqrt", Some(1), builtin_sqrt), false);
    env.define("floor", builtin("floor", Some(1), builtin_floor), false);
    env.define("round", builtin("round", Some(1), builtin_round), false);
    env.define("min", builtin("min", Some(2), builtin_min), false);
    env.define("max", builtin("max", Some(2), builtin_max), false);
    env.define("pow", builtin("pow", Some(2), builtin_pow), false);
    env.define("http", http_object(), false);
}

fn builtin_print(interp: &mut Interpreter, args: &[Value], _span: &Span) -> Exec<Value> {
    let line = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    interp.console().print(&line);
    Ok(Value::Unit)
}

fn builtin_input(interp: &mut Interpreter, args: &[Value], span: &Span) -> Exec<Value> {
    if args.len() > 1 {
        return raise(
            ErrorKind::ArityMismatch,
            format!("`input` expects at most 1 argument, got {}", args.len()),
            span,
        );
    }
    if let Some(prompt) = args.first() {
        interp.console().print(&prompt.to_string());
    }
    Ok(Value::str(interp.console().read_line()))
}

fn builtin_len(_interp: &mut Interpreter, args: &[Value], span: &Span) -> Exec<Value> {
    match args.first() {
        Some(Value::List(elements)) => Ok(Value::Number(elements.borrow().len() as f64)),
        Some(Value::Str(s)) => Ok(Value::Number(s.chars().count() as f64)),
        Some(other) => raise(
            ErrorKind::TypeMismatch,
            format!("`len` expects a List or String, got {}", other.type_name()),
            span,
        ),
        None => raise(ErrorKind::ArityMismatch, "`len` expects 1 argument", span),
    }
}

fn number_arg(args: &[Value], i: usize, name: &str, span: &Span) -> Exec<f64> {
    match args.get(i) {
        Some(Value::Number(n)) => Ok(*n),
        Some(other) => raise(
            ErrorKind::TypeMismatch,
            format!("`{}` expects a Number, got {}", name, other.type_name()),
            span,
        ),
        None => raise(
            ErrorKind::ArityMismatch,
            format!("`{}` is missing argument {}", name, i + 1),
            span,
        ),
    }
}

fn builtin_abs(_interp: &mut Interpreter, args: &[Value], span: &Span) -> Exec<Value> {
    Ok(Value::Number(number_arg(args, 0, "abs", span)?.abs()))
}

fn builtin_sqrt(_interp: &mut Interpreter, args: &[Value], span: &Span) -> Exec<Value> {
    Ok(Value::Number(number_arg(args, 0, "sqrt", span)?.sqrt()))
}

fn builtin_floor(_interp: &mut Interpreter, args: &[Value], span: &Span) -> Exec<Value> {
    Ok(Value::Number(number_arg(args, 0, "floor", span)?.floor()))
}

fn builtin_round(_interp: &mut Interpreter, args: &[Value], span: &Span) -> Exec<Value> {
    Ok(Value::Number(number_arg(args, 0, "round", span)?.round()))
}

fn builtin_min(_interp: &mut Interpreter, args: &[Value], span: &Span) -> Exec<Value> {
    let a = number_arg(args, 0, "min", span)?;
    let b = number_arg(args, 1, "min", span)?;
    Ok(Value::Number(a.min(b)))
}

fn builtin_max(_interp: &mut Interpreter, args: &[Value], span: &Span) -> Exec<Value> {
    let a = number_arg(args, 0, "max", span)?;
    let b = number_arg(args, 1, "max", span)?;
    Ok(Value::Number(a.max(b)))
}

fn builtin_pow(_interp: &mut Interpreter, args: &[Value], span: &Span) -> Exec<Value> {
    let base = number_arg(args, 0, "pow", span)?;
    let exp = number_arg(args, 1, "pow", span)?;
    Ok(Value::Number(base.powf(exp)))
}

/// The `http` namespace: a struct whose `get` field is a function
/// returning an already-resolved pending Response
fn http_object() -> Value {
    let ty = Rc::new(StructType {
        name: "Http".to_string(),
        fields: vec![StructFieldSpec {
            name: "get".to_string(),
            mutable: false,
            default: None,
        }],
    });
    let get = builtin("get", Some(1), builtin_http_get);
    Value::Struct(Rc::new(RefCell::new(StructInstance {
        ty,
        values: vec![get],
    })))
}

/// Canned fetch: no real network traffic, the Response resolves immediately
/// with status 200 and an empty body
fn builtin_http_get(_interp: &mut Interpreter, args: &[Value], span: &Span) -> Exec<Value> {
    let url = match args.first() {
        Some(Value::Str(s)) => s.clone(),
        Some(other) => {
            return raise(
                ErrorKind::TypeMismatch,
                format!("`http.get` expects a String url, got {}", other.type_name()),
                span,
            )
        }
        None => return raise(ErrorKind::ArityMismatch, "`http.get` expects 1 argument", span),
    };

    let ty = Rc::new(StructType {
        name: "Response".to_string(),
        fields: vec![
            StructFieldSpec {
                name: "status".to_string(),
                mutable: false,
                default: None,
            },
            StructFieldSpec {
                name: "url".to_string(),
                mutable: false,
                default: None,
            },
            StructFieldSpec {
                name: "body".to_string(),
                mutable: false,
                default: None,
            },
        ],
    });
    let response = Value::Struct(Rc::new(RefCell::new(StructInstance {
        ty,
        values: vec![Value::Number(200.0), Value::Str(url), Value::str("")],
    })));
    Ok(Value::Pending(Rc::new(RefCell::new(
        PendingAsync::Resolved(response),
    ))))
}
