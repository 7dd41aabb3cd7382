//! Tree-walking evaluator for NooCrush
//!
//! The interpreter walks the AST directly, threading a scope chain through
//! every block. Control flow (`return`, `break`, `continue`) travels on the
//! error channel as `Signal`s and is intercepted by the constructs that own
//! it; async values are plain deferred bodies forced synchronously by
//! `await`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::diagnostics::Span;
use crate::parser::ast::{
    AssignTarget, BinaryOp, Block, Expr, Program, Stmt, TemplatePart, UnaryOp,
};

pub mod builtins;
pub mod environment;
pub mod error;
pub mod methods;
pub mod pattern;
pub mod value;


pub use environment::Env;
pub use error::{ErrorKind, Exec, RuntimeError, Signal};
pub use value::Value;

use environment::AssignError;
use error::raise;
use pattern::match_pattern;
use value::{
    format_number, values_equal, Closure, PendingAsync, StructFieldSpec, StructInstance,
    StructType,
};

/// Host output and input sink. Programs print through this so embedders and
/// tests can capture output.
pub trait Console {
    fn print(&mut self, line: &str);
    fn read_line(&mut self) -> String;
}

/// Console backed by stdout/stdin
pub struct StdConsole;

impl Console for StdConsole {
    fn print(&mut self, line: &str) {
        println!("{}", line);
    }

    fn read_line(&mut self) -> String {
        let mut buf = String::new();
        let _ = std::io::stdin().read_line(&mut buf);
        buf.trim_end_matches(['\n', '\r']).to_string()
    }
}

/// The NooCrush interpreter
pub struct Interpreter {
    globals: Env,
    console: Box<dyn Console>,
}

impl Interpreter {
    /// Create an interpreter with the standard built-ins installed
    pub fn new(console: Box<dyn Console>) -> Self {
        let globals = Env::new();
        builtins::install(&globals);
        Self { globals, console }
    }

    pub fn console(&mut self) -> &mut dyn Console {
        self.console.as_mut()
    }

    /// Evaluate a whole program. Top-level statements run in order in the
    /// global scope; if the program defines `main`, it is then invoked with
    /// no arguments (awaited if async) and its result becomes the program
    /// result. Otherwise the result is the value of the last statement.
    pub fn run(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        let env = self.globals.clone();
        let mut last = Value::Unit;
        for stmt in &program.stmts {
            last = self
                .eval_stmt(stmt, &env)
                .map_err(Signal::into_runtime_error)?;
        }

        if let Some(Value::Closure(main)) = env.lookup("main") {
            let span = main.body.span.clone();
            let result = self
                .call_value(&Value::Closure(main), Vec::new(), &span)
                .map_err(Signal::into_runtime_error)?;
            last = self.force(result).map_err(Signal::into_runtime_error)?;
        }

        Ok(last)
    }

    // Statements

    fn eval_stmt(&mut self, stmt: &Stmt, env: &Env) -> Exec<Value> {
        match stmt {
            Stmt::Let {
                name,
                mutable,
                value,
                ..
            } => {
                let v = self.eval_expr(value, env)?;
                env.define(name.clone(), v, *mutable);
                Ok(Value::Unit)
            }
            Stmt::Const { name, value, .. } => {
                let v = self.eval_expr(value, env)?;
                env.define(name.clone(), v, false);
                Ok(Value::Unit)
            }
            Stmt::StructDef(def) => {
                let ty = StructType {
                    name: def.name.clone(),
                    fields: def
                        .fields
                        .iter()
                        .map(|f| StructFieldSpec {
                            name: f.name.clone(),
                            mutable: f.mutable,
                            default: f.default.clone(),
                        })
                        .collect(),
                };
                env.define(def.name.clone(), Value::StructType(Rc::new(ty)), false);
                Ok(Value::Unit)
            }
            Stmt::FnDef(def) => {
                let closure = Closure {
                    name: Some(def.name.clone()),
                    params: def.params.clone(),
                    body: def.body.clone(),
                    env: env.clone(),
                    is_async: def.is_async,
                };
                env.define(def.name.clone(), Value::Closure(Rc::new(closure)), false);
                Ok(Value::Unit)
            }
            Stmt::Assign { target, value, .. } => {
                let v = self.eval_expr(value, env)?;
                match target {
                    AssignTarget::Name { name, span } => match env.assign(name, v) {
                        Ok(()) => Ok(Value::Unit),
                        Err(AssignError::Unknown) => raise(
                            ErrorKind::UnknownIdentifier,
                            format!("cannot assign to unknown identifier `{}`", name),
                            span,
                        ),
                        Err(AssignError::Immutable) => raise(
                            ErrorKind::ImmutableAssignment,
                            format!("cannot assign to immutable binding `{}`", name),
                            span,
                        ),
                    },
                    AssignTarget::Field {
                        object,
                        field,
                        span,
                    } => {
                        let obj = self.eval_expr(object, env)?;
                        self.assign_field(&obj, field, v, span)
                    }
                }
            }
            Stmt::Expr { expr, .. } => self.eval_expr(expr, env),
            Stmt::Return { value, .. } => {
                let v = match value {
                    Some(e) => self.eval_expr(e, env)?,
                    None => Value::Unit,
                };
                Err(Signal::Return(v))
            }
            Stmt::Break { span } => Err(Signal::Break(span.clone())),
            Stmt::Continue { span } => Err(Signal::Continue(span.clone())),
            Stmt::For {
                binding,
                iterable,
                body,
                ..
            } => {
                let source = self.eval_expr(iterable, env)?;
                let items = self.iterate(&source, iterable.span())?;
                for item in items {
                    let scope = env.child();
                    scope.define(binding.clone(), item, false);
                    if !self.run_loop_body(body, &scope)? {
                        break;
                    }
                }
                Ok(Value::Unit)
            }
            Stmt::While { cond, body, .. } => {
                while self.eval_expr(cond, env)?.is_truthy() {
                    if !self.run_loop_body(body, env)? {
                        break;
                    }
                }
                Ok(Value::Unit)
            }
            Stmt::Loop { body, .. } => {
                loop {
                    if !self.run_loop_body(body, env)? {
                        break;
                    }
                }
                Ok(Value::Unit)
            }
        }
    }

    /// Run one loop iteration, absorbing `break`/`continue`.
    /// Returns `Ok(false)` when the loop should stop.
    fn run_loop_body(&mut self, body: &Block, env: &Env) -> Exec<bool> {
        match self.eval_block(body, env) {
            Ok(_) => Ok(true),
            Err(Signal::Continue(_)) => Ok(true),
            Err(Signal::Break(_)) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Evaluate a block in a fresh child scope. The trailing expression
    /// (if present) is the block's value.
    fn eval_block(&mut self, block: &Block, env: &Env) -> Exec<Value> {
        let scope = env.child();
        for stmt in &block.stmts {
            self.eval_stmt(stmt, &scope)?;
        }
        match &block.expr {
            Some(e) => self.eval_expr(e, &scope),
            None => Ok(Value::Unit),
        }
    }

    // Expressions

    fn eval_expr(&mut self, expr: &Expr, env: &Env) -> Exec<Value> {
        match expr {
            Expr::Number { value, .. } => Ok(Value::Number(*value)),
            Expr::Str { value, .. } => Ok(Value::str(value)),
            Expr::Bool { value, .. } => Ok(Value::Bool(*value)),

            Expr::Template { parts, .. } => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Text { value } => out.push_str(value),
                        TemplatePart::Expr { expr } => {
                            let v = self.eval_expr(expr, env)?;
                            out.push_str(&v.to_string());
                        }
                    }
                }
                Ok(Value::str(out))
            }

            Expr::Ident { name, span } => match env.lookup(name) {
                Some(v) => Ok(v),
                None => raise(
                    ErrorKind::UnknownIdentifier,
                    format!("unknown identifier `{}`", name),
                    span,
                ),
            },

            Expr::List { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element, env)?);
                }
                Ok(Value::list(values))
            }

            Expr::ListComprehension {
                output,
                binding,
                iterable,
                filter,
                ..
            } => {
                let source = self.eval_expr(iterable, env)?;
                let items = self.iterate(&source, iterable.span())?;
                let mut out = Vec::new();
                for item in items {
                    let scope = env.child();
                    scope.define(binding.clone(), item, false);
                    if let Some(filter) = filter {
                        if !self.eval_expr(filter, &scope)?.is_truthy() {
                            continue;
                        }
                    }
                    out.push(self.eval_expr(output, &scope)?);
                }
                Ok(Value::list(out))
            }

            Expr::Range {
                start,
                end,
                inclusive,
                span,
            } => {
                let start_v = self.eval_expr(start, env)?;
                let end_v = self.eval_expr(end, env)?;
                match (start_v, end_v) {
                    (Value::Number(a), Value::Number(b)) => {
                        let mut items = Vec::new();
                        let mut i = a;
                        while if *inclusive { i <= b } else { i < b } {
                            items.push(Value::Number(i));
                            i += 1.0;
                        }
                        Ok(Value::list(items))
                    }
                    (a, b) => raise(
                        ErrorKind::TypeMismatch,
                        format!(
                            "range bounds must be Numbers, got {} and {}",
                            a.type_name(),
                            b.type_name()
                        ),
                        span,
                    ),
                }
            }

            Expr::StructLiteral { name, fields, span } => {
                self.eval_struct_literal(name, fields, span, env)
            }

            Expr::FieldAccess {
                object,
                field,
                span,
            } => {
                let obj = self.eval_expr(object, env)?;
                self.access_field(&obj, field, span)
            }

            Expr::Index {
                object,
                index,
                span,
            } => {
                let obj = self.eval_expr(object, env)?;
                let idx = self.eval_expr(index, env)?;
                self.index_value(&obj, &idx, span)
            }

            Expr::Call { callee, args, span } => {
                let callee_v = self.eval_expr(callee, env)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval_expr(arg, env)?);
                }
                self.call_value(&callee_v, arg_values, span)
            }

            Expr::MethodCall {
                receiver,
                method,
                args,
                span,
            } => {
                let recv = self.eval_expr(receiver, env)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval_expr(arg, env)?);
                }
                methods::call_method(self, &recv, method, arg_values, span)
            }

            Expr::Binary {
                op,
                left,
                right,
                span,
            } => match op {
                // Short-circuit operators yield the deciding operand
                BinaryOp::And => {
                    let l = self.eval_expr(left, env)?;
                    if !l.is_truthy() {
                        Ok(l)
                    } else {
                        self.eval_expr(right, env)
                    }
                }
                BinaryOp::Or => {
                    let l = self.eval_expr(left, env)?;
                    if l.is_truthy() {
                        Ok(l)
                    } else {
                        self.eval_expr(right, env)
                    }
                }
                _ => {
                    let l = self.eval_expr(left, env)?;
                    let r = self.eval_expr(right, env)?;
                    self.binary_op(*op, l, r, span)
                }
            },

            Expr::Unary { op, operand, span } => {
                let v = self.eval_expr(operand, env)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!v.is_truthy())),
                    UnaryOp::Neg => match v {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => raise(
                            ErrorKind::TypeMismatch,
                            format!("cannot negate {}", other.type_name()),
                            span,
                        ),
                    },
                }
            }

            Expr::If {
                branches,
                else_block,
                ..
            } => {
                for (cond, block) in branches {
                    if self.eval_expr(cond, env)?.is_truthy() {
                        return self.eval_block(block, env);
                    }
                }
                match else_block {
                    Some(block) => self.eval_block(block, env),
                    None => Ok(Value::Unit),
                }
            }

            Expr::Match {
                subject,
                arms,
                span,
            } => {
                let subject_v = self.eval_expr(subject, env)?;
                for arm in arms {
                    if let Some(bindings) = match_pattern(&arm.pattern, &subject_v) {
                        let scope = env.child();
                        for (name, value) in bindings {
                            scope.define(name, value, false);
                        }
                        if let Some(guard) = &arm.guard {
                            if !self.eval_expr(guard, &scope)?.is_truthy() {
                                continue;
                            }
                        }
                        return self.eval_expr(&arm.body, &scope);
                    }
                }
                raise(
                    ErrorKind::MatchExhaustion,
                    format!("no arm matched value `{}`", subject_v),
                    span,
                )
            }

            Expr::Lambda {
                params,
                body,
                is_async,
                ..
            } => Ok(Value::Closure(Rc::new(Closure {
                name: None,
                params: params.clone(),
                body: body.clone(),
                env: env.clone(),
                is_async: *is_async,
            }))),

            Expr::Block { block, .. } => self.eval_block(block, env),

            Expr::AsyncBlock { body, .. } => {
                Ok(Value::Pending(Rc::new(RefCell::new(PendingAsync::Body {
                    body: body.clone(),
                    env: env.clone(),
                }))))
            }

            Expr::Await { inner, .. } => {
                let v = self.eval_expr(inner, env)?;
                self.force(v)
            }

            Expr::OkCtor { inner, .. } => {
                Ok(Value::Ok(Rc::new(self.eval_expr(inner, env)?)))
            }
            Expr::ErrCtor { inner, .. } => {
                Ok(Value::Err(Rc::new(self.eval_expr(inner, env)?)))
            }
        }
    }

    // Calls

    /// Call any callable value. Calling an async function defers the bound
    /// body instead of running it.
    pub fn call_value(&mut self, callee: &Value, args: Vec<Value>, span: &Span) -> Exec<Value> {
        match callee {
            Value::Closure(closure) => {
                if closure.is_async {
                    let env = self.bind_params(closure, args, span)?;
                    Ok(Value::Pending(Rc::new(RefCell::new(PendingAsync::Body {
                        body: closure.body.clone(),
                        env,
                    }))))
                } else {
                    self.call_closure(closure, args, span)
                }
            }
            Value::Builtin(builtin) => {
                if let Some(arity) = builtin.arity {
                    if args.len() != arity {
                        return raise(
                            ErrorKind::ArityMismatch,
                            format!(
                                "`{}` expects {} argument(s), got {}",
                                builtin.name,
                                arity,
                                args.len()
                            ),
                            span,
                        );
                    }
                }
                (builtin.func)(self, &args, span)
            }
            other => raise(
                ErrorKind::NotCallable,
                format!("value of type {} is not callable", other.type_name()),
                span,
            ),
        }
    }

    fn call_closure(&mut self, closure: &Closure, args: Vec<Value>, span: &Span) -> Exec<Value> {
        let env = self.bind_params(closure, args, span)?;
        match self.eval_block(&closure.body, &env) {
            Ok(v) => Ok(v),
            Err(Signal::Return(v)) => Ok(v),
            Err(other) => Err(other),
        }
    }

    fn bind_params(&self, closure: &Closure, args: Vec<Value>, span: &Span) -> Exec<Env> {
        if args.len() != closure.params.len() {
            let name = closure.name.as_deref().unwrap_or("<lambda>");
            return raise(
                ErrorKind::ArityMismatch,
                format!(
                    "`{}` expects {} argument(s), got {}",
                    name,
                    closure.params.len(),
                    args.len()
                ),
                span,
            );
        }
        let env = closure.env.child();
        for (param, arg) in closure.params.iter().zip(args) {
            env.define(param.name.clone(), arg, false);
        }
        Ok(env)
    }

    /// Force a pending computation to its value; any other value passes
    /// through unchanged. Forcing is memoized: the body runs at most once.
    pub fn force(&mut self, value: Value) -> Exec<Value> {
        let Value::Pending(cell) = value else {
            return Ok(value);
        };

        let (body, env) = {
            let state = cell.borrow();
            match &*state {
                PendingAsync::Resolved(v) => return Ok(v.clone()),
                PendingAsync::Body { body, env } => (body.clone(), env.clone()),
            }
        };

        let result = match self.eval_block(&body, &env) {
            Ok(v) => v,
            Err(Signal::Return(v)) => v,
            Err(other) => return Err(other),
        };
        *cell.borrow_mut() = PendingAsync::Resolved(result.clone());
        Ok(result)
    }

    // Operators

    fn binary_op(&mut self, op: BinaryOp, left: Value, right: Value, span: &Span) -> Exec<Value> {
        use BinaryOp::*;
        match op {
            Add => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::str(format!("{}{}", a, b))),
                (Value::List(a), Value::List(b)) => {
                    let mut out = a.borrow().clone();
                    out.extend(b.borrow().iter().cloned());
                    Ok(Value::list(out))
                }
                _ => op_type_mismatch("+", &left, &right, span),
            },
            Sub | Mul | Div | Mod => {
                let (Value::Number(a), Value::Number(b)) = (&left, &right) else {
                    return op_type_mismatch(op_symbol(op), &left, &right, span);
                };
                match op {
                    Sub => Ok(Value::Number(a - b)),
                    Mul => Ok(Value::Number(a * b)),
                    Div => {
                        if *b == 0.0 {
                            raise(ErrorKind::DivisionByZero, "division by zero", span)
                        } else {
                            Ok(Value::Number(a / b))
                        }
                    }
                    Mod => {
                        if *b == 0.0 {
                            raise(ErrorKind::DivisionByZero, "modulo by zero", span)
                        } else {
                            Ok(Value::Number(a % b))
                        }
                    }
                    _ => unreachable!(),
                }
            }
            Eq => Ok(Value::Bool(values_equal(&left, &right))),
            Ne => Ok(Value::Bool(!values_equal(&left, &right))),
            Lt | Le | Gt | Ge => {
                let ordering = match (&left, &right) {
                    (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                    (Value::Str(a), Value::Str(b)) => Some(a.as_ref().cmp(b.as_ref())),
                    _ => return op_type_mismatch(op_symbol(op), &left, &right, span),
                };
                let result = match ordering {
                    // NaN comparisons are false
                    None => false,
                    Some(o) => match op {
                        Lt => o.is_lt(),
                        Le => o.is_le(),
                        Gt => o.is_gt(),
                        Ge => o.is_ge(),
                        _ => unreachable!(),
                    },
                };
                Ok(Value::Bool(result))
            }
            And | Or => unreachable!("short-circuit operators are handled before evaluation"),
        }
    }

    fn index_value(&mut self, obj: &Value, idx: &Value, span: &Span) -> Exec<Value> {
        match (obj, idx) {
            (Value::List(elements), Value::Number(n)) => {
                let elements = elements.borrow();
                let i = resolve_index(*n, elements.len()).ok_or_else(|| {
                    Signal::Error(RuntimeError::new(
                        ErrorKind::IndexOutOfBounds,
                        format!(
                            "index {} out of bounds for list of length {}",
                            format_number(*n),
                            elements.len()
                        ),
                        span.clone(),
                    ))
                })?;
                Ok(elements[i].clone())
            }
            (Value::Str(s), Value::Number(n)) => {
                let chars: Vec<char> = s.chars().collect();
                let i = resolve_index(*n, chars.len()).ok_or_else(|| {
                    Signal::Error(RuntimeError::new(
                        ErrorKind::IndexOutOfBounds,
                        format!(
                            "index {} out of bounds for string of length {}",
                            format_number(*n),
                            chars.len()
                        ),
                        span.clone(),
                    ))
                })?;
                Ok(Value::str(chars[i].to_string()))
            }
            (obj, idx) => raise(
                ErrorKind::TypeMismatch,
                format!(
                    "cannot index {} with {}",
                    obj.type_name(),
                    idx.type_name()
                ),
                span,
            ),
        }
    }

    // Structs

    fn eval_struct_literal(
        &mut self,
        name: &str,
        fields: &[(String, Expr)],
        span: &Span,
        env: &Env,
    ) -> Exec<Value> {
        let ty = match env.lookup(name) {
            Some(Value::StructType(ty)) => ty,
            Some(other) => {
                return raise(
                    ErrorKind::StructError,
                    format!("`{}` is not a struct type (found {})", name, other.type_name()),
                    span,
                )
            }
            None => {
                return raise(
                    ErrorKind::UnknownIdentifier,
                    format!("unknown struct type `{}`", name),
                    span,
                )
            }
        };

        for (i, (field_name, _)) in fields.iter().enumerate() {
            if ty.field_index(field_name).is_none() {
                return raise(
                    ErrorKind::StructError,
                    format!("struct {} has no field `{}`", ty.name, field_name),
                    span,
                );
            }
            if fields[..i].iter().any(|(n, _)| n == field_name) {
                return raise(
                    ErrorKind::StructError,
                    format!("duplicate field `{}` in literal of struct {}", field_name, ty.name),
                    span,
                );
            }
        }

        // Field expressions run in the order written in the literal, then the
        // slots are laid out in declaration order.
        let mut provided = Vec::with_capacity(fields.len());
        for (field_name, expr) in fields {
            provided.push((field_name.as_str(), self.eval_expr(expr, env)?));
        }

        let mut values = Vec::with_capacity(ty.fields.len());
        for spec in &ty.fields {
            let given = provided.iter().find(|(n, _)| *n == spec.name);
            let value = match (given, &spec.default) {
                (Some((_, value)), _) => value.clone(),
                (None, Some(default)) => self.eval_expr(default, env)?,
                (None, None) => {
                    return raise(
                        ErrorKind::StructError,
                        format!("missing field `{}` in literal of struct {}", spec.name, ty.name),
                        span,
                    )
                }
            };
            values.push(value);
        }

        Ok(Value::Struct(Rc::new(RefCell::new(StructInstance {
            ty,
            values,
        }))))
    }

    fn access_field(&mut self, obj: &Value, field: &str, span: &Span) -> Exec<Value> {
        match obj {
            Value::Struct(instance) => {
                let instance = instance.borrow();
                match instance.ty.field_index(field) {
                    Some(i) => Ok(instance.values[i].clone()),
                    None => raise(
                        ErrorKind::UnknownField,
                        format!("struct {} has no field `{}`", instance.ty.name, field),
                        span,
                    ),
                }
            }
            other => raise(
                ErrorKind::TypeMismatch,
                format!("cannot access field `{}` on {}", field, other.type_name()),
                span,
            ),
        }
    }

    fn assign_field(&mut self, obj: &Value, field: &str, value: Value, span: &Span) -> Exec<Value> {
        let Value::Struct(instance) = obj else {
            return raise(
                ErrorKind::TypeMismatch,
                format!("cannot assign field `{}` on {}", field, obj.type_name()),
                span,
            );
        };
        let mut instance = instance.borrow_mut();
        let Some(i) = instance.ty.field_index(field) else {
            return raise(
                ErrorKind::UnknownField,
                format!("struct {} has no field `{}`", instance.ty.name, field),
                span,
            );
        };
        if !instance.ty.fields[i].mutable {
            return raise(
                ErrorKind::ImmutableAssignment,
                format!(
                    "field `{}` of struct {} is immutable",
                    field, instance.ty.name
                ),
                span,
            );
        }
        instance.values[i] = value;
        Ok(Value::Unit)
    }

    /// Materialize the items a `for` loop or comprehension walks over
    fn iterate(&mut self, value: &Value, span: &Span) -> Exec<Vec<Value>> {
        match value {
            Value::List(elements) => Ok(elements.borrow().clone()),
            Value::Str(s) => Ok(s.chars().map(|c| Value::str(c.to_string())).collect()),
            other => raise(
                ErrorKind::TypeMismatch,
                format!("cannot iterate over {}", other.type_name()),
                span,
            ),
        }
    }
}

/// Resolve a (possibly negative) index against a length
fn resolve_index(n: f64, len: usize) -> Option<usize> {
    if n.fract() != 0.0 {
        return None;
    }
    let mut i = n as i64;
    if i < 0 {
        i += len as i64;
    }
    if i < 0 || i >= len as i64 {
        return None;
    }
    Some(i as usize)
}

fn op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

fn op_type_mismatch(symbol: &str, left: &Value, right: &Value, span: &Span) -> Exec<Value> {
    raise(
        ErrorKind::TypeMismatch,
        format!(
            "cannot apply `{}` to {} and {}",
            symbol,
            left.type_name(),
            right.type_name()
        ),
        span,
    )
}
