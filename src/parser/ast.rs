//! Abstract syntax tree for NooCrush
//!
//! Every node carries its source span so runtime diagnostics can point back
//! at the originating code. The tree is produced once by the parser, owned
//! top-down, and never mutated afterwards.

use crate::diagnostics::Span;
use serde::{Deserialize, Serialize};

/// A complete program: an ordered sequence of top-level statements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

/// A block of statements with an optional trailing expression.
/// The trailing expression (no semicolon) is the block's value;
/// without one the block yields Unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub span: Span,
    pub stmts: Vec<Stmt>,
    pub expr: Option<Box<Expr>>,
}

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stmt {
    /// `let` / `let mut` binding
    Let {
        span: Span,
        name: String,
        ty: Option<String>,
        mutable: bool,
        value: Box<Expr>,
    },
    /// `const` binding (always immutable)
    Const {
        span: Span,
        name: String,
        ty: Option<String>,
        value: Box<Expr>,
    },
    /// Struct type definition
    StructDef(StructDef),
    /// Named function definition
    FnDef(FnDef),
    /// Assignment to an identifier or a field path
    Assign {
        span: Span,
        target: AssignTarget,
        value: Box<Expr>,
    },
    /// Expression statement
    Expr { span: Span, expr: Box<Expr> },
    /// Return statement
    Return {
        span: Span,
        value: Option<Box<Expr>>,
    },
    /// Break out of the nearest loop
    Break { span: Span },
    /// Continue the nearest loop
    Continue { span: Span },
    /// `for <binding> in <iterable> { ... }`
    For {
        span: Span,
        binding: String,
        iterable: Box<Expr>,
        body: Block,
    },
    /// `while <cond> { ... }`
    While {
        span: Span,
        cond: Box<Expr>,
        body: Block,
    },
    /// `loop { ... }`
    Loop { span: Span, body: Block },
}

/// Assignment target: a bare name or a field-access path rooted at an
/// arbitrary expression (`point.x`, `get_point().x`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AssignTarget {
    Name { span: Span, name: String },
    Field {
        span: Span,
        object: Box<Expr>,
        field: String,
    },
}

/// Struct type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDef {
    pub span: Span,
    pub name: String,
    pub fields: Vec<FieldDef>,
}

/// A field in a struct definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub span: Span,
    pub name: String,
    pub ty: Option<String>,
    pub mutable: bool,
    pub default: Option<Expr>,
}

/// Named function definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FnDef {
    pub span: Span,
    pub name: String,
    pub params: Vec<Param>,
    pub return_ty: Option<String>,
    pub body: Block,
    pub is_async: bool,
}

/// Function parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub span: Span,
    pub name: String,
    pub ty: Option<String>,
}

/// One piece of a template string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TemplatePart {
    Text { value: String },
    Expr { expr: Box<Expr> },
}

/// Expression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    // Literals
    Number { span: Span, value: f64 },
    Str { span: Span, value: String },
    Bool { span: Span, value: bool },
    Template { span: Span, parts: Vec<TemplatePart> },

    /// Identifier reference
    Ident { span: Span, name: String },

    /// List literal
    List { span: Span, elements: Vec<Expr> },

    /// `[output for binding in iterable if filter]`
    ListComprehension {
        span: Span,
        output: Box<Expr>,
        binding: String,
        iterable: Box<Expr>,
        filter: Option<Box<Expr>>,
    },

    /// `start..end` / `start..=end`
    Range {
        span: Span,
        start: Box<Expr>,
        end: Box<Expr>,
        inclusive: bool,
    },

    /// `Name { field: expr, ... }`
    StructLiteral {
        span: Span,
        name: String,
        fields: Vec<(String, Expr)>,
    },

    /// `expr.field`
    FieldAccess {
        span: Span,
        object: Box<Expr>,
        field: String,
    },

    /// `expr[index]`
    Index {
        span: Span,
        object: Box<Expr>,
        index: Box<Expr>,
    },

    /// `callee(args...)`
    Call {
        span: Span,
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// `expr.method(args...)`
    MethodCall {
        span: Span,
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },

    Binary {
        span: Span,
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        span: Span,
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// `if`/`else if` chain with optional final `else`
    If {
        span: Span,
        branches: Vec<(Expr, Block)>,
        else_block: Option<Block>,
    },

    /// `match subject { pattern (if guard)? => body, ... }`
    Match {
        span: Span,
        subject: Box<Expr>,
        arms: Vec<MatchArm>,
    },

    /// Anonymous arrow function: `x => e` or `(a, b) => { ... }`
    Lambda {
        span: Span,
        params: Vec<Param>,
        body: Block,
        is_async: bool,
    },

    /// Bare block expression
    Block { span: Span, block: Block },

    /// `async { ... }` — deferred body, forced by `await`
    AsyncBlock { span: Span, body: Block },

    /// `await expr`
    Await { span: Span, inner: Box<Expr> },

    /// `Ok(expr)`
    OkCtor { span: Span, inner: Box<Expr> },
    /// `Err(expr)`
    ErrCtor { span: Span, inner: Box<Expr> },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Match arm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchArm {
    pub span: Span,
    pub pattern: Pattern,
    pub guard: Option<Box<Expr>>,
    pub body: Box<Expr>,
}

/// Pattern for matching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    Wildcard { span: Span },
    Number { span: Span, value: f64 },
    Str { span: Span, value: String },
    Bool { span: Span, value: bool },
    /// Identifier pattern: binds the subject
    Binding { span: Span, name: String },
    /// `Ok(pattern)`
    Ok { span: Span, inner: Box<Pattern> },
    /// `Err(pattern)`
    Err { span: Span, inner: Box<Pattern> },
}

impl Expr {
    /// Source span of this expression
    pub fn span(&self) -> &Span {
        match self {
            Expr::Number { span, .. }
            | Expr::Str { span, .. }
            | Expr::Bool { span, .. }
            | Expr::Template { span, .. }
            | Expr::Ident { span, .. }
            | Expr::List { span, .. }
            | Expr::ListComprehension { span, .. }
            | Expr::Range { span, .. }
            | Expr::StructLiteral { span, .. }
            | Expr::FieldAccess { span, .. }
            | Expr::Index { span, .. }
            | Expr::Call { span, .. }
            | Expr::MethodCall { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::If { span, .. }
            | Expr::Match { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::Block { span, .. }
            | Expr::AsyncBlock { span, .. }
            | Expr::Await { span, .. }
            | Expr::OkCtor { span, .. }
            | Expr::ErrCtor { span, .. } => span,
        }
    }

    /// Whether this expression carries its own braces and can stand as a
    /// statement without a trailing semicolon
    pub fn is_block_like(&self) -> bool {
        matches!(
            self,
            Expr::If { .. } | Expr::Match { .. } | Expr::Block { .. } | Expr::AsyncBlock { .. }
        )
    }
}

impl Stmt {
    /// Source span of this statement
    pub fn span(&self) -> &Span {
        match self {
            Stmt::Let { span, .. }
            | Stmt::Const { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::Expr { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Break { span }
            | Stmt::Continue { span }
            | Stmt::For { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Loop { span, .. } => span,
            Stmt::StructDef(def) => &def.span,
            Stmt::FnDef(def) => &def.span,
        }
    }
}
