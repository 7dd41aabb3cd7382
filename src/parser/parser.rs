//! Recursive descent parser for NooCrush
//!
//! Operator precedence climbing for binary expressions; fail-fast on the
//! first error (no recovery), reporting expected-vs-found with a span.
#![allow(clippy::result_large_err)]

use crate::diagnostics::{codes, Diagnostic, Span};
use crate::parser::ast::*;
use crate::parser::lexer::{tokenize, Token, TokenKind};
use crate::parser::span::SourceFile;

/// Parser for NooCrush source code
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Struct literals are disallowed in `if`/`while`/`match`/`for` headers
    /// so `match Foo { ... }` reads the braces as the arm block; parentheses
    /// re-enable them.
    struct_literals_allowed: bool,
}

impl Parser {
    /// Create a new parser over a token sequence
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            struct_literals_allowed: true,
        }
    }

    /// Parse a complete program
    pub fn parse_program(mut self) -> Result<Program, Diagnostic> {
        let mut stmts = Vec::new();
        while !self.is_eof() {
            if self.at_stmt_keyword() {
                stmts.push(self.parse_stmt()?);
            } else {
                let expr = self.parse_expr()?;
                stmts.push(self.finish_expr_stmt(expr, TokenKind::Eof)?);
            }
        }
        Ok(Program { stmts })
    }

    /// Parse a single expression followed by end of input (used for
    /// template-string interpolation spans)
    pub fn parse_expr_entry(mut self) -> Result<Expr, Diagnostic> {
        let expr = self.parse_expr()?;
        if !self.is_eof() {
            return Err(self.error_unexpected("end of interpolated expression"));
        }
        Ok(expr)
    }

    // Statements

    fn at_stmt_keyword(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Let
                | TokenKind::Const
                | TokenKind::Struct
                | TokenKind::Fn
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Loop
        ) || (matches!(self.peek().kind, TokenKind::Async)
            && matches!(self.peek_nth(1).kind, TokenKind::Fn))
    }

    fn parse_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        match self.peek().kind {
            TokenKind::Let => self.parse_let(),
            TokenKind::Const => self.parse_const(),
            TokenKind::Struct => self.parse_struct_def().map(Stmt::StructDef),
            TokenKind::Fn | TokenKind::Async => self.parse_fn_def().map(Stmt::FnDef),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => {
                let span = self.advance().span;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Break { span })
            }
            TokenKind::Continue => {
                let span = self.advance().span;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Continue { span })
            }
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Loop => self.parse_loop(),
            _ => Err(self.error_unexpected("statement")),
        }
    }

    /// Turn an already-parsed expression into a statement, handling
    /// assignment targets and the semicolon policy. `terminator` is the
    /// token that ends the surrounding sequence (`}` or end of input).
    fn finish_expr_stmt(&mut self, expr: Expr, terminator: TokenKind) -> Result<Stmt, Diagnostic> {
        if self.check(TokenKind::Eq) {
            self.advance();
            let target = match expr {
                Expr::Ident { span, name } => AssignTarget::Name { span, name },
                Expr::FieldAccess {
                    span,
                    object,
                    field,
                } => AssignTarget::Field {
                    span,
                    object,
                    field,
                },
                other => {
                    return Err(Diagnostic::error(codes::PARSE_UNEXPECTED_TOKEN)
                        .message("invalid assignment target")
                        .span(other.span().clone())
                        .build())
                }
            };
            let value = self.parse_expr()?;
            let span = target_span(&target).merge(value.span());
            self.expect(TokenKind::Semi)?;
            return Ok(Stmt::Assign {
                span,
                target,
                value: Box::new(value),
            });
        }

        let span = expr.span().clone();
        if self.check(TokenKind::Semi) {
            self.advance();
        } else if !self.check_kind(&terminator) && !expr.is_block_like() {
            return Err(self.error_unexpected("`;`"));
        }
        Ok(Stmt::Expr {
            span,
            expr: Box::new(expr),
        })
    }

    fn parse_let(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.expect(TokenKind::Let)?.span;
        let mutable = self.check(TokenKind::Mut);
        if mutable {
            self.advance();
        }
        let name = self.expect_ident()?;
        let ty = self.parse_optional_type_annotation()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        let span = start.merge(value.span());
        self.expect(TokenKind::Semi)?;
        Ok(Stmt::Let {
            span,
            name,
            ty,
            mutable,
            value: Box::new(value),
        })
    }

    fn parse_const(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.expect(TokenKind::Const)?.span;
        let name = self.expect_ident()?;
        let ty = self.parse_optional_type_annotation()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        let span = start.merge(value.span());
        self.expect(TokenKind::Semi)?;
        Ok(Stmt::Const {
            span,
            name,
            ty,
            value: Box::new(value),
        })
    }

    fn parse_struct_def(&mut self) -> Result<StructDef, Diagnostic> {
        let start = self.expect(TokenKind::Struct)?.span;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            fields.push(self.parse_field_def()?);
            if self.check(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace)?.span;

        Ok(StructDef {
            span: start.merge(&end),
            name,
            fields,
        })
    }

    fn parse_field_def(&mut self) -> Result<FieldDef, Diagnostic> {
        let start = self.peek().span.clone();
        let mutable = self.check(TokenKind::Mut);
        if mutable {
            self.advance();
        }
        let name = self.expect_ident()?;
        let ty = self.parse_optional_type_annotation()?;
        let default = if self.check(TokenKind::Eq) {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };
        let end = self.previous_span();
        Ok(FieldDef {
            span: start.merge(&end),
            name,
            ty,
            mutable,
            default,
        })
    }

    fn parse_fn_def(&mut self) -> Result<FnDef, Diagnostic> {
        let start = self.peek().span.clone();
        let is_async = self.check(TokenKind::Async);
        if is_async {
            self.advance();
        }
        self.expect(TokenKind::Fn)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;

        let return_ty = if self.check(TokenKind::Arrow) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_block()?;
        let span = start.merge(&body.span);
        Ok(FnDef {
            span,
            name,
            params,
            return_ty,
            body,
            is_async,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, Diagnostic> {
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            params.push(self.parse_param()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                if self.check(TokenKind::RParen) {
                    break;
                }
                params.push(self.parse_param()?);
            }
        }
        Ok(params)
    }

    fn parse_param(&mut self) -> Result<Param, Diagnostic> {
        let start = self.peek().span.clone();
        let name = self.expect_ident()?;
        let ty = self.parse_optional_type_annotation()?;
        let end = self.previous_span();
        Ok(Param {
            span: start.merge(&end),
            name,
            ty,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, Diagnostic> {
        let span = self.expect(TokenKind::Return)?.span;
        let value = if self.check(TokenKind::Semi) || self.check(TokenKind::RBrace) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        if self.check(TokenKind::Semi) {
            self.advance();
        }
        Ok(Stmt::Return { span, value })
    }

    fn parse_for(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.expect(TokenKind::For)?.span;
        let binding = self.expect_ident()?;
        self.expect(TokenKind::In)?;
        let iterable = self.parse_header_expr()?;
        let body = self.parse_block()?;
        let span = start.merge(&body.span);
        Ok(Stmt::For {
            span,
            binding,
            iterable: Box::new(iterable),
            body,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.expect(TokenKind::While)?.span;
        let cond = self.parse_header_expr()?;
        let body = self.parse_block()?;
        let span = start.merge(&body.span);
        Ok(Stmt::While {
            span,
            cond: Box::new(cond),
            body,
        })
    }

    fn parse_loop(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.expect(TokenKind::Loop)?.span;
        let body = self.parse_block()?;
        let span = start.merge(&body.span);
        Ok(Stmt::Loop { span, body })
    }

    /// Parse a control-flow header expression with struct literals disabled
    fn parse_header_expr(&mut self) -> Result<Expr, Diagnostic> {
        let saved = self.struct_literals_allowed;
        self.struct_literals_allowed = false;
        let result = self.parse_expr();
        self.struct_literals_allowed = saved;
        result
    }

    // Blocks

    fn parse_block(&mut self) -> Result<Block, Diagnostic> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let saved = self.struct_literals_allowed;
        self.struct_literals_allowed = true;

        let mut stmts = Vec::new();
        let mut expr = None;

        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            if self.at_stmt_keyword() {
                stmts.push(self.parse_stmt()?);
            } else {
                let e = self.parse_expr()?;
                // An expression right before `}` with no semicolon is the
                // block's value
                if self.check(TokenKind::RBrace) {
                    expr = Some(Box::new(e));
                    break;
                }
                stmts.push(self.finish_expr_stmt(e, TokenKind::RBrace)?);
            }
        }

        let end = self.expect(TokenKind::RBrace)?.span;
        self.struct_literals_allowed = saved;
        Ok(Block {
            span: start.merge(&end),
            stmts,
            expr,
        })
    }

    // Expressions

    fn parse_expr(&mut self) -> Result<Expr, Diagnostic> {
        let left = self.parse_binary_expr(1)?;

        // Ranges sit below the comparison chain: `0..n`, `1..=10`
        if self.check(TokenKind::DotDot) || self.check(TokenKind::DotDotEq) {
            let inclusive = self.check(TokenKind::DotDotEq);
            self.advance();
            let end = self.parse_binary_expr(1)?;
            let span = left.span().merge(end.span());
            return Ok(Expr::Range {
                span,
                start: Box::new(left),
                end: Box::new(end),
                inclusive,
            });
        }

        Ok(left)
    }

    fn parse_binary_expr(&mut self, min_prec: u8) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_unary_expr()?;

        loop {
            let (op, prec) = match self.peek().kind {
                TokenKind::OrOr => (BinaryOp::Or, 1),
                TokenKind::AndAnd => (BinaryOp::And, 2),
                TokenKind::EqEq => (BinaryOp::Eq, 3),
                TokenKind::BangEq => (BinaryOp::Ne, 3),
                TokenKind::Lt => (BinaryOp::Lt, 4),
                TokenKind::LtEq => (BinaryOp::Le, 4),
                TokenKind::Gt => (BinaryOp::Gt, 4),
                TokenKind::GtEq => (BinaryOp::Ge, 4),
                TokenKind::Plus => (BinaryOp::Add, 5),
                TokenKind::Minus => (BinaryOp::Sub, 5),
                TokenKind::Star => (BinaryOp::Mul, 6),
                TokenKind::Slash => (BinaryOp::Div, 6),
                TokenKind::Percent => (BinaryOp::Mod, 6),
                _ => break,
            };

            if prec < min_prec {
                break;
            }

            self.advance();
            let right = self.parse_binary_expr(prec + 1)?;
            let span = left.span().merge(right.span());
            left = Expr::Binary {
                span,
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, Diagnostic> {
        match self.peek().kind {
            TokenKind::Bang => {
                let start = self.advance().span;
                let operand = self.parse_unary_expr()?;
                let span = start.merge(operand.span());
                Ok(Expr::Unary {
                    span,
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                })
            }
            TokenKind::Minus => {
                let start = self.advance().span;
                let operand = self.parse_unary_expr()?;
                let span = start.merge(operand.span());
                Ok(Expr::Unary {
                    span,
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                })
            }
            TokenKind::Await => {
                let start = self.advance().span;
                let inner = self.parse_unary_expr()?;
                let span = start.merge(inner.span());
                Ok(Expr::Await {
                    span,
                    inner: Box::new(inner),
                })
            }
            _ => self.parse_postfix_expr(),
        }
    }

    fn parse_postfix_expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_primary_expr()?;

        loop {
            if self.check(TokenKind::LParen) {
                self.advance();
                let args = self.parse_args()?;
                let end = self.expect(TokenKind::RParen)?.span;
                let span = expr.span().merge(&end);
                expr = Expr::Call {
                    span,
                    callee: Box::new(expr),
                    args,
                };
            } else if self.check(TokenKind::Dot) {
                self.advance();
                let name = self.expect_ident()?;
                if self.check(TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_args()?;
                    let end = self.expect(TokenKind::RParen)?.span;
                    let span = expr.span().merge(&end);
                    expr = Expr::MethodCall {
                        span,
                        receiver: Box::new(expr),
                        method: name,
                        args,
                    };
                } else {
                    let end = self.previous_span();
                    let span = expr.span().merge(&end);
                    expr = Expr::FieldAccess {
                        span,
                        object: Box::new(expr),
                        field: name,
                    };
                }
            } else if self.check(TokenKind::LBracket) {
                self.advance();
                let saved = self.struct_literals_allowed;
                self.struct_literals_allowed = true;
                let index = self.parse_expr();
                self.struct_literals_allowed = saved;
                let index = index?;
                let end = self.expect(TokenKind::RBracket)?.span;
                let span = expr.span().merge(&end);
                expr = Expr::Index {
                    span,
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse a comma-separated argument list (trailing comma accepted);
    /// struct literals are re-enabled inside the parentheses
    fn parse_args(&mut self) -> Result<Vec<Expr>, Diagnostic> {
        let saved = self.struct_literals_allowed;
        self.struct_literals_allowed = true;
        let result = self.parse_args_inner();
        self.struct_literals_allowed = saved;
        result
    }

    fn parse_args_inner(&mut self) -> Result<Vec<Expr>, Diagnostic> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                if self.check(TokenKind::RParen) {
                    break;
                }
                args.push(self.parse_expr()?);
            }
        }
        Ok(args)
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, Diagnostic> {
        let token = self.peek().clone();

        match &token.kind {
            TokenKind::NumberLit(n) => {
                let value = *n;
                self.advance();
                Ok(Expr::Number {
                    span: token.span,
                    value,
                })
            }
            TokenKind::StringLit(s) => {
                let value = s.clone();
                self.advance();
                Ok(Expr::Str {
                    span: token.span,
                    value,
                })
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool {
                    span: token.span,
                    value: true,
                })
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool {
                    span: token.span,
                    value: false,
                })
            }
            TokenKind::TemplateLit(fragments) => {
                let fragments = fragments.clone();
                self.advance();
                self.build_template(fragments, token.span)
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.parse_ident_expr(name, token.span)
            }
            TokenKind::LParen => self.parse_paren_or_lambda(),
            TokenKind::LBracket => self.parse_list_or_comprehension(),
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                Ok(Expr::Block {
                    span: block.span.clone(),
                    block,
                })
            }
            TokenKind::If => self.parse_if_expr(),
            TokenKind::Match => self.parse_match_expr(),
            TokenKind::Async => self.parse_async_expr(),
            _ => Err(self.error_unexpected("expression")),
        }
    }

    fn parse_ident_expr(&mut self, name: String, span: Span) -> Result<Expr, Diagnostic> {
        // `Result::Ok(x)` / `Result::Err(e)` long form
        if name == "Result" && matches!(self.peek_nth(1).kind, TokenKind::ColonColon) {
            self.advance(); // Result
            self.advance(); // ::
            let ctor = self.expect_ident()?;
            return self.parse_result_ctor(&ctor, span);
        }

        // `Ok(x)` / `Err(e)` constructors
        if (name == "Ok" || name == "Err") && matches!(self.peek_nth(1).kind, TokenKind::LParen) {
            self.advance();
            return self.parse_result_ctor(&name, span);
        }

        // `x => expr` single-parameter lambda
        if matches!(self.peek_nth(1).kind, TokenKind::FatArrow) {
            self.advance(); // ident
            self.advance(); // =>
            let param = Param {
                span: span.clone(),
                name,
                ty: None,
            };
            return self.parse_lambda_body(vec![param], span, false);
        }

        self.advance();

        // `Name { field: expr, ... }` struct literal
        if self.struct_literals_allowed
            && self.check(TokenKind::LBrace)
            && name.chars().next().is_some_and(|c| c.is_uppercase())
        {
            return self.parse_struct_literal(name, span);
        }

        Ok(Expr::Ident { span, name })
    }

    fn parse_result_ctor(&mut self, ctor: &str, start: Span) -> Result<Expr, Diagnostic> {
        self.expect(TokenKind::LParen)?;
        let saved = self.struct_literals_allowed;
        self.struct_literals_allowed = true;
        let inner = self.parse_expr();
        self.struct_literals_allowed = saved;
        let inner = inner?;
        let end = self.expect(TokenKind::RParen)?.span;
        let span = start.merge(&end);
        match ctor {
            "Ok" => Ok(Expr::OkCtor {
                span,
                inner: Box::new(inner),
            }),
            "Err" => Ok(Expr::ErrCtor {
                span,
                inner: Box::new(inner),
            }),
            _ => Err(Diagnostic::error(codes::PARSE_UNEXPECTED_TOKEN)
                .message(format!("expected `Ok` or `Err`, found `{}`", ctor))
                .span(span)
                .build()),
        }
    }

    fn parse_struct_literal(&mut self, name: String, start: Span) -> Result<Expr, Diagnostic> {
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            let field = self.expect_ident()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expr()?;
            fields.push((field, value));
            if self.check(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(Expr::StructLiteral {
            span: start.merge(&end),
            name,
            fields,
        })
    }

    /// At `(`: either a parenthesized expression or a lambda parameter
    /// list. Try the parameter-list interpretation first and backtrack.
    fn parse_paren_or_lambda(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.peek().span.clone();
        let saved_pos = self.pos;

        if let Some(params) = self.try_parse_lambda_params() {
            return self.parse_lambda_body(params, start, false);
        }

        self.pos = saved_pos;
        self.expect(TokenKind::LParen)?;
        let saved = self.struct_literals_allowed;
        self.struct_literals_allowed = true;
        let expr = self.parse_expr();
        self.struct_literals_allowed = saved;
        let expr = expr?;
        self.expect(TokenKind::RParen)?;
        Ok(expr)
    }

    /// Attempt `( ident (: type)?, ... ) =>`; returns None (position
    /// unchanged by the caller) when the tokens don't form a lambda head
    fn try_parse_lambda_params(&mut self) -> Option<Vec<Param>> {
        let saved_pos = self.pos;
        if !self.check(TokenKind::LParen) {
            return None;
        }
        self.advance();

        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let param = match self.parse_param() {
                    Ok(p) => p,
                    Err(_) => {
                        self.pos = saved_pos;
                        return None;
                    }
                };
                params.push(param);
                if self.check(TokenKind::Comma) {
                    self.advance();
                    if self.check(TokenKind::RParen) {
                        break;
                    }
                } else {
                    break;
                }
            }
        }
        if !self.check(TokenKind::RParen) {
            self.pos = saved_pos;
            return None;
        }
        self.advance();
        if !self.check(TokenKind::FatArrow) {
            self.pos = saved_pos;
            return None;
        }
        self.advance();
        Some(params)
    }

    /// Parse a lambda body after `=>`: either a block or a bare expression
    fn parse_lambda_body(
        &mut self,
        params: Vec<Param>,
        start: Span,
        is_async: bool,
    ) -> Result<Expr, Diagnostic> {
        let body = if self.check(TokenKind::LBrace) {
            self.parse_block()?
        } else {
            let expr = self.parse_expr()?;
            Block {
                span: expr.span().clone(),
                stmts: Vec::new(),
                expr: Some(Box::new(expr)),
            }
        };
        let span = start.merge(&body.span);
        Ok(Expr::Lambda {
            span,
            params,
            body,
            is_async,
        })
    }

    fn parse_list_or_comprehension(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.expect(TokenKind::LBracket)?.span;
        let saved = self.struct_literals_allowed;
        self.struct_literals_allowed = true;
        let result = self.parse_list_inner(start);
        self.struct_literals_allowed = saved;
        result
    }

    fn parse_list_inner(&mut self, start: Span) -> Result<Expr, Diagnostic> {
        if self.check(TokenKind::RBracket) {
            let end = self.advance().span;
            return Ok(Expr::List {
                span: start.merge(&end),
                elements: Vec::new(),
            });
        }

        let first = self.parse_expr()?;

        // `[output for binding in iterable if filter]`
        if self.check(TokenKind::For) {
            self.advance();
            let binding = self.expect_ident()?;
            self.expect(TokenKind::In)?;
            let iterable = self.parse_expr()?;
            let filter = if self.check(TokenKind::If) {
                self.advance();
                Some(Box::new(self.parse_expr()?))
            } else {
                None
            };
            let end = self.expect(TokenKind::RBracket)?.span;
            return Ok(Expr::ListComprehension {
                span: start.merge(&end),
                output: Box::new(first),
                binding,
                iterable: Box::new(iterable),
                filter,
            });
        }

        let mut elements = vec![first];
        while self.check(TokenKind::Comma) {
            self.advance();
            if self.check(TokenKind::RBracket) {
                break;
            }
            elements.push(self.parse_expr()?);
        }
        let end = self.expect(TokenKind::RBracket)?.span;
        Ok(Expr::List {
            span: start.merge(&end),
            elements,
        })
    }

    fn parse_if_expr(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.expect(TokenKind::If)?.span;
        let cond = self.parse_header_expr()?;
        let block = self.parse_block()?;
        let mut branches = vec![(cond, block)];
        let mut else_block = None;

        while self.check(TokenKind::Else) {
            self.advance();
            if self.check(TokenKind::If) {
                self.advance();
                let cond = self.parse_header_expr()?;
                let block = self.parse_block()?;
                branches.push((cond, block));
            } else {
                else_block = Some(self.parse_block()?);
                break;
            }
        }

        let end = self.previous_span();
        Ok(Expr::If {
            span: start.merge(&end),
            branches,
            else_block,
        })
    }

    fn parse_match_expr(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.expect(TokenKind::Match)?.span;
        let subject = self.parse_header_expr()?;
        self.expect(TokenKind::LBrace)?;

        let mut arms = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            arms.push(self.parse_match_arm()?);
            if self.check(TokenKind::Comma) {
                self.advance();
            }
        }
        let end = self.expect(TokenKind::RBrace)?.span;

        Ok(Expr::Match {
            span: start.merge(&end),
            subject: Box::new(subject),
            arms,
        })
    }

    fn parse_match_arm(&mut self) -> Result<MatchArm, Diagnostic> {
        let start = self.peek().span.clone();
        let pattern = self.parse_pattern()?;
        let guard = if self.check(TokenKind::If) {
            self.advance();
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect(TokenKind::FatArrow)?;
        let body = self.parse_expr()?;
        let span = start.merge(body.span());
        Ok(MatchArm {
            span,
            pattern,
            guard,
            body: Box::new(body),
        })
    }

    fn parse_pattern(&mut self) -> Result<Pattern, Diagnostic> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::NumberLit(n) => {
                let value = *n;
                self.advance();
                Ok(Pattern::Number {
                    span: token.span,
                    value,
                })
            }
            TokenKind::Minus => {
                self.advance();
                let num = self.advance();
                match num.kind {
                    TokenKind::NumberLit(n) => Ok(Pattern::Number {
                        span: token.span.merge(&num.span),
                        value: -n,
                    }),
                    _ => Err(Diagnostic::error(codes::PARSE_UNEXPECTED_TOKEN)
                        .message("expected number literal after `-` in pattern")
                        .span(num.span)
                        .build()),
                }
            }
            TokenKind::StringLit(s) => {
                let value = s.clone();
                self.advance();
                Ok(Pattern::Str {
                    span: token.span,
                    value,
                })
            }
            TokenKind::True => {
                self.advance();
                Ok(Pattern::Bool {
                    span: token.span,
                    value: true,
                })
            }
            TokenKind::False => {
                self.advance();
                Ok(Pattern::Bool {
                    span: token.span,
                    value: false,
                })
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                if name == "_" {
                    return Ok(Pattern::Wildcard { span: token.span });
                }
                if (name == "Ok" || name == "Err") && self.check(TokenKind::LParen) {
                    self.advance();
                    let inner = self.parse_pattern()?;
                    let end = self.expect(TokenKind::RParen)?.span;
                    let span = token.span.merge(&end);
                    return Ok(if name == "Ok" {
                        Pattern::Ok {
                            span,
                            inner: Box::new(inner),
                        }
                    } else {
                        Pattern::Err {
                            span,
                            inner: Box::new(inner),
                        }
                    });
                }
                Ok(Pattern::Binding {
                    span: token.span,
                    name,
                })
            }
            _ => Err(self.error_unexpected("pattern")),
        }
    }

    fn parse_async_expr(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.expect(TokenKind::Async)?.span;
        if self.check(TokenKind::LBrace) {
            let body = self.parse_block()?;
            let span = start.merge(&body.span);
            return Ok(Expr::AsyncBlock { span, body });
        }

        // `async x => e` / `async (a, b) => e`
        if let TokenKind::Ident(name) = self.peek().kind.clone() {
            if matches!(self.peek_nth(1).kind, TokenKind::FatArrow) {
                let param_span = self.advance().span;
                self.advance(); // =>
                let param = Param {
                    span: param_span,
                    name,
                    ty: None,
                };
                return self.parse_lambda_body(vec![param], start, true);
            }
        }
        if let Some(params) = self.try_parse_lambda_params() {
            return self.parse_lambda_body(params, start, true);
        }

        Err(self.error_unexpected("`{` or lambda after `async`"))
    }

    fn build_template(
        &mut self,
        fragments: Vec<crate::parser::lexer::TemplateFragment>,
        span: Span,
    ) -> Result<Expr, Diagnostic> {
        use crate::parser::lexer::TemplateFragment;

        let mut parts = Vec::new();
        for fragment in fragments {
            match fragment {
                TemplateFragment::Text(value) => parts.push(TemplatePart::Text { value }),
                TemplateFragment::Expr(src) => {
                    let sub_source = SourceFile::new("<template>", src);
                    let tokens = tokenize(&sub_source).map_err(|e| {
                        Diagnostic::error(codes::PARSE_UNEXPECTED_TOKEN)
                            .message(format!("in template interpolation: {}", e.message))
                            .span(span.clone())
                            .build()
                    })?;
                    let expr = Parser::new(tokens).parse_expr_entry().map_err(|e| {
                        Diagnostic::error(codes::PARSE_UNEXPECTED_TOKEN)
                            .message(format!("in template interpolation: {}", e.message))
                            .span(span.clone())
                            .build()
                    })?;
                    parts.push(TemplatePart::Expr {
                        expr: Box::new(expr),
                    });
                }
            }
        }
        Ok(Expr::Template { span, parts })
    }

    // Type annotations (stored as display strings; NooCrush is dynamically
    // checked, annotations are documentation)

    fn parse_optional_type_annotation(&mut self) -> Result<Option<String>, Diagnostic> {
        if self.check(TokenKind::Colon) {
            self.advance();
            Ok(Some(self.parse_type()?))
        } else {
            Ok(None)
        }
    }

    fn parse_type(&mut self) -> Result<String, Diagnostic> {
        if self.check(TokenKind::LBracket) {
            self.advance();
            let inner = self.parse_type()?;
            self.expect(TokenKind::RBracket)?;
            return Ok(format!("[{}]", inner));
        }

        let name = self.expect_ident()?;
        if self.check(TokenKind::Lt) {
            self.advance();
            let mut args = vec![self.parse_type()?];
            while self.check(TokenKind::Comma) {
                self.advance();
                args.push(self.parse_type()?);
            }
            self.expect(TokenKind::Gt)?;
            return Ok(format!("{}<{}>", name, args.join(", ")));
        }
        Ok(name)
    }

    // Helper methods

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().expect("token stream has Eof"))
    }

    fn peek_nth(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .unwrap_or_else(|| self.tokens.last().expect("token stream has Eof"))
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn previous_span(&self) -> Span {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span.clone())
            .unwrap_or_else(Span::start_of_input)
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.check_kind(&kind)
    }

    fn check_kind(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Diagnostic> {
        if self.check_kind(&kind) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            Err(Diagnostic::error(codes::PARSE_UNEXPECTED_TOKEN)
                .message(format!("expected {:?}, found {:?}", kind, token.kind))
                .span(token.span.clone())
                .build())
        }
    }

    fn expect_ident(&mut self) -> Result<String, Diagnostic> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(name) => Ok(name),
            other => Err(Diagnostic::error(codes::PARSE_UNEXPECTED_TOKEN)
                .message(format!("expected identifier, found {:?}", other))
                .span(token.span)
                .build()),
        }
    }

    fn error_unexpected(&self, expected: &str) -> Diagnostic {
        let token = self.peek();
        Diagnostic::error(codes::PARSE_UNEXPECTED_TOKEN)
            .message(format!("expected {}, found {:?}", expected, token.kind))
            .span(token.span.clone())
            .build()
    }
}

fn target_span(target: &AssignTarget) -> Span {
    match target {
        AssignTarget::Name { span, .. } | AssignTarget::Field { span, .. } => span.clone(),
    }
}
