//! Expression grammar: precedence-climbing binary operators, call/pipe
//! postfixes, and the primary forms (literal, identifier, call, grouped
//! expression, nested `fn` declaration).
//!
//! spec.md §4.2 describes binary-operator parsing as a rotation performed
//! after a right-recursive descent ("rotate only when the right operand's
//! operator binds strictly looser"). Traced against same-precedence
//! chains that rule double-rotates left-associative operators back
//! towards right-associativity — `1 - 2 - 3` comes out as `1 - (2 - 3)`
//! instead of `(1 - 2) - 3`. Precedence climbing (bump `min_prec` by one
//! on the recursive call) gives the left-associative reading the rest of
//! the spec assumes without needing a post-hoc rotation step; see
//! DESIGN.md Open Question 6.

use crate::ast::{BinOp, Expr, ExprKind, FuncCall, Literal, Pipe};
use crate::token::{Keyword, TokenType};

use super::{ParseResult, Parser};

impl<'a> Parser<'a> {
    pub(super) fn parse_expr(&mut self) -> ParseResult<Expr> {
        let head = self.parse_binary(0)?;
        self.parse_pipe_tail(head)
    }

    fn parse_pipe_tail(&mut self, first: Expr) -> ParseResult<Expr> {
        if !self.current_is_symbol("|>") {
            return Ok(first);
        }
        let pos = first.pos.clone();
        let mut stages = Vec::new();
        while self.current_is_symbol("|>") {
            self.advance();
            stages.push(self.parse_binary(0)?);
        }
        let mut tail = None;
        for stage in stages.into_iter().rev() {
            tail = Some(Box::new(Pipe { value: Box::new(stage), next: tail }));
        }
        Ok(Expr::new(ExprKind::Pipe(Pipe { value: Box::new(first), next: tail }), pos))
    }

    fn parse_binary(&mut self, min_prec: u8) -> ParseResult<Expr> {
        let mut lhs = self.parse_primary()?;
        loop {
            let op = match self
                .current
                .kind
                .symbol_text()
                .and_then(BinOp::from_symbol)
            {
                Some(op) if op.precedence() >= min_prec => op,
                _ => break,
            };
            let pos = self.pos();
            self.advance();
            let rhs = self.parse_binary(op.precedence() + 1)?;
            lhs = Expr::new(
                ExprKind::Binop { op, lhs: Box::new(lhs), rhs: Box::new(rhs) },
                pos,
            );
        }
        Ok(lhs)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let pos = self.pos();
        match self.current.kind.clone() {
            TokenType::String(s) => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Str(s)), pos))
            }
            TokenType::Integer(n) => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Int(n)), pos))
            }
            TokenType::Identifier(name) => {
                self.advance();
                if self.current_is_symbol("(") {
                    let args = self.parse_call_args()?;
                    Ok(Expr::new(ExprKind::Call(FuncCall { name, args }), pos))
                } else {
                    Ok(Expr::new(ExprKind::Ident(name), pos))
                }
            }
            TokenType::Symbol(ref s) if s == "(" => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_symbol(")")?;
                Ok(Expr::new(ExprKind::Group(Box::new(inner)), pos))
            }
            TokenType::Keyword(Keyword::Fn) => {
                let decl = self.parse_fn_decl()?;
                Ok(Expr::new(ExprKind::FuncDecl(Box::new(decl)), pos))
            }
            _ => Err(self.error_unexpected("an expression")),
        }
    }

    fn parse_call_args(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect_symbol("(")?;
        let mut args = Vec::new();
        if !self.current_is_symbol(")") {
            loop {
                args.push(self.parse_expr()?);
                if self.current_is_symbol(",") {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect_symbol(")")?;
        Ok(args)
    }
}
