//! Statement-level grammar productions.

use std::cell::RefCell;

use crate::ast::{FuncDecl, FuncDeclArg, IfElse, Stmt, StmtKind, VarDecl, UNRESOLVED_TYPE};
use crate::token::{Keyword, TokenType};

use super::{ParseResult, Parser};

impl<'a> Parser<'a> {
    pub(super) fn parse_statement(&mut self) -> ParseResult<Stmt> {
        if self.current.kind.is_eof() {
            return Ok(Stmt::eof(self.pos()));
        }
        match &self.current.kind {
            TokenType::Keyword(Keyword::If) => self.parse_if_else(),
            TokenType::Keyword(Keyword::Let) => {
                let stmt = self.parse_var_decl()?;
                self.expect_symbol(";")?;
                Ok(stmt)
            }
            TokenType::Keyword(Keyword::Return) => {
                let stmt = self.parse_return()?;
                self.expect_symbol(";")?;
                Ok(stmt)
            }
            TokenType::Keyword(Keyword::Fn) => {
                let pos = self.pos();
                let decl = self.parse_fn_decl()?;
                Ok(Stmt::new(StmtKind::FuncDecl(decl), pos))
            }
            _ => {
                let pos = self.pos();
                let expr = self.parse_expr()?;
                self.expect_symbol(";")?;
                Ok(Stmt::new(StmtKind::Expr(expr), pos))
            }
        }
    }

    fn parse_var_decl(&mut self) -> ParseResult<Stmt> {
        let pos = self.pos();
        self.expect_keyword(Keyword::Let)?;
        let name = self.expect_identifier()?;

        let mut declared_type = UNRESOLVED_TYPE.to_string();
        let mut init = None;

        if self.current_is_symbol(":") {
            self.advance();
            if !self.current_is_symbol("=") && !self.current_is_symbol(";") {
                declared_type = self.parse_type_name_text()?;
            }
            if self.current_is_symbol("=") {
                self.advance();
                init = Some(self.parse_expr()?);
            }
        }

        Ok(Stmt::new(
            StmtKind::VarDecl(VarDecl {
                name,
                declared_type: RefCell::new(declared_type),
                init,
                pos: pos.clone(),
                resolved_type: RefCell::new(None),
            }),
            pos,
        ))
    }

    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let pos = self.pos();
        self.expect_keyword(Keyword::Return)?;
        let expr = if self.current_is_symbol(";") {
            None
        } else {
            Some(self.parse_expr()?)
        };
        Ok(Stmt::new(StmtKind::Return(expr), pos))
    }

    fn parse_if_else(&mut self) -> ParseResult<Stmt> {
        let pos = self.pos();
        self.expect_keyword(Keyword::If)?;
        let cond = self.parse_expr()?;
        let body = self.parse_block_or_stmt()?;
        let else_body = if self.current.kind.is_word("else") {
            self.advance();
            Some(self.parse_block_or_stmt()?)
        } else {
            None
        };
        Ok(Stmt::new(StmtKind::IfElse(IfElse { cond, body, else_body }), pos))
    }

    fn parse_block_or_stmt(&mut self) -> ParseResult<Vec<Stmt>> {
        if self.current_is_symbol("{") {
            self.parse_block()
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    pub(super) fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect_symbol("{")?;
        let mut stmts = Vec::new();
        while !self.current_is_symbol("}") {
            if self.current.kind.is_eof() {
                return Err(self.error_unexpected("'}'"));
            }
            stmts.push(self.parse_statement()?);
        }
        self.expect_symbol("}")?;
        Ok(stmts)
    }

    pub(super) fn parse_fn_decl(&mut self) -> ParseResult<FuncDecl> {
        let pos = self.pos();
        self.expect_keyword(Keyword::Fn)?;
        let name = self.expect_identifier()?;
        self.expect_symbol("(")?;

        let mut args = Vec::new();
        if !self.current_is_symbol(")") {
            loop {
                let arg_pos = self.pos();
                let arg_name = self.expect_identifier()?;
                let type_name = if self.current_is_symbol(":") {
                    self.advance();
                    self.parse_type_name_text()?
                } else {
                    UNRESOLVED_TYPE.to_string()
                };
                args.push(FuncDeclArg { name: arg_name, type_name, pos: arg_pos });
                if self.current_is_symbol(",") {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect_symbol(")")?;

        let returns = if self.current_is_symbol("->") {
            self.advance();
            self.parse_type_name_text()?
        } else {
            UNRESOLVED_TYPE.to_string()
        };

        let body = self.parse_block()?;
        Ok(FuncDecl { name, args, returns, body, pos })
    }
}
