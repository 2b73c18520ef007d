//! Recursive-descent parser (spec.md §4.2 "Grammar").
//!
//! Grounded on the teacher's clause-by-clause descent in
//! `src/parser/clause.rs` (one `parse_*` method per grammar production,
//! single-token lookahead via the lexer's `peek`), generalized from the
//! teacher's fixed NLP clause set to EFU's statement/expression grammar.

mod expr;
mod stmt;


use crate::error::CompileError;
use crate::lexer::Lexer;
use crate::token::{Keyword, Position, Token, TokenType};

pub type ParseResult<T> = Result<T, CompileError>;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next();
        Self { lexer, current }
    }

    /// Parse the whole program. Per spec.md §4.2, a parse failure aborts
    /// the rest of the drive: the statement list ends at the first error,
    /// which is returned alongside whatever statements parsed cleanly
    /// before it.
    pub fn parse_program(mut self) -> (Vec<crate::ast::Stmt>, Option<CompileError>) {
        let mut stmts = Vec::new();
        loop {
            match self.parse_statement() {
                Ok(stmt) => {
                    let is_eof = stmt.is_eof();
                    stmts.push(stmt);
                    if is_eof {
                        return (stmts, None);
                    }
                }
                Err(e) => return (stmts, Some(e)),
            }
        }
    }

    fn advance(&mut self) -> Token {
        let old = std::mem::replace(&mut self.current, self.lexer.next());
        old
    }

    fn pos(&self) -> Position {
        self.current.pos.clone()
    }

    fn current_is_symbol(&self, s: &str) -> bool {
        self.current.kind.symbol_text() == Some(s)
    }

    fn expect_symbol(&mut self, s: &str) -> ParseResult<()> {
        if self.current_is_symbol(s) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_unexpected(&format!("'{}'", s)))
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<String> {
        match self.current.kind.clone() {
            TokenType::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_unexpected("an identifier")),
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> ParseResult<()> {
        if matches!(&self.current.kind, TokenType::Keyword(k) if *k == kw) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_unexpected(&format!("keyword '{:?}'", kw)))
        }
    }

    fn error_unexpected(&self, expected: &str) -> CompileError {
        CompileError::parse(
            self.pos(),
            format!("expected {}, found {}", expected, self.current.kind),
        )
    }

    /// Reads a type name: a base identifier (or the `"number"` sentinel)
    /// followed by zero or more `[]` / `[N]` array suffixes, reconstructed
    /// as the textual form spec.md §4.3 uses for declared-type strings.
    fn parse_type_name_text(&mut self) -> ParseResult<String> {
        let base = self.expect_identifier()?;
        let mut out = base;
        while self.current_is_symbol("[") {
            self.advance();
            if let TokenType::Integer(n) = self.current.kind.clone() {
                self.advance();
                out.push_str(&format!("[{}]", n));
            } else {
                out.push_str("[]");
            }
            self.expect_symbol("]")?;
        }
        Ok(out)
    }
}
