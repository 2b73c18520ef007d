use std::cell::RefCell;

use crate::ast::expr::Expr;
use crate::token::Position;
use crate::types::Type;

#[derive(Debug, Clone)]
pub struct FuncDeclArg {
    pub name: String,
    pub type_name: String,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    pub args: Vec<FuncDeclArg>,
    /// Written return type name, or `ast::UNRESOLVED_TYPE` ("()") when
    /// omitted. The checker mutates this in place once it infers a
    /// concrete return type (spec.md §4.4 Pass 1).
    pub returns: String,
    pub body: Vec<Stmt>,
    pub pos: Position,
}

#[derive(Debug)]
pub struct VarDecl {
    pub name: String,
    /// Written type name, or `ast::UNRESOLVED_TYPE` ("()") when omitted,
    /// or the sentinel `"number"` requesting "any numeric type". Mutated
    /// in place by the checker once a concrete type is known.
    pub declared_type: RefCell<String>,
    pub init: Option<Expr>,
    pub pos: Position,
    /// Filled in by the checker; `None` until then.
    pub resolved_type: RefCell<Option<Type>>,
}

impl Clone for VarDecl {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            declared_type: RefCell::new(self.declared_type.borrow().clone()),
            init: self.init.clone(),
            pos: self.pos.clone(),
            resolved_type: RefCell::new(self.resolved_type.borrow().clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IfElse {
    pub cond: Expr,
    pub body: Vec<Stmt>,
    pub else_body: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Eof,
    FuncDecl(FuncDecl),
    VarDecl(VarDecl),
    IfElse(IfElse),
    Return(Option<Expr>),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: Position,
}

impl Stmt {
    pub fn new(kind: StmtKind, pos: Position) -> Self {
        Self { kind, pos }
    }

    pub fn eof(pos: Position) -> Self {
        Self { kind: StmtKind::Eof, pos }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, StmtKind::Eof)
    }
}
