use std::cell::RefCell;

use crate::ast::stmt::FuncDecl;
use crate::token::Position;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Gt,
    Lt,
    Eq,
    Le,
    Ge,
    Ne,
    And,
    Or,
}

impl BinOp {
    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "%" => BinOp::Mod,
            ">" => BinOp::Gt,
            "<" => BinOp::Lt,
            "==" => BinOp::Eq,
            "<=" => BinOp::Le,
            ">=" => BinOp::Ge,
            "!=" => BinOp::Ne,
            "&&" => BinOp::And,
            "||" => BinOp::Or,
            _ => return None,
        })
    }

    /// Lowest to highest: `{&&, ||}` < `%` < comparisons < `{+ -}` < `{* /}`.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::And | BinOp::Or => 0,
            BinOp::Mod => 1,
            BinOp::Gt | BinOp::Lt | BinOp::Eq | BinOp::Le | BinOp::Ge | BinOp::Ne => 2,
            BinOp::Add | BinOp::Sub => 3,
            BinOp::Mul | BinOp::Div => 4,
        }
    }

    pub fn is_logic(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Gt | BinOp::Lt | BinOp::Eq | BinOp::Le | BinOp::Ge | BinOp::Ne
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Gt => ">",
            BinOp::Lt => "<",
            BinOp::Eq => "==",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Ne => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone)]
pub struct FuncCall {
    pub name: String,
    pub args: Vec<Expr>,
}

/// A pipe chain `a |> f |> g(x)`, represented as the linked list
/// `spec.md` §3 describes: `value` is the current stage, `next`
/// continues the chain.
#[derive(Debug, Clone)]
pub struct Pipe {
    pub value: Box<Expr>,
    pub next: Option<Box<Pipe>>,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Ident(String),
    Literal(Literal),
    Binop {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call(FuncCall),
    Pipe(Pipe),
    /// A parenthesized grouping.
    Group(Box<Expr>),
    /// A function declared in expression position (`primary := ... | fn-decl`).
    FuncDecl(Box<FuncDecl>),
}

/// An AST expression node. Carries its source position and a slot the
/// type checker fills in with the resolved `Type`, the way the teacher
/// mutates AST nodes in place across passes rather than building a
/// second annotated tree (DESIGN_NOTES "in-place AST mutation").
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Position,
    pub resolved_type: RefCell<Option<Type>>,
}

impl Expr {
    pub fn new(kind: ExprKind, pos: Position) -> Self {
        Self {
            kind,
            pos,
            resolved_type: RefCell::new(None),
        }
    }

    pub fn ty(&self) -> Option<Type> {
        self.resolved_type.borrow().clone()
    }

    pub fn set_ty(&self, ty: Type) {
        *self.resolved_type.borrow_mut() = Some(ty);
    }

    /// True when this node is a literal (used to gate the integer-literal
    /// monomorphisation rewrite to literal-origin arguments only, per
    /// DESIGN.md Open Question 1).
    pub fn is_literal_origin(&self) -> bool {
        matches!(self.kind, ExprKind::Literal(_))
    }
}
