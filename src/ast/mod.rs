//! Abstract syntax tree (spec.md §3).
//!
//! Mirrors the teacher's split of "expression-shaped" vs "statement-
//! shaped" nodes (`src/ast/logic.rs` vs `src/ast/stmt.rs`) rather than
//! the single undifferentiated tagged node the spec's source language
//! happens to use — Rust's enums let the two be told apart at compile
//! time instead of by a runtime discriminator, per DESIGN_NOTES "tagged
//! unions over inheritance".

mod expr;
mod stmt;

pub use expr::{BinOp, Expr, ExprKind, FuncCall, Literal, Pipe};
pub use stmt::{FuncDecl, FuncDeclArg, IfElse, Stmt, StmtKind, VarDecl};

/// Sentinel written by the parser for a type name that was not spelled
/// out and must be inferred by the checker (spec.md §3).
pub const UNRESOLVED_TYPE: &str = "()";
