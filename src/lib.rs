//! EFU: a small imperative language transpiled to one of two targets.
//!
//! Pipeline (spec.md §1/§2): lexer → parser → type checker → one of two
//! code generators. Module layout follows the teacher's flat `src/`
//! convention — see `TEACHER.txt` and `DESIGN.md`.

pub mod ast;
pub mod checker;
pub mod cli;
pub mod codegen;
pub mod context;
pub mod debug;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pipe;
pub mod style;
pub mod token;
pub mod types;

use checker::Checker;
use error::CompileError;
use parser::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Static,
    Dynamic,
}

impl Target {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "go" => Some(Target::Static),
            "js" => Some(Target::Dynamic),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Target::Static => "go",
            Target::Dynamic => "js",
        }
    }
}

pub struct CompileOutput {
    /// Emitted target source. Empty when `debug_ir` was requested.
    pub code: String,
    /// One debug-IR line per top-level statement, present only when
    /// `-debug-ir` was requested (spec.md §6).
    pub debug_ir: Option<String>,
}

/// Runs the full pipeline over `source`. Per spec.md §7 "Policy", the
/// first failed phase halts the run and returns its accumulated
/// diagnostics rather than throwing; `-debug-ir` mode stops right after
/// parsing and never reaches the checker or a backend.
pub fn compile(source: &str, target: Target, debug_ir: bool) -> Result<CompileOutput, Vec<CompileError>> {
    let (mut stmts, parse_err) = Parser::new(source).parse_program();
    if let Some(e) = parse_err {
        return Err(vec![e]);
    }

    if debug_ir {
        let rendered = stmts.iter().map(debug::print_stmt).collect::<Vec<_>>().join("\n");
        return Ok(CompileOutput { code: String::new(), debug_ir: Some(rendered) });
    }

    let (ok, errors) = Checker::new().check_program(&mut stmts);
    if !ok {
        return Err(errors);
    }

    let code = match target {
        Target::Static => codegen::static_backend::emit(&stmts),
        Target::Dynamic => codegen::dynamic_backend::emit(&stmts),
    };
    Ok(CompileOutput { code, debug_ir: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_rejects_parse_error() {
        let result = compile("fn f() { return 1;", Target::Static, false);
        assert!(result.is_err());
    }

    #[test]
    fn compile_rejects_type_error() {
        let result = compile("let x: u8 = `oops';", Target::Static, false);
        assert!(result.is_err());
    }

    #[test]
    fn debug_ir_short_circuits_before_checking() {
        // `y` is undeclared; a normal compile would fail the checker, but
        // `-debug-ir` never reaches it.
        let out = compile("y;", Target::Static, true).unwrap();
        assert!(out.debug_ir.is_some());
        assert!(out.code.is_empty());
    }

    #[test]
    fn static_target_emits_go_package() {
        let out = compile("fn main() { printnf(`hi'); }", Target::Static, false).unwrap();
        assert!(out.code.contains("package main"));
    }

    #[test]
    fn dynamic_target_emits_generator() {
        let out = compile("fn main() { printnf(`hi'); }", Target::Dynamic, false).unwrap();
        assert!(out.code.contains("function* main()"));
    }
}
