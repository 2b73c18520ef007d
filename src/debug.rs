//! `-debug-ir` recursive printer (spec.md §6 "Debug IR format").
//!
//! One line per top-level `Stmt`; children are rendered recursively and
//! comma-joined inline, the way the teacher's `DisplayWith`/wrapper
//! pattern in `src/debug.rs` threads a single formatting context down
//! through nested `fmt::Display` calls rather than building an
//! intermediate tree of strings.

use crate::ast::{Expr, ExprKind, FuncDecl, IfElse, Literal, Pipe, Stmt, StmtKind, VarDecl};

/// Render one top-level statement as a single debug-IR line.
pub fn print_stmt(stmt: &Stmt) -> String {
    fmt_stmt(stmt)
}

fn fmt_stmt(stmt: &Stmt) -> String {
    match &stmt.kind {
        StmtKind::Eof => "EoF{}".to_string(),
        StmtKind::FuncDecl(f) => fmt_fn_decl(f),
        StmtKind::VarDecl(v) => fmt_var_decl(v),
        StmtKind::IfElse(ie) => fmt_if_else(ie),
        StmtKind::Return(expr) => format!("Keyword{{return, ({})}}", fmt_expr_or_unit(expr.as_ref())),
        StmtKind::Expr(e) => format!("Expr{{{}}}", fmt_expr(e)),
    }
}

/// `VarDecl` has no dedicated tag in the named format list; it is a
/// `let`-keyword construct, so it rides the `Keyword{...}` form with the
/// variable name folded into the word slot (documented as an Open
/// Question decision in DESIGN.md).
fn fmt_var_decl(v: &VarDecl) -> String {
    format!("Keyword{{let {}, ({})}}", v.name, fmt_expr_or_unit(v.init.as_ref()))
}

/// `IfElse` likewise rides `Keyword{...}`, extended with `Body{}`/`Else{}`
/// child lists past the documented two fields — an additive extension,
/// not a replacement of the named form.
fn fmt_if_else(ie: &IfElse) -> String {
    let body = ie.body.iter().map(fmt_stmt).collect::<Vec<_>>().join(", ");
    let else_part = match &ie.else_body {
        Some(stmts) => stmts.iter().map(fmt_stmt).collect::<Vec<_>>().join(", "),
        None => "()".to_string(),
    };
    format!(
        "Keyword{{if, ({})}}Body{{{}}}Else{{{}}}",
        fmt_expr(&ie.cond),
        body,
        else_part
    )
}

fn fmt_fn_decl(f: &FuncDecl) -> String {
    let args = f
        .args
        .iter()
        .map(|a| format!("{}: {}", a.name, a.type_name))
        .collect::<Vec<_>>()
        .join(", ");
    let body = f.body.iter().map(fmt_stmt).collect::<Vec<_>>().join(", ");
    format!("FnDecl{{{}, Args{{{}}}, Body{{{}}}}}", f.name, args, body)
}

fn fmt_expr(e: &Expr) -> String {
    match &e.kind {
        ExprKind::Literal(Literal::Int(n)) => format!("Literal{{{}}}", n),
        ExprKind::Literal(Literal::Str(s)) => {
            format!("Literal{{{}}}", serde_json::to_string(s).unwrap())
        }
        ExprKind::Ident(name) => format!("Ident{{{}}}", name),
        ExprKind::Binop { op, lhs, rhs } => {
            format!("BinOp{{{}, {}, {}}}", fmt_expr(lhs), op.as_str(), fmt_expr(rhs))
        }
        ExprKind::Call(call) => {
            let args = call.args.iter().map(fmt_expr).collect::<Vec<_>>().join(", ");
            format!("FnCall{{{}, ({})}}", call.name, args)
        }
        ExprKind::Pipe(p) => fmt_pipe(p),
        ExprKind::Group(inner) => format!("({})", fmt_expr(inner)),
        ExprKind::FuncDecl(f) => fmt_fn_decl(f),
    }
}

fn fmt_pipe(p: &Pipe) -> String {
    match &p.next {
        Some(next) => format!("Pipe{{{} |> {}}}", fmt_expr(&p.value), fmt_pipe(next)),
        None => fmt_expr(&p.value),
    }
}

fn fmt_expr_or_unit(expr: Option<&Expr>) -> String {
    match expr {
        Some(e) => fmt_expr(e),
        None => "()".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn stmts(src: &str) -> Vec<Stmt> {
        let (stmts, err) = Parser::new(src).parse_program();
        assert!(err.is_none());
        stmts
    }

    #[test]
    fn eof_prints_empty_braces() {
        let stmts = stmts("");
        assert_eq!(print_stmt(stmts.last().unwrap()), "EoF{}");
    }

    #[test]
    fn literal_int_prints_json() {
        let stmts = stmts("5;");
        assert_eq!(print_stmt(&stmts[0]), "Expr{Literal{5}}");
    }

    #[test]
    fn binop_prints_operands_and_symbol() {
        let stmts = stmts("1 + 2;");
        assert_eq!(print_stmt(&stmts[0]), "Expr{BinOp{Literal{1}, +, Literal{2}}}");
    }

    #[test]
    fn fn_call_prints_name_and_args() {
        let stmts = stmts("f(1, 2);");
        assert_eq!(print_stmt(&stmts[0]), "Expr{FnCall{f, (Literal{1}, Literal{2})}}");
    }

    #[test]
    fn pipe_chain_prints_recursively() {
        let stmts = stmts("a |> f;");
        assert_eq!(print_stmt(&stmts[0]), "Expr{Pipe{Ident{a} |> Ident{f}}}");
    }

    #[test]
    fn return_without_value_prints_unit() {
        let stmts = stmts("fn f() { return; }");
        let f = match &stmts[0].kind {
            StmtKind::FuncDecl(f) => f,
            _ => panic!(),
        };
        assert_eq!(fmt_stmt(&f.body[0]), "Keyword{return, ()}");
    }

    #[test]
    fn fn_decl_prints_name_args_and_body() {
        let stmts = stmts("fn add(a: u8, b: u8) -> u8 { return a + b; }");
        let rendered = print_stmt(&stmts[0]);
        assert!(rendered.starts_with("FnDecl{add, Args{a: u8, b: u8}, Body{"));
        assert!(rendered.contains("BinOp{Ident{a}, +, Ident{b}}"));
    }
}
