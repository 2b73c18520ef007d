//! Shared pipe-chain desugaring (spec.md §4.2 "Pipe desugaring").
//!
//! Both the checker and the two backends need to turn a `Pipe` chain
//! into the `FuncCall` it denotes, so the fold lives in one place
//! instead of being re-derived per consumer.

use crate::ast::{Expr, ExprKind, FuncCall, Pipe};
use crate::token::Position;

#[derive(Debug)]
pub struct InvalidPipeTarget {
    pub pos: Position,
}

/// Fold a pipe chain `v0 |> v1 |> v2 |> … |> vN` into the `FuncCall` it
/// denotes. At each step: if `vk` is an `Ident`, the result is
/// `Call(name=vk, args=[prev])`; if `vk` is a `FuncCall(name, args)`, the
/// result is `Call(name, args ++ [prev])`.
pub fn desugar_pipe(pipe: &Pipe) -> Result<FuncCall, InvalidPipeTarget> {
    let mut prev: Expr = (*pipe.value).clone();
    let mut stage = pipe.next.as_deref();
    let mut result: Option<FuncCall> = None;

    while let Some(p) = stage {
        let call = apply_stage(&p.value, prev)?;
        prev = Expr::new(ExprKind::Call(call.clone()), p.value.pos.clone());
        result = Some(call);
        stage = p.next.as_deref();
    }

    result.ok_or(InvalidPipeTarget { pos: pipe.value.pos.clone() })
}

fn apply_stage(stage: &Expr, prev: Expr) -> Result<FuncCall, InvalidPipeTarget> {
    match &stage.kind {
        ExprKind::Ident(name) => Ok(FuncCall { name: name.clone(), args: vec![prev] }),
        ExprKind::Call(call) => {
            let mut args = call.args.clone();
            args.push(prev);
            Ok(FuncCall { name: call.name.clone(), args })
        }
        _ => Err(InvalidPipeTarget { pos: stage.pos.clone() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;
    use crate::token::Position;

    fn ident(name: &str) -> Expr {
        Expr::new(ExprKind::Ident(name.to_string()), Position::start())
    }

    fn call(name: &str, args: Vec<Expr>) -> Expr {
        Expr::new(ExprKind::Call(FuncCall { name: name.to_string(), args }), Position::start())
    }

    fn int(n: i64) -> Expr {
        Expr::new(ExprKind::Literal(Literal::Int(n)), Position::start())
    }

    #[test]
    fn simple_pipe_to_ident_becomes_call() {
        // 5 |> fizz  =>  fizz(5)
        let pipe = Pipe {
            value: Box::new(int(5)),
            next: Some(Box::new(Pipe { value: Box::new(ident("fizz")), next: None })),
        };
        let result = desugar_pipe(&pipe).unwrap();
        assert_eq!(result.name, "fizz");
        assert_eq!(result.args.len(), 1);
    }

    #[test]
    fn pipe_to_call_appends_last_positional_arg() {
        // a |> f(x)  =>  f(x, a)
        let pipe = Pipe {
            value: Box::new(ident("a")),
            next: Some(Box::new(Pipe {
                value: Box::new(call("f", vec![ident("x")])),
                next: None,
            })),
        };
        let result = desugar_pipe(&pipe).unwrap();
        assert_eq!(result.name, "f");
        assert_eq!(result.args.len(), 2);
        match &result.args[0].kind {
            ExprKind::Ident(n) => assert_eq!(n, "x"),
            _ => panic!("expected x first"),
        }
        match &result.args[1].kind {
            ExprKind::Ident(n) => assert_eq!(n, "a"),
            _ => panic!("expected a second"),
        }
    }

    #[test]
    fn chained_pipe_folds_left_to_right() {
        // a |> f |> g(x)  =>  g(x, f(a))
        let pipe = Pipe {
            value: Box::new(ident("a")),
            next: Some(Box::new(Pipe {
                value: Box::new(ident("f")),
                next: Some(Box::new(Pipe {
                    value: Box::new(call("g", vec![ident("x")])),
                    next: None,
                })),
            })),
        };
        let result = desugar_pipe(&pipe).unwrap();
        assert_eq!(result.name, "g");
        assert_eq!(result.args.len(), 2);
        match &result.args[1].kind {
            ExprKind::Call(inner) => assert_eq!(inner.name, "f"),
            _ => panic!("expected inner f(a) call"),
        }
    }

    #[test]
    fn invalid_pipe_target_is_rejected() {
        let pipe = Pipe {
            value: Box::new(ident("a")),
            next: Some(Box::new(Pipe { value: Box::new(int(5)), next: None })),
        };
        assert!(desugar_pipe(&pipe).is_err());
    }
}
