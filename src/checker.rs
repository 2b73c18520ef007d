//! Two-pass type checker (spec.md §4.4).
//!
//! Pass 1 registers every top-level declaration's type in the global
//! scope (inferring missing function return types along the way); pass 2
//! walks each top-level node and recursively validates it, accumulating
//! diagnostics rather than aborting on the first one — "one failed
//! top-level declaration fails the run", not the whole drive, per
//! §4.4 "Failure".

use crate::ast::{
    Expr, ExprKind, FuncCall, FuncDecl, IfElse, Literal, Stmt, StmtKind, VarDecl, UNRESOLVED_TYPE,
};
use crate::context::{TypeContext, VarEntry};
use crate::error::CompileError;
use crate::token::Position;
use crate::types::{parse_type_name, FuncBuilder, Primitive, Type, TypeKind};

pub struct Checker {
    ctx: TypeContext,
    errors: Vec<CompileError>,
}

enum ReturnInference {
    Concrete(Type),
    Void,
    InfiniteRecursion,
}

impl Checker {
    pub fn new() -> Self {
        Self { ctx: TypeContext::new(), errors: Vec::new() }
    }

    /// Runs both passes over the top-level statement list. Returns whether
    /// every top-level declaration passed, plus the full diagnostic list.
    pub fn check_program(mut self, stmts: &mut [Stmt]) -> (bool, Vec<CompileError>) {
        for stmt in stmts.iter_mut() {
            if let StmtKind::FuncDecl(f) = &mut stmt.kind {
                self.register_func_decl(f);
            }
        }
        for stmt in stmts.iter() {
            if let StmtKind::VarDecl(v) = &stmt.kind {
                self.register_var_decl(v);
            }
        }

        for stmt in stmts.iter() {
            self.check_stmt(stmt, None);
        }
        let all_ok = self.errors.is_empty();
        (all_ok, self.errors)
    }

    fn resolve_type_name(&self, name: &str) -> Result<Type, String> {
        let ctx = &self.ctx;
        parse_type_name(name, |base| {
            Primitive::from_name(base).map(Type::primitive).or_else(|| ctx.get_type(base))
        })
    }

    // -- Pass 1 ------------------------------------------------------------

    fn register_func_decl(&mut self, f: &mut FuncDecl) {
        let func_ty = self.build_func_type(f);
        if f.returns == UNRESOLVED_TYPE {
            if let TypeKind::Func { ret, .. } = func_ty.kind() {
                f.returns = ret.canonical_name();
            }
        }
        self.ctx.add_var(VarEntry { name: f.name.clone(), declared_at: f.pos.clone(), ty: func_ty });
    }

    fn register_var_decl(&mut self, v: &VarDecl) {
        let declared = v.declared_type.borrow().clone();
        let ty = if declared != UNRESOLVED_TYPE && declared != "number" {
            self.resolve_type_name(&declared).unwrap_or_else(|_| Type::any())
        } else if let Some(init) = &v.init {
            self.infer_type_quiet(init)
        } else {
            Type::any()
        };
        self.ctx.add_var(VarEntry { name: v.name.clone(), declared_at: v.pos.clone(), ty });
    }

    /// Builds the `func` type for a declaration without requiring mutable
    /// access to it — used both by `register_func_decl` (which then writes
    /// the inferred return name back onto the top-level node) and by the
    /// nested `fn`-expression case in pass 2, which has no top-level slot
    /// to write the inferred name back into and instead relies on the
    /// containing `Expr`'s `resolved_type` (see `check_expr`).
    fn build_func_type(&mut self, f: &FuncDecl) -> Type {
        let mut builder = FuncBuilder::new().name(f.name.clone());
        for arg in &f.args {
            if arg.type_name == UNRESOLVED_TYPE {
                self.errors.push(CompileError::check(
                    arg.pos.clone(),
                    format!("argument '{}' of '{}' has no declared type", arg.name, f.name),
                ));
                builder = builder.arg(arg.name.clone(), Type::any());
                continue;
            }
            match self.resolve_type_name(&arg.type_name) {
                Ok(ty) => builder = builder.arg(arg.name.clone(), ty),
                Err(msg) => {
                    self.errors.push(CompileError::resolve(arg.pos.clone(), msg));
                    builder = builder.arg(arg.name.clone(), Type::any());
                }
            }
        }

        let ret = if f.returns == UNRESOLVED_TYPE {
            match self.infer_return(f) {
                ReturnInference::Concrete(ty) => ty,
                ReturnInference::Void => Type::void(),
                ReturnInference::InfiniteRecursion => {
                    self.errors.push(CompileError::check(
                        f.pos.clone(),
                        format!("cannot infer infinitely recursive return type of '{}'", f.name),
                    ));
                    Type::any()
                }
            }
        } else {
            match self.resolve_type_name(&f.returns) {
                Ok(ty) => ty,
                Err(msg) => {
                    self.errors.push(CompileError::resolve(f.pos.clone(), msg));
                    Type::any()
                }
            }
        };

        builder.ret(ret).build()
    }

    fn infer_return(&self, f: &FuncDecl) -> ReturnInference {
        let mut saw_return = false;
        let mut saw_self_recursive_only = false;
        match self.collect_return_type(&f.body, &f.name, &mut saw_return, &mut saw_self_recursive_only) {
            Some(ty) => ReturnInference::Concrete(ty),
            None if saw_return && saw_self_recursive_only => ReturnInference::InfiniteRecursion,
            None => ReturnInference::Void,
        }
    }

    fn collect_return_type(
        &self,
        body: &[Stmt],
        fn_name: &str,
        saw_return: &mut bool,
        saw_self_recursive_only: &mut bool,
    ) -> Option<Type> {
        for stmt in body {
            match &stmt.kind {
                StmtKind::Return(None) => {
                    *saw_return = true;
                    return Some(Type::void());
                }
                StmtKind::Return(Some(expr)) => {
                    *saw_return = true;
                    if is_self_recursive_call(expr, fn_name) {
                        *saw_self_recursive_only = true;
                        continue;
                    }
                    return Some(self.infer_type_quiet(expr));
                }
                StmtKind::IfElse(ie) => {
                    if let Some(ty) =
                        self.collect_return_type(&ie.body, fn_name, saw_return, saw_self_recursive_only)
                    {
                        return Some(ty);
                    }
                    if let Some(else_body) = &ie.else_body {
                        if let Some(ty) = self.collect_return_type(
                            else_body,
                            fn_name,
                            saw_return,
                            saw_self_recursive_only,
                        ) {
                            return Some(ty);
                        }
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// A quiet, best-effort type inference used only while pass 1 is still
    /// populating the context (so identifiers forward of the current
    /// declaration resolve to `any` rather than producing premature
    /// diagnostics that pass 2 will re-derive correctly anyway).
    fn infer_type_quiet(&self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::Literal(Literal::Str(_)) => Type::primitive(Primitive::String),
            ExprKind::Literal(Literal::Int(_)) => Type::primitive(Primitive::Sisz),
            ExprKind::Ident(name) => self.ctx.get_var(name).map(|v| v.ty.clone()).unwrap_or_else(Type::any),
            ExprKind::Call(c) => self.func_return_type(&c.name),
            ExprKind::Binop { op, lhs, .. } => {
                if op.is_logic() || op.is_comparison() {
                    Type::primitive(Primitive::Bool)
                } else {
                    self.infer_type_quiet(lhs)
                }
            }
            ExprKind::Group(inner) => self.infer_type_quiet(inner),
            ExprKind::Pipe(p) => match crate::pipe::desugar_pipe(p) {
                Ok(call) => self.func_return_type(&call.name),
                Err(_) => Type::any(),
            },
            ExprKind::FuncDecl(_) => Type::any(),
        }
    }

    fn func_return_type(&self, name: &str) -> Type {
        self.ctx
            .get_var(name)
            .and_then(|v| match v.ty.kind() {
                TypeKind::Func { ret, .. } => Some(ret.clone()),
                _ => None,
            })
            .unwrap_or_else(Type::any)
    }

    // -- Pass 2 ------------------------------------------------------------

    fn check_stmt(&mut self, stmt: &Stmt, enclosing_fn: Option<&Type>) {
        match &stmt.kind {
            StmtKind::Eof => {}
            StmtKind::FuncDecl(f) => {
                // `fn-decl` is also a valid `stmt` (reachable from a block,
                // not just top level via Pass 1's loop), so a nested
                // declaration needs the same registration Pass 1 gives a
                // top-level one — otherwise sibling statements (and the
                // function's own self-recursive calls) can never resolve
                // its name.
                let func_ty = match self.ctx.get_var(&f.name) {
                    Some(v) => v.ty.clone(),
                    None => {
                        let func_ty = self.build_func_type(f);
                        self.ctx.add_var(VarEntry {
                            name: f.name.clone(),
                            declared_at: f.pos.clone(),
                            ty: func_ty.clone(),
                        });
                        func_ty
                    }
                };
                self.check_func_body(&func_ty, f);
            }
            StmtKind::VarDecl(v) => self.check_var_decl(v),
            StmtKind::IfElse(ie) => self.check_if_else(ie, enclosing_fn),
            StmtKind::Return(expr) => self.check_return(expr, stmt.pos.clone(), enclosing_fn),
            StmtKind::Expr(e) => {
                self.check_expr(e);
            }
        }
    }

    fn check_func_body(&mut self, func_ty: &Type, f: &FuncDecl) {
        self.ctx.push_scope();
        if let TypeKind::Func { args, .. } = func_ty.kind() {
            for (name, ty) in args {
                self.ctx.add_var(VarEntry { name: name.clone(), declared_at: f.pos.clone(), ty: ty.clone() });
            }
        }
        for stmt in &f.body {
            self.check_stmt(stmt, Some(func_ty));
        }
        self.ctx.pop_scope();
    }

    fn check_var_decl(&mut self, v: &VarDecl) {
        if let Some(existing) = self.ctx.has_var_in_current_scope(&v.name) {
            if existing.declared_at != v.pos {
                self.errors
                    .push(CompileError::check(v.pos.clone(), format!("redeclaration of '{}'", v.name)));
            }
        }

        let declared = v.declared_type.borrow().clone();

        if declared == UNRESOLVED_TYPE && v.init.is_none() {
            self.errors.push(CompileError::check(
                v.pos.clone(),
                format!("'{}' has no declared type and no initializer", v.name),
            ));
            return;
        }

        let resolved = if let Some(init) = &v.init {
            let init_ty = self.check_expr(init);
            if declared == UNRESOLVED_TYPE {
                init_ty
            } else if declared == "number" {
                if !init_ty.is_number() {
                    self.errors.push(CompileError::check(
                        v.pos.clone(),
                        format!("expected a numeric initializer for '{}', received {}", v.name, init_ty),
                    ));
                }
                init_ty
            } else {
                match self.resolve_type_name(&declared) {
                    Ok(ty) => {
                        if init.is_literal_origin() && ty.is_number() && init_ty.is_number() {
                            init.set_ty(ty.clone());
                        } else if !init_ty.equivalent(&ty) {
                            self.errors.push(CompileError::check(
                                v.pos.clone(),
                                format!("expected {}, received {}", ty, init_ty),
                            ));
                        }
                        ty
                    }
                    Err(msg) => {
                        self.errors.push(CompileError::resolve(v.pos.clone(), msg));
                        Type::any()
                    }
                }
            }
        } else {
            match self.resolve_type_name(&declared) {
                Ok(ty) => ty,
                Err(msg) => {
                    self.errors.push(CompileError::resolve(v.pos.clone(), msg));
                    Type::any()
                }
            }
        };

        // `declared_type` is left as originally written (including the
        // "()" / "number" sentinels) so the backends can tell an inferred
        // declaration from an explicit one; `resolved_type` is the
        // checker's authoritative answer either way.
        *v.resolved_type.borrow_mut() = Some(resolved.clone());
        self.ctx.add_var(VarEntry { name: v.name.clone(), declared_at: v.pos.clone(), ty: resolved });
    }

    fn check_if_else(&mut self, ie: &IfElse, enclosing_fn: Option<&Type>) {
        let cond_ty = self.check_expr(&ie.cond);
        if !cond_ty.equivalent(&Type::primitive(Primitive::Bool)) {
            self.errors.push(CompileError::check(
                ie.cond.pos.clone(),
                format!("if condition must be bool, received {}", cond_ty),
            ));
        }
        self.ctx.push_scope();
        for s in &ie.body {
            self.check_stmt(s, enclosing_fn);
        }
        self.ctx.pop_scope();
        if let Some(else_body) = &ie.else_body {
            self.ctx.push_scope();
            for s in else_body {
                self.check_stmt(s, enclosing_fn);
            }
            self.ctx.pop_scope();
        }
    }

    fn check_return(&mut self, expr_opt: &Option<Expr>, pos: Position, enclosing_fn: Option<&Type>) {
        let ret_ty = enclosing_fn
            .and_then(|f| match f.kind() {
                TypeKind::Func { ret, .. } => Some(ret.clone()),
                _ => None,
            })
            .unwrap_or_else(Type::void);
        let actual = match expr_opt {
            Some(e) => self.check_expr(e),
            None => Type::void(),
        };
        if !actual.equivalent(&ret_ty) {
            self.errors.push(CompileError::check(
                pos,
                format!("return type mismatch: expected {}, received {}", ret_ty, actual),
            ));
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> Type {
        let ty = match &expr.kind {
            ExprKind::Literal(Literal::Str(_)) => Type::primitive(Primitive::String),
            ExprKind::Literal(Literal::Int(_)) => Type::primitive(Primitive::Sisz),
            ExprKind::Ident(name) => match self.ctx.get_var(name) {
                Some(v) => v.ty.clone(),
                None => {
                    self.errors.push(CompileError::check(
                        expr.pos.clone(),
                        format!("undeclared identifier '{}'", name),
                    ));
                    Type::any()
                }
            },
            ExprKind::Binop { op, lhs, rhs } => {
                let lhs_ty = self.check_expr(lhs);
                let rhs_ty = self.check_expr(rhs);
                if op.is_logic() {
                    let bool_ty = Type::primitive(Primitive::Bool);
                    if !lhs_ty.equivalent(&bool_ty) || !rhs_ty.equivalent(&bool_ty) {
                        self.errors.push(CompileError::check(
                            expr.pos.clone(),
                            format!("'{}' requires bool operands", op.as_str()),
                        ));
                    }
                    bool_ty
                } else if op.is_comparison() {
                    if !lhs_ty.equivalent(&rhs_ty) {
                        self.errors.push(CompileError::check(
                            expr.pos.clone(),
                            format!("cannot compare {} with {}", lhs_ty, rhs_ty),
                        ));
                    }
                    Type::primitive(Primitive::Bool)
                } else {
                    if !lhs_ty.is_number() || !rhs_ty.is_number() {
                        self.errors.push(CompileError::check(
                            expr.pos.clone(),
                            format!("'{}' requires numeric operands", op.as_str()),
                        ));
                    }
                    if lhs.is_literal_origin() && !rhs.is_literal_origin() && rhs_ty.is_number() {
                        rhs_ty
                    } else {
                        lhs_ty
                    }
                }
            }
            ExprKind::Call(call) => self.check_call(call, &expr.pos),
            ExprKind::Pipe(p) => match crate::pipe::desugar_pipe(p) {
                Ok(call) => self.check_call(&call, &expr.pos),
                Err(_) => {
                    self.errors.push(CompileError::parse(expr.pos.clone(), "invalid pipe target"));
                    Type::any()
                }
            },
            ExprKind::Group(inner) => self.check_expr(inner),
            ExprKind::FuncDecl(f) => self.build_func_type(f),
        };
        expr.set_ty(ty.clone());
        ty
    }

    fn check_call(&mut self, call: &FuncCall, pos: &Position) -> Type {
        let entry_ty = match self.ctx.get_var(&call.name) {
            Some(v) => v.ty.clone(),
            None => {
                self.errors.push(CompileError::check(
                    pos.clone(),
                    format!("call of undeclared identifier '{}'", call.name),
                ));
                for a in &call.args {
                    self.check_expr(a);
                }
                return Type::any();
            }
        };

        let (args, ret, variadic) = match entry_ty.kind() {
            TypeKind::Func { args, ret, variadic, .. } => (args.clone(), ret.clone(), variadic.clone()),
            _ => {
                self.errors
                    .push(CompileError::check(pos.clone(), format!("'{}' is not callable", call.name)));
                for a in &call.args {
                    self.check_expr(a);
                }
                return Type::any();
            }
        };

        let required = args.len();
        if variadic.is_some() {
            if call.args.len() < required {
                self.errors.push(CompileError::check(
                    pos.clone(),
                    format!(
                        "'{}' expects at least {} argument(s), received {}",
                        call.name,
                        required,
                        call.args.len()
                    ),
                ));
            }
        } else if call.args.len() != required {
            self.errors.push(CompileError::check(
                pos.clone(),
                format!("'{}' expects {} argument(s), received {}", call.name, required, call.args.len()),
            ));
        }

        for (i, arg) in call.args.iter().enumerate() {
            if i < required {
                self.check_call_arg(arg, &args[i].1);
            } else if let Some((_, Some(elem_ty))) = &variadic {
                self.check_call_arg(arg, elem_ty);
            } else {
                self.check_expr(arg);
            }
        }

        ret
    }

    fn check_call_arg(&mut self, arg: &Expr, param_ty: &Type) {
        let arg_ty = self.check_expr(arg);
        if arg.is_literal_origin() && param_ty.is_number() && arg_ty.is_number() {
            arg.set_ty(param_ty.clone());
            return;
        }
        if !arg_ty.equivalent(param_ty) {
            self.errors.push(CompileError::check(
                arg.pos.clone(),
                format!("argument type mismatch: expected {}, received {}", param_ty, arg_ty),
            ));
        }
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

fn is_self_recursive_call(expr: &Expr, fn_name: &str) -> bool {
    matches!(&expr.kind, ExprKind::Call(c) if c.name == fn_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn check(src: &str) -> (bool, Vec<CompileError>) {
        let (mut stmts, parse_err) = Parser::new(src).parse_program();
        assert!(parse_err.is_none(), "unexpected parse error: {:?}", parse_err);
        Checker::new().check_program(&mut stmts)
    }

    #[test]
    fn scenario_e_type_mismatch_is_rejected() {
        let (ok, errors) = check("let x: bool = 5;");
        assert!(!ok);
        assert!(errors[0].message.contains("bool"));
    }

    #[test]
    fn scenario_f_variadic_printf_accepts_format_then_any() {
        let (ok, errors) = check("printf(`n=%v`, 7);");
        assert!(ok, "errors: {:?}", errors);
    }

    #[test]
    fn scenario_f_variadic_printf_rejects_non_string_format() {
        let (ok, _) = check("printf(7);");
        assert!(!ok);
    }

    #[test]
    fn infers_function_return_type_from_body() {
        let (mut stmts, _) = Parser::new("fn one() { return 1; }").parse_program();
        let (ok, errors) = Checker::new().check_program(&mut stmts);
        assert!(ok, "errors: {:?}", errors);
        match &stmts[0].kind {
            StmtKind::FuncDecl(f) => assert_eq!(f.returns, "sisz"),
            _ => panic!("expected fn decl"),
        }
    }

    #[test]
    fn infinitely_self_recursive_return_is_rejected() {
        let (ok, errors) = check("fn loop() { return loop(); }");
        assert!(!ok);
        assert!(errors[0].message.contains("infinitely recursive"));
    }

    #[test]
    fn literal_argument_is_monomorphised_to_param_base() {
        let (mut stmts, _) = Parser::new(
            "fn fizz(n: si32) -> ui8 { return 0; } fn main() { 5 |> fizz; }",
        )
        .parse_program();
        let (ok, errors) = Checker::new().check_program(&mut stmts);
        assert!(ok, "errors: {:?}", errors);
    }

    #[test]
    fn nested_fn_statement_is_callable_by_sibling_statements() {
        let (ok, errors) =
            check("fn main() { fn helper(x: si32) -> si32 { return x; } helper(5); }");
        assert!(ok, "errors: {:?}", errors);
    }

    #[test]
    fn nested_fn_statement_can_call_itself_recursively() {
        let (ok, errors) = check(
            "fn main() { fn helper(n: si32) -> si32 { if (n == 0) return 0; return helper(n - 1); } helper(3); }",
        );
        assert!(ok, "errors: {:?}", errors);
    }

    #[test]
    fn pipe_to_non_function_target_is_rejected() {
        let (ok, _) = check("5 |> 6;");
        assert!(!ok);
    }

    #[test]
    fn redeclaration_at_different_position_is_rejected() {
        let (ok, errors) = check("let x: si32 = 1; let x: si32 = 2;");
        assert!(!ok);
        assert!(errors.iter().any(|e| e.message.contains("redeclaration")));
    }
}
