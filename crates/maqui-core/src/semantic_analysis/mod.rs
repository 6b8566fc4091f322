// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Semantic analysis for maqui.
//!
//! The [`ContextAnalyser`] pulls statements from an
//! [`ExprStream`](crate::ast::ExprStream) and:
//! - resolves identifiers and function names through a stack of scopes
//! - infers the type of every expression and checks operator use
//! - records each statement together with the scope it was analysed in; a
//!   function declaration carries its body scope, which starts out with a
//!   copy of the enclosing entries
//!
//! Analysis never stops at an error. Failed expressions get a [`TypeErr`]
//! type that propagates upward without producing further diagnostics.

use tracing::{debug, trace};

use crate::ast::{
    AnnotatedExpr, Ast, BinaryExpr, BinaryOp, Expr, ExprStream, FuncCall, FuncDecl, LiteralKind,
    UnaryExpr, UnaryOp,
};

pub mod builtins;
pub mod error;
pub mod scope;
pub mod types;


pub use builtins::{BUILTIN_NAMES, define_builtins};
pub use error::CompileError;
pub use scope::{ScopeRef, SymbolTable};
pub use types::{ArgumentType, BasicType, FuncType, Type, TypeErr};

/// Returns `true` if `op` is defined for operands of type `ty`.
///
/// | Type | Operators |
/// |------|-----------|
/// | `int` | `+` `-` `*` |
/// | `string` | `+` |
fn binary_supported(ty: &Type, op: BinaryOp) -> bool {
    match ty {
        Type::Basic(basic) => match basic.name.as_str() {
            "int" => true,
            "string" => op == BinaryOp::Addition,
            _ => false,
        },
        Type::Func(_) | Type::Err(_) => false,
    }
}

/// Returns `true` if `op` is defined for an operand of type `ty`.
fn unary_supported(ty: &Type, op: UnaryOp) -> bool {
    match op {
        UnaryOp::Negative => matches!(ty, Type::Basic(basic) if basic.name == "int"),
    }
}

/// Resolves names and types for a stream of statements.
#[derive(Debug)]
pub struct ContextAnalyser<S> {
    source: S,
    /// Innermost scope last. Empty outside of [`run`](Self::run).
    scopes: Vec<ScopeRef>,
    errors: Vec<CompileError>,
}

impl<S: ExprStream> ContextAnalyser<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            scopes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Seeds `global` with the builtin declarations.
    pub fn define(&self, global: &mut SymbolTable) {
        define_builtins(global);
    }

    /// Analyses every statement of the source with `global` as the
    /// outermost scope.
    pub fn run(&mut self, global: ScopeRef) -> Ast {
        self.scopes = vec![global.clone()];
        self.errors.clear();

        let mut statements = Vec::new();
        loop {
            let mut expr = self.source.get();
            if matches!(expr, Expr::EndOfStatements) {
                break;
            }
            let (ty, scope) = match &mut expr {
                Expr::FuncDecl(decl) => (Type::Func(FuncType::default()), self.resolve_func(decl)),
                other => {
                    let scope = self.current_scope();
                    (self.resolve(other), scope)
                }
            };
            trace!(statement = %expr, %ty, "analysed statement");
            statements.push(AnnotatedExpr { expr, scope });
        }
        self.scopes.clear();

        let filename = self.source.filename();
        debug!(
            filename,
            statements = statements.len(),
            errors = self.errors.len(),
            "context analysis finished"
        );

        Ast {
            filename: filename.into(),
            statements,
            errors: std::mem::take(&mut self.errors),
            global,
        }
    }

    /// Returns the statement provider.
    pub fn into_source(self) -> S {
        self.source
    }

    fn current_scope(&self) -> ScopeRef {
        match self.scopes.last() {
            Some(scope) => scope.clone(),
            None => ScopeRef::default(),
        }
    }

    /// Looks `name` up, innermost scope first.
    fn lookup(&self, name: &str) -> Option<Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.borrow().get(name).cloned())
    }

    /// Records `error` in the innermost scope and in the flat list.
    fn report(&mut self, error: CompileError) {
        trace!(%error, "semantic error");
        if let Some(scope) = self.scopes.last() {
            scope.borrow_mut().push_error(error.clone());
        }
        self.errors.push(error);
    }

    fn resolve(&mut self, expr: &mut Expr) -> Type {
        match expr {
            Expr::FuncDecl(decl) => {
                self.resolve_func(decl);
                Type::Func(FuncType::default())
            }
            Expr::VariableDecl(decl) => {
                let ty = self.resolve(&mut decl.value);
                self.current_scope()
                    .borrow_mut()
                    .define(decl.name.clone(), ty.clone());
                decl.resolved_type = Some(ty.clone());
                ty
            }
            Expr::FuncCall(call) => self.resolve_call(call),
            Expr::Binary(bin) => self.resolve_binary(bin),
            Expr::Unary(un) => self.resolve_unary(un),
            Expr::Literal(lit) => match lit.kind {
                LiteralKind::Number => Type::int(),
                LiteralKind::String => Type::string(),
            },
            Expr::Identifier(ident) => match self.lookup(&ident.name) {
                Some(ty) => ty,
                None => {
                    self.report(CompileError::undefined(ident.name.clone()));
                    Type::Err(TypeErr::Undefined)
                }
            },
            // Already reported by the parser
            Expr::Bad(_) | Expr::EndOfStatements => Type::Err(TypeErr::Undefined),
        }
    }

    /// Declares `decl` in the current scope and analyses its body in a new
    /// scope seeded with the enclosing entries. Returns the body scope.
    fn resolve_func(&mut self, decl: &mut FuncDecl) -> ScopeRef {
        let enclosing = self.current_scope();
        enclosing
            .borrow_mut()
            .define(decl.name.clone(), Type::Func(FuncType::default()));

        let mut body = SymbolTable::new();
        body.import(&enclosing.borrow());
        let body = ScopeRef::new(body);

        self.scopes.push(body.clone());
        for stmt in &mut decl.body {
            self.resolve(stmt);
        }
        self.scopes.pop();
        body
    }

    /// A callee with exactly one return type yields that type; any other
    /// callee yields its own type. Arguments are resolved for their
    /// diagnostics only.
    fn resolve_call(&mut self, call: &mut FuncCall) -> Type {
        let callee = self.lookup(&call.name);
        if callee.is_none() {
            self.report(CompileError::undefined(call.name.clone()));
        }
        for arg in &mut call.args {
            self.resolve(arg);
        }

        match callee {
            None => Type::Err(TypeErr::Undefined),
            Some(Type::Func(func)) if func.returns.len() == 1 => {
                Type::Basic(func.returns[0].clone())
            }
            Some(ty) => ty,
        }
    }

    fn resolve_binary(&mut self, bin: &mut BinaryExpr) -> Type {
        let left = self.resolve(&mut bin.left);
        let right = self.resolve(&mut bin.right);

        if left.is_err() {
            return left;
        }
        if right.is_err() {
            return right;
        }
        if !left.equals(&right) {
            self.report(CompileError::IncompatibleTypes {
                type1: left,
                type2: right,
            });
            return Type::Err(TypeErr::Incompatible);
        }
        if !binary_supported(&left, bin.op) {
            self.report(CompileError::UndefinedOperation {
                ty: left,
                op: bin.op,
            });
            return Type::Err(TypeErr::Incompatible);
        }
        left
    }

    fn resolve_unary(&mut self, un: &mut UnaryExpr) -> Type {
        let operand = self.resolve(&mut un.operand);
        if operand.is_err() {
            return operand;
        }
        if !unary_supported(&operand, un.op) {
            self.report(CompileError::UndefinedUnitary {
                ty: operand,
                op: un.op,
            });
            return Type::Err(TypeErr::Incompatible);
        }
        operand
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BadExpr, ExprBuffer, VariableDecl};
    use crate::source_analysis::{Location, SyntaxError};

    /// A global scope holding the builtins plus `entries`.
    fn global_with(entries: &[(&str, Type)]) -> SymbolTable {
        let mut table = SymbolTable::new();
        define_builtins(&mut table);
        for (name, ty) in entries {
            table.define(*name, ty.clone());
        }
        table
    }

    fn with_errors(mut table: SymbolTable, errors: &[CompileError]) -> SymbolTable {
        for error in errors {
            table.push_error(error.clone());
        }
        table
    }

    fn analyse(exprs: Vec<Expr>) -> Ast {
        let mut analyser = ContextAnalyser::new(ExprBuffer::new("testing", exprs));
        let mut global = SymbolTable::new();
        analyser.define(&mut global);
        analyser.run(ScopeRef::new(global))
    }

    fn expected_ast(statements: Vec<(Expr, SymbolTable)>, global: SymbolTable) -> Ast {
        let errors = global.errors().to_vec();
        Ast {
            filename: "testing".into(),
            statements: statements
                .into_iter()
                .map(|(expr, scope)| AnnotatedExpr {
                    expr,
                    scope: ScopeRef::new(scope),
                })
                .collect(),
            errors,
            global: ScopeRef::new(global),
        }
    }

    fn resolved(name: &str, value: Expr, ty: Type) -> Expr {
        Expr::VariableDecl(VariableDecl {
            name: name.into(),
            value: Box::new(value),
            resolved_type: Some(ty),
        })
    }

    fn one_plus(right: Expr) -> Expr {
        Expr::binary(BinaryOp::Addition, Expr::number("1"), right)
    }

    fn func_type() -> Type {
        Type::Func(FuncType::default())
    }

    #[test]
    fn var_sum_int_in_function() {
        let ast = analyse(vec![Expr::func(
            "main",
            vec![Expr::variable("x", one_plus(Expr::number("1")))],
        )]);

        let global = global_with(&[("main", func_type())]);
        let body = global_with(&[("main", func_type()), ("x", Type::int())]);
        let expected = expected_ast(
            vec![(
                Expr::func(
                    "main",
                    vec![resolved("x", one_plus(Expr::number("1")), Type::int())],
                ),
                body,
            )],
            global,
        );
        assert_eq!(ast, expected);
        assert!(!ast.statements[0].scope.ptr_eq(&ast.global));
    }

    #[test]
    fn incompatible_type_int_string() {
        let ast = analyse(vec![Expr::variable("x", one_plus(Expr::string("text")))]);

        let error = CompileError::IncompatibleTypes {
            type1: Type::int(),
            type2: Type::string(),
        };
        let global = with_errors(
            global_with(&[("x", Type::Err(TypeErr::Incompatible))]),
            &[error],
        );
        let expected = expected_ast(
            vec![(
                resolved(
                    "x",
                    one_plus(Expr::string("text")),
                    Type::Err(TypeErr::Incompatible),
                ),
                global.clone(),
            )],
            global,
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn function_declaration_then_call() {
        let ast = analyse(vec![Expr::func("foo", vec![]), Expr::call("foo", vec![])]);

        let global = global_with(&[("foo", func_type())]);
        let expected = expected_ast(
            vec![
                (Expr::func("foo", vec![]), global.clone()),
                (Expr::call("foo", vec![]), global.clone()),
            ],
            global,
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn function_call_undefined() {
        let ast = analyse(vec![Expr::call("foo", vec![])]);

        let global = with_errors(global_with(&[]), &[CompileError::undefined("foo")]);
        let expected = expected_ast(vec![(Expr::call("foo", vec![]), global.clone())], global);
        assert_eq!(ast, expected);
    }

    #[test]
    fn identifier_undefined() {
        let ast = analyse(vec![Expr::identifier("x")]);

        let global = with_errors(global_with(&[]), &[CompileError::undefined("x")]);
        let expected = expected_ast(vec![(Expr::identifier("x"), global.clone())], global);
        assert_eq!(ast, expected);
    }

    #[test]
    fn unary_negative_immediate() {
        let ast = analyse(vec![Expr::negative(Expr::number("1"))]);

        let global = global_with(&[]);
        let expected = expected_ast(
            vec![(Expr::negative(Expr::number("1")), global.clone())],
            global,
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn unary_negative_string() {
        let ast = analyse(vec![Expr::negative(Expr::string("foo"))]);

        let error = CompileError::UndefinedUnitary {
            ty: Type::string(),
            op: UnaryOp::Negative,
        };
        let global = with_errors(global_with(&[]), &[error]);
        let expected = expected_ast(
            vec![(Expr::negative(Expr::string("foo")), global.clone())],
            global,
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn string_subtraction() {
        let expr = Expr::binary(
            BinaryOp::Subtraction,
            Expr::string("foo"),
            Expr::string("bar"),
        );
        let ast = analyse(vec![expr.clone()]);

        let error = CompileError::UndefinedOperation {
            ty: Type::string(),
            op: BinaryOp::Subtraction,
        };
        let global = with_errors(global_with(&[]), &[error]);
        let expected = expected_ast(vec![(expr, global.clone())], global);
        assert_eq!(ast, expected);
    }

    #[test]
    fn var_int_literal_sum() {
        let ast = analyse(vec![
            Expr::variable("x", one_plus(Expr::number("1"))),
            Expr::variable("y", one_plus(Expr::identifier("x"))),
        ]);

        let global = global_with(&[("x", Type::int()), ("y", Type::int())]);
        let expected = expected_ast(
            vec![
                (
                    resolved("x", one_plus(Expr::number("1")), Type::int()),
                    global.clone(),
                ),
                (
                    resolved("y", one_plus(Expr::identifier("x")), Type::int()),
                    global.clone(),
                ),
            ],
            global,
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn var_declaration_undefined_operand() {
        let ast = analyse(vec![Expr::variable("y", one_plus(Expr::identifier("x")))]);

        let global = with_errors(
            global_with(&[("y", Type::Err(TypeErr::Undefined))]),
            &[CompileError::undefined("x")],
        );
        let expected = expected_ast(
            vec![(
                resolved(
                    "y",
                    one_plus(Expr::identifier("x")),
                    Type::Err(TypeErr::Undefined),
                ),
                global.clone(),
            )],
            global,
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn string_concatenation_is_allowed() {
        let ast = analyse(vec![Expr::variable(
            "s",
            Expr::binary(BinaryOp::Addition, Expr::string("a"), Expr::string("b")),
        )]);
        assert!(ast.errors.is_empty());
        assert_eq!(ast.global.borrow().get("s"), Some(&Type::string()));
    }

    #[test]
    fn string_multiplication_is_undefined() {
        let ast = analyse(vec![Expr::binary(
            BinaryOp::Multiplication,
            Expr::string("a"),
            Expr::string("b"),
        )]);
        assert_eq!(
            ast.errors,
            vec![CompileError::UndefinedOperation {
                ty: Type::string(),
                op: BinaryOp::Multiplication,
            }]
        );
    }

    #[test]
    fn type_errors_propagate_without_new_diagnostics() {
        // (x + 1) * -x: each undefined x is reported, nothing else
        let ast = analyse(vec![Expr::variable(
            "z",
            Expr::binary(
                BinaryOp::Multiplication,
                Expr::binary(BinaryOp::Addition, Expr::identifier("x"), Expr::number("1")),
                Expr::negative(Expr::identifier("x")),
            ),
        )]);
        assert_eq!(
            ast.errors,
            vec![CompileError::undefined("x"), CompileError::undefined("x")]
        );
        assert_eq!(
            ast.global.borrow().get("z"),
            Some(&Type::Err(TypeErr::Undefined))
        );
    }

    #[test]
    fn both_operands_are_resolved() {
        let ast = analyse(vec![Expr::binary(
            BinaryOp::Addition,
            Expr::identifier("a"),
            Expr::identifier("b"),
        )]);
        assert_eq!(
            ast.errors,
            vec![CompileError::undefined("a"), CompileError::undefined("b")]
        );
    }

    #[test]
    fn call_arguments_are_resolved_even_when_callee_is_undefined() {
        let ast = analyse(vec![Expr::call("nope", vec![Expr::identifier("missing")])]);
        assert_eq!(
            ast.errors,
            vec![
                CompileError::undefined("nope"),
                CompileError::undefined("missing")
            ]
        );
    }

    #[test]
    fn call_arity_is_not_checked() {
        let ast = analyse(vec![Expr::call(
            "print",
            vec![Expr::number("1"), Expr::number("2")],
        )]);
        assert!(ast.errors.is_empty());
    }

    #[test]
    fn call_with_single_return_yields_return_type() {
        let mut global = SymbolTable::new();
        global.define(
            "answer",
            Type::Func(FuncType::new(vec![], vec![BasicType::int()])),
        );
        global.define(
            "pair",
            Type::Func(FuncType::new(
                vec![],
                vec![BasicType::int(), BasicType::string()],
            )),
        );

        let mut analyser = ContextAnalyser::new(ExprBuffer::new(
            "testing",
            vec![
                Expr::variable("a", Expr::call("answer", vec![])),
                Expr::variable("p", Expr::call("pair", vec![])),
            ],
        ));
        let ast = analyser.run(ScopeRef::new(global));

        assert_eq!(ast.global.borrow().get("a"), Some(&Type::int()));
        assert_eq!(
            ast.global.borrow().get("p").map(ToString::to_string).as_deref(),
            Some("func() int, string")
        );
    }

    #[test]
    fn errors_in_function_body_stay_in_body_scope() {
        let ast = analyse(vec![Expr::func(
            "main",
            vec![Expr::identifier("missing")],
        )]);

        assert_eq!(ast.errors, vec![CompileError::undefined("missing")]);
        assert!(ast.global.borrow().errors().is_empty());
        let body = ast.statements[0].scope.borrow();
        assert_eq!(body.errors(), [CompileError::undefined("missing")]);
    }

    #[test]
    fn body_scope_imports_enclosing_entries() {
        let ast = analyse(vec![
            Expr::variable("outer", Expr::string("o")),
            Expr::func("main", vec![Expr::variable("inner", Expr::number("1"))]),
            Expr::variable("later", Expr::number("2")),
        ]);

        let body = ast.statements[1].scope.borrow();
        let names: Vec<&str> = body.entries().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["inner", "main", "outer", "print"]);
        // Entries are copied when the body is entered
        assert!(!body.contains("later"));
        assert!(ast.global.borrow().contains("later"));
    }

    #[test]
    fn nested_function_body_sees_every_enclosing_entry() {
        let ast = analyse(vec![
            Expr::variable("a", Expr::number("1")),
            Expr::func(
                "outer",
                vec![
                    Expr::variable("b", Expr::number("2")),
                    Expr::func(
                        "inner",
                        vec![Expr::variable(
                            "c",
                            Expr::binary(
                                BinaryOp::Addition,
                                Expr::identifier("a"),
                                Expr::identifier("b"),
                            ),
                        )],
                    ),
                ],
            ),
        ]);

        assert!(ast.errors.is_empty(), "{:?}", ast.errors);
        let outer = ast.statements[1].scope.borrow();
        assert!(outer.contains("b"));
        assert!(outer.contains("inner"));
        assert!(!outer.contains("c"));
    }

    #[test]
    fn function_body_sees_enclosing_scope_but_does_not_leak() {
        let ast = analyse(vec![
            Expr::variable("outer", Expr::number("1")),
            Expr::func(
                "main",
                vec![Expr::variable(
                    "inner",
                    Expr::binary(
                        BinaryOp::Multiplication,
                        Expr::identifier("outer"),
                        Expr::number("2"),
                    ),
                )],
            ),
            Expr::identifier("inner"),
        ]);

        assert_eq!(ast.errors, vec![CompileError::undefined("inner")]);
        assert!(!ast.global.borrow().contains("inner"));
        let Expr::FuncDecl(decl) = &ast.statements[1].expr else {
            panic!("expected a function");
        };
        assert_eq!(
            decl.body[0],
            resolved(
                "inner",
                Expr::binary(
                    BinaryOp::Multiplication,
                    Expr::identifier("outer"),
                    Expr::number("2"),
                ),
                Type::int()
            )
        );
    }

    #[test]
    fn function_can_call_itself() {
        let ast = analyse(vec![Expr::func("f", vec![Expr::call("f", vec![])])]);
        assert!(ast.errors.is_empty());
    }

    #[test]
    fn statements_of_one_block_share_their_scope() {
        let ast = analyse(vec![
            Expr::variable("a", Expr::number("1")),
            Expr::variable("b", Expr::number("2")),
        ]);

        let first = &ast.statements[0].scope;
        assert!(first.ptr_eq(&ast.statements[1].scope));
        assert!(first.ptr_eq(&ast.global));
        // Declared after the first statement, visible through its handle
        assert!(first.borrow().contains("b"));
    }

    #[test]
    fn redeclaration_overwrites_silently() {
        let ast = analyse(vec![
            Expr::variable("x", Expr::number("1")),
            Expr::variable("x", Expr::string("now a string")),
        ]);
        assert!(ast.errors.is_empty());
        assert_eq!(ast.global.borrow().get("x"), Some(&Type::string()));
    }

    #[test]
    fn bad_expressions_produce_no_diagnostics() {
        let bad = Expr::Bad(BadExpr {
            error: SyntaxError::new("expected expression, found ')'", Location::default()),
        });
        let ast = analyse(vec![
            bad.clone(),
            Expr::variable("x", one_plus(bad)),
        ]);

        assert!(ast.errors.is_empty());
        assert!(ast.has_syntax_errors());
        assert_eq!(ast.syntax_errors().len(), 2);
        assert_eq!(
            ast.global.borrow().get("x"),
            Some(&Type::Err(TypeErr::Undefined))
        );
    }

    #[test]
    fn run_can_be_repeated_with_a_fresh_global() {
        let mut analyser = ContextAnalyser::new(ExprBuffer::new(
            "testing",
            vec![Expr::identifier("x")],
        ));
        let first = analyser.run(ScopeRef::default());
        let second = analyser.run(ScopeRef::default());
        assert_eq!(first.errors.len(), 1);
        assert!(second.errors.is_empty());
        assert!(second.statements.is_empty());
        assert_eq!(analyser.into_source().filename(), "testing");
    }
}
