// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Shared pre-order walker over [`Expr`] trees.
//!
//! Passes that need threaded state (the context analyser tracks scopes) keep
//! their own recursion. This module covers the plain visitor case.

use crate::ast::Expr;

/// Recursively walks an expression tree in pre-order, calling `f` on every node.
///
/// The visitor is called on the current node **before** recursing into its
/// children.
pub(crate) fn walk_expr<'a, F>(expr: &'a Expr, f: &mut F)
where
    F: FnMut(&'a Expr),
{
    f(expr);
    match expr {
        Expr::FuncDecl(decl) => {
            for stmt in &decl.body {
                walk_expr(stmt, f);
            }
        }
        Expr::VariableDecl(decl) => walk_expr(&decl.value, f),
        Expr::FuncCall(call) => {
            for arg in &call.args {
                walk_expr(arg, f);
            }
        }
        Expr::Binary(bin) => {
            walk_expr(&bin.left, f);
            walk_expr(&bin.right, f);
        }
        Expr::Unary(un) => walk_expr(&un.operand, f),
        Expr::Literal(_) | Expr::Identifier(_) | Expr::Bad(_) | Expr::EndOfStatements => {}
    }
}
