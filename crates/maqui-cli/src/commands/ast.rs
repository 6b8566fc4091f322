// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `maqui ast <path>`: print the analysed statements.
//!
//! Function bodies are indented one level per block and every variable
//! declaration is followed by the type the analyser resolved for it.

use std::fmt::Write as _;

use camino::Utf8Path;
use maqui_core::CompilerOptions;
use maqui_core::ast::{Ast, Expr};
use miette::Result;

use super::{compile, read_source};

const INDENT: &str = "    ";

pub fn run(path: &Utf8Path, options: &CompilerOptions) -> Result<()> {
    let source = read_source(path)?;
    let ast = compile(path.as_str(), &source, options)?;
    print!("{}", render(&ast));
    Ok(())
}

/// Renders every top-level statement, one per line.
pub fn render(ast: &Ast) -> String {
    let mut out = String::new();
    for stmt in &ast.statements {
        render_expr(&mut out, &stmt.expr, 0);
    }
    out
}

fn render_expr(out: &mut String, expr: &Expr, depth: usize) {
    let indent = INDENT.repeat(depth);
    match expr {
        Expr::FuncDecl(decl) => {
            let _ = writeln!(out, "{indent}func {}() {{", decl.name);
            for stmt in &decl.body {
                render_expr(out, stmt, depth + 1);
            }
            let _ = writeln!(out, "{indent}}}");
        }
        Expr::VariableDecl(decl) => {
            let ty = decl
                .resolved_type
                .as_ref()
                .map_or_else(|| "?".to_string(), ToString::to_string);
            let _ = writeln!(out, "{indent}{expr}  : {ty}");
        }
        other => {
            let _ = writeln!(out, "{indent}{other}");
        }
    }
}
