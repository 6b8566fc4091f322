// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! CLI command implementations.

pub mod ast;
pub mod check;
pub mod tokens;

use camino::Utf8Path;
use maqui_core::ast::Ast;
use maqui_core::{Compiler, CompilerOptions, FatalError};
use miette::Result;

use crate::diagnostic::SourceDiagnostic;

/// Reads a source file, reporting failures the same way the compiler does.
pub fn read_source(path: &Utf8Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| {
        FatalError::Io {
            path: path.to_owned(),
            source,
        }
        .into()
    })
}

/// Compiles in-memory source, turning a lexical error into a report that
/// shows the offending line.
pub fn compile(filename: &str, source: &str, options: &CompilerOptions) -> Result<Ast> {
    match Compiler::new(options.clone()).compile_source(filename, source) {
        Ok(ast) => Ok(ast),
        Err(FatalError::Lex(err)) => {
            Err(SourceDiagnostic::from_lex_error(&err, filename, source).into())
        }
        Err(err) => Err(err.into()),
    }
}
