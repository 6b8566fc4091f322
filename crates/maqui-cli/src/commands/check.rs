// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `maqui check <path>`: report syntax and type errors.
//!
//! Syntax errors are rendered with source context; semantic errors are
//! printed one per line as `path: message`. Any error makes the command
//! exit non-zero.

use camino::Utf8Path;
use maqui_core::CompilerOptions;
use maqui_core::semantic_analysis::CompileError;
use miette::Result;
use tracing::debug;

use super::{compile, read_source};
use crate::diagnostic::SourceDiagnostic;

/// Everything `check` found in one file.
#[derive(Debug)]
pub struct CheckOutcome {
    pub syntax: Vec<SourceDiagnostic>,
    pub semantic: Vec<CompileError>,
}

impl CheckOutcome {
    pub fn error_count(&self) -> usize {
        self.syntax.len() + self.semantic.len()
    }
}

pub fn run(path: &Utf8Path, options: &CompilerOptions) -> Result<()> {
    let source = read_source(path)?;
    let outcome = check_source(path.as_str(), &source, options)?;
    let count = outcome.error_count();

    for diag in outcome.syntax {
        eprintln!("{:?}", miette::Report::new(diag));
    }
    for err in &outcome.semantic {
        eprintln!("{path}: {err}");
    }

    if count > 0 {
        let plural = if count == 1 { "" } else { "s" };
        miette::bail!("{count} error{plural} found in {path}");
    }
    println!("{path}: ok");
    Ok(())
}

/// Compiles `source` and collects its diagnostics.
///
/// # Errors
///
/// Returns the lexical error report if the source cannot be tokenized.
pub fn check_source(
    filename: &str,
    source: &str,
    options: &CompilerOptions,
) -> Result<CheckOutcome> {
    let ast = compile(filename, source, options)?;
    let syntax = ast
        .syntax_errors()
        .into_iter()
        .map(|err| SourceDiagnostic::from_syntax_error(err, filename, source))
        .collect::<Vec<_>>();
    debug!(
        filename,
        syntax_errors = syntax.len(),
        semantic_errors = ast.errors.len(),
        "checked"
    );
    Ok(CheckOutcome {
        syntax,
        semantic: ast.errors,
    })
}
