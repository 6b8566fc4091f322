// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `maqui tokens <path>`: dump the token stream.

use camino::Utf8Path;
use maqui_core::CompilerOptions;
use maqui_core::source_analysis::{Lexer, Token};
use miette::Result;

use super::read_source;
use crate::diagnostic::SourceDiagnostic;

pub fn run(path: &Utf8Path, options: &CompilerOptions) -> Result<()> {
    let source = read_source(path)?;
    for line in token_lines(path.as_str(), &source, options)? {
        println!("{line}");
    }
    Ok(())
}

/// Lexes `source` and formats one line per token.
pub fn token_lines(filename: &str, source: &str, options: &CompilerOptions) -> Result<Vec<String>> {
    let tokens = Lexer::new(filename, source)
        .with_buffer(options.token_buffer)
        .run_blocking()
        .map_err(|err| SourceDiagnostic::from_lex_error(&err, filename, source))?;
    Ok(tokens.iter().map(format_token).collect())
}

fn format_token(token: &Token) -> String {
    format!("{}\t{}\t{}", token.location(), token.kind(), token)
}
