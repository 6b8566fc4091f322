// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source-annotated error reports using miette.
//!
//! Lexical and syntax errors carry a location, so they are rendered with the
//! offending line and an arrow under the error.

// Suppress unused_assignments for struct fields used by derive macros
#![allow(unused_assignments)]

use maqui_core::source_analysis::{LexError, Location, SyntaxError};
use miette::{Diagnostic, SourceSpan};

/// An error with the source text it points into.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(maqui::compile))]
pub struct SourceDiagnostic {
    /// Human-readable error message
    pub message: String,
    /// Source code for context
    #[source_code]
    pub src: miette::NamedSource<String>,
    /// Location of the error
    #[label("{label}")]
    pub span: SourceSpan,
    /// Label for the error span (interpolated by miette derive macro)
    pub label: String,
}

impl SourceDiagnostic {
    fn new(message: String, location: Location, source_path: &str, source: &str) -> Self {
        Self {
            message,
            src: miette::NamedSource::new(source_path, source.to_string()),
            span: location.into(),
            label: format!("at {location}"),
        }
    }

    pub fn from_syntax_error(error: &SyntaxError, source_path: &str, source: &str) -> Self {
        Self::new(error.message.to_string(), error.location, source_path, source)
    }

    pub fn from_lex_error(error: &LexError, source_path: &str, source: &str) -> Self {
        Self::new(error.kind.to_string(), error.location, source_path, source)
    }
}
