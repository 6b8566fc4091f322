// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error types for source analysis.
//!
//! Lexical errors are fatal: the first one ends tokenization for the whole
//! file. Syntax errors are recoverable and travel inside
//! [`BadExpr`](crate::ast::BadExpr) placeholders.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use super::Location;

/// A fatal lexical error encountered during tokenization.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind} at {location}")]
#[diagnostic(code(maqui::lex))]
pub struct LexError {
    /// The kind of lexical error.
    pub kind: LexErrorKind,
    /// The source location of the error.
    #[label("here")]
    pub location: Location,
}

impl LexError {
    /// Creates a new lexical error.
    #[must_use]
    pub fn new(kind: LexErrorKind, location: Location) -> Self {
        Self { kind, location }
    }

    /// Creates an "unexpected character" error.
    #[must_use]
    pub fn unexpected_char(c: char, location: Location) -> Self {
        Self::new(LexErrorKind::UnexpectedCharacter(c), location)
    }

    /// Creates an "unterminated string" error.
    #[must_use]
    pub fn unterminated_string(location: Location) -> Self {
        Self::new(LexErrorKind::UnterminatedString, location)
    }
}

/// The kind of lexical error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    /// A character outside the language's alphabet.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    /// End of input reached before the closing `"`.
    #[error("unterminated string literal")]
    UnterminatedString,
}

/// A malformed statement shape found by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(maqui::syntax))]
pub struct SyntaxError {
    pub message: EcoString,
    #[label("here")]
    pub location: Location,
}

impl SyntaxError {
    #[must_use]
    pub fn new(message: impl Into<EcoString>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}
