// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Semantic analysis error types.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use super::Type;
use crate::ast::{BinaryOp, UnaryOp};

/// A semantic error discovered during analysis.
///
/// Semantic errors never stop analysis; they are collected in the scope
/// where they were found and in [`Ast::errors`](crate::ast::Ast::errors).
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum CompileError {
    /// The operands of a binary expression have different types.
    #[error("incompatible types: {type1} and {type2}")]
    #[diagnostic(code(maqui::incompatible_types))]
    IncompatibleTypes { type1: Type, type2: Type },

    /// A variable or function was referenced before being declared.
    #[error("undefined: {name}")]
    #[diagnostic(code(maqui::undefined))]
    Undefined { name: EcoString },

    /// A unary operator was applied to a type that does not support it.
    #[error("operator '{op}' is not defined for type {ty}")]
    #[diagnostic(code(maqui::undefined_unary))]
    UndefinedUnitary { ty: Type, op: UnaryOp },

    /// A binary operator was applied to a type that does not support it.
    #[error("operator '{op}' is not defined for type {ty}")]
    #[diagnostic(
        code(maqui::undefined_operation),
        help("int supports + - *, string supports +")
    )]
    UndefinedOperation { ty: Type, op: BinaryOp },
}

impl CompileError {
    #[must_use]
    pub fn undefined(name: impl Into<EcoString>) -> Self {
        Self::Undefined { name: name.into() }
    }
}
