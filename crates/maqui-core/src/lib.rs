// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Maqui compiler front end.
//!
//! This crate contains the front-end pipeline:
//! - Lexical analysis (tokenization on a background thread)
//! - Parsing (AST construction with error recovery)
//! - Semantic analysis (name resolution, type checking)
//!
//! # Example
//!
//! ```
//! use maqui_core::compiler::Compiler;
//! use maqui_core::semantic_analysis::CompileError;
//!
//! let ast = Compiler::default()
//!     .compile_source("demo.mq", "x := 1 + \"two\"")
//!     .unwrap();
//! assert!(matches!(ast.errors[0], CompileError::IncompatibleTypes { .. }));
//! ```

#![doc = include_str!("../../../README.md")]

pub mod ast;
pub mod compiler;
pub mod semantic_analysis;
pub mod source_analysis;

mod ast_walker;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use compiler::{Compiler, CompilerOptions, FatalError, compile};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{Ast, Expr, ExprStream};
    pub use crate::compiler::{Compiler, CompilerOptions, FatalError};
    pub use crate::semantic_analysis::{CompileError, ContextAnalyser, ScopeRef, SymbolTable, Type};
    pub use crate::source_analysis::{Lexer, Location, Parser, Token, TokenKind, TokenStream};
}
