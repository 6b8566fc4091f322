// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexing and parsing for maqui source code.
//!
//! # Lexical Analysis
//!
//! The [`Lexer`] converts source text into [`Token`]s on a background thread;
//! the parser pulls them through the [`TokenStream`] trait. Each token
//! carries its source [`Location`]. [`lex`] runs the same scanner
//! synchronously.
//!
//! ```
//! use maqui_core::source_analysis::{TokenKind, lex};
//!
//! let tokens = lex("x + 1").unwrap();
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[1].kind(), TokenKind::Plus);
//! ```
//!
//! # Parsing
//!
//! The [`Parser`] turns a token stream into top-level
//! [`Expr`](crate::ast::Expr) statements, one per
//! [`ExprStream::get`](crate::ast::ExprStream::get) call.
//!
//! # Error Handling
//!
//! A [`LexError`] is fatal: the lexer stops and the token stream yields a
//! `Malformed` token. Syntax errors are not: the parser records a
//! [`SyntaxError`] in a [`BadExpr`](crate::ast::BadExpr) and moves on.

mod error;
mod lexer;
mod parser;
mod span;
mod stream;
mod token;


pub use error::{LexError, LexErrorKind, SyntaxError};
pub use lexer::{DEFAULT_TOKEN_BUFFER, Lexer, Scanner, lex};
pub use parser::Parser;
pub use span::{Location, Span};
pub use stream::{TokenBuffer, TokenReceiver, TokenStream};
pub use token::{Token, TokenKind};
