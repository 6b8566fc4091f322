// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for maqui source code.
//!
//! The parser pulls tokens from a [`TokenStream`] and hands out one
//! top-level statement per [`ExprStream::get`] call, so it can sit between
//! the background lexer and the context analyser without buffering the
//! whole file.
//!
//! # Design Philosophy
//!
//! - **Error recovery is mandatory** - a malformed statement becomes an
//!   [`Expr::Bad`] and parsing continues at the next statement boundary
//! - **Multiple errors** - every malformed statement is reported
//! - **Synchronization points** - a `func` keyword, an `IDENT :=` pair, the
//!   `}` closing the current block, or end of input
//!
//! # Binary Operator Precedence (Pratt Parsing)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 10 | `+` `-` | Left |
//! | 20 | `*` | Left |
//!
//! Unary `-` binds tighter than any binary operator.
//!
//! # Usage
//!
//! ```
//! use maqui_core::ast::Expr;
//! use maqui_core::source_analysis::{Lexer, Parser};
//!
//! let mut parser = Parser::new(Lexer::new("demo.mq", "x := 3 + 4").spawn());
//! let statements = parser.run();
//!
//! assert_eq!(statements.len(), 1);
//! assert!(matches!(statements[0], Expr::VariableDecl(_)));
//! ```

use std::collections::VecDeque;

use tracing::debug;

use crate::ast::{BadExpr, BinaryOp, Expr, ExprStream};
use crate::source_analysis::{SyntaxError, Token, TokenKind, TokenStream};

mod declarations;
mod expressions;


/// Result of parsing a single construct.
pub(super) type ParseResult<T> = Result<T, SyntaxError>;

// ============================================================================
// Pratt Parsing for Binary Operator Precedence
// ============================================================================

/// Binding power for binary operators (Pratt parsing).
///
/// Higher values bind tighter. For a left-associative operator
/// `left_bp == right_bp - 1`.
#[derive(Debug, Clone, Copy)]
pub(super) struct BindingPower {
    pub(super) left: u8,
    pub(super) right: u8,
}

impl BindingPower {
    const fn left_assoc(precedence: u8) -> Self {
        Self {
            left: precedence,
            right: precedence + 1,
        }
    }
}

/// Maps a token to its binary operator and binding power.
///
/// Returns `None` for anything that is not a binary operator, which ends the
/// current expression.
pub(super) fn binary_binding_power(kind: TokenKind) -> Option<(BinaryOp, BindingPower)> {
    match kind {
        TokenKind::Plus => Some((BinaryOp::Addition, BindingPower::left_assoc(10))),
        TokenKind::Minus => Some((BinaryOp::Subtraction, BindingPower::left_assoc(10))),
        TokenKind::Multiply => Some((BinaryOp::Multiplication, BindingPower::left_assoc(20))),
        _ => None,
    }
}

/// Maximum depth of nested parentheses, unary operators and function
/// bodies. Deeper input is reported as a syntax error instead of risking a
/// stack overflow.
const MAX_NESTING_DEPTH: usize = 64;

/// Maximum number of binary operators on any path from a statement down to
/// a leaf. Each operator adds a level to the tree, and later passes walk it
/// recursively.
const MAX_OPERATOR_DEPTH: usize = 256;

/// Pulls tokens from a [`TokenStream`] and produces top-level statements.
#[derive(Debug)]
pub struct Parser<S> {
    /// The token provider.
    source: S,
    /// Tokens pulled but not yet consumed. Line comments never enter here.
    lookahead: VecDeque<Token>,
    /// Number of tokens consumed so far.
    consumed: usize,
    /// How many function bodies enclose the current position.
    pub(super) block_depth: usize,
    /// Current recursion depth (guards against stack overflow).
    nesting_depth: usize,
    /// Binary operators folded into the expressions being built.
    pub(super) operator_depth: usize,
    /// Set once a terminal token has been reached at a statement boundary.
    finished: bool,
}

impl<S: TokenStream> Parser<S> {
    /// Creates a parser over `source`. No tokens are pulled until the first
    /// [`get`](ExprStream::get).
    pub fn new(source: S) -> Self {
        Self {
            source,
            lookahead: VecDeque::with_capacity(2),
            consumed: 0,
            block_depth: 0,
            nesting_depth: 0,
            operator_depth: 0,
            finished: false,
        }
    }

    /// Parses every remaining statement.
    pub fn run(&mut self) -> Vec<Expr> {
        let mut statements = Vec::new();
        loop {
            match self.get() {
                Expr::EndOfStatements => break,
                expr => statements.push(expr),
            }
        }
        statements
    }

    /// The name of the file being parsed.
    pub fn filename(&self) -> &str {
        self.source.filename()
    }

    /// Returns the token provider, e.g. to collect a fatal lexer error.
    pub fn into_inner(self) -> S {
        self.source
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Ensures at least `n` tokens are buffered.
    ///
    /// Once a terminal token has been pulled it is repeated instead of asking
    /// the provider again.
    fn fill(&mut self, n: usize) {
        while self.lookahead.len() < n {
            if let Some(last) = self.lookahead.back()
                && last.kind().is_terminal()
            {
                let repeat = last.clone();
                self.lookahead.push_back(repeat);
                continue;
            }
            let token = self.source.get();
            if token.kind() == TokenKind::LineComment {
                continue;
            }
            self.lookahead.push_back(token);
        }
    }

    /// Returns the current token without consuming it.
    pub(super) fn peek(&mut self) -> &Token {
        self.fill(1);
        &self.lookahead[0]
    }

    /// Returns the current token kind.
    pub(super) fn peek_kind(&mut self) -> TokenKind {
        self.peek().kind()
    }

    /// Returns the kind of the token after the current one.
    pub(super) fn peek_second_kind(&mut self) -> TokenKind {
        self.fill(2);
        self.lookahead[1].kind()
    }

    /// Consumes the current token and returns it.
    ///
    /// Terminal tokens are never consumed; they are returned again.
    pub(super) fn advance(&mut self) -> Token {
        self.fill(1);
        if self.lookahead[0].kind().is_terminal() {
            return self.lookahead[0].clone();
        }
        self.consumed += 1;
        self.lookahead
            .pop_front()
            .unwrap_or_else(|| unreachable!("lookahead filled above"))
    }

    /// Checks if the current token has the given kind.
    pub(super) fn check(&mut self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Consumes the current token if it has the given kind.
    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a token of the given kind or fails with
    /// "expected {kind} {context}, found {actual}".
    pub(super) fn expect(&mut self, kind: TokenKind, context: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(kind.describe(), context))
        }
    }

    /// Builds an error located at the current token.
    pub(super) fn error_here(&mut self, message: impl Into<ecow::EcoString>) -> SyntaxError {
        let location = self.peek().location();
        SyntaxError::new(message, location)
    }

    /// Builds an "expected X, found Y" error at the current token.
    pub(super) fn error_expected(&mut self, expected: &str, context: &str) -> SyntaxError {
        let found = self.peek_kind().describe();
        if context.is_empty() {
            self.error_here(format!("expected {expected}, found {found}"))
        } else {
            self.error_here(format!("expected {expected} {context}, found {found}"))
        }
    }

    /// Runs `f` one nesting level deeper, failing if the limit is exceeded.
    pub(super) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.nesting_depth >= MAX_NESTING_DEPTH {
            return Err(self.error_here(format!(
                "nesting is too deep (maximum {MAX_NESTING_DEPTH} levels)"
            )));
        }
        self.nesting_depth += 1;
        let result = f(self);
        self.nesting_depth -= 1;
        result
    }

    // ========================================================================
    // Error Handling & Recovery
    // ========================================================================

    /// Parses one statement, turning a failure into a [`BadExpr`].
    pub(super) fn parse_statement_or_recover(&mut self) -> Expr {
        let start = self.consumed;
        match self.parse_statement() {
            Ok(expr) => expr,
            Err(error) => {
                debug!(
                    filename = self.source.filename(),
                    location = %error.location,
                    %error,
                    "syntax error"
                );
                self.synchronize(start);
                Expr::Bad(BadExpr { error })
            }
        }
    }

    /// Skips tokens up to the next statement boundary.
    ///
    /// Braces opened while skipping are balanced, so boundaries inside a
    /// skipped block are ignored. A stray `}` at the top level is skipped.
    /// At least one token is consumed for the failed statement.
    fn synchronize(&mut self, start: usize) {
        if self.consumed == start {
            self.advance();
        }

        let mut depth = 0usize;
        loop {
            match self.peek_kind() {
                kind if kind.is_terminal() => return,
                TokenKind::OpenCurly => depth += 1,
                TokenKind::CloseCurly if depth > 0 => depth -= 1,
                TokenKind::CloseCurly if self.block_depth > 0 => return,
                TokenKind::Func if depth == 0 => return,
                TokenKind::Identifier
                    if depth == 0 && self.peek_second_kind() == TokenKind::Declaration =>
                {
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }
}

impl<S: TokenStream> ExprStream for Parser<S> {
    fn get(&mut self) -> Expr {
        if self.finished {
            return Expr::EndOfStatements;
        }
        let current = self.peek_kind();
        if current.is_terminal() {
            debug!(
                filename = self.source.filename(),
                consumed = self.consumed,
                at = %current,
                "parser finished"
            );
            self.finished = true;
            return Expr::EndOfStatements;
        }
        self.parse_statement_or_recover()
    }

    fn filename(&self) -> &str {
        self.source.filename()
    }
}
