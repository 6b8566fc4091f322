// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement-level parsing: function and variable declarations.

use crate::ast::{Expr, FuncDecl, VariableDecl};
use crate::source_analysis::{TokenKind, TokenStream};

use super::{ParseResult, Parser};

impl<S: TokenStream> Parser<S> {
    /// Parses a statement.
    ///
    /// ```text
    /// statement := func_decl | variable_decl | expression
    /// ```
    pub(super) fn parse_statement(&mut self) -> ParseResult<Expr> {
        match self.peek_kind() {
            TokenKind::Func => self.parse_func_decl(),
            TokenKind::Identifier if self.peek_second_kind() == TokenKind::Declaration => {
                self.parse_variable_decl()
            }
            _ => self.parse_expression(),
        }
    }

    /// Parses `func IDENT ( ) { statement* }`.
    ///
    /// Statements in the body recover on their own, so a malformed body
    /// statement shows up as a [`BadExpr`](crate::ast::BadExpr) inside an
    /// otherwise valid declaration.
    fn parse_func_decl(&mut self) -> ParseResult<Expr> {
        self.expect(TokenKind::Func, "")?;
        let name = self
            .expect(TokenKind::Identifier, "after 'func'")?
            .into_lexeme();
        self.expect(TokenKind::OpenParen, "after function name")?;
        if !self.check(TokenKind::CloseParen) {
            return Err(self.error_here("function parameters are not supported"));
        }
        self.advance();
        self.expect(TokenKind::OpenCurly, "to open function body")?;

        let body = self.nested(|p| {
            p.block_depth += 1;
            let mut body = Vec::new();
            while !p.check(TokenKind::CloseCurly) && !p.peek_kind().is_terminal() {
                body.push(p.parse_statement_or_recover());
            }
            p.block_depth -= 1;
            Ok(body)
        })?;

        self.expect(TokenKind::CloseCurly, "to close function body")?;
        Ok(Expr::FuncDecl(FuncDecl { name, body }))
    }

    /// Parses `IDENT := expression`.
    fn parse_variable_decl(&mut self) -> ParseResult<Expr> {
        let name = self.expect(TokenKind::Identifier, "")?.into_lexeme();
        self.expect(TokenKind::Declaration, "after variable name")?;
        let value = self.parse_expression()?;
        Ok(Expr::VariableDecl(VariableDecl {
            name,
            value: Box::new(value),
            resolved_type: None,
        }))
    }
}
