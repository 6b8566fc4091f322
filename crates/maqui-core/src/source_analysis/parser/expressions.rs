// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing.
//!
//! ```text
//! expression := unary (binary_op unary)*      -- precedence via binding power
//! unary      := '-' unary | primary
//! primary    := NUMBER | STRING | IDENT | call | '(' expression ')'
//! call       := IDENT '(' (expression (',' expression)*)? ')'
//! ```

use ecow::EcoString;

use crate::ast::{Expr, FuncCall};
use crate::source_analysis::{TokenKind, TokenStream};

use super::{MAX_OPERATOR_DEPTH, ParseResult, Parser, binary_binding_power};

impl<S: TokenStream> Parser<S> {
    /// Parses a full expression.
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_binary_with_pratt(0)
    }

    /// Pratt parsing for binary expressions.
    ///
    /// `min_bp` is the minimum binding power an operator needs to be folded
    /// into the current expression (0 for top-level).
    ///
    /// Every folded operator counts against `MAX_OPERATOR_DEPTH` until this
    /// call returns, so operand chains parsed meanwhile share the budget.
    fn parse_binary_with_pratt(&mut self, min_bp: u8) -> ParseResult<Expr> {
        let mut folds = 0;
        let result = self.fold_binary(min_bp, &mut folds);
        self.operator_depth -= folds;
        result
    }

    fn fold_binary(&mut self, min_bp: u8, folds: &mut usize) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;

        while let Some((op, bp)) = binary_binding_power(self.peek_kind()) {
            if bp.left < min_bp {
                break;
            }
            if self.operator_depth >= MAX_OPERATOR_DEPTH {
                return Err(self.error_here(format!(
                    "expression is too long (maximum {MAX_OPERATOR_DEPTH} operators)"
                )));
            }
            self.advance();
            self.operator_depth += 1;
            *folds += 1;
            let right = self.parse_binary_with_pratt(bp.right)?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.match_token(TokenKind::Minus) {
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr::negative(operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.peek_kind() {
            TokenKind::Number => Ok(Expr::number(self.advance().into_lexeme())),
            TokenKind::String => Ok(Expr::string(self.advance().into_lexeme())),
            TokenKind::Identifier => {
                let name = self.advance().into_lexeme();
                if self.check(TokenKind::OpenParen) {
                    self.parse_call(name)
                } else {
                    Ok(Expr::identifier(name))
                }
            }
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.nested(Self::parse_expression)?;
                self.expect(TokenKind::CloseParen, "to close parenthesized expression")?;
                Ok(inner)
            }
            _ => Err(self.error_expected("expression", "")),
        }
    }

    /// Parses the argument list of a call to `name`; the current token is
    /// the opening parenthesis.
    fn parse_call(&mut self, name: EcoString) -> ParseResult<Expr> {
        self.expect(TokenKind::OpenParen, "")?;
        let mut args = Vec::new();

        if !self.match_token(TokenKind::CloseParen) {
            loop {
                args.push(self.nested(Self::parse_expression)?);
                if self.match_token(TokenKind::CloseParen) {
                    break;
                }
                if !self.match_token(TokenKind::Comma) {
                    return Err(self.error_expected("',' or ')'", "in argument list"));
                }
            }
        }

        Ok(Expr::FuncCall(FuncCall { name, args }))
    }
}
