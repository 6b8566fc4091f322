// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree (AST) definitions for maqui.
//!
//! # Design Philosophy
//!
//! - **Closed variant sets** - [`Expr`], [`Type`](crate::semantic_analysis::Type)
//!   and [`CompileError`] are plain enums; consumers match exhaustively
//! - **Error recovery** - the parser produces [`Expr::Bad`] placeholders for
//!   malformed statements instead of stopping
//! - **Exclusive ownership** - nodes own their children; there is no sharing
//!   and no cycles
//!
//! # Example
//!
//! ```ignore
//! // Source: x := 1 + 2 * 3
//! Expr::VariableDecl(VariableDecl {
//!     name: "x",
//!     value: Box::new(Expr::Binary(BinaryExpr {
//!         op: BinaryOp::Addition,
//!         left: Box::new(Expr::number("1")),
//!         right: Box::new(Expr::Binary(BinaryExpr {
//!             op: BinaryOp::Multiplication,
//!             left: Box::new(Expr::number("2")),
//!             right: Box::new(Expr::number("3")),
//!         })),
//!     })),
//!     resolved_type: None,
//! })
//! ```

use std::fmt;

use ecow::EcoString;

use crate::ast_walker::walk_expr;
use crate::semantic_analysis::{CompileError, ScopeRef, Type};
use crate::source_analysis::SyntaxError;

/// A maqui statement or expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `func name() { body }`
    FuncDecl(FuncDecl),
    /// `name := value`
    VariableDecl(VariableDecl),
    /// `name(args...)`
    FuncCall(FuncCall),
    /// `left op right`
    Binary(BinaryExpr),
    /// `op operand`
    Unary(UnaryExpr),
    /// A number or string literal.
    Literal(LiteralExpr),
    /// A bare name.
    Identifier(Identifier),
    /// Placeholder for a statement that failed to parse.
    Bad(BadExpr),
    /// Returned by an [`ExprStream`] once it has no more statements.
    EndOfStatements,
}

impl Expr {
    /// A number literal.
    #[must_use]
    pub fn number(value: impl Into<EcoString>) -> Self {
        Self::Literal(LiteralExpr {
            kind: LiteralKind::Number,
            value: value.into(),
        })
    }

    /// A string literal (without quotes).
    #[must_use]
    pub fn string(value: impl Into<EcoString>) -> Self {
        Self::Literal(LiteralExpr {
            kind: LiteralKind::String,
            value: value.into(),
        })
    }

    /// An identifier reference.
    #[must_use]
    pub fn identifier(name: impl Into<EcoString>) -> Self {
        Self::Identifier(Identifier { name: name.into() })
    }

    /// A binary expression.
    #[must_use]
    pub fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Unary negation.
    #[must_use]
    pub fn negative(operand: Self) -> Self {
        Self::Unary(UnaryExpr {
            op: UnaryOp::Negative,
            operand: Box::new(operand),
        })
    }

    /// A function call.
    #[must_use]
    pub fn call(name: impl Into<EcoString>, args: Vec<Self>) -> Self {
        Self::FuncCall(FuncCall {
            name: name.into(),
            args,
        })
    }

    /// An unanalysed variable declaration.
    #[must_use]
    pub fn variable(name: impl Into<EcoString>, value: Self) -> Self {
        Self::VariableDecl(VariableDecl {
            name: name.into(),
            value: Box::new(value),
            resolved_type: None,
        })
    }

    /// A function declaration.
    #[must_use]
    pub fn func(name: impl Into<EcoString>, body: Vec<Self>) -> Self {
        Self::FuncDecl(FuncDecl {
            name: name.into(),
            body,
        })
    }

    /// Returns `true` if this is the parse-error placeholder.
    #[must_use]
    pub const fn is_bad(&self) -> bool {
        matches!(self, Self::Bad(_))
    }

    /// Returns `true` if this node or any node below it is a [`BadExpr`].
    #[must_use]
    pub fn contains_bad(&self) -> bool {
        let mut found = false;
        walk_expr(self, &mut |e| found |= e.is_bad());
        found
    }
}

/// `func name() { body }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: EcoString,
    pub body: Vec<Expr>,
}

/// `name := value`
///
/// `resolved_type` is `None` until semantic analysis fills it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDecl {
    pub name: EcoString,
    pub value: Box<Expr>,
    pub resolved_type: Option<Type>,
}

/// `name(args...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncCall {
    pub name: EcoString,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralExpr {
    pub kind: LiteralKind,
    /// The literal text as written (string literals without quotes).
    pub value: EcoString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: EcoString,
}

/// Placeholder for a statement that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadExpr {
    /// What went wrong, and where.
    pub error: SyntaxError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Number,
    String,
}

/// Binary operators, in the order of the operator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Addition,
    Subtraction,
    Multiplication,
}

impl BinaryOp {
    /// The source symbol for the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Addition => "+",
            Self::Subtraction => "-",
            Self::Multiplication => "*",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negative,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negative => f.write_str("-"),
        }
    }
}

impl fmt::Display for Expr {
    /// Renders the expression back to source form, fully parenthesising
    /// binary expressions so the tree shape is visible.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FuncDecl(decl) => {
                write!(f, "func {}() {{", decl.name)?;
                for stmt in &decl.body {
                    write!(f, " {stmt};")?;
                }
                if !decl.body.is_empty() {
                    f.write_str(" ")?;
                }
                f.write_str("}")
            }
            Self::VariableDecl(decl) => write!(f, "{} := {}", decl.name, decl.value),
            Self::FuncCall(call) => {
                write!(f, "{}(", call.name)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Self::Binary(bin) => write!(f, "({} {} {})", bin.left, bin.op, bin.right),
            Self::Unary(un) => write!(f, "{}{}", un.op, un.operand),
            Self::Literal(lit) => match lit.kind {
                LiteralKind::Number => f.write_str(&lit.value),
                LiteralKind::String => write!(f, "\"{}\"", lit.value),
            },
            Self::Identifier(ident) => f.write_str(&ident.name),
            Self::Bad(bad) => write!(f, "<error: {}>", bad.error),
            Self::EndOfStatements => f.write_str("<end>"),
        }
    }
}

/// A pull-based source of top-level statements.
///
/// Implemented by the [`Parser`](crate::source_analysis::Parser) and by
/// [`ExprBuffer`] for driving the analyser without source text.
pub trait ExprStream {
    /// Returns the next statement, or [`Expr::EndOfStatements`] once the
    /// provider is exhausted (on this and every later call).
    fn get(&mut self) -> Expr;

    /// The name of the file the statements come from.
    fn filename(&self) -> &str;
}

/// An in-memory statement provider.
#[derive(Debug, Clone, Default)]
pub struct ExprBuffer {
    filename: EcoString,
    exprs: std::collections::VecDeque<Expr>,
}

impl ExprBuffer {
    #[must_use]
    pub fn new(filename: impl Into<EcoString>, exprs: Vec<Expr>) -> Self {
        Self {
            filename: filename.into(),
            exprs: exprs.into(),
        }
    }
}

impl ExprStream for ExprBuffer {
    fn get(&mut self) -> Expr {
        self.exprs.pop_front().unwrap_or(Expr::EndOfStatements)
    }

    fn filename(&self) -> &str {
        &self.filename
    }
}

/// A top-level statement together with the scope it was analysed in.
///
/// `scope` is a shared handle: every statement of the same block points at
/// the same table, which keeps growing while the rest of the block is
/// analysed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedExpr {
    pub expr: Expr,
    pub scope: ScopeRef,
}

/// The output of semantic analysis for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    pub filename: EcoString,
    pub statements: Vec<AnnotatedExpr>,
    /// Every diagnostic raised anywhere in the tree, in discovery order.
    pub errors: Vec<CompileError>,
    pub global: ScopeRef,
}

impl Ast {
    /// Returns `true` if any statement, at any depth, failed to parse.
    #[must_use]
    pub fn has_syntax_errors(&self) -> bool {
        self.statements.iter().any(|s| s.expr.contains_bad())
    }

    /// All syntax errors carried by [`BadExpr`] placeholders, in source order.
    #[must_use]
    pub fn syntax_errors(&self) -> Vec<&SyntaxError> {
        let mut errors = Vec::new();
        for stmt in &self.statements {
            walk_expr(&stmt.expr, &mut |e| {
                if let Expr::Bad(bad) = e {
                    errors.push(&bad.error);
                }
            });
        }
        errors
    }
}
