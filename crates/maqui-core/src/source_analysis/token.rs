// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types for maqui lexical analysis.
//!
//! # Token Structure
//!
//! Each token consists of:
//! - A [`TokenKind`] from a closed vocabulary
//! - The lexeme: the token text (string literals without their quotes,
//!   line comments without the leading `//`)
//! - A [`Location`] pointing back into the source

use ecow::EcoString;

use super::Location;

/// The kind of token.
///
/// The vocabulary is closed and consumed by external tooling, so variants are
/// never renamed or reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// The `func` keyword
    Func,
    /// An identifier: `main`, `únicódeShouldBeVàlid`
    Identifier,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `{`
    OpenCurly,
    /// `}`
    CloseCurly,
    /// `,`
    Comma,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Multiply,
    /// Variable declaration: `:=`
    Declaration,
    /// A double-quoted string literal
    String,
    /// A run of decimal digits
    Number,
    /// A `//` comment up to (not including) the newline
    LineComment,
    /// End of input
    Eof,
    /// Produced by a token stream whose lexer hit a fatal error
    Malformed,
}

impl TokenKind {
    /// Returns `true` for literal-carrying kinds.
    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(self, Self::String | Self::Number)
    }

    /// Returns `true` if no further tokens will follow this one.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Eof | Self::Malformed)
    }

    /// Human-readable description used in syntax error messages.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Func => "'func'",
            Self::Identifier => "identifier",
            Self::OpenParen => "'('",
            Self::CloseParen => "')'",
            Self::OpenCurly => "'{'",
            Self::CloseCurly => "'}'",
            Self::Comma => "','",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Multiply => "'*'",
            Self::Declaration => "':='",
            Self::String => "string literal",
            Self::Number => "number literal",
            Self::LineComment => "comment",
            Self::Eof => "end of input",
            Self::Malformed => "malformed input",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// A token with its text and source location.
///
/// # Examples
///
/// ```
/// use maqui_core::source_analysis::{Location, Token, TokenKind};
///
/// let token = Token::new(TokenKind::Identifier, "foo", Location::default());
/// assert_eq!(token.kind(), TokenKind::Identifier);
/// assert_eq!(token.lexeme(), "foo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    lexeme: EcoString,
    location: Location,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, lexeme: impl Into<EcoString>, location: Location) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }

    /// An end-of-input token at `location`.
    #[must_use]
    pub fn eof(location: Location) -> Self {
        Self::new(TokenKind::Eof, "", location)
    }

    /// Returns the kind of this token.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Returns the token text.
    #[must_use]
    pub fn lexeme(&self) -> &EcoString {
        &self.lexeme
    }

    /// Returns where the token starts in the source.
    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    /// Consumes the token and returns its text.
    #[must_use]
    pub fn into_lexeme(self) -> EcoString {
        self.lexeme
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Identifier | TokenKind::Number => write!(f, "{}", self.lexeme),
            TokenKind::String => write!(f, "\"{}\"", self.lexeme),
            TokenKind::LineComment => write!(f, "//{}", self.lexeme),
            TokenKind::Func => write!(f, "func"),
            TokenKind::OpenParen => write!(f, "("),
            TokenKind::CloseParen => write!(f, ")"),
            TokenKind::OpenCurly => write!(f, "{{"),
            TokenKind::CloseCurly => write!(f, "}}"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Multiply => write!(f, "*"),
            TokenKind::Declaration => write!(f, ":="),
            TokenKind::Eof => write!(f, "<eof>"),
            TokenKind::Malformed => write!(f, "<malformed: {}>", self.lexeme),
        }
    }
}
