// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for maqui source code.
//!
//! The character-to-token conversion is a hand-written [`Scanner`]. It is
//! driven two ways:
//!
//! - [`lex`] runs it to completion on the calling thread.
//! - [`Lexer::spawn`] runs it on a background thread that pushes into a
//!   bounded queue; the parser pulls from the returned
//!   [`TokenReceiver`](super::TokenReceiver) one token at a time.
//!
//! Lexical errors are fatal. The scanner stops at the first one and no
//! partial token list is returned.
//!
//! # Example
//!
//! ```
//! use maqui_core::source_analysis::{TokenKind, lex};
//!
//! let tokens = lex("x := 1 + 2").unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind()).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         TokenKind::Identifier,
//!         TokenKind::Declaration,
//!         TokenKind::Number,
//!         TokenKind::Plus,
//!         TokenKind::Number,
//!     ]
//! );
//! ```

use std::iter::Peekable;
use std::str::CharIndices;
use std::sync::{Arc, mpsc};
use std::thread;

use camino::Utf8Path;
use ecow::EcoString;
use tracing::{debug, warn};

use super::{LexError, Location, Span, Token, TokenKind, TokenReceiver};

/// Queue capacity used when none is configured.
pub const DEFAULT_TOKEN_BUFFER: usize = 64;

/// Converts source text into tokens, one call to [`Iterator::next`] at a time.
///
/// The final item is either an `Eof` token or the first [`LexError`]; the
/// iterator is fused after that.
pub struct Scanner<'src> {
    /// The source text being lexed.
    source: &'src str,
    /// Character iterator with byte positions.
    chars: Peekable<CharIndices<'src>>,
    /// Current byte position in source.
    position: usize,
    line: u32,
    column: u32,
    done: bool,
}

impl std::fmt::Debug for Scanner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("position", &self.position)
            .field("line", &self.line)
            .field("column", &self.column)
            .finish_non_exhaustive()
    }
}

impl<'src> Scanner<'src> {
    /// Creates a new scanner for the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            position: 0,
            line: 1,
            column: 1,
            done: false,
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peeks at the character after the next one.
    fn peek_char_second(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, c)| c)
    }

    /// Consumes the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.position = pos + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consumes characters while the predicate is true.
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Location of the next unconsumed character.
    fn here(&self) -> Location {
        Location::new(
            Span::from(self.position..self.position),
            self.line,
            self.column,
        )
    }

    /// Extends `start` up to the current position.
    fn location_from(&self, start: Location) -> Location {
        Location::new(
            Span::from(start.span.as_range().start..self.position),
            start.line,
            start.column,
        )
    }

    fn text_from(&self, start_byte: usize) -> &'src str {
        &self.source[start_byte..self.position]
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
    }

    /// Lexes the next token.
    fn lex_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start = self.here();

        let Some(c) = self.peek_char() else {
            return Ok(Token::eof(start));
        };

        let (kind, lexeme): (TokenKind, EcoString) = match c {
            '/' if self.peek_char_second() == Some('/') => self.lex_line_comment(),
            c if c.is_alphabetic() || c == '_' => self.lex_identifier_or_keyword(),
            '0'..='9' => {
                let from = self.position;
                self.advance_while(|c| c.is_ascii_digit());
                (TokenKind::Number, self.text_from(from).into())
            }
            '"' => self.lex_string(start)?,
            ':' if self.peek_char_second() == Some('=') => {
                self.advance();
                self.advance();
                (TokenKind::Declaration, ":=".into())
            }
            '(' | ')' | '{' | '}' | ',' | '+' | '-' | '*' => {
                self.advance();
                let kind = match c {
                    '(' => TokenKind::OpenParen,
                    ')' => TokenKind::CloseParen,
                    '{' => TokenKind::OpenCurly,
                    '}' => TokenKind::CloseCurly,
                    ',' => TokenKind::Comma,
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    _ => TokenKind::Multiply,
                };
                (kind, EcoString::from(c))
            }
            _ => {
                self.advance();
                return Err(LexError::unexpected_char(c, self.location_from(start)));
            }
        };

        Ok(Token::new(kind, lexeme, self.location_from(start)))
    }

    /// Lexes a line comment: `// ...`. The text excludes the `//` and the
    /// line terminator.
    fn lex_line_comment(&mut self) -> (TokenKind, EcoString) {
        self.advance(); // /
        self.advance(); // /
        let from = self.position;
        self.advance_while(|c| c != '\n');
        let text = self.text_from(from);
        let text = text.strip_suffix('\r').unwrap_or(text);
        (TokenKind::LineComment, text.into())
    }

    /// Lexes an identifier or the `func` keyword.
    fn lex_identifier_or_keyword(&mut self) -> (TokenKind, EcoString) {
        let from = self.position;
        self.advance_while(|c| c.is_alphanumeric() || c == '_');
        let text = self.text_from(from);
        let kind = if text == "func" {
            TokenKind::Func
        } else {
            TokenKind::Identifier
        };
        (kind, text.into())
    }

    /// Lexes a double-quoted string literal. There are no escape sequences.
    fn lex_string(&mut self, start: Location) -> Result<(TokenKind, EcoString), LexError> {
        self.advance(); // opening quote
        let from = self.position;

        loop {
            match self.peek_char() {
                None => {
                    return Err(LexError::unterminated_string(self.location_from(start)));
                }
                Some('"') => break,
                Some(_) => {
                    self.advance();
                }
            }
        }

        let content = self.text_from(from);
        self.advance(); // closing quote
        Ok((TokenKind::String, content.into()))
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.lex_token();
        self.done = match &item {
            Ok(token) => token.kind() == TokenKind::Eof,
            Err(_) => true,
        };
        Some(item)
    }
}

/// Lexes `source` to completion on the calling thread.
///
/// Returns every token (comments included, EOF excluded) or the first fatal
/// error.
///
/// # Errors
///
/// Returns a [`LexError`] for an unterminated string or an illegal
/// character.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    for item in Scanner::new(source) {
        let token = item?;
        if token.kind() == TokenKind::Eof {
            break;
        }
        tokens.push(token);
    }
    Ok(tokens)
}

/// A source file waiting to be tokenized.
///
/// Nothing is scanned until [`Lexer::spawn`] (or [`Lexer::run_blocking`]) is
/// called.
#[derive(Debug, Clone)]
pub struct Lexer {
    filename: EcoString,
    source: String,
    buffer: usize,
}

impl Lexer {
    /// Creates a lexer for in-memory source text.
    #[must_use]
    pub fn new(filename: impl Into<EcoString>, source: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            source: source.into(),
            buffer: DEFAULT_TOKEN_BUFFER,
        }
    }

    /// Reads `path` into a new lexer.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read as UTF-8 text.
    pub fn from_file(path: &Utf8Path) -> std::io::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::new(path.as_str(), source))
    }

    /// Sets how many tokens the background worker may run ahead.
    #[must_use]
    pub fn with_buffer(mut self, capacity: usize) -> Self {
        self.buffer = capacity.max(1);
        self
    }

    /// The name of the file being lexed.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Starts scanning on a background thread.
    ///
    /// The worker blocks whenever the queue is full, so it never runs more
    /// than the configured buffer ahead of the consumer. Dropping the
    /// receiver stops it at its next send.
    #[must_use]
    pub fn spawn(self) -> TokenReceiver {
        let Self {
            filename,
            source,
            buffer,
        } = self;
        let source: Arc<str> = source.into();

        let (tx, rx) = mpsc::sync_channel(buffer);
        let worker_filename = filename.clone();
        let worker_source = Arc::clone(&source);
        let spawned = thread::Builder::new()
            .name("maqui-lexer".into())
            .spawn(move || {
                produce(&worker_filename, &worker_source, |item| tx.send(item).is_ok());
            });

        match spawned {
            Ok(handle) => TokenReceiver::new(filename, rx, Some(handle)),
            Err(err) => {
                warn!(%err, "failed to spawn lexer thread, lexing inline");
                let (tx, rx) = mpsc::channel();
                produce(&filename, &source, |item| tx.send(item).is_ok());
                TokenReceiver::new(filename, rx, None)
            }
        }
    }

    /// Runs the lexer to completion: spawns the worker and drains it.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`LexError`].
    pub fn run_blocking(self) -> Result<Vec<Token>, LexError> {
        self.spawn().drain()
    }
}

/// Feeds every scanner item to `send` until the input ends, the first error
/// is sent, or `send` reports that the consumer has gone away.
fn produce(
    filename: &str,
    source: &str,
    mut send: impl FnMut(Result<Token, LexError>) -> bool,
) {
    debug!(filename, bytes = source.len(), "lexer started");
    let mut produced = 0usize;
    for item in Scanner::new(source) {
        if let Err(err) = &item {
            debug!(filename, %err, "lexer stopped on fatal error");
        }
        if !send(item) {
            debug!(filename, produced, "token consumer dropped, lexer stopping");
            return;
        }
        produced += 1;
    }
    debug!(filename, produced, "lexer finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{LexErrorKind, TokenStream};

    /// Helper to lex and drop locations, as `(kind, lexeme)` pairs.
    fn lex_pairs(source: &str) -> Result<Vec<(TokenKind, String)>, LexError> {
        Ok(lex(source)?
            .into_iter()
            .map(|t| (t.kind(), t.lexeme().to_string()))
            .collect())
    }

    fn pairs(expected: &[(TokenKind, &str)]) -> Vec<(TokenKind, String)> {
        expected
            .iter()
            .map(|(kind, text)| (*kind, (*text).to_string()))
            .collect()
    }

    #[test]
    fn lex_empty() {
        assert!(lex("").unwrap().is_empty());
        assert!(lex("  \n\t ").unwrap().is_empty());
    }

    #[test]
    fn lex_func_declaration() {
        assert_eq!(
            lex_pairs("func main () {}").unwrap(),
            pairs(&[
                (TokenKind::Func, "func"),
                (TokenKind::Identifier, "main"),
                (TokenKind::OpenParen, "("),
                (TokenKind::CloseParen, ")"),
                (TokenKind::OpenCurly, "{"),
                (TokenKind::CloseCurly, "}"),
            ])
        );
    }

    #[test]
    fn lex_line_comment_only() {
        assert_eq!(
            lex_pairs("//this is a comment\n").unwrap(),
            pairs(&[(TokenKind::LineComment, "this is a comment")])
        );
    }

    #[test]
    fn lex_comment_inside_block() {
        assert_eq!(
            lex_pairs("func main () {\n// this is a comment \n}").unwrap(),
            pairs(&[
                (TokenKind::Func, "func"),
                (TokenKind::Identifier, "main"),
                (TokenKind::OpenParen, "("),
                (TokenKind::CloseParen, ")"),
                (TokenKind::OpenCurly, "{"),
                (TokenKind::LineComment, " this is a comment "),
                (TokenKind::CloseCurly, "}"),
            ])
        );
    }

    #[test]
    fn lex_comment_strips_carriage_return() {
        assert_eq!(
            lex_pairs("// windows\r\nx").unwrap(),
            pairs(&[
                (TokenKind::LineComment, " windows"),
                (TokenKind::Identifier, "x"),
            ])
        );
    }

    #[test]
    fn lex_unicode_identifier() {
        assert_eq!(
            lex_pairs("únicódeShouldBeVàlid := 1").unwrap(),
            pairs(&[
                (TokenKind::Identifier, "únicódeShouldBeVàlid"),
                (TokenKind::Declaration, ":="),
                (TokenKind::Number, "1"),
            ])
        );
    }

    #[test]
    fn lex_string_declaration() {
        assert_eq!(
            lex_pairs("varDeclExpr := \"string\"").unwrap(),
            pairs(&[
                (TokenKind::Identifier, "varDeclExpr"),
                (TokenKind::Declaration, ":="),
                (TokenKind::String, "string"),
            ])
        );
    }

    #[test]
    fn lex_empty_string() {
        assert_eq!(
            lex_pairs("\"\"").unwrap(),
            pairs(&[(TokenKind::String, "")])
        );
    }

    #[test]
    fn lex_funcs_prefix_is_identifier() {
        assert_eq!(
            lex_pairs("funcs func_ func").unwrap(),
            pairs(&[
                (TokenKind::Identifier, "funcs"),
                (TokenKind::Identifier, "func_"),
                (TokenKind::Func, "func"),
            ])
        );
    }

    #[test]
    fn lex_operators_and_punctuation() {
        assert_eq!(
            lex_pairs("foo(1, -2) + 3 * 4").unwrap(),
            pairs(&[
                (TokenKind::Identifier, "foo"),
                (TokenKind::OpenParen, "("),
                (TokenKind::Number, "1"),
                (TokenKind::Comma, ","),
                (TokenKind::Minus, "-"),
                (TokenKind::Number, "2"),
                (TokenKind::CloseParen, ")"),
                (TokenKind::Plus, "+"),
                (TokenKind::Number, "3"),
                (TokenKind::Multiply, "*"),
                (TokenKind::Number, "4"),
            ])
        );
    }

    #[test]
    fn lex_unterminated_string_is_fatal() {
        let err = lex("\"unclosed string").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.location.span.start(), 0);
    }

    #[test]
    fn lex_illegal_character_is_fatal() {
        let err = lex("@").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('@'));
    }

    #[test]
    fn lex_error_discards_earlier_tokens() {
        assert!(lex("x := 1 / 2").is_err());
        assert!(lex("x : 1").is_err());
    }

    #[test]
    fn lex_locations_track_lines_and_columns() {
        let tokens = lex("foo\n  bár := 1").unwrap();
        assert_eq!(tokens[0].location().line, 1);
        assert_eq!(tokens[0].location().column, 1);
        assert_eq!(tokens[0].location().span, Span::new(0, 3));
        assert_eq!(tokens[1].location().line, 2);
        assert_eq!(tokens[1].location().column, 3);
        // `á` is two bytes wide
        assert_eq!(tokens[1].location().span, Span::new(6, 10));
        assert_eq!(tokens[2].location().column, 7);
    }

    #[test]
    fn run_blocking_matches_synchronous_lex() {
        let source = "func main() {\n  x := foo(1, \"a\") // note\n}";
        let background = Lexer::new("test.mq", source).run_blocking().unwrap();
        assert_eq!(background, lex(source).unwrap());
    }

    #[test]
    fn run_blocking_reports_fatal_error() {
        let err = Lexer::new("test.mq", "x := \"open").run_blocking().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn spawned_lexer_with_tiny_buffer_delivers_every_token() {
        let source = (0..200).map(|i| format!("v{i} := {i}\n")).collect::<String>();
        let mut receiver = Lexer::new("big.mq", source).with_buffer(1).spawn();
        let mut count = 0;
        while receiver.get().kind() != TokenKind::Eof {
            count += 1;
        }
        assert_eq!(count, 600);
        assert!(receiver.take_error().is_none());
    }

    #[test]
    fn spawned_lexer_surfaces_error_as_malformed_token() {
        let mut receiver = Lexer::new("bad.mq", "x := @").spawn();
        assert_eq!(receiver.get().kind(), TokenKind::Identifier);
        assert_eq!(receiver.get().kind(), TokenKind::Declaration);
        assert_eq!(receiver.get().kind(), TokenKind::Malformed);
        assert_eq!(receiver.get().kind(), TokenKind::Eof);
        let err = receiver.take_error().unwrap();
        assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('@'));
    }

    #[test]
    fn dropping_receiver_early_does_not_hang() {
        let source = "x := 1\n".repeat(10_000);
        let mut receiver = Lexer::new("drop.mq", source).with_buffer(2).spawn();
        assert_eq!(receiver.get().kind(), TokenKind::Identifier);
        drop(receiver);
    }
}
