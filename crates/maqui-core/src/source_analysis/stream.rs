// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token providers consumed by the parser.
//!
//! The parser only needs two capabilities from its input: pull the next
//! token and name the file. [`TokenStream`] captures exactly that so the
//! parser can be driven by the background lexer ([`TokenReceiver`]) or by an
//! in-memory [`TokenBuffer`] in tests and tooling.

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::thread::JoinHandle;

use ecow::EcoString;
use tracing::warn;

use super::{LexError, Location, Scanner, Span, Token, TokenKind};

/// A pull-based source of tokens.
pub trait TokenStream {
    /// Returns the next token, blocking until one is available.
    ///
    /// Once the input is exhausted this returns an `Eof` token on every call.
    fn get(&mut self) -> Token;

    /// The name of the file the tokens come from.
    fn filename(&self) -> &str;
}

/// Consumer end of a lexer running on a background thread.
///
/// Created by [`Lexer::spawn`](super::Lexer::spawn).
#[derive(Debug)]
pub struct TokenReceiver {
    filename: EcoString,
    rx: Receiver<Result<Token, LexError>>,
    worker: Option<JoinHandle<()>>,
    error: Option<LexError>,
    last_location: Location,
    finished: bool,
}

impl TokenReceiver {
    pub(super) fn new(
        filename: EcoString,
        rx: Receiver<Result<Token, LexError>>,
        worker: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            filename,
            rx,
            worker,
            error: None,
            last_location: Location::default(),
            finished: false,
        }
    }

    /// Takes the fatal error the lexer stopped on, if any.
    ///
    /// The error becomes available once [`TokenStream::get`] has returned the
    /// `Malformed` token that stands in for it.
    pub fn take_error(&mut self) -> Option<LexError> {
        self.error.take()
    }

    /// Pulls every remaining token, comments included and EOF excluded.
    ///
    /// # Errors
    ///
    /// Returns the fatal [`LexError`] that ended tokenization.
    pub fn drain(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.get();
            if token.kind().is_terminal() {
                break;
            }
            tokens.push(token);
        }
        match self.take_error() {
            Some(err) => Err(err),
            None => Ok(tokens),
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!(filename = %self.filename, "lexer worker panicked");
            }
        }
    }
}

impl TokenStream for TokenReceiver {
    fn get(&mut self) -> Token {
        if self.finished {
            return Token::eof(self.last_location);
        }

        match self.rx.recv() {
            Ok(Ok(token)) => {
                self.last_location = token.location();
                if token.kind() == TokenKind::Eof {
                    self.finish();
                }
                token
            }
            Ok(Err(err)) => {
                let token = Token::new(TokenKind::Malformed, err.kind.to_string(), err.location);
                self.last_location = err.location;
                self.error = Some(err);
                self.finish();
                token
            }
            // Worker exited without sending EOF
            Err(_) => {
                self.finish();
                Token::eof(self.last_location)
            }
        }
    }

    fn filename(&self) -> &str {
        &self.filename
    }
}

/// An in-memory token provider.
///
/// Once the buffered tokens run out, `Eof` is reported where the input
/// ended: at a buffered terminal token, or else just past the last token.
///
/// # Examples
///
/// ```
/// use maqui_core::source_analysis::{Location, Token, TokenBuffer, TokenKind, TokenStream};
///
/// let mut tokens = TokenBuffer::new(
///     "testing",
///     vec![Token::new(TokenKind::Number, "1", Location::default())],
/// );
/// assert_eq!(tokens.get().kind(), TokenKind::Number);
/// let eof = tokens.get();
/// assert_eq!(eof.kind(), TokenKind::Eof);
/// assert_eq!(eof.location().column, 2);
/// assert_eq!(tokens.get(), eof);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenBuffer {
    filename: EcoString,
    tokens: VecDeque<Token>,
    end: Location,
}

impl TokenBuffer {
    #[must_use]
    pub fn new(filename: impl Into<EcoString>, tokens: Vec<Token>) -> Self {
        let end = tokens.last().map_or_else(Location::default, end_of);
        Self {
            filename: filename.into(),
            tokens: tokens.into(),
            end,
        }
    }

    /// Lexes `source` on the calling thread and buffers the result,
    /// including the `Eof` token, so trailing whitespace is accounted for.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`LexError`].
    pub fn from_source(filename: impl Into<EcoString>, source: &str) -> Result<Self, LexError> {
        let tokens = Scanner::new(source).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(filename, tokens))
    }
}

/// The position just past `token`, or the token's own position if nothing
/// can follow it.
fn end_of(token: &Token) -> Location {
    let start = token.location();
    if token.kind().is_terminal() {
        return start;
    }
    // Display gives the source text: quotes and `//` included
    let text = token.to_string();
    let end = start.span.end();
    let (line, column) = match text.rfind('\n') {
        Some(newline) => {
            let lines = u32::try_from(text.matches('\n').count()).unwrap_or(u32::MAX);
            let tail = u32::try_from(text[newline + 1..].chars().count()).unwrap_or(u32::MAX);
            (start.line.saturating_add(lines), tail.saturating_add(1))
        }
        None => {
            let width = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
            (start.line, start.column.saturating_add(width))
        }
    };
    Location::new(Span::new(end, end), line, column)
}

impl TokenStream for TokenBuffer {
    fn get(&mut self) -> Token {
        self.tokens
            .pop_front()
            .unwrap_or_else(|| Token::eof(self.end))
    }

    fn filename(&self) -> &str {
        &self.filename
    }
}
