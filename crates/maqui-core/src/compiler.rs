// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Compilation driver.
//!
//! Wires the pipeline together for one file: the [`Lexer`] runs on a
//! background thread, the [`Parser`] pulls from it, and the
//! [`ContextAnalyser`] pulls statements from the parser into a global scope
//! seeded with the builtins.
//!
//! A fatal lexical error discards everything the later stages produced.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::ast::Ast;
use crate::semantic_analysis::{CompileError, ContextAnalyser, ScopeRef, SymbolTable};
use crate::source_analysis::{DEFAULT_TOKEN_BUFFER, LexError, Lexer, Parser};

/// Knobs for a compilation run.
///
/// Deserializes from the `[compiler]` table of `maqui.toml`; missing keys
/// keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerOptions {
    /// How many tokens the lexer may run ahead of the parser.
    pub token_buffer: usize,
    /// Seed the global scope with the builtin declarations.
    pub builtins: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            token_buffer: DEFAULT_TOKEN_BUFFER,
            builtins: true,
        }
    }
}

/// An error that stops compilation before any result is produced.
#[derive(Debug, Error, Diagnostic)]
pub enum FatalError {
    /// The source file could not be read.
    #[error("failed to read {path}")]
    #[diagnostic(code(maqui::io))]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lexer hit a character or string it cannot tokenize.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),
}

/// Runs the front end over source files.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    #[must_use]
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compiles the file at `path` and returns its semantic errors.
    ///
    /// Syntax errors are not part of the list; use
    /// [`compile_file`](Self::compile_file) to inspect them.
    ///
    /// # Errors
    ///
    /// Returns a [`FatalError`] if the file cannot be read or tokenized.
    pub fn compile(&self, path: &Utf8Path) -> Result<Vec<CompileError>, FatalError> {
        Ok(self.compile_file(path)?.errors)
    }

    /// Compiles the file at `path` into an analysed [`Ast`].
    ///
    /// # Errors
    ///
    /// Returns a [`FatalError`] if the file cannot be read or tokenized.
    #[instrument(skip_all, fields(path = %path))]
    pub fn compile_file(&self, path: &Utf8Path) -> Result<Ast, FatalError> {
        let lexer = Lexer::from_file(path).map_err(|source| FatalError::Io {
            path: path.to_owned(),
            source,
        })?;
        self.run(lexer)
    }

    /// Compiles in-memory source text into an analysed [`Ast`].
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::Lex`] if the source cannot be tokenized.
    #[instrument(skip_all, fields(filename = %filename))]
    pub fn compile_source(&self, filename: &str, source: &str) -> Result<Ast, FatalError> {
        self.run(Lexer::new(filename, source))
    }

    fn run(&self, lexer: Lexer) -> Result<Ast, FatalError> {
        debug!(
            filename = lexer.filename(),
            token_buffer = self.options.token_buffer,
            builtins = self.options.builtins,
            "compiling"
        );
        let tokens = lexer.with_buffer(self.options.token_buffer).spawn();
        let mut analyser = ContextAnalyser::new(Parser::new(tokens));

        let mut global = SymbolTable::new();
        if self.options.builtins {
            analyser.define(&mut global);
        }
        let ast = analyser.run(ScopeRef::new(global));

        if let Some(err) = analyser.into_source().into_inner().take_error() {
            debug!(%err, "discarding analysis after fatal lexer error");
            return Err(err.into());
        }

        info!(
            filename = %ast.filename,
            statements = ast.statements.len(),
            syntax_errors = ast.syntax_errors().len(),
            semantic_errors = ast.errors.len(),
            "compiled"
        );
        Ok(ast)
    }
}

/// Compiles the file at `path` with default options and returns its
/// semantic errors.
///
/// # Errors
///
/// Returns a [`FatalError`] if the file cannot be read or tokenized.
pub fn compile(path: &Utf8Path) -> Result<Vec<CompileError>, FatalError> {
    Compiler::default().compile(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use crate::semantic_analysis::Type;
    use crate::source_analysis::LexErrorKind;
    use crate::test_helpers::{utf8_dir, write_source};

    #[test]
    fn compile_clean_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_source(
            &dir,
            "main.mq",
            "// entry point\nfunc main() {\n  greeting := \"hello\"\n  print(greeting)\n}\n",
        );
        let errors = compile(&path).expect("compiles");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn compile_reports_semantic_errors_in_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_source(
            &dir,
            "main.mq",
            "x := 1 + \"one\"\ny := -\"two\"\nprint(z)\n",
        );
        let errors = compile(&path).expect("compiles");
        assert_eq!(
            errors,
            vec![
                CompileError::IncompatibleTypes {
                    type1: Type::int(),
                    type2: Type::string(),
                },
                CompileError::UndefinedUnitary {
                    ty: Type::string(),
                    op: crate::ast::UnaryOp::Negative,
                },
                CompileError::undefined("z"),
            ]
        );
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = utf8_dir(&dir).join("nope.mq");
        let err = compile(&path).expect_err("missing file");
        assert!(matches!(err, FatalError::Io { .. }), "{err:?}");
        assert!(err.to_string().starts_with("failed to read"));
    }

    #[test]
    fn lexical_error_discards_results() {
        let compiler = Compiler::default();
        let err = compiler
            .compile_source("bad.mq", "x := undefined_name\ny := \"open")
            .expect_err("lex error");
        let lex = match err {
            FatalError::Lex(lex) => lex,
            other => panic!("expected a lex error, got {other:?}"),
        };
        assert_eq!(lex.kind, LexErrorKind::UnterminatedString);
        assert_eq!(lex.location.line, 2);
    }

    #[test]
    fn syntax_errors_are_kept_in_ast() {
        let ast = Compiler::default()
            .compile_source("syntax.mq", "x := ) 1\ny := 2")
            .expect("no fatal error");
        assert!(ast.has_syntax_errors());
        assert_eq!(ast.syntax_errors()[0].message, "expected expression, found ')'");
        assert!(ast.errors.is_empty());
        assert_eq!(ast.statements[1].expr, {
            let mut expected = Expr::variable("y", Expr::number("2"));
            if let Expr::VariableDecl(decl) = &mut expected {
                decl.resolved_type = Some(Type::int());
            }
            expected
        });
    }

    #[test]
    fn long_operator_chain_is_not_fatal() {
        let source = format!("total := 1{}\nprint(total)", " + 1".repeat(5_000));
        let ast = Compiler::default()
            .compile_source("chain.mq", &source)
            .expect("no fatal error");
        assert!(ast.has_syntax_errors());
        assert!(
            ast.syntax_errors()[0]
                .message
                .starts_with("expression is too long"),
            "{:?}",
            ast.syntax_errors()
        );
        assert_eq!(ast.statements.len(), 2);
    }

    #[test]
    fn builtins_can_be_disabled() {
        let options = CompilerOptions {
            builtins: false,
            ..CompilerOptions::default()
        };
        let ast = Compiler::new(options)
            .compile_source("nobuiltins.mq", "print(\"hi\")")
            .expect("compiles");
        assert_eq!(ast.errors, vec![CompileError::undefined("print")]);
    }

    #[test]
    fn small_token_buffer_gives_same_result() {
        let source = "a := 1\n".repeat(200);
        let default = Compiler::default()
            .compile_source("big.mq", &source)
            .expect("compiles");
        let tiny = Compiler::new(CompilerOptions {
            token_buffer: 1,
            ..CompilerOptions::default()
        })
        .compile_source("big.mq", &source)
        .expect("compiles");
        assert_eq!(default, tiny);
        assert_eq!(tiny.statements.len(), 200);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: CompilerOptions = toml::from_str("token_buffer = 8").expect("valid toml");
        assert_eq!(
            options,
            CompilerOptions {
                token_buffer: 8,
                builtins: true,
            }
        );
        let options: CompilerOptions = toml::from_str("").expect("valid toml");
        assert_eq!(options, CompilerOptions::default());
    }

    #[test]
    fn options_reject_unknown_keys() {
        assert!(toml::from_str::<CompilerOptions>("buffer = 8").is_err());
    }
}
