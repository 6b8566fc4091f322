// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for whole-pipeline crash safety.
//!
//! Arbitrary bytes go through the lexer, parser and analyser. The compiler
//! passes if it never panics: a fatal lexical error or an `Ast` full of
//! diagnostics are both fine.
//!
//! ```sh
//! cargo +nightly fuzz run compile_arbitrary
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use maqui_core::{Compiler, CompilerOptions};

fuzz_target!(|data: &[u8]| {
    // Invalid UTF-8 is rejected when the file is read, before lexing.
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // A one-token buffer maximises interleaving between the lexer thread
    // and the parser.
    let options = CompilerOptions {
        token_buffer: 1,
        ..CompilerOptions::default()
    };
    if let Ok(ast) = Compiler::new(options).compile_source("fuzz.mq", source) {
        for err in ast.syntax_errors() {
            assert!(err.location.span.end() as usize <= source.len());
        }
    }
});
