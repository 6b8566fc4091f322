// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Declarations every program can use without defining them.

use super::{ArgumentType, FuncType, SymbolTable, Type};

/// Names of the builtin declarations, in definition order.
pub const BUILTIN_NAMES: &[&str] = &["print"];

/// Seeds `scope` with the builtin declarations.
///
/// | Name | Type |
/// |------|------|
/// | `print` | `func(value string)` |
pub fn define_builtins(scope: &mut SymbolTable) {
    scope.define(
        "print",
        Type::Func(FuncType::new(
            vec![ArgumentType::new("value", Type::string())],
            vec![],
        )),
    );
}
