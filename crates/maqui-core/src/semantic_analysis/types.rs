// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Types resolved by the context analyser.
//!
//! [`Type`] is a closed set: basic named types, function types, and the
//! [`TypeErr`] placeholder produced once an expression fails to resolve.
//! Comparisons between types go through [`Type::equals`], which is
//! structural and ignores argument names; the derived `PartialEq` is full
//! equality and is what tests compare with.

use std::fmt;

use ecow::EcoString;

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Basic(BasicType),
    Func(FuncType),
    Err(TypeErr),
}

impl Type {
    /// The `int` type.
    #[must_use]
    pub fn int() -> Self {
        Self::Basic(BasicType::int())
    }

    /// The `string` type.
    #[must_use]
    pub fn string() -> Self {
        Self::Basic(BasicType::string())
    }

    /// Structural type equality.
    ///
    /// Basic types are equal when their names are. Function types are equal
    /// when their argument types and return types match pairwise, in order.
    /// Type errors are equal when they are the same kind of error.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Basic(a), Self::Basic(b)) => a.equals(b),
            (Self::Func(a), Self::Func(b)) => a.equals(b),
            (Self::Err(a), Self::Err(b)) => a == b,
            _ => false,
        }
    }

    /// Returns `true` for the unresolved placeholder types.
    #[must_use]
    pub const fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(basic) => basic.fmt(f),
            Self::Func(func) => func.fmt(f),
            Self::Err(err) => err.fmt(f),
        }
    }
}

impl From<BasicType> for Type {
    fn from(basic: BasicType) -> Self {
        Self::Basic(basic)
    }
}

impl From<FuncType> for Type {
    fn from(func: FuncType) -> Self {
        Self::Func(func)
    }
}

impl From<TypeErr> for Type {
    fn from(err: TypeErr) -> Self {
        Self::Err(err)
    }
}

/// A named scalar type such as `int` or `string`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BasicType {
    pub name: EcoString,
}

impl BasicType {
    #[must_use]
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn int() -> Self {
        Self::new("int")
    }

    #[must_use]
    pub fn string() -> Self {
        Self::new("string")
    }

    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A named function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentType {
    pub name: EcoString,
    pub ty: Type,
}

impl ArgumentType {
    #[must_use]
    pub fn new(name: impl Into<EcoString>, ty: impl Into<Type>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// A function signature: parameters and zero or more return types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuncType {
    pub args: Vec<ArgumentType>,
    pub returns: Vec<BasicType>,
}

impl FuncType {
    #[must_use]
    pub fn new(args: Vec<ArgumentType>, returns: Vec<BasicType>) -> Self {
        Self { args, returns }
    }

    /// Compares parameter and return types pairwise; names are ignored.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self.args.len() == other.args.len()
            && self.returns.len() == other.returns.len()
            && self
                .args
                .iter()
                .zip(&other.args)
                .all(|(a, b)| a.ty.equals(&b.ty))
            && self
                .returns
                .iter()
                .zip(&other.returns)
                .all(|(a, b)| a.equals(b))
    }
}

impl fmt::Display for FuncType {
    /// `func(string, int) string, int`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("func(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg.ty)?;
        }
        f.write_str(")")?;
        for (i, ret) in self.returns.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{ret}")?;
        }
        Ok(())
    }
}

/// Why an expression has no usable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeErr {
    /// The operands or operator do not fit together.
    Incompatible,
    /// A referenced name does not exist.
    Undefined,
}

impl fmt::Display for TypeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incompatible => f.write_str("<incompatible>"),
            Self::Undefined => f.write_str("<undefined>"),
        }
    }
}
