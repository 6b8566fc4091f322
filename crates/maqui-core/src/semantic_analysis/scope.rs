// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Symbol tables for semantic analysis.
//!
//! There is one [`SymbolTable`] per lexical block: the global scope and one
//! per function body. Every statement analysed in a block holds a
//! [`ScopeRef`] to the same table, so a handle taken from an early statement
//! sees entries added by later statements once the block is done.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use ecow::EcoString;

use super::{CompileError, Type};

/// Name to type bindings of one lexical block, plus the errors raised in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    entries: BTreeMap<EcoString, Type>,
    errors: Vec<CompileError>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `ty`, replacing any previous binding in this table.
    pub fn define(&mut self, name: impl Into<EcoString>, ty: Type) {
        self.entries.insert(name.into(), ty);
    }

    /// Looks `name` up in this table only.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Type> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Records an error raised while analysing this block.
    pub fn push_error(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    /// Copies every entry of `other` into this table. Entries already
    /// present are overwritten; errors are not copied.
    pub fn import(&mut self, other: &Self) {
        self.entries
            .extend(other.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// A deep, independently mutable duplicate.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Bindings in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&EcoString, &Type)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Errors raised in this block, in discovery order.
    #[must_use]
    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, ty)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {ty}")?;
        }
        f.write_str("}")
    }
}

/// A shared handle to a [`SymbolTable`].
///
/// Cloning the handle aliases the table. Equality compares table contents,
/// use [`ScopeRef::ptr_eq`] for identity.
#[derive(Clone, Default)]
pub struct ScopeRef(Rc<RefCell<SymbolTable>>);

impl ScopeRef {
    #[must_use]
    pub fn new(table: SymbolTable) -> Self {
        Self(Rc::new(RefCell::new(table)))
    }

    /// Borrows the table.
    ///
    /// # Panics
    ///
    /// Panics if the table is currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, SymbolTable> {
        self.0.borrow()
    }

    /// Mutably borrows the table.
    ///
    /// # Panics
    ///
    /// Panics if the table is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, SymbolTable> {
        self.0.borrow_mut()
    }

    /// Returns `true` if both handles point at the same table.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// A snapshot of the table's current contents.
    #[must_use]
    pub fn snapshot(&self) -> SymbolTable {
        self.borrow().copy()
    }
}

impl From<SymbolTable> for ScopeRef {
    fn from(table: SymbolTable) -> Self {
        Self::new(table)
    }
}

impl PartialEq for ScopeRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.borrow() == *other.borrow()
    }
}

impl Eq for ScopeRef {}

impl fmt::Debug for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.borrow(), f)
    }
}
