// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Shared test helpers for maqui-core tests.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Returns the path of `dir` as UTF-8.
///
/// # Panics
///
/// Panics if the temp dir is not valid UTF-8.
pub fn utf8_dir(dir: &TempDir) -> &Utf8Path {
    Utf8Path::from_path(dir.path()).expect("temp dir is UTF-8")
}

/// Writes `source` to `name` inside `dir` and returns its path.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_source(dir: &TempDir, name: &str, source: &str) -> Utf8PathBuf {
    let path = utf8_dir(dir).join(name);
    std::fs::write(&path, source).expect("write source file");
    path
}
