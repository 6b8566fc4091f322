// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `maqui.toml` loading.
//!
//! The file is optional. Without `--config`, the CLI looks for `maqui.toml`
//! in the directory of the source file and falls back to the defaults when
//! there is none. A file named by `--config` must exist.
//!
//! ```toml
//! [compiler]
//! token_buffer = 16
//! builtins = true
//! ```

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use camino::{Utf8Path, Utf8PathBuf};
use maqui_core::CompilerOptions;
use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// File name searched for next to the source file.
pub const CONFIG_FILE_NAME: &str = "maqui.toml";

/// Contents of `maqui.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub compiler: CompilerOptions,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    #[diagnostic(code(maqui::config::read))]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    #[diagnostic(code(maqui::config::parse), help("see `[compiler]` keys: token_buffer, builtins"))]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Loads the configuration for compiling `source`.
///
/// # Errors
///
/// Returns [`ConfigError`] if an explicit config file is missing, or if any
/// config file that is found cannot be read or parsed.
pub fn load(explicit: Option<&Utf8Path>, source: &Utf8Path) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return read(path);
    }

    let candidate = source
        .parent()
        .map_or_else(|| Utf8PathBuf::from(CONFIG_FILE_NAME), |dir| dir.join(CONFIG_FILE_NAME));
    if candidate.is_file() {
        read(&candidate)
    } else {
        debug!(%candidate, "no config file, using defaults");
        Ok(Config::default())
    }
}

fn read(path: &Utf8Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })?;
    debug!(%path, ?config, "loaded config");
    Ok(config)
}
