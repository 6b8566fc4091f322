// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Maqui compiler command-line interface.
//!
//! This is the main entry point for the `maqui` command.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, Subcommand};
use miette::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod diagnostic;

/// Maqui: a small statically typed language
#[derive(Debug, Parser)]
#[command(name = "maqui")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Read compiler options from this file instead of `maqui.toml` next to the source
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a source file for syntax and type errors
    Check {
        /// Source file to check
        path: Utf8PathBuf,
    },

    /// Print the tokens of a source file, one per line
    Tokens {
        /// Source file to tokenize
        path: Utf8PathBuf,
    },

    /// Print the analysed statements of a source file
    Ast {
        /// Source file to analyse
        path: Utf8PathBuf,
    },
}

impl Command {
    fn path(&self) -> &Utf8PathBuf {
        match self {
            Self::Check { path } | Self::Tokens { path } | Self::Ast { path } => path,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let config = config::load(cli.config.as_deref(), cli.command.path())?;
    let options = config.compiler;

    match &cli.command {
        Command::Check { path } => commands::check::run(path, &options),
        Command::Tokens { path } => commands::tokens::run(path, &options),
        Command::Ast { path } => commands::ast::run(path, &options),
    }
}

fn init_tracing(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(verbose))),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn directive_for_verbosity(v: u8) -> &'static str {
    // Targets are module paths, so the binary is `maqui_cli`, not `maqui`.
    match v {
        0 => "maqui_cli=warn,maqui_core=warn",
        1 => "maqui_cli=debug,maqui_core=debug",
        _ => "maqui_cli=trace,maqui_core=trace",
    }
}
