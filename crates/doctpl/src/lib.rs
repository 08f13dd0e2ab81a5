//! # doctpl - DOCX Template Command Line
//!
//! Drives [`doctpl_render`] over files: contexts and field schemas are read
//! from YAML or JSON, rendered documents are written to disk and optionally
//! converted to PDF through [`doctpl_convert`].
//!
//! Configuration comes from the embedded defaults, then `--config <file>` or
//! `./doctpl.toml`, then command-line overrides. See [`config`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod schema;

use anyhow::{Context as _, Result};

use crate::cli::Cli;
use crate::config::DoctplConfig;

/// Loads configuration for `cli` and runs its subcommand.
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    commands::dispatch(cli.command, &config)
}

pub fn load_config(cli: &Cli) -> Result<DoctplConfig> {
    let mut overrides = Vec::new();
    if let Some(color) = cli.command.highlight() {
        overrides.push(("engine.highlight", color));
    }
    config::load(cli.config.as_deref(), &overrides).context("invalid configuration")
}
