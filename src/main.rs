//! maplive - live FHIR Mapping Language workbench.
//!
//! Watches a mapping file and a source resource, compiles the mapping on a
//! remote FHIR server and transforms the source with it whenever either
//! settles.

#![allow(dead_code)]

mod actor;
mod buffer;
mod cli;
mod config;
mod error;
mod logger;
mod remote;
mod resource;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = AppConfig::load(&cli)?;

    match &cli.command {
        Commands::Watch { inputs } => cli::watch::watch(config, inputs),
        Commands::Run { inputs } => cli::run::run(&config, inputs),
    }
}
