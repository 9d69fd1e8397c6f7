//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Live FHIR mapping workbench: edit a mapping and a source resource, see the result
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: maplive.toml)
    #[arg(short = 'C', long, default_value = "maplive.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Override the mapping server base URL
    #[arg(short, long, global = true, value_hint = clap::ValueHint::Url)]
    pub server: Option<String>,

    /// Override the quiet interval (milliseconds without edits before a buffer settles)
    #[arg(short, long = "quiet-ms", global = true)]
    pub quiet_ms: Option<u64>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Watch a mapping file and a source file, recompiling and transforming on change
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Compile and transform once, then exit
    #[command(visible_alias = "r")]
    Run {
        #[command(flatten)]
        inputs: InputArgs,
    },
}

/// Shared input arguments for Watch and Run commands
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// FHIR Mapping Language file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub map: PathBuf,

    /// Source resource (JSON)
    #[arg(short = 'i', long, value_hint = clap::ValueHint::FilePath)]
    pub source: PathBuf,
}

impl Cli {
    pub fn inputs(&self) -> &InputArgs {
        match &self.command {
            Commands::Watch { inputs } | Commands::Run { inputs } => inputs,
        }
    }
}
