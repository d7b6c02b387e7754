//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Recipe-driven SVG icon compiler
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Print per-pass and per-stage details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build every icon of the given cookbooks
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },

    /// List recipes with their sizes and aliases
    #[command(visible_alias = "l")]
    List {
        #[command(flatten)]
        cookbooks: CookbookArgs,
    },
}

/// Which cookbooks to read.
#[derive(clap::Args, Debug, Clone)]
pub struct CookbookArgs {
    /// Cookbook files. If omitted, every `*.cookbook.toml` under the source directory.
    #[arg(value_name = "COOKBOOK", value_hint = clap::ValueHint::FilePath)]
    pub paths: Vec<PathBuf>,

    /// Directory searched for cookbooks
    #[arg(short, long, default_value = "src", value_hint = clap::ValueHint::DirPath)]
    pub source: PathBuf,
}

/// Build command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub cookbooks: CookbookArgs,

    /// Output directory
    #[arg(short, long, default_value = "build", value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,

    /// Worker threads (default: one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Build only the named icons
    #[arg(long, value_name = "ICON", num_args = 1..)]
    pub only: Vec<String>,
}
