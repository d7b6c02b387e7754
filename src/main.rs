//! iconbake - recipe-driven SVG icon compiler.

mod build;
mod cli;
mod compose;
mod config;
mod logger;
mod optimize;
mod output;
mod recipe;
mod svg;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match &cli.command {
        Commands::Build { args } => cli::build::build_cookbooks(args).map(|_| ()),
        Commands::List { cookbooks } => cli::list::list_recipes(cookbooks),
    }
}
