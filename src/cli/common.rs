//! Helpers shared by the subcommands.

use crate::cli::CookbookArgs;
use crate::config::{self, Cookbook};
use anyhow::{Context, Result, bail};

/// Load the cookbooks named on the command line, or every one under the
/// source directory when none are named.
pub fn load_cookbooks(args: &CookbookArgs) -> Result<Vec<Cookbook>> {
    let paths = if args.paths.is_empty() {
        let found = config::discover(&args.source);
        if found.is_empty() {
            bail!("no cookbooks found under {}", args.source.display());
        }
        found
    } else {
        args.paths.clone()
    };

    paths
        .iter()
        .map(|path| {
            Cookbook::load(path)
                .with_context(|| format!("failed to load cookbook {}", path.display()))
        })
        .collect()
}
