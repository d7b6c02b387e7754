//! Icon theme building.
//!
//! Each cookbook is one batch: its units run on a shared rayon pool while a
//! progress line counts them, then successful documents and their aliases are
//! written under the output directory.

use crate::{
    build::{Shared, Unit, UnitReport, build_batch},
    cli::{BuildArgs, common::load_cookbooks},
    config::Cookbook,
    log,
    logger::ProgressLine,
    output::{self, AliasOutcome},
    utils::plural_count,
};
use anyhow::{Context, Result, bail};
use std::ops::AddAssign;
use std::path::Path;
use std::time::Instant;

/// Counts for one cookbook, or all of them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub built: usize,
    pub failed: usize,
    pub aliases: usize,
}

impl AddAssign for Summary {
    fn add_assign(&mut self, other: Self) {
        self.built += other.built;
        self.failed += other.failed;
        self.aliases += other.aliases;
    }
}

impl Summary {
    fn describe(&self) -> String {
        format!(
            "{} built, {} failed, {}",
            plural_count(self.built, "icon"),
            self.failed,
            plural_count(self.aliases, "alias")
        )
    }
}

/// Build every selected cookbook. Fails when any unit failed.
pub fn build_cookbooks(args: &BuildArgs) -> Result<Summary> {
    let start = Instant::now();
    let mut cookbooks = load_cookbooks(&args.cookbooks)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.unwrap_or(0))
        .build()
        .context("failed to create thread pool")?;

    let mut total = Summary::default();
    for cookbook in &mut cookbooks {
        cookbook.retain_recipes(&args.only);
        total += pool.install(|| build_cookbook(cookbook, &args.output));
    }

    log!(
        "build";
        "{} in {:.2}s",
        total.describe(),
        start.elapsed().as_secs_f64()
    );
    if total.failed > 0 {
        bail!("{} failed", plural_count(total.failed, "unit"));
    }
    Ok(total)
}

/// Build and write one cookbook. Runs on the current rayon pool.
fn build_cookbook(cookbook: &Cookbook, output: &Path) -> Summary {
    let name = cookbook.name();
    let units = Unit::all(&cookbook.recipes);
    if units.is_empty() {
        log!("skip"; "{}: nothing to build", name);
        return Summary::default();
    }

    let shared = Shared {
        palette: &cookbook.palette,
        options: &cookbook.options,
    };
    let loader = cookbook.loader();

    let progress = ProgressLine::new(name.as_str(), &[("units", units.len())]);
    let reports = build_batch(&units, shared, &loader, |report| {
        log_report(report);
        progress.inc("units");
    });
    progress.finish();

    let mut summary = Summary::default();
    for (unit, report) in units.iter().zip(&reports) {
        let Ok(svg) = &report.outcome else {
            summary.failed += 1;
            continue;
        };
        match write_unit(unit, svg, output) {
            Ok(aliases) => {
                summary.built += 1;
                summary.aliases += aliases;
            }
            Err(e) => {
                log!("fail"; "{}@{}: {:#}", report.icon, report.size, e);
                summary.failed += 1;
            }
        }
    }

    log!("build"; "{}: {}", name, summary.describe());
    summary
}

fn log_report(report: &UnitReport) {
    match &report.outcome {
        Ok(_) => log!(
            "done";
            "{}/{}@{} in {}ms",
            report.context,
            report.icon,
            report.size,
            report.elapsed.as_millis()
        ),
        Err(failure) => {
            log!("fail"; "{}@{}: {}", report.icon, report.size, failure);
            if let Some(offender) = failure.error.offender() {
                crate::debug!("fail"; "{}@{} offending `{}`", report.icon, report.size, offender);
            }
        }
    }
}

/// Write one document and its aliases, returning how many aliases are in place.
fn write_unit(unit: &Unit<'_>, svg: &str, output: &Path) -> Result<usize> {
    let recipe = unit.recipe;
    let path = output::icon_path(output, &recipe.folder, unit.size, &recipe.name);
    output::write_icon(&path, svg)?;

    let mut in_place = 0;
    for outcome in output::write_aliases(&path, &recipe.aliases)? {
        match outcome {
            AliasOutcome::Linked(_) | AliasOutcome::Kept(_) => in_place += 1,
            AliasOutcome::Skipped(link) => {
                log!("skip"; "alias {} is a real file", link.display());
            }
        }
    }
    Ok(in_place)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CookbookArgs;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const COOKBOOK: &str = r##"
[cookbook]
reserved-ids = ["current-color-scheme"]

[defaults]
sizes = ["16"]
folder = "actions"
base = "bases/square"

[recipes.edit-copy]
template = "copy.svg"
aliases = ["gtk-copy"]

[recipes.edit-cut]
template = "cut.svg"
"##;

    const BASE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16"><g id="content"/></svg>"#;
    const COPY: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M3 1h7v14H3z"/></svg>"#;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("bases")).unwrap();
        fs::write(src.join("icons.cookbook.toml"), COOKBOOK).unwrap();
        fs::write(src.join("bases/square.16.svg"), BASE).unwrap();
        fs::write(src.join("copy.svg"), COPY).unwrap();
        dir
    }

    fn args(dir: &TempDir, only: &[&str]) -> BuildArgs {
        BuildArgs {
            cookbooks: CookbookArgs {
                paths: vec![],
                source: dir.path().join("src"),
            },
            output: dir.path().join("build"),
            jobs: Some(2),
            only: only.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn built(dir: &TempDir, icon: &str) -> PathBuf {
        dir.path().join("build/actions/16").join(format!("{icon}.svg"))
    }

    #[test]
    fn test_only_filter_builds_selected_icons() {
        let dir = project();
        let summary = build_cookbooks(&args(&dir, &["edit-copy"])).unwrap();
        assert_eq!(
            summary,
            Summary {
                built: 1,
                failed: 0,
                aliases: 1,
            }
        );

        let svg = fs::read_to_string(built(&dir, "edit-copy")).unwrap();
        assert!(svg.contains(r#"d="M3 1h7v14H3z""#), "{svg}");
        assert!(built(&dir, "gtk-copy").exists());
    }

    #[test]
    fn test_failed_unit_fails_the_run() {
        let dir = project();
        let err = build_cookbooks(&args(&dir, &[])).unwrap_err();
        assert_eq!(err.to_string(), "1 unit failed");

        // the healthy icon is still written
        assert!(built(&dir, "edit-copy").is_file());
        assert!(!built(&dir, "edit-cut").exists());
    }

    #[test]
    fn test_summary_text() {
        let mut total = Summary {
            built: 1,
            failed: 0,
            aliases: 0,
        };
        total += Summary {
            built: 1,
            failed: 2,
            aliases: 1,
        };
        assert_eq!(total.describe(), "2 icons built, 2 failed, 1 alias");
    }
}
