//! Built icons on disk.
//!
//! Layout: `<output>/<folder>/<size>/<icon>.svg`, aliases next to it.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What happened to one alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasOutcome {
    /// Created, or replaced a link pointing elsewhere.
    Linked(PathBuf),
    /// Already correct.
    Kept(PathBuf),
    /// A real file is in the way and was left alone.
    Skipped(PathBuf),
}

/// Path of a unit's output file.
pub fn icon_path(output: &Path, folder: &str, size: &str, icon: &str) -> PathBuf {
    output.join(folder).join(size).join(format!("{icon}.svg"))
}

/// Write a built unit, creating directories as needed.
pub fn write_icon(path: &Path, svg: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, svg).with_context(|| format!("failed to write {}", path.display()))
}

/// Create `<alias>.svg` for every alias next to `icon`.
pub fn write_aliases(icon: &Path, aliases: &[String]) -> Result<Vec<AliasOutcome>> {
    let (Some(dir), Some(file_name)) = (icon.parent(), icon.file_name()) else {
        anyhow::bail!("icon path {} has no file name", icon.display());
    };

    let mut outcomes = Vec::with_capacity(aliases.len());
    for alias in aliases.iter().map(|alias| alias.trim()) {
        if alias.is_empty() {
            continue;
        }
        let link = dir.join(format!("{alias}.svg"));
        if link == icon {
            continue;
        }
        let outcome = link_alias(Path::new(file_name), icon, &link)
            .with_context(|| format!("failed to create alias {}", link.display()))?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

#[cfg(unix)]
fn link_alias(target: &Path, _icon: &Path, link: &Path) -> io::Result<AliasOutcome> {
    match fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_symlink() => {
            if fs::read_link(link)? == target {
                return Ok(AliasOutcome::Kept(link.to_path_buf()));
            }
            fs::remove_file(link)?;
        }
        Ok(_) => return Ok(AliasOutcome::Skipped(link.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    std::os::unix::fs::symlink(target, link)?;
    Ok(AliasOutcome::Linked(link.to_path_buf()))
}

/// Copies stand in for links; an identical copy counts as correct.
#[cfg(not(unix))]
fn link_alias(_target: &Path, icon: &Path, link: &Path) -> io::Result<AliasOutcome> {
    match fs::read(link) {
        Ok(existing) if existing == fs::read(icon)? => Ok(AliasOutcome::Kept(link.to_path_buf())),
        Ok(_) => Ok(AliasOutcome::Skipped(link.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::copy(icon, link)?;
            Ok(AliasOutcome::Linked(link.to_path_buf()))
        }
        Err(e) => Err(e),
    }
}
