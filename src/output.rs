// src/output.rs

//! Built-artifact inspection for the local output directory
//!
//! The container builder writes finished archives into platform
//! subdirectories of `output/` (`linux-64/` for native builds, `noarch/`
//! for platform-independent ones). This module answers "is this package
//! already built?" and handles the `--clean` reset. It never creates
//! artifacts itself.

use crate::error::{Error, Result};
use crate::recipe::{BuildKind, Package};
use std::fs;
use std::path::{Path, PathBuf};

/// Platform subdirectory the container builder targets for native builds
pub const BUILD_PLATFORM: &str = "linux-64";

/// Archive extension counted toward completeness
const CONDA_EXT: &str = ".conda";

/// Subdirectories removed by a clean: finished outputs plus the builder's
/// reject pile. Source and build caches survive for faster rebuilds.
const CLEAN_SUBDIRS: [&str; 3] = [BUILD_PLATFORM, "noarch", "broken"];

/// Whether a package already has its full set of build outputs.
///
/// Standard and noarch packages are done after one matching archive. A
/// variant package is done only once at least `variant_count` matching
/// archives exist: one recipe fans out into the whole matrix, and a
/// partial set must never count as built.
pub fn is_built(pkg: &Package, output_dir: &Path, variant_count: usize) -> bool {
    let subdir = match pkg.kind {
        BuildKind::NoArch => output_dir.join("noarch"),
        _ => output_dir.join(BUILD_PLATFORM),
    };
    if !subdir.is_dir() {
        return false;
    }

    let matches = count_artifacts(&subdir, &pkg.name);
    match pkg.kind {
        BuildKind::Variant => matches >= variant_count,
        _ => matches >= 1,
    }
}

/// Count archives in `subdir` named `<name>-*.conda`.
fn count_artifacts(subdir: &Path, name: &str) -> usize {
    let prefix = format!("{name}-");
    let Ok(entries) = fs::read_dir(subdir) else {
        return 0;
    };
    entries
        .flatten()
        .filter(|entry| {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            file_name.starts_with(&prefix) && file_name.ends_with(CONDA_EXT)
        })
        .count()
}

/// The clean targets that currently exist under `output_dir`.
pub fn clean_targets(output_dir: &Path) -> Vec<PathBuf> {
    CLEAN_SUBDIRS
        .iter()
        .map(|name| output_dir.join(name))
        .filter(|path| path.exists())
        .collect()
}

/// Remove finished build outputs, returning what was removed.
pub fn clean_output(output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for target in clean_targets(output_dir) {
        fs::remove_dir_all(&target)
            .map_err(|e| Error::IoError(format!("failed to remove {}: {e}", target.display())))?;
        removed.push(target);
    }
    Ok(removed)
}
