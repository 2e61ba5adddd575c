// src/recipe/scanner.rs

//! Package discovery and recipe classification
//!
//! Scans the `pkgs/` tree for buildable recipes and detects each package's
//! build kind from the recipe text. Classification is a heuristic over the
//! literal document: a `cuda_version` mention in a comment still counts as
//! a variant marker. The precedence order (noarch, then variant, then
//! standard) is fixed; a recipe matching both detectors is noarch.

use crate::error::{Error, Result};
use crate::recipe::{BuildKind, Package};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Recipe filename looked for in each package directory
const RECIPE_FILE: &str = "recipe.yaml";

/// Variant-axis marker that flags a combinatorial build
const VARIANT_MARKER: &str = "cuda_version";

/// A `noarch:` key at nested indentation, i.e. inside a build block rather
/// than at the document root
static NOARCH_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s+noarch:").unwrap());

/// Classify a recipe's build kind from its literal content.
///
/// `noarch` takes precedence over the variant marker when a document
/// matches both detectors.
pub fn classify(content: &str) -> BuildKind {
    if NOARCH_KEY.is_match(content) {
        return BuildKind::NoArch;
    }
    if content.contains(VARIANT_MARKER) {
        return BuildKind::Variant;
    }
    BuildKind::Standard
}

/// Discover every buildable package under `<repo_root>/pkgs/`.
///
/// Immediate subdirectories are visited in lexicographic order. A nested
/// `recipe/recipe.yaml` wins over a top-level `recipe.yaml`; directories
/// with neither are skipped (heterogeneous trees are expected). A recipe
/// that exists but cannot be read aborts discovery: the returned list is
/// never partial.
pub fn discover_packages(repo_root: &Path) -> Result<Vec<Package>> {
    let pkgs_dir = repo_root.join("pkgs");
    if !pkgs_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = fs::read_dir(&pkgs_dir)
        .and_then(|iter| iter.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| {
            Error::DiscoveryError(format!("failed to read {}: {e}", pkgs_dir.display()))
        })?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut packages = Vec::new();
    for entry in entries {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }

        let nested = dir.join("recipe").join(RECIPE_FILE);
        let (recipe_path, recipe_dir) = if nested.is_file() {
            (nested, dir.join("recipe"))
        } else {
            let flat = dir.join(RECIPE_FILE);
            if !flat.is_file() {
                continue;
            }
            (flat, dir.clone())
        };

        let content = fs::read_to_string(&recipe_path).map_err(|e| {
            Error::DiscoveryError(format!("failed to read {}: {e}", recipe_path.display()))
        })?;

        let name = entry.file_name().to_string_lossy().into_owned();
        let kind = classify(&content);
        let recipe_dir = recipe_dir
            .strip_prefix(repo_root)
            .unwrap_or(&recipe_dir)
            .to_path_buf();
        debug!("discovered {name} ({kind}) at {}", recipe_dir.display());

        packages.push(Package {
            name,
            recipe_dir,
            kind,
        });
    }

    Ok(packages)
}
