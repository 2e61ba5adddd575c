// src/recipe/variants.rs

//! Variant matrix cardinality
//!
//! `variants.yaml` at the repository root declares named axes, each a list
//! of values; the build matrix for a variant recipe is their cross product.
//! Only the axis sizes matter here, so the file is scanned line by line
//! rather than parsed structurally, which keeps the count robust against
//! foreign content in the document.

use std::fs;
use std::path::Path;

/// Variant configuration filename at the repository root
const VARIANTS_FILE: &str = "variants.yaml";

/// Expected number of builds a variant recipe fans out into.
///
/// A missing configuration means no fan-out: every variant package behaves
/// like a single-build package.
pub fn variant_count(repo_root: &Path) -> usize {
    match fs::read_to_string(repo_root.join(VARIANTS_FILE)) {
        Ok(content) => parse_variant_config(&content),
        Err(_) => 1,
    }
}

/// Compute the matrix cardinality from a variants document.
///
/// Blank lines and `#` comments are ignored. A `- ` item counts toward the
/// current axis; a line ending in `:` closes the previous axis and opens a
/// new one. An axis that collected no items stays out of the product, so a
/// stray trailing key can never zero the count.
pub fn parse_variant_config(content: &str) -> usize {
    let mut axes: Vec<usize> = Vec::new();
    let mut current = 0usize;

    for line in content.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }
        if stripped.starts_with("- ") {
            current += 1;
        } else if stripped.ends_with(':') {
            if current > 0 {
                axes.push(current);
            }
            current = 0;
        }
    }
    if current > 0 {
        axes.push(current);
    }

    axes.into_iter().product()
}
