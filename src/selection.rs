// src/selection.rs

//! Package selection resolution
//!
//! Turns one selection criterion into an ordered, deduplicated package
//! list. Non-interactive criteria (explicit names, kind shortcuts, all)
//! resolve purely against the discovered set. The interactive path is split
//! into pure pieces so it is testable without a terminal: [`display_rows`]
//! assigns the grouped numbering the operator sees, and
//! [`parse_index_selection`] parses the answer against it. Printing and
//! prompting stay in the command layer.

use crate::error::{Error, Result};
use crate::recipe::{BuildKind, Package};
use std::collections::{BTreeSet, HashSet};

/// Display group ordering for the interactive listing
pub const GROUP_ORDER: [BuildKind; 3] = [BuildKind::NoArch, BuildKind::Variant, BuildKind::Standard];

/// One way of choosing packages for a run
#[derive(Debug, Clone)]
pub enum Selection {
    /// Every discovered package, regardless of completion state
    All,
    /// Every package of one build kind; an empty result is valid
    Kind(BuildKind),
    /// An explicit name set; every name must resolve
    Names(Vec<String>),
}

/// Resolve a criterion against the discovered set, preserving discovery
/// order. Completion filtering is layered on by the caller afterward.
pub fn resolve(packages: &[Package], selection: &Selection) -> Result<Vec<Package>> {
    match selection {
        Selection::All => Ok(packages.to_vec()),
        Selection::Kind(kind) => Ok(packages
            .iter()
            .filter(|p| p.kind == *kind)
            .cloned()
            .collect()),
        Selection::Names(names) => resolve_names(packages, names),
    }
}

/// Resolve an explicit name set.
///
/// Unknown names are collected and reported together with the full known
/// set, so the caller can correct every mistake in one pass.
fn resolve_names(packages: &[Package], names: &[String]) -> Result<Vec<Package>> {
    let wanted: BTreeSet<&str> = names.iter().map(String::as_str).collect();
    let known: HashSet<&str> = packages.iter().map(|p| p.name.as_str()).collect();

    let unknown: Vec<String> = wanted
        .iter()
        .filter(|name| !known.contains(*name))
        .map(|name| name.to_string())
        .collect();
    if !unknown.is_empty() {
        return Err(Error::UnknownPackages {
            unknown,
            known: packages.iter().map(|p| p.name.clone()).collect(),
        });
    }

    Ok(packages
        .iter()
        .filter(|p| wanted.contains(p.name.as_str()))
        .cloned()
        .collect())
}

/// One numbered row of the interactive listing
#[derive(Debug, Clone)]
pub struct DisplayRow {
    /// 1-based index shown to the operator
    pub index: usize,
    /// Group the row is listed under
    pub kind: BuildKind,
    /// Whether the package already has its full build outputs
    pub built: bool,
    pub package: Package,
}

/// Assign display indices grouped by kind (noarch, variant, standard),
/// keeping discovery order within each group.
pub fn display_rows(packages: &[Package], built: impl Fn(&Package) -> bool) -> Vec<DisplayRow> {
    let mut rows = Vec::with_capacity(packages.len());
    let mut index = 0;
    for kind in GROUP_ORDER {
        for pkg in packages.iter().filter(|p| p.kind == kind) {
            index += 1;
            rows.push(DisplayRow {
                index,
                kind,
                built: built(pkg),
                package: pkg.clone(),
            });
        }
    }
    rows
}

/// Parse an interactive selection like `1,3,6-8` into 1-based indices.
///
/// Accepts single indices and inclusive ranges, comma-separated. An empty
/// line is fatal: selection must never silently proceed with zero
/// packages. Any index outside `1..=total` is fatal as well.
pub fn parse_index_selection(input: &str, total: usize) -> Result<Vec<usize>> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::SelectionError("no selection made".to_string()));
    }

    let mut indices = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if let Some((start, end)) = part.split_once('-') {
            let start: usize = parse_index(start)?;
            let end: usize = parse_index(end)?;
            if end < start {
                return Err(Error::SelectionError(format!("empty range: {part}")));
            }
            indices.extend(start..=end);
        } else {
            indices.push(parse_index(part)?);
        }
    }

    for &index in &indices {
        if index == 0 || index > total {
            return Err(Error::SelectionError(format!("invalid index: {index}")));
        }
    }
    Ok(indices)
}

fn parse_index(token: &str) -> Result<usize> {
    token
        .trim()
        .parse()
        .map_err(|_| Error::SelectionError(format!("not a number: {token}")))
}

/// Map parsed indices back to their packages, deduplicated, preserving the
/// entered order. Indices must already be validated against the rows.
pub fn packages_for_indices(rows: &[DisplayRow], indices: &[usize]) -> Vec<Package> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    for &index in indices {
        if let Some(row) = rows.iter().find(|r| r.index == index) {
            if seen.insert(index) {
                selected.push(row.package.clone());
            }
        }
    }
    selected
}
