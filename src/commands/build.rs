// src/commands/build.rs

//! Build command - select packages and drive the containerized builder

use anyhow::{Context, Result};
use kiln::dispatch::DispatchConfig;
use kiln::recipe::{discover_packages, variant_count, BuildKind, Package};
use kiln::{dispatch, output, selection};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use super::upload::cmd_upload;

/// Build selected packages in the container, then publish the outputs
#[allow(clippy::too_many_arguments)]
pub fn cmd_build(
    packages: &[String],
    all: bool,
    noarch_only: bool,
    variant_only: bool,
    clean: bool,
    jobs: u32,
    no_sccache: bool,
    docker_image: &str,
    dry_run: bool,
    no_upload: bool,
    force: bool,
    repo_root: &str,
) -> Result<()> {
    let repo_root = fs::canonicalize(repo_root)
        .with_context(|| format!("repository root not found: {repo_root}"))?;
    let output_dir = repo_root.join("output");
    let expected_variants = variant_count(&repo_root);

    let discovered = discover_packages(&repo_root)?;
    if discovered.is_empty() {
        println!("No packages found in pkgs/");
        return Ok(());
    }

    // Clean before selection so the built-status annotations are honest
    if clean {
        if dry_run {
            println!("\n[DRY RUN] Would clean built outputs from:");
            for target in output::clean_targets(&output_dir) {
                println!("  {}", target.display());
            }
            println!();
        } else {
            println!("\nCleaning built outputs...");
            for removed in output::clean_output(&output_dir)? {
                println!("  Removed {}", removed.display());
            }
            println!();
        }
    }

    let criterion = if all {
        Some(selection::Selection::All)
    } else if noarch_only {
        Some(selection::Selection::Kind(BuildKind::NoArch))
    } else if variant_only {
        Some(selection::Selection::Kind(BuildKind::Variant))
    } else if !packages.is_empty() {
        Some(selection::Selection::Names(packages.to_vec()))
    } else {
        None
    };

    let mut selected = match criterion {
        Some(criterion) => selection::resolve(&discovered, &criterion)?,
        None => interactive_select(&discovered, &output_dir, expected_variants)?,
    };

    if selected.is_empty() {
        println!("No packages selected.");
        return Ok(());
    }

    // Skip already-built packages unless --clean just wiped them
    if !clean {
        let (skipped, to_build): (Vec<_>, Vec<_>) = selected
            .into_iter()
            .partition(|pkg| output::is_built(pkg, &output_dir, expected_variants));

        if !skipped.is_empty() {
            println!("\nSkipping {} already-built package(s):", skipped.len());
            for pkg in &skipped {
                println!("  - {} ({})", pkg.name, pkg.kind);
            }
        }

        selected = to_build;
        if selected.is_empty() {
            println!("\nAll selected packages are already built. Use --clean to rebuild.");
            return Ok(());
        }
    }

    println!("\nBuilding {} package(s):", selected.len());
    for pkg in &selected {
        println!("  - {} ({})", pkg.name, pkg.kind);
    }
    println!();

    let config = DispatchConfig::from_env(&repo_root, docker_image.to_string(), jobs, !no_sccache);
    config.ensure_host_dirs()?;

    if dry_run {
        println!("[DRY RUN] Docker command:");
        print!("{}", dispatch::format_dry_run(&config.docker_args(&selected)));
        return Ok(());
    }

    println!("Launching Docker build...\n");
    config.run(&selected)?;

    if !no_upload {
        println!("\nUploading packages to the channel...\n");
        let output_dir = output_dir.to_string_lossy().into_owned();
        cmd_upload(&[], true, None, &output_dir, force, false).map_err(|e| {
            println!("\nUpload failed (build succeeded). Run manually: kiln upload --all");
            e
        })?;
    }

    Ok(())
}

/// Group heading shown above each kind in the interactive listing
fn group_label(kind: BuildKind) -> &'static str {
    match kind {
        BuildKind::NoArch => "Noarch packages:",
        BuildKind::Variant => "Variant packages (CUDA):",
        BuildKind::Standard => "Standard packages:",
    }
}

/// Present the grouped, numbered package list and read one selection.
fn interactive_select(
    packages: &[Package],
    output_dir: &Path,
    expected_variants: usize,
) -> Result<Vec<Package>> {
    let rows = selection::display_rows(packages, |pkg| {
        output::is_built(pkg, output_dir, expected_variants)
    });

    println!("\n=== kiln local builder ===\n");
    let mut current_kind = None;
    for row in &rows {
        if current_kind != Some(row.kind) {
            println!("  {}", group_label(row.kind));
            current_kind = Some(row.kind);
        }
        let status = if row.built { " (built)" } else { "" };
        println!("    {:>2}. {}{}", row.index, row.package.name, status);
    }
    println!("\n  Shortcuts: 'all', 'noarch', 'variant', 'standard'");
    println!("  Examples:  '1,3,6-8' or 'all'\n");
    print!("  Select packages > ");
    io::stdout().flush().context("failed to flush prompt")?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read selection")?;
    let input = line.trim().to_lowercase();

    if input == "all" {
        return Ok(packages.to_vec());
    }
    if let Ok(kind) = BuildKind::from_str(&input) {
        return Ok(packages.iter().filter(|p| p.kind == kind).cloned().collect());
    }

    let indices = selection::parse_index_selection(&input, rows.len())?;
    Ok(selection::packages_for_indices(&rows, &indices))
}
