// src/commands/upload.rs

//! Upload command - sync local artifacts to the remote channel

use anyhow::Result;
use kiln::channel::{self, ChannelConfig, SkipReason, UploadOutcome};
use kiln::Error;
use std::fs;
use std::path::{Path, PathBuf};

const MIB: f64 = 1024.0 * 1024.0;

/// Upload packages to the channel, skipping ones already there
pub fn cmd_upload(
    files: &[String],
    all: bool,
    channel_name: Option<&str>,
    output_dir: &str,
    force: bool,
    dry_run: bool,
) -> Result<()> {
    let mut config = ChannelConfig::from_env();
    if let Some(name) = channel_name {
        config.channel = name.to_string();
    }

    let artifacts: Vec<PathBuf> = if all {
        channel::find_artifacts(Path::new(output_dir))
    } else if !files.is_empty() {
        files.iter().map(PathBuf::from).collect()
    } else {
        println!("Nothing to upload: pass package files or --all");
        return Ok(());
    };

    if artifacts.is_empty() {
        println!("No packages found to upload");
        return Ok(());
    }
    println!("Found {} local package(s)", artifacts.len());

    let client = channel::http_client()?;

    // Diff against the channel unless --force republishes everything
    let (to_upload, present) = if force {
        (artifacts, Vec::new())
    } else {
        channel::partition_new(&artifacts, &client, &config)
    };

    if !present.is_empty() {
        println!(
            "\nSkipping {} package(s) already on '{}':",
            present.len(),
            config.channel
        );
        for path in &present {
            println!("  - {}", display_name(path));
        }
    }
    if to_upload.is_empty() {
        println!("\nAll packages are already on the channel. Nothing to upload.");
        return Ok(());
    }

    println!(
        "\n{} package(s) to upload to '{}':",
        to_upload.len(),
        config.channel
    );
    for path in &to_upload {
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        println!(
            "  - {} ({:.2} MB)",
            display_name(path),
            size as f64 / MIB
        );
    }
    println!();

    if dry_run {
        println!("Dry run - no packages uploaded");
        return Ok(());
    }

    let token = config.require_token()?.to_string();

    let mut uploaded = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for path in &to_upload {
        let name = display_name(path);
        match channel::upload_artifact(&client, &config, &token, path, force) {
            UploadOutcome::Uploaded => {
                uploaded += 1;
                println!("  Uploaded {name}");
            }
            UploadOutcome::Skipped(SkipReason::NotPackageArchive) => {
                skipped += 1;
                println!("  Skipping {name}: not a conda package");
            }
            UploadOutcome::Skipped(SkipReason::TooLarge { size, limit }) => {
                skipped += 1;
                println!(
                    "  Skipping {name}: too large ({:.1} MB > {:.0} MB limit)",
                    size as f64 / MIB,
                    limit as f64 / MIB
                );
            }
            UploadOutcome::Skipped(SkipReason::AlreadyExists) => {
                skipped += 1;
                println!("  {name} already exists on the channel (use --force to overwrite)");
            }
            UploadOutcome::Failed(reason) => {
                failed += 1;
                println!("  Upload failed for {name}: {reason}");
            }
        }
    }

    println!();
    println!("Upload complete: {uploaded} uploaded, {skipped} skipped, {failed} failed");

    if failed > 0 {
        return Err(Error::UploadFailed { failed }.into());
    }
    Ok(())
}

/// `subdir/filename` as the operator-facing artifact label
fn display_name(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    match path.parent().and_then(|p| p.file_name()) {
        Some(parent) => format!("{}/{file}", parent.to_string_lossy()),
        None => file,
    }
}
