// src/channel/upload.rs

//! Artifact enumeration and per-artifact upload
//!
//! Uploads are per-artifact and non-fatal to the batch: each one resolves
//! to an [`UploadOutcome`] and the caller aggregates. Only recognized
//! package archives under the fixed platform-subdirectory allow-list are
//! ever considered, which keeps stray files out of the channel.

use super::ChannelConfig;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Timeout for one artifact upload, sized for archives near the limit
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Upload size ceiling enforced by the channel (100 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Platform subdirectories recognized as artifact sources
const PLATFORM_SUBDIRS: [&str; 9] = [
    "linux-64",
    "linux-aarch64",
    "linux-ppc64le",
    "linux-s390x",
    "osx-64",
    "osx-arm64",
    "win-64",
    "win-arm64",
    "noarch",
];

/// Result of one artifact upload attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Stored by the channel
    Uploaded,
    /// Not attempted or refused for an expected reason; the batch continues
    /// and the run still counts as successful
    Skipped(SkipReason),
    /// Transport or server failure; the batch continues but the run exits
    /// nonzero
    Failed(String),
}

/// Expected reasons an artifact is left alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Not a recognized package-archive format
    NotPackageArchive,
    /// Larger than the channel accepts
    TooLarge { size: u64, limit: u64 },
    /// Filename already on the channel and `force` was not set
    AlreadyExists,
}

/// Whether a filename is a recognized package archive.
fn is_package_archive(name: &str) -> bool {
    name.ends_with(".conda") || name.ends_with(".tar.bz2")
}

/// Enumerate every package archive under the platform subdirectories of
/// `output_dir`, sorted for stable processing order.
///
/// A missing output directory yields an empty set; subdirectories outside
/// the allow-list are ignored entirely.
pub fn find_artifacts(output_dir: &Path) -> Vec<PathBuf> {
    let mut artifacts = Vec::new();
    for subdir in PLATFORM_SUBDIRS {
        let dir = output_dir.join(subdir);
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name();
            if path.is_file() && is_package_archive(&name.to_string_lossy()) {
                artifacts.push(path);
            }
        }
    }
    artifacts.sort();
    artifacts
}

/// Upload one artifact to the channel.
///
/// The raw bytes are POSTed with the filename, a SHA-256 checksum for
/// remote integrity verification, and the bearer credential. Under
/// `force` the request asks the channel to overwrite; otherwise an
/// HTTP 409 is the expected already-exists answer and resolves to a skip.
pub fn upload_artifact(
    client: &Client,
    config: &ChannelConfig,
    token: &str,
    path: &Path,
    force: bool,
) -> UploadOutcome {
    let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return UploadOutcome::Failed(format!("not a file path: {}", path.display()));
    };
    if !is_package_archive(&file_name) {
        return UploadOutcome::Skipped(SkipReason::NotPackageArchive);
    }

    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => return UploadOutcome::Failed(format!("could not read {file_name}: {e}")),
    };
    let size = data.len() as u64;
    if size > MAX_UPLOAD_BYTES {
        return UploadOutcome::Skipped(SkipReason::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    let digest = hex::encode(Sha256::digest(&data));
    debug!("uploading {file_name} ({size} bytes, sha256 {digest})");

    let mut url = format!("{}/upload/{}", config.api_base, config.channel);
    if force {
        url.push_str("?force=true");
    }

    let response = client
        .post(&url)
        .timeout(UPLOAD_TIMEOUT)
        .header("X-File-Name", &file_name)
        .header("X-File-SHA256", &digest)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/octet-stream")
        .header(CONTENT_LENGTH, size)
        .body(data)
        .send();

    match response {
        Ok(response) => match response.status() {
            StatusCode::OK => {
                info!("uploaded {file_name}");
                UploadOutcome::Uploaded
            }
            StatusCode::CONFLICT if !force => UploadOutcome::Skipped(SkipReason::AlreadyExists),
            StatusCode::CONFLICT => {
                UploadOutcome::Failed("overwrite refused (HTTP 409)".to_string())
            }
            status => UploadOutcome::Failed(format!("HTTP {}", status.as_u16())),
        },
        Err(e) if e.is_timeout() => UploadOutcome::Failed("request timed out".to_string()),
        Err(e) => UploadOutcome::Failed(e.to_string()),
    }
}
