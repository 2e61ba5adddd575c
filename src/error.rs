// src/error.rs

//! Error types for the kiln orchestrator
//!
//! The taxonomy follows the run lifecycle: discovery and selection errors
//! abort before any side effect, a build failure propagates the external
//! executor's exit code, and upload failures are aggregated per batch after
//! per-artifact recovery.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A recipe exists but could not be read; discovery never returns a
    /// partial package list
    #[error("discovery failed: {0}")]
    DiscoveryError(String),

    /// One or more requested package names did not resolve
    #[error("unknown packages: {}\nAvailable: {}", unknown.join(", "), known.join(", "))]
    UnknownPackages {
        unknown: Vec<String>,
        known: Vec<String>,
    },

    /// Invalid interactive input or an otherwise unusable selection
    #[error("invalid selection: {0}")]
    SelectionError(String),

    /// The external build executor exited nonzero; the code becomes the
    /// process exit code, no retry
    #[error("build executor exited with status {code}")]
    BuildFailed { code: i32 },

    /// At least one artifact failed to upload after the batch ran to
    /// completion
    #[error("upload failed for {failed} artifact(s)")]
    UploadFailed { failed: usize },

    /// Missing or unusable ambient configuration
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Wrapped filesystem failure
    #[error("I/O error: {0}")]
    IoError(String),

    /// Failure constructing an external collaborator (HTTP client, docker)
    #[error("initialization error: {0}")]
    InitError(String),
}
