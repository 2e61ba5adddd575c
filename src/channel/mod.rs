// src/channel/mod.rs

//! Remote channel synchronization
//!
//! The channel is a hosted conda package index organized by platform
//! subdirectory. Publishing is an idempotent sync: enumerate local
//! artifacts, diff their filenames against the channel's repodata, and
//! upload only the delta. Identical filenames are assumed to be identical
//! content; `force` requests an unconditional overwrite instead.
//!
//! Repodata is fetched fresh on every run. A fetch failure degrades to
//! "nothing known to exist remotely", which at worst re-uploads an
//! artifact the channel already has — never the other way around.

mod manifest;
mod upload;

pub use manifest::{diff_against, fetch_remote_filenames, partition_new, Repodata};
pub use upload::{
    find_artifacts, upload_artifact, SkipReason, UploadOutcome, MAX_UPLOAD_BYTES,
};

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use std::env;

/// Default channel name on the hosting service
pub const DEFAULT_CHANNEL: &str = "kiln-forge";

/// Upload API endpoint base
const API_BASE: &str = "https://prefix.dev/api/v1";

/// Anonymous channel base used for repodata reads
const CHANNEL_BASE: &str = "https://prefix.dev";

/// Remote channel configuration, built once at the CLI boundary
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Channel name on the hosting service
    pub channel: String,
    /// Upload API endpoint base
    pub api_base: String,
    /// Anonymous base serving `<channel>/<subdir>/repodata.json`
    pub channel_base: String,
    /// Bearer token for uploads; only required once an upload is attempted
    pub token: Option<String>,
}

impl ChannelConfig {
    /// Gather channel configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            channel: env::var("KILN_CHANNEL").unwrap_or_else(|_| DEFAULT_CHANNEL.to_string()),
            api_base: API_BASE.to_string(),
            channel_base: CHANNEL_BASE.to_string(),
            token: env::var("PREFIX_API_KEY").ok(),
        }
    }

    /// The bearer token, or a configuration error telling the operator
    /// what to set.
    pub fn require_token(&self) -> Result<&str> {
        self.token.as_deref().ok_or_else(|| {
            Error::ConfigError(
                "PREFIX_API_KEY is not set; export it or add it to the environment".to_string(),
            )
        })
    }
}

/// Build the blocking HTTP client shared by repodata reads and uploads.
///
/// Timeouts are applied per request: repodata fetches are quick, uploads
/// are sized for large artifacts.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .build()
        .map_err(|e| Error::InitError(format!("failed to create HTTP client: {e}")))
}
