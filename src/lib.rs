// src/lib.rs

//! Kiln Build Orchestrator
//!
//! Local build/publish orchestrator for a conda package distribution:
//! discovers buildable recipes under `pkgs/`, classifies each by build
//! strategy, skips work already done locally or on the remote channel,
//! drives an external containerized builder, and syncs `output/` to the
//! channel.
//!
//! # Architecture
//!
//! - Filesystem-first: the only state is the recipe tree, the `output/`
//!   directory, and the channel's repodata, all re-read fresh per run
//! - Strategy-aware completeness: a variant recipe is done only when its
//!   whole build matrix is on disk, never on a partial set
//! - Idempotent publish: uploads are a filename diff against the channel,
//!   so re-running a sync is safe
//! - External execution: the container build toolchain and the channel's
//!   storage are collaborators behind narrow interfaces, not code here

pub mod channel;
pub mod dispatch;
mod error;
pub mod output;
pub mod recipe;
pub mod selection;

pub use channel::{ChannelConfig, SkipReason, UploadOutcome};
pub use dispatch::DispatchConfig;
pub use error::{Error, Result};
pub use recipe::{classify, discover_packages, variant_count, BuildKind, Package};
pub use selection::{
    display_rows, packages_for_indices, parse_index_selection, DisplayRow, Selection,
};
