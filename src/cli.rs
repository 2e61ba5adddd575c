// src/cli.rs
//! CLI definitions for the kiln orchestrator
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use kiln::dispatch::DOCKER_IMAGE_DEFAULT;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(author = "Kiln Project")]
#[command(version)]
#[command(about = "Local build and publish orchestrator for conda packages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build packages in the containerized builder, then publish
    Build {
        /// Package names to build (non-interactive)
        packages: Vec<String>,

        /// Build all packages
        #[arg(long)]
        all: bool,

        /// Build only noarch packages
        #[arg(long)]
        noarch_only: bool,

        /// Build only variant (CUDA) packages
        #[arg(long)]
        variant_only: bool,

        /// Remove built outputs before selecting
        #[arg(long)]
        clean: bool,

        /// Max parallel compilation jobs
        #[arg(short, long, default_value_t = 28, value_name = "N")]
        jobs: u32,

        /// Disable sccache
        #[arg(long)]
        no_sccache: bool,

        /// Builder image to use
        #[arg(long, default_value = DOCKER_IMAGE_DEFAULT)]
        docker_image: String,

        /// Print the docker command without running it
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Skip uploading packages to the channel after the build
        #[arg(long)]
        no_upload: bool,

        /// Overwrite packages already on the channel during upload
        #[arg(short, long)]
        force: bool,

        /// Repository root containing pkgs/, variants.yaml, and output/
        #[arg(long, default_value = ".")]
        repo_root: String,
    },

    /// Upload built packages to the remote channel
    Upload {
        /// Package files to upload
        files: Vec<String>,

        /// Upload every package under the output directory
        #[arg(long)]
        all: bool,

        /// Channel name on the hosting service
        #[arg(short, long)]
        channel: Option<String>,

        /// Output directory containing built packages
        #[arg(short, long, default_value = "output")]
        output_dir: String,

        /// Overwrite packages already on the channel
        #[arg(short, long)]
        force: bool,

        /// Show what would be uploaded without uploading
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}
