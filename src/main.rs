// src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::{cmd_build, cmd_upload};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Build {
            packages,
            all,
            noarch_only,
            variant_only,
            clean,
            jobs,
            no_sccache,
            docker_image,
            dry_run,
            no_upload,
            force,
            repo_root,
        }) => cmd_build(
            &packages,
            all,
            noarch_only,
            variant_only,
            clean,
            jobs,
            no_sccache,
            &docker_image,
            dry_run,
            no_upload,
            force,
            &repo_root,
        ),
        Some(Commands::Upload {
            files,
            all,
            channel,
            output_dir,
            force,
            dry_run,
        }) => cmd_upload(&files, all, channel.as_deref(), &output_dir, force, dry_run),
        None => {
            println!("kiln v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'kiln --help' for usage information");
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            exit_code_for(&err)
        }
    }
}

/// Map a failure onto the process exit code. The external executor's exit
/// code propagates unchanged; everything else exits 1.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if let Some(kiln::Error::BuildFailed { code }) = err.downcast_ref::<kiln::Error>() {
        return ExitCode::from(u8::try_from(*code).unwrap_or(1));
    }
    ExitCode::FAILURE
}
