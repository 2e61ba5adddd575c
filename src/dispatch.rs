// src/dispatch.rs

//! Docker invocation assembly for the external build executor
//!
//! The actual build runs inside a container driven by an in-repo script;
//! this module only encodes the job list and runtime configuration into a
//! `docker run` argument vector and launches it. All ambient inputs
//! (environment variables, uid, TTY state) are gathered once into a
//! [`DispatchConfig`] at the CLI boundary so the assembly itself stays
//! pure and testable.

use crate::error::{Error, Result};
use crate::recipe::Package;
use std::env;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Default builder image
pub const DOCKER_IMAGE_DEFAULT: &str = "quay.io/condaforge/linux-anvil-x86_64:alma9";

/// Repository mount point inside the container
pub const CONTAINER_REPO: &str = "/home/conda/forge";

/// Build entry point inside the container
const CONTAINER_SCRIPT: &str = "/home/conda/forge/.scripts/run_rattler_build.sh";

/// Channel and object-store variables forwarded verbatim when set, so the
/// container can resolve dependencies against the channel and authenticate
const PASSTHROUGH_VARS: [&str; 4] = [
    "KILN_CHANNEL_URL",
    "S3_ACCESS_KEY_ID",
    "S3_SECRET_ACCESS_KEY",
    "S3_REGION",
];

/// Runtime configuration for one dispatch
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Builder image reference
    pub docker_image: String,
    /// Absolute repository root on the host
    pub repo_root: PathBuf,
    /// Artifact output directory on the host
    pub output_dir: PathBuf,
    /// Max parallel compilation jobs inside the container
    pub jobs: u32,
    /// Mount and enable the sccache compiler cache
    pub sccache_enabled: bool,
    /// Invoking uid, forwarded so container-written files stay owned by
    /// the operator
    pub host_uid: u32,
    /// Attach an interactive TTY
    pub interactive: bool,
    /// `CONDA_OVERRIDE_CUDA`, forwarded only when present in the invoking
    /// environment; the in-container script owns the default
    pub cuda_override: Option<String>,
    /// Forwarded ambient variables, as (name, value) pairs
    pub passthrough: Vec<(String, String)>,
    /// Persistent repodata cache mount
    pub rattler_cache: PathBuf,
    /// Persistent compiler cache mount
    pub sccache_dir: PathBuf,
}

impl DispatchConfig {
    /// Gather ambient configuration for a dispatch rooted at `repo_root`.
    ///
    /// This is the only place the environment is read; everything
    /// downstream works from the returned struct.
    pub fn from_env(
        repo_root: &Path,
        docker_image: String,
        jobs: u32,
        sccache_enabled: bool,
    ) -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let passthrough = PASSTHROUGH_VARS
            .iter()
            .filter_map(|key| env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();

        Self {
            docker_image,
            repo_root: repo_root.to_path_buf(),
            output_dir: repo_root.join("output"),
            jobs,
            sccache_enabled,
            host_uid: unsafe { libc::getuid() },
            interactive: std::io::stdin().is_terminal(),
            cuda_override: env::var("CONDA_OVERRIDE_CUDA").ok(),
            passthrough,
            rattler_cache: home.join(".cache").join("rattler"),
            sccache_dir: home.join(".cache").join("sccache"),
        }
    }

    /// Assemble the full `docker run` argument vector. Pure; no I/O.
    pub fn docker_args(&self, packages: &[Package]) -> Vec<String> {
        let mut args: Vec<String> = ["run", "--rm", "--network", "host"]
            .map(String::from)
            .to_vec();

        if self.interactive {
            args.push("-it".into());
        }

        // Repo mounts read-only; output overlays it read-write so the
        // builder can deposit artifacts
        args.push("-v".into());
        args.push(format!("{}:{CONTAINER_REPO}:ro", self.repo_root.display()));
        args.push("-v".into());
        args.push(format!(
            "{}:{CONTAINER_REPO}/output",
            self.output_dir.display()
        ));
        args.push("-v".into());
        args.push(format!(
            "{}:/home/conda/.cache/rattler",
            self.rattler_cache.display()
        ));
        if self.sccache_enabled {
            args.push("-v".into());
            args.push(format!(
                "{}:/home/conda/.cache/sccache",
                self.sccache_dir.display()
            ));
        }

        args.push("-e".into());
        args.push(format!("BUILD_PACKAGES={}", encode_job_spec(packages)));
        args.push("-e".into());
        args.push(format!(
            "SCCACHE_ENABLED={}",
            if self.sccache_enabled { "1" } else { "0" }
        ));
        args.push("-e".into());
        args.push(format!("HOST_USER_ID={}", self.host_uid));
        args.push("-e".into());
        args.push(format!("BUILD_JOBS={}", self.jobs));

        if let Some(cuda) = &self.cuda_override {
            args.push("-e".into());
            args.push(format!("CONDA_OVERRIDE_CUDA={cuda}"));
        }
        for (key, value) in &self.passthrough {
            args.push("-e".into());
            args.push(format!("{key}={value}"));
        }

        args.push(self.docker_image.clone());
        args.push("bash".into());
        args.push(CONTAINER_SCRIPT.into());
        args
    }

    /// Create the host-side directories docker will mount.
    pub fn ensure_host_dirs(&self) -> Result<()> {
        let mut dirs = vec![&self.output_dir, &self.rattler_cache];
        if self.sccache_enabled {
            dirs.push(&self.sccache_dir);
        }
        for dir in dirs {
            fs::create_dir_all(dir)
                .map_err(|e| Error::IoError(format!("failed to create {}: {e}", dir.display())))?;
        }
        Ok(())
    }

    /// Run the containerized build, propagating the executor's exit status.
    pub fn run(&self, packages: &[Package]) -> Result<()> {
        let args = self.docker_args(packages);
        info!("launching docker build for {} package(s)", packages.len());
        debug!("docker {}", args.join(" "));

        let status = Command::new("docker")
            .args(&args)
            .status()
            .map_err(|e| Error::InitError(format!("failed to launch docker: {e}")))?;

        if !status.success() {
            return Err(Error::BuildFailed {
                code: status.code().unwrap_or(1),
            });
        }
        Ok(())
    }
}

/// Encode the job list as semicolon-separated `kind:name:recipe-path`
/// triples, with each recipe path rooted under the container mount.
pub fn encode_job_spec(packages: &[Package]) -> String {
    packages
        .iter()
        .map(|pkg| {
            format!(
                "{}:{}:{CONTAINER_REPO}/{}",
                pkg.kind.as_str(),
                pkg.name,
                pkg.recipe_dir.display()
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Render a docker argument vector as a copy-pasteable multi-line command.
pub fn format_dry_run(args: &[String]) -> String {
    let mut out = String::from("  docker run \\\n");
    let mut i = 1; // past "run"
    while i < args.len() {
        let arg = &args[i];
        if (arg == "-v" || arg == "-e" || arg == "--network") && i + 1 < args.len() {
            out.push_str(&format!("    {arg} {} \\\n", args[i + 1]));
            i += 2;
        } else if i == args.len() - 1 {
            out.push_str(&format!("    {arg}\n"));
            i += 1;
        } else {
            out.push_str(&format!("    {arg} \\\n"));
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::BuildKind;

    fn pkg(name: &str, kind: BuildKind) -> Package {
        Package {
            name: name.to_string(),
            recipe_dir: PathBuf::from(format!("pkgs/{name}/recipe")),
            kind,
        }
    }

    fn fixture_config() -> DispatchConfig {
        DispatchConfig {
            docker_image: DOCKER_IMAGE_DEFAULT.to_string(),
            repo_root: PathBuf::from("/work/forge"),
            output_dir: PathBuf::from("/work/forge/output"),
            jobs: 28,
            sccache_enabled: true,
            host_uid: 1000,
            interactive: false,
            cuda_override: None,
            passthrough: Vec::new(),
            rattler_cache: PathBuf::from("/home/op/.cache/rattler"),
            sccache_dir: PathBuf::from("/home/op/.cache/sccache"),
        }
    }

    #[test]
    fn test_job_spec_one_triple_per_package() {
        let packages = vec![
            pkg("cumm", BuildKind::Variant),
            pkg("helper", BuildKind::NoArch),
        ];
        assert_eq!(
            encode_job_spec(&packages),
            "variant:cumm:/home/conda/forge/pkgs/cumm/recipe;\
             noarch:helper:/home/conda/forge/pkgs/helper/recipe"
        );
    }

    #[test]
    fn test_docker_args_mounts_and_env() {
        let config = fixture_config();
        let args = config.docker_args(&[pkg("cumm", BuildKind::Standard)]);

        assert!(args.contains(&"/work/forge:/home/conda/forge:ro".to_string()));
        assert!(args.contains(&"/work/forge/output:/home/conda/forge/output".to_string()));
        assert!(args
            .contains(&"/home/op/.cache/sccache:/home/conda/.cache/sccache".to_string()));
        assert!(args.contains(&"SCCACHE_ENABLED=1".to_string()));
        assert!(args.contains(&"HOST_USER_ID=1000".to_string()));
        assert!(args.contains(&"BUILD_JOBS=28".to_string()));
        assert!(!args.contains(&"-it".to_string()));
        assert_eq!(args.last().unwrap(), CONTAINER_SCRIPT);
    }

    #[test]
    fn test_cuda_override_forwarded_only_when_set() {
        let mut config = fixture_config();
        let packages = [pkg("cumm", BuildKind::Variant)];

        let args = config.docker_args(&packages);
        assert!(!args.iter().any(|a| a.starts_with("CONDA_OVERRIDE_CUDA=")));

        config.cuda_override = Some("12.9".to_string());
        let args = config.docker_args(&packages);
        assert!(args.contains(&"CONDA_OVERRIDE_CUDA=12.9".to_string()));
    }

    #[test]
    fn test_sccache_disabled_drops_mount_and_flags_env() {
        let mut config = fixture_config();
        config.sccache_enabled = false;
        let args = config.docker_args(&[pkg("cumm", BuildKind::Standard)]);

        assert!(args.contains(&"SCCACHE_ENABLED=0".to_string()));
        assert!(!args.iter().any(|a| a.contains(".cache/sccache")));
    }

    #[test]
    fn test_passthrough_vars_forwarded() {
        let mut config = fixture_config();
        config.passthrough = vec![(
            "S3_ACCESS_KEY_ID".to_string(),
            "AKIAEXAMPLE".to_string(),
        )];
        let args = config.docker_args(&[pkg("cumm", BuildKind::Standard)]);
        assert!(args.contains(&"S3_ACCESS_KEY_ID=AKIAEXAMPLE".to_string()));
    }

    #[test]
    fn test_dry_run_rendering_pairs_flags() {
        let config = fixture_config();
        let rendered = format_dry_run(&config.docker_args(&[pkg("cumm", BuildKind::Standard)]));

        assert!(rendered.starts_with("  docker run \\\n"));
        assert!(rendered.contains("-v /work/forge:/home/conda/forge:ro \\\n"));
        assert!(rendered.trim_end().ends_with(CONTAINER_SCRIPT));
    }

    #[test]
    fn test_ensure_host_dirs_creates_mount_points() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = fixture_config();
        config.output_dir = tmp.path().join("output");
        config.rattler_cache = tmp.path().join("rattler");
        config.sccache_dir = tmp.path().join("sccache");

        config.ensure_host_dirs().unwrap();
        assert!(config.output_dir.is_dir());
        assert!(config.rattler_cache.is_dir());
        assert!(config.sccache_dir.is_dir());
    }
}
