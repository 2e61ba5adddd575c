// src/channel/manifest.rs

//! Remote repodata reads and the local/remote diff
//!
//! `repodata.json` is the only remote state consulted: per platform
//! subdirectory, its `packages` (legacy `.tar.bz2`) and `packages.conda`
//! keys map artifact filenames to metadata. Only filename presence is
//! assumed reliable.

use super::ChannelConfig;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Timeout for repodata fetches
const REPODATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-platform repodata index as served by the channel
#[derive(Debug, Default, Deserialize)]
pub struct Repodata {
    /// Legacy `.tar.bz2` archives
    #[serde(default)]
    pub packages: HashMap<String, serde_json::Value>,
    /// `.conda` archives
    #[serde(default, rename = "packages.conda")]
    pub packages_conda: HashMap<String, serde_json::Value>,
}

impl Repodata {
    /// Every artifact filename the index lists, across both archive formats.
    pub fn filenames(&self) -> HashSet<String> {
        self.packages
            .keys()
            .chain(self.packages_conda.keys())
            .cloned()
            .collect()
    }
}

/// Fetch the set of artifact filenames already on the channel for one
/// platform subdirectory.
///
/// Any failure (non-200, network error, malformed body) degrades to an
/// empty set with a warning: the diff must treat an unknown manifest as
/// "nothing known to exist remotely", never as "everything exists".
pub fn fetch_remote_filenames(
    client: &Client,
    config: &ChannelConfig,
    subdir: &str,
) -> HashSet<String> {
    let url = format!(
        "{}/{}/{subdir}/repodata.json",
        config.channel_base, config.channel
    );
    info!("fetching remote package list from {url}");

    let response = match client.get(&url).timeout(REPODATA_TIMEOUT).send() {
        Ok(response) => response,
        Err(e) => {
            warn!("could not fetch repodata for {subdir}: {e}");
            return HashSet::new();
        }
    };
    if !response.status().is_success() {
        warn!(
            "could not fetch repodata for {subdir} (HTTP {})",
            response.status().as_u16()
        );
        return HashSet::new();
    }

    match response.json::<Repodata>() {
        Ok(repodata) => repodata.filenames(),
        Err(e) => {
            warn!("malformed repodata for {subdir}: {e}");
            HashSet::new()
        }
    }
}

/// Partition local artifacts into (new, already present) against the
/// channel.
///
/// Repodata is fetched once per distinct platform subdirectory actually
/// referenced by the local set, bounding network calls; presence is a
/// plain filename-equality check within that subdirectory.
pub fn partition_new(
    artifacts: &[PathBuf],
    client: &Client,
    config: &ChannelConfig,
) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let subdirs: BTreeSet<String> = artifacts
        .iter()
        .filter_map(|path| subdir_of(path))
        .collect();

    let remote: HashMap<String, HashSet<String>> = subdirs
        .into_iter()
        .map(|subdir| {
            let filenames = fetch_remote_filenames(client, config, &subdir);
            (subdir, filenames)
        })
        .collect();

    diff_against(artifacts, &remote)
}

/// Diff local artifacts against pre-fetched per-platform manifests.
///
/// Pure core of [`partition_new`]; a subdirectory missing from the map is
/// an unknown manifest, so its artifacts all count as new.
pub fn diff_against(
    artifacts: &[PathBuf],
    remote: &HashMap<String, HashSet<String>>,
) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut new = Vec::new();
    let mut present = Vec::new();

    for path in artifacts {
        let known = subdir_of(path)
            .and_then(|subdir| remote.get(&subdir))
            .zip(file_name_of(path))
            .is_some_and(|(filenames, name)| filenames.contains(&name));
        if known {
            present.push(path.clone());
        } else {
            new.push(path.clone());
        }
    }
    (new, present)
}

/// Platform subdirectory an artifact sits in (its parent directory name).
fn subdir_of(path: &std::path::Path) -> Option<String> {
    path.parent()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

fn file_name_of(path: &std::path::Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repodata_filenames_merges_both_formats() {
        let raw = r#"{
            "packages": {"old-1.0-0.tar.bz2": {}},
            "packages.conda": {"new-2.0-0.conda": {}}
        }"#;
        let repodata: Repodata = serde_json::from_str(raw).unwrap();
        let names = repodata.filenames();
        assert!(names.contains("old-1.0-0.tar.bz2"));
        assert!(names.contains("new-2.0-0.conda"));
    }

    #[test]
    fn test_repodata_tolerates_missing_keys() {
        let repodata: Repodata = serde_json::from_str("{}").unwrap();
        assert!(repodata.filenames().is_empty());
    }

    #[test]
    fn test_partition_splits_on_remote_presence() {
        let artifacts = vec![
            PathBuf::from("output/linux-64/a-1.0-0.conda"),
            PathBuf::from("output/linux-64/b-1.0-0.conda"),
        ];
        let mut remote = HashMap::new();
        remote.insert(
            "linux-64".to_string(),
            HashSet::from(["a-1.0-0.conda".to_string()]),
        );

        let (new, present) = diff_against(&artifacts, &remote);
        assert_eq!(new, vec![PathBuf::from("output/linux-64/b-1.0-0.conda")]);
        assert_eq!(
            present,
            vec![PathBuf::from("output/linux-64/a-1.0-0.conda")]
        );
    }

    #[test]
    fn test_partition_unknown_manifest_counts_as_new() {
        // a failed fetch leaves the subdir out of the map entirely
        let artifacts = vec![PathBuf::from("output/noarch/c-1.0-0.conda")];
        let (new, present) = diff_against(&artifacts, &HashMap::new());
        assert_eq!(new.len(), 1);
        assert!(present.is_empty());
    }

    #[test]
    fn test_partition_same_filename_other_subdir_is_new() {
        let artifacts = vec![PathBuf::from("output/noarch/a-1.0-0.conda")];
        let mut remote = HashMap::new();
        remote.insert(
            "linux-64".to_string(),
            HashSet::from(["a-1.0-0.conda".to_string()]),
        );
        remote.insert("noarch".to_string(), HashSet::new());

        let (new, present) = diff_against(&artifacts, &remote);
        assert_eq!(new.len(), 1);
        assert!(present.is_empty());
    }
}
