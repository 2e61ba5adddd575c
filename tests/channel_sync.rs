// tests/channel_sync.rs

//! Channel sync tests: artifact enumeration and the local/remote diff,
//! exercised against on-disk fixtures and pre-fetched manifests.

use kiln::channel::{diff_against, find_artifacts, MAX_UPLOAD_BYTES};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

fn touch(dir: &Path, name: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), b"archive").unwrap();
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect()
}

#[test]
fn test_diff_uploads_only_the_delta() {
    let tmp = tempfile::tempdir().unwrap();
    touch(&tmp.path().join("linux-64"), "a-1.0-0.conda");
    touch(&tmp.path().join("linux-64"), "b-1.0-0.conda");

    let local = find_artifacts(tmp.path());
    assert_eq!(local.len(), 2);

    let mut remote = HashMap::new();
    remote.insert(
        "linux-64".to_string(),
        HashSet::from(["a-1.0-0.conda".to_string()]),
    );

    let (new, present) = diff_against(&local, &remote);
    assert_eq!(names(&new), vec!["b-1.0-0.conda"]);
    assert_eq!(names(&present), vec!["a-1.0-0.conda"]);
}

#[test]
fn test_force_republishes_everything() {
    // Under --force the command layer never calls the diff; every local
    // artifact is attempted. The equivalent here: diffing against empty
    // manifests yields everything as new.
    let tmp = tempfile::tempdir().unwrap();
    touch(&tmp.path().join("linux-64"), "a-1.0-0.conda");
    touch(&tmp.path().join("noarch"), "b-1.0-0.conda");

    let local = find_artifacts(tmp.path());
    let (new, present) = diff_against(&local, &HashMap::new());
    assert_eq!(new.len(), 2);
    assert!(present.is_empty());
}

#[test]
fn test_enumeration_ignores_stray_subdirs_and_files() {
    let tmp = tempfile::tempdir().unwrap();
    touch(&tmp.path().join("linux-64"), "a-1.0-0.conda");
    touch(&tmp.path().join("linux-64"), "repodata.json");
    touch(&tmp.path().join("bld"), "b-1.0-0.conda");
    touch(&tmp.path().join("src_cache"), "tarball.tar.gz");

    assert_eq!(names(&find_artifacts(tmp.path())), vec!["a-1.0-0.conda"]);
}

#[test]
fn test_enumeration_accepts_both_archive_formats() {
    let tmp = tempfile::tempdir().unwrap();
    touch(&tmp.path().join("osx-arm64"), "new-2.0-0.conda");
    touch(&tmp.path().join("osx-arm64"), "legacy-1.0-0.tar.bz2");

    let found = names(&find_artifacts(tmp.path()));
    assert_eq!(found.len(), 2);
    assert!(found.contains(&"new-2.0-0.conda".to_string()));
    assert!(found.contains(&"legacy-1.0-0.tar.bz2".to_string()));
}

#[test]
fn test_upload_ceiling_is_100_mib() {
    assert_eq!(MAX_UPLOAD_BYTES, 100 * 1024 * 1024);
}
