//! Fake cgroup trees for tests.

use std::path::Path;

use tempfile::TempDir;

use crate::cgroup::CgroupReader;

pub const MEMORY_STAT: &str = "cache 2453\nrss 1234\n";
pub const KMEM_USAGE: &str = "5432";
pub const MEMORY_LIMIT: &str = "9999";
pub const CPUACCT_USAGE: &str = "1000";
pub const CPUACCT_STAT: &str = "user 2000\nsystem 3000\n";
pub const CPUACCT_USAGE_PERCPU: &str = "225049880 964460277 1520937451 464329645\n";

/// Files every fully-populated fixture contains, relative to the cgroup root.
pub const STANDARD: &[(&str, &str)] = &[
    ("memory/memory.stat", MEMORY_STAT),
    ("memory/memory.kmem.usage_in_bytes", KMEM_USAGE),
    ("memory/memory.limit_in_bytes", MEMORY_LIMIT),
    ("cpuacct/cpuacct.usage", CPUACCT_USAGE),
    ("cpuacct/cpuacct.stat", CPUACCT_STAT),
    ("cpuacct/cpuacct.usage_percpu", CPUACCT_USAGE_PERCPU),
];

/// Writes `files` below a fresh temporary directory.
///
/// An entry for `meminfo` is written to the root and used as the host memory source.
pub fn cgroup_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    for (relative, contents) in files {
        write(dir.path(), relative, contents);
    }
    dir
}

/// Like [`cgroup_tree`], starting from [`STANDARD`] and applying `overrides` on top.
pub fn standard_tree_with(overrides: &[(&str, &str)]) -> TempDir {
    let dir = cgroup_tree(STANDARD);
    for (relative, contents) in overrides {
        write(dir.path(), relative, contents);
    }
    dir
}

pub fn reader(dir: &TempDir) -> CgroupReader {
    CgroupReader::builder()
        .set_cgroup_root(dir.path())
        .set_meminfo_path(dir.path().join("meminfo"))
        .build()
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create fixture dir");
    }
    std::fs::write(path, contents).expect("failed to write fixture file");
}
