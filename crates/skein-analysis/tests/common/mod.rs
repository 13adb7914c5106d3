//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use skein_analysis::{build_graph, BuildOptions, BuildResult};

/// Create a project tree from (relative path, content) pairs.
pub fn create_project(temp: &TempDir, files: &[(&str, &str)]) -> PathBuf {
    let root = temp.path().to_path_buf();
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(path, content).expect("write fixture file");
    }
    root
}

/// Build with defaults for the given root.
pub fn build(root: &Path) -> BuildResult {
    build_graph(&BuildOptions::new(root)).expect("build_graph should succeed")
}

/// Edge triple assertions read better with a compact constructor.
pub fn edge(
    target: &str,
    kind: skein_analysis::EdgeKind,
    resolution: skein_analysis::EdgeResolution,
) -> skein_analysis::Edge {
    skein_analysis::Edge::new(
        skein_analysis::NodeId::new(target).unwrap(),
        kind,
        resolution,
    )
}
