//! Test fixtures for configuration text assertions
//!
//! - `canonical.cfg`: a file already in canonical form (round-trips byte-for-byte)
//! - `layers/`: files merged in precedence order
//! - `malformed/`: structurally invalid files

#![allow(dead_code)]

use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Path to the canonical fixture
pub fn canonical_path() -> PathBuf {
    fixtures_dir().join("canonical.cfg")
}

/// Paths of the layered fixtures, lowest precedence first
pub fn layer_paths() -> Vec<PathBuf> {
    vec![
        fixtures_dir().join("layers/site.cfg"),
        fixtures_dir().join("layers/user.cfg"),
    ]
}

/// Path to a malformed fixture by file stem
pub fn malformed_path(name: &str) -> PathBuf {
    fixtures_dir().join("malformed").join(format!("{}.cfg", name))
}

/// Read a fixture as text
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
