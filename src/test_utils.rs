//! Shared test utilities for infralens.
//!
//! This module provides common helpers used across multiple test modules.
//! It is only compiled when running tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a temporary workspace directory for testing.
///
/// Returns a tuple of (TempDir, PathBuf) where:
/// - TempDir: The temp directory handle (must be kept alive for the test duration)
/// - PathBuf: The path to the workspace subdirectory
///
/// A non-hidden `workspace` subdirectory is used so tests resemble a real
/// checkout root, with a `schemas/` directory matching the default
/// `schema_search_paths` setting.
pub fn create_test_workspace() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let workspace = temp_dir.path().join("workspace");
    fs::create_dir(&workspace).expect("Failed to create workspace subdirectory");
    fs::create_dir(workspace.join("schemas")).expect("Failed to create schemas subdirectory");
    (temp_dir, workspace)
}

/// Write a file, creating any missing parent directories first.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    fs::write(path, contents).unwrap_or_else(|err| panic!("Failed to write {path:?}: {err}"));
}
