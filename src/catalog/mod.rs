//! The in-memory artifact catalog.
//!
//! A [`Catalog`] is the complete index built from one manifest plus all
//! schema files discovered under the configured search paths. It is an
//! immutable snapshot: rebuilt in full on any relevant file-system event and
//! swapped atomically, so readers always see either the old or the new
//! complete catalog, never a mix. The accessor methods do no interpretation
//! of the data; that is up to the resolver and the host.

pub mod manifest;
pub mod schema;
mod types;

pub use manifest::{locate_manifest, parse_manifest, MANIFEST_FILE_NAMES};
pub use schema::{collect_schema_files, parse_schema_artifacts};
pub use types::{
    line_of_offset, ArtifactKind, AttributeRef, EntryPayload, ManifestEntry, ManifestSection,
    RelationshipRef, SchemaArtifact, TransformType,
};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::IndexError;

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    sections: Vec<ManifestSection>,
    artifacts: HashMap<String, SchemaArtifact>,
    schema_files: Vec<PathBuf>,
    workspace_root: PathBuf,
}

impl Catalog {
    /// Build the full catalog for one workspace.
    ///
    /// The manifest traversal and the schema traversal are independent; each
    /// is fail-soft over its files, so a single malformed or unreadable file
    /// is logged and skipped rather than aborting the build. The only hard
    /// error is a workspace root that is not a directory.
    pub fn build(settings: &Settings, workspace_root: &Path) -> Result<Catalog, IndexError> {
        if !workspace_root.is_dir() {
            return Err(IndexError::MissingFile {
                path: workspace_root.to_path_buf(),
            });
        }

        let sections = build_sections(settings, workspace_root);
        let schema_files = collect_schema_files(workspace_root, &settings.schema_search_paths);
        let artifacts = build_artifacts(settings, &schema_files);

        debug!(
            sections = sections.len(),
            artifacts = artifacts.len(),
            files = schema_files.len(),
            "catalog built"
        );

        Ok(Catalog {
            sections,
            artifacts,
            schema_files,
            workspace_root: workspace_root.to_path_buf(),
        })
    }

    /// An empty catalog, used when no manifest is tracked.
    pub fn empty(workspace_root: &Path) -> Catalog {
        Catalog {
            sections: Vec::new(),
            artifacts: HashMap::new(),
            schema_files: Vec::new(),
            workspace_root: workspace_root.to_path_buf(),
        }
    }

    /// Manifest sections in manifest order.
    pub fn sections(&self) -> &[ManifestSection] {
        &self.sections
    }

    pub fn section(&self, key: &str) -> Option<&ManifestSection> {
        self.sections.iter().find(|section| section.key == key)
    }

    /// All schema artifacts, in no particular order.
    pub fn artifacts(&self) -> impl Iterator<Item = &SchemaArtifact> {
        self.artifacts.values()
    }

    /// Case-insensitive lookup by `namespace + name`.
    pub fn artifact(&self, identifier: &str) -> Option<&SchemaArtifact> {
        self.artifacts.get(&identifier.to_lowercase())
    }

    /// Every schema file the build discovered, in traversal order.
    pub fn schema_files(&self) -> &[PathBuf] {
        &self.schema_files
    }

    /// Workspace-relative display labels for the discovered schema files.
    pub fn schema_file_labels(&self) -> Vec<String> {
        self.schema_files
            .iter()
            .map(|path| {
                path.strip_prefix(&self.workspace_root)
                    .unwrap_or(path)
                    .display()
                    .to_string()
            })
            .collect()
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }
}

fn build_sections(settings: &Settings, workspace_root: &Path) -> Vec<ManifestSection> {
    let Some(manifest_path) = locate_manifest(workspace_root) else {
        debug!(root = %workspace_root.display(), "no manifest found");
        return Vec::new();
    };
    let text = match std::fs::read_to_string(&manifest_path) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %manifest_path.display(), %err, "manifest unreadable");
            return Vec::new();
        }
    };
    match parse_manifest(settings, &text, &manifest_path, workspace_root) {
        Ok(sections) => sections,
        Err(err) => {
            warn!(%err, "manifest failed to parse");
            Vec::new()
        }
    }
}

/// Parse every schema file in parallel, then fold the per-file results in
/// file order so the duplicate-identity tie-break stays last-write-wins and
/// deterministic for a fixed filesystem snapshot.
fn build_artifacts(
    settings: &Settings,
    schema_files: &[PathBuf],
) -> HashMap<String, SchemaArtifact> {
    let per_file: Vec<Vec<SchemaArtifact>> = schema_files
        .par_iter()
        .map(|path| {
            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(err) => {
                    warn!(path = %path.display(), %err, "schema file unreadable, skipped");
                    return Vec::new();
                }
            };
            match parse_schema_artifacts(&text, path) {
                Ok(artifacts) => artifacts,
                Err(err) => {
                    warn!(%err, "schema file failed to parse, skipped");
                    Vec::new()
                }
            }
        })
        .collect();

    let mut artifacts = HashMap::new();
    for artifact in per_file.into_iter().flatten().collect_vec() {
        let key = artifact.identity_key();
        if let Some(previous) = artifacts.insert(key, artifact) {
            if settings.warn_on_duplicate_artifacts {
                warn!(
                    identity = %previous.identity_key(),
                    earlier = %previous.file.display(),
                    "duplicate artifact identity, later definition wins"
                );
            }
        }
    }
    artifacts
}
