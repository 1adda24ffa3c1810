//! Manifest file location and traversal.
//!
//! The manifest is a single YAML file at the workspace root enumerating
//! queries, transforms, and artifact definitions. It may live under either
//! of two accepted names; the primary wins when both exist. Every top-level
//! key whose value is a sequence becomes a section; unrecognized keys are
//! intentionally passed through rather than validated, so manifest typos
//! still render in the host tree instead of vanishing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ropey::Rope;
use tracing::warn;

use crate::catalog::types::{
    line_of_offset, EntryPayload, ManifestEntry, ManifestSection, TransformType,
};
use crate::config::Settings;
use crate::error::IndexError;
use crate::graphql::extract_variables;
use crate::yaml_ast::{parse_yaml, YamlMapping};

/// Accepted manifest file names, probed in order.
pub const MANIFEST_FILE_NAMES: [&str; 2] = [".infrahub.yml", ".infrahub.yaml"];

/// Probe the workspace root for the manifest under its accepted names.
pub fn locate_manifest(workspace_root: &Path) -> Option<PathBuf> {
    MANIFEST_FILE_NAMES
        .iter()
        .map(|name| workspace_root.join(name))
        .find(|candidate| candidate.is_file())
}

/// Walk one manifest buffer into ordered sections.
///
/// Query entries resolve their `file_path` against the workspace root and
/// attach the variable manifest; a missing or unparsable query document
/// leaves the entry without one, never failing the walk. Artifact
/// definitions are cross-referenced against the transform sections of the
/// same parse afterwards.
pub fn parse_manifest(
    settings: &Settings,
    text: &str,
    manifest_path: &Path,
    workspace_root: &Path,
) -> Result<Vec<ManifestSection>, IndexError> {
    let document = parse_yaml(text).map_err(|err| IndexError::syntax(manifest_path, err))?;
    let Some(root) = document.root_mapping() else {
        return Err(IndexError::syntax(
            manifest_path,
            "document root is not a mapping",
        ));
    };

    let rope = Rope::from_str(text);
    let mut sections = Vec::new();

    for entry in &root.entries {
        let Some(sequence) = entry.value.as_sequence() else {
            // Scalar keys like `version` carry no navigable items.
            continue;
        };

        let mut entries = Vec::new();
        for item in &sequence.items {
            let mapping = item.as_mapping();
            let label = mapping
                .and_then(|m| m.get_str("name"))
                .unwrap_or("item")
                .to_string();
            let offset = item.span().start;

            entries.push(ManifestEntry {
                label,
                source_file: manifest_path.to_path_buf(),
                line: line_of_offset(&rope, offset),
                offset,
                payload: entry_payload(settings, &entry.key, mapping, workspace_root),
            });
        }

        sections.push(ManifestSection {
            key: entry.key.clone(),
            entries,
        });
    }

    resolve_artifact_definitions(&mut sections);
    Ok(sections)
}

fn entry_payload(
    settings: &Settings,
    section_key: &str,
    item: Option<&YamlMapping>,
    workspace_root: &Path,
) -> EntryPayload {
    match section_key {
        "queries" => {
            let gql_path = item
                .and_then(|m| m.get_str("file_path"))
                .map(|rel| workspace_root.join(rel));
            let variables = match (&gql_path, settings.resolve_query_variables) {
                (Some(path), true) => load_query_variables(path),
                _ => None,
            };
            EntryPayload::Query {
                gql_path,
                variables,
            }
        }
        "jinja2_transforms" => EntryPayload::Transform {
            transform_type: TransformType::Jinja,
        },
        "python_transforms" => EntryPayload::Transform {
            transform_type: TransformType::Python,
        },
        "artifact_definitions" => EntryPayload::ArtifactDefinition {
            transformation: item
                .and_then(|m| m.get_str("transformation"))
                .map(str::to_string),
            resolved: None,
        },
        _ => EntryPayload::Other,
    }
}

/// Read and parse one referenced query document, fail-soft.
fn load_query_variables(path: &Path) -> Option<crate::graphql::QueryVariables> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), %err, "query file unavailable, entry kept without variables");
            return None;
        }
    };
    match extract_variables(&text, path) {
        Ok(variables) => Some(variables),
        Err(err) => {
            warn!(%err, "query file failed to parse, entry kept without variables");
            None
        }
    }
}

/// Fill `resolved` on artifact definitions by looking the `transformation`
/// name up against every transform entry collected from the same manifest.
fn resolve_artifact_definitions(sections: &mut [ManifestSection]) {
    let transforms: HashMap<String, TransformType> = sections
        .iter()
        .flat_map(|section| section.entries.iter())
        .filter_map(|entry| match entry.payload {
            EntryPayload::Transform { transform_type } => {
                Some((entry.label.clone(), transform_type))
            }
            _ => None,
        })
        .collect();

    for section in sections.iter_mut() {
        for entry in section.entries.iter_mut() {
            if let EntryPayload::ArtifactDefinition {
                transformation,
                resolved,
            } = &mut entry.payload
            {
                *resolved = transformation
                    .as_deref()
                    .and_then(|name| transforms.get(name))
                    .copied();
            }
        }
    }
}
