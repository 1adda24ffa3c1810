//! Schema file discovery and artifact extraction.
//!
//! Schema YAML files declare objects under the top-level `nodes` and
//! `generics` sequences. Discovery is a plain depth-first walk of the
//! configured search paths; extraction records each object with the
//! positions of its attributes and relationships for sub-navigation.

use std::path::{Path, PathBuf};

use itertools::Itertools;
use ropey::Rope;
use walkdir::WalkDir;

use crate::catalog::types::{
    line_of_offset, ArtifactKind, AttributeRef, RelationshipRef, SchemaArtifact,
};
use crate::error::IndexError;
use crate::yaml_ast::{parse_yaml, YamlMapping, YamlNode};

fn is_yaml_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Enumerate every `*.yaml`/`*.yml` file under the configured search paths.
///
/// Relative paths are resolved against the workspace root; a path naming a
/// file directly is included as-is. The result is sorted within each walk so
/// consecutive builds over an unchanged tree see the same file order (the
/// order only matters for the duplicate-identity tie-break).
pub fn collect_schema_files(workspace_root: &Path, search_paths: &[String]) -> Vec<PathBuf> {
    search_paths
        .iter()
        .flat_map(|search_path| {
            let root = workspace_root.join(search_path);
            if root.is_file() {
                return vec![root];
            }
            WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .flatten()
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.path().to_path_buf())
                .filter(|path| is_yaml_file(path))
                .collect_vec()
        })
        .collect()
}

/// Extract every `nodes`/`generics` artifact from one schema buffer.
///
/// Items missing a `name` or `namespace` are skipped; they cannot form an
/// identity key. A buffer without a mapping root yields a syntax error so
/// the caller can log and skip the file.
pub fn parse_schema_artifacts(text: &str, path: &Path) -> Result<Vec<SchemaArtifact>, IndexError> {
    let document = parse_yaml(text).map_err(|err| IndexError::syntax(path, err))?;
    let Some(root) = document.root_mapping() else {
        return Err(IndexError::syntax(path, "document root is not a mapping"));
    };

    let rope = Rope::from_str(text);
    let mut artifacts = Vec::new();

    for kind in [ArtifactKind::Node, ArtifactKind::Generic] {
        let Some(sequence) = root.get(kind.schema_key()).and_then(|n| n.as_sequence()) else {
            continue;
        };
        for item in &sequence.items {
            let Some(mapping) = item.as_mapping() else {
                continue;
            };
            let (Some(name), Some(namespace)) =
                (mapping.get_str("name"), mapping.get_str("namespace"))
            else {
                continue;
            };

            let offset = item.span().start;
            artifacts.push(SchemaArtifact {
                name: name.to_string(),
                namespace: namespace.to_string(),
                kind,
                label: mapping.get_str("label").map(str::to_string),
                description: mapping.get_str("description").map(str::to_string),
                attributes: collect_attributes(mapping, &rope),
                relationships: collect_relationships(mapping, &rope),
                file: path.to_path_buf(),
                line: line_of_offset(&rope, offset),
                offset,
            });
        }
    }

    Ok(artifacts)
}

fn collect_attributes(artifact: &YamlMapping, rope: &Rope) -> Vec<AttributeRef> {
    named_children(artifact, "attributes", rope)
        .map(|(mapping, line)| AttributeRef {
            name: mapping.get_str("name").unwrap_or_default().to_string(),
            kind: mapping.get_str("kind").map(str::to_string),
            label: mapping.get_str("label").map(str::to_string),
            line,
        })
        .collect()
}

fn collect_relationships(artifact: &YamlMapping, rope: &Rope) -> Vec<RelationshipRef> {
    named_children(artifact, "relationships", rope)
        .map(|(mapping, line)| RelationshipRef {
            name: mapping.get_str("name").unwrap_or_default().to_string(),
            peer: mapping.get_str("peer").map(str::to_string),
            kind: mapping.get_str("kind").map(str::to_string),
            line,
        })
        .collect()
}

/// Mapping items of a nested sequence that carry a `name`, with their lines.
fn named_children<'a>(
    artifact: &'a YamlMapping,
    key: &str,
    rope: &'a Rope,
) -> impl Iterator<Item = (&'a YamlMapping, u32)> {
    artifact
        .get(key)
        .and_then(YamlNode::as_sequence)
        .map(|sequence| sequence.items.as_slice())
        .unwrap_or_default()
        .iter()
        .filter_map(move |item| {
            let mapping = item.as_mapping()?;
            mapping.get_str("name")?;
            Some((mapping, line_of_offset(rope, item.span().start)))
        })
}
