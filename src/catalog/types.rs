//! Core types for the artifact catalog.
//!
//! Everything here is an immutable snapshot: records are created during one
//! catalog build from the buffers read at that moment, and superseded
//! wholesale on the next build. Line numbers are zero-based (LSP convention)
//! and derived from character offsets against the build-time buffer.

use std::path::PathBuf;

use ropey::Rope;
use serde::{Deserialize, Serialize};

use crate::graphql::QueryVariables;

/// Zero-based line of a character offset, clamped to the buffer end.
pub fn line_of_offset(rope: &Rope, offset: usize) -> u32 {
    let offset = offset.min(rope.len_chars());
    rope.char_to_line(offset) as u32
}

/// The two schema object shapes a schema file can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Node,
    Generic,
}

impl ArtifactKind {
    /// The top-level schema file key holding artifacts of this kind.
    pub fn schema_key(self) -> &'static str {
        match self {
            ArtifactKind::Node => "nodes",
            ArtifactKind::Generic => "generics",
        }
    }
}

/// An attribute declared on a schema artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRef {
    pub name: String,
    pub kind: Option<String>,
    pub label: Option<String>,
    pub line: u32,
}

/// A relationship declared on a schema artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRef {
    pub name: String,
    pub peer: Option<String>,
    pub kind: Option<String>,
    pub line: u32,
}

/// One object definition inside a schema YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaArtifact {
    pub name: String,
    pub namespace: String,
    pub kind: ArtifactKind,
    pub label: Option<String>,
    pub description: Option<String>,
    pub attributes: Vec<AttributeRef>,
    pub relationships: Vec<RelationshipRef>,
    /// The file this artifact was parsed from.
    pub file: PathBuf,
    /// Zero-based line of the artifact's first key in `file`.
    pub line: u32,
    /// Character offset of the artifact's first key in the build-time buffer.
    pub offset: usize,
}

impl SchemaArtifact {
    /// Lowercased `namespace + name`, the case-insensitive lookup key.
    pub fn identity_key(&self) -> String {
        format!("{}{}", self.namespace, self.name).to_lowercase()
    }

    /// `NamespaceName` as shown in navigation UIs.
    pub fn display_name(&self) -> String {
        format!("{}{}", self.namespace, self.name)
    }
}

/// Transform language bound to a manifest transform or artifact definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformType {
    Python,
    Jinja,
}

/// Kind-specific payload of a manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryPayload {
    /// A `queries` item. `variables` is absent when the referenced document
    /// is missing or unparsable; the entry itself survives.
    Query {
        gql_path: Option<PathBuf>,
        variables: Option<QueryVariables>,
    },
    /// A `jinja2_transforms` or `python_transforms` item.
    Transform { transform_type: TransformType },
    /// An `artifact_definitions` item. `resolved` is filled by
    /// cross-referencing `transformation` against the transform sections of
    /// the same manifest parse; unresolved is not an error.
    ArtifactDefinition {
        transformation: Option<String>,
        resolved: Option<TransformType>,
    },
    /// An item under a key the core does not interpret. Passed through so
    /// the host can still render and navigate to it.
    Other,
}

/// One item of a top-level manifest sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// The item's `name`, or the literal `"item"` when absent.
    pub label: String,
    pub source_file: PathBuf,
    /// Zero-based line of the item in the manifest.
    pub line: u32,
    /// Character offset of the item in the build-time manifest buffer.
    pub offset: usize,
    pub payload: EntryPayload,
}

/// One top-level manifest key and its items, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSection {
    pub key: String,
    pub entries: Vec<ManifestEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_is_lowercased_namespace_name() {
        let artifact = SchemaArtifact {
            name: "Device".to_string(),
            namespace: "Infra".to_string(),
            kind: ArtifactKind::Node,
            label: None,
            description: None,
            attributes: vec![],
            relationships: vec![],
            file: PathBuf::from("schemas/device.yml"),
            line: 3,
            offset: 42,
        };

        assert_eq!(artifact.identity_key(), "infradevice");
        assert_eq!(artifact.display_name(), "InfraDevice");
    }

    #[test]
    fn test_line_of_offset_counts_newlines() {
        let rope = Rope::from_str("a\nb\nc\n");
        assert_eq!(line_of_offset(&rope, 0), 0);
        assert_eq!(line_of_offset(&rope, 2), 1);
        assert_eq!(line_of_offset(&rope, 4), 2);
        // Clamped past the end of the buffer.
        assert_eq!(line_of_offset(&rope, 1000), 3);
    }
}
