//! Document outline symbols for schema YAML files.
//!
//! Produces the `textDocument/documentSymbol`-shaped tree the host renders
//! as an outline: one node per schema artifact of the requested kind,
//! labeled `NamespaceName` (with the artifact's label suffixed in
//! parentheses when present), holding optional "Attributes" and
//! "Relationships" child groups. Groups with zero children are omitted
//! entirely rather than rendered empty.
//!
//! | Symbol | LSP kind |
//! |--------------------|-------------|
//! | Schema artifact | `Object` |
//! | Attribute group | `Module` |
//! | Attribute | `Field` |
//! | Relationship group | `Module` |
//! | Relationship | `Interface` |

use std::path::Path;

use tower_lsp::lsp_types::{DocumentSymbol, Position, Range, SymbolKind};

use crate::catalog::{parse_schema_artifacts, ArtifactKind, SchemaArtifact};

/// Outline symbols for every artifact of `kind` in one schema buffer.
///
/// Pure function of the buffer text; an unparsable buffer yields an empty
/// outline rather than an error.
pub fn document_symbols(text: &str, path: &Path, kind: ArtifactKind) -> Vec<DocumentSymbol> {
    let artifacts = match parse_schema_artifacts(text, path) {
        Ok(artifacts) => artifacts,
        Err(_) => return Vec::new(),
    };

    artifacts
        .iter()
        .filter(|artifact| artifact.kind == kind)
        .map(artifact_symbol)
        .collect()
}

fn artifact_symbol(artifact: &SchemaArtifact) -> DocumentSymbol {
    let name = match &artifact.label {
        Some(label) => format!("{} ({})", artifact.display_name(), label),
        None => artifact.display_name(),
    };

    let mut children = Vec::new();

    let attributes: Vec<DocumentSymbol> = artifact
        .attributes
        .iter()
        .map(|attribute| {
            make_symbol(
                attribute
                    .label
                    .clone()
                    .unwrap_or_else(|| attribute.name.clone()),
                attribute.kind.as_ref().map(|kind| format!("Kind: {kind}")),
                SymbolKind::FIELD,
                attribute.line,
                Vec::new(),
            )
        })
        .collect();
    if !attributes.is_empty() {
        children.push(make_symbol(
            "Attributes".to_string(),
            None,
            SymbolKind::MODULE,
            artifact.line,
            attributes,
        ));
    }

    let relationships: Vec<DocumentSymbol> = artifact
        .relationships
        .iter()
        .map(|relationship| {
            let detail = relationship.peer.as_ref().map(|peer| match &relationship.kind {
                Some(kind) => format!("Peer: {peer}, Kind: {kind}"),
                None => format!("Peer: {peer}"),
            });
            make_symbol(
                format!("Rel: {}", relationship.name),
                detail,
                SymbolKind::INTERFACE,
                relationship.line,
                Vec::new(),
            )
        })
        .collect();
    if !relationships.is_empty() {
        children.push(make_symbol(
            "Relationships".to_string(),
            None,
            SymbolKind::MODULE,
            artifact.line,
            relationships,
        ));
    }

    make_symbol(
        name,
        artifact.description.clone(),
        SymbolKind::OBJECT,
        artifact.line,
        children,
    )
}

#[allow(deprecated)] // DocumentSymbol::deprecated must still be populated
fn make_symbol(
    name: String,
    detail: Option<String>,
    kind: SymbolKind,
    line: u32,
    children: Vec<DocumentSymbol>,
) -> DocumentSymbol {
    let range = Range {
        start: Position { line, character: 0 },
        end: Position {
            line,
            character: 100,
        },
    };
    DocumentSymbol {
        name,
        detail,
        kind,
        tags: None,
        deprecated: None,
        range,
        selection_range: range,
        children: if children.is_empty() {
            None
        } else {
            Some(children)
        },
    }
}
