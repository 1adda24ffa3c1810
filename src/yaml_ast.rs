//! Position-aware YAML parsing.
//!
//! The manifest and schema walkers need to know *where* every mapping and
//! sequence item starts so the host can jump to it, which rules out plain
//! value deserialization. This module drives `yaml-rust2`'s marked event
//! stream into a small closed tree: [`YamlNode::Mapping`],
//! [`YamlNode::Sequence`] and [`YamlNode::Scalar`], each carrying a
//! character-offset [`Span`]. Consumers pattern-match exhaustively on the
//! node kind instead of probing fields at runtime.
//!
//! A parsed document is never mutated; files are re-read and re-parsed
//! wholesale whenever they change on disk, so spans are only meaningful
//! against the exact buffer they were produced from.

use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, ScanError};

/// A character-offset span into the buffer a node was parsed from.
///
/// `start` is exact for every node. For scalars, `end` is derived from the
/// parsed value's length, so it undercounts source forms whose text differs
/// from their value (quoted, escaped, folded and block scalars); all line
/// and navigation positions are derived from `start` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Closed set of node kinds, ordered for consumers that sort by shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum YamlNodeKind {
    Scalar,
    Sequence,
    Mapping,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlScalar {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlSequence {
    pub items: Vec<YamlNode>,
    pub span: Span,
}

/// One `key: value` pair inside a mapping. Key order is preserved for
/// display; lookups go through [`YamlMapping::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub key: String,
    pub key_span: Span,
    pub value: YamlNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlMapping {
    pub entries: Vec<MappingEntry>,
    pub span: Span,
}

impl YamlMapping {
    /// First value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&YamlNode> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Scalar value for `key`, if present and actually a scalar.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            YamlNode::Scalar(scalar) => Some(scalar.value.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YamlNode {
    Scalar(YamlScalar),
    Sequence(YamlSequence),
    Mapping(YamlMapping),
}

impl YamlNode {
    pub fn kind(&self) -> YamlNodeKind {
        match self {
            YamlNode::Scalar(_) => YamlNodeKind::Scalar,
            YamlNode::Sequence(_) => YamlNodeKind::Sequence,
            YamlNode::Mapping(_) => YamlNodeKind::Mapping,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            YamlNode::Scalar(scalar) => scalar.span,
            YamlNode::Sequence(sequence) => sequence.span,
            YamlNode::Mapping(mapping) => mapping.span,
        }
    }

    pub fn as_mapping(&self) -> Option<&YamlMapping> {
        match self {
            YamlNode::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&YamlSequence> {
        match self {
            YamlNode::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }
}

/// The root of one parsed YAML buffer. An empty buffer parses to a document
/// with no root rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct YamlDocument {
    pub root: Option<YamlNode>,
}

impl YamlDocument {
    /// The root mapping, for the manifest/schema shapes that require one.
    pub fn root_mapping(&self) -> Option<&YamlMapping> {
        self.root.as_ref().and_then(|node| node.as_mapping())
    }
}

/// Parse a YAML buffer into a position-aware tree.
///
/// Only the first document of a multi-document stream is kept; the manifest
/// and schema files are single-document by convention.
pub fn parse_yaml(text: &str) -> Result<YamlDocument, ScanError> {
    let mut builder = TreeBuilder::default();
    let mut parser = Parser::new_from_str(text);
    parser.load(&mut builder, true)?;
    Ok(YamlDocument { root: builder.root })
}

enum Frame {
    Mapping {
        start: usize,
        entries: Vec<MappingEntry>,
        pending_key: Option<(String, Span)>,
    },
    Sequence {
        start: usize,
        items: Vec<YamlNode>,
    },
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    root: Option<YamlNode>,
}

impl TreeBuilder {
    fn attach(&mut self, node: YamlNode) {
        match self.stack.last_mut() {
            Some(Frame::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some((key, key_span)) => entries.push(MappingEntry {
                    key,
                    key_span,
                    value: node,
                }),
                // A non-scalar mapping key. The manifest and schema shapes
                // never use one; keep the tree total with an empty key.
                None => *pending_key = Some((String::new(), node.span())),
            },
            Some(Frame::Sequence { items, .. }) => items.push(node),
            None => {
                // Keep the first document's root; ignore trailing documents.
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
        }
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, event: Event, mark: Marker) {
        match event {
            Event::Scalar(value, ..) => {
                let span = Span {
                    start: mark.index(),
                    end: mark.index() + value.chars().count(),
                };
                match self.stack.last_mut() {
                    Some(Frame::Mapping { pending_key, .. }) if pending_key.is_none() => {
                        *pending_key = Some((value, span));
                    }
                    _ => self.attach(YamlNode::Scalar(YamlScalar { value, span })),
                }
            }
            Event::Alias(_) => {
                // Aliases are not resolved; represent them as an empty scalar
                // so surrounding structure stays intact.
                let span = Span {
                    start: mark.index(),
                    end: mark.index(),
                };
                self.attach(YamlNode::Scalar(YamlScalar {
                    value: String::new(),
                    span,
                }));
            }
            Event::MappingStart(..) => self.stack.push(Frame::Mapping {
                start: mark.index(),
                entries: Vec::new(),
                pending_key: None,
            }),
            Event::MappingEnd => {
                if let Some(Frame::Mapping { start, entries, .. }) = self.stack.pop() {
                    self.attach(YamlNode::Mapping(YamlMapping {
                        entries,
                        span: Span {
                            start,
                            end: mark.index(),
                        },
                    }));
                }
            }
            Event::SequenceStart(..) => self.stack.push(Frame::Sequence {
                start: mark.index(),
                items: Vec::new(),
            }),
            Event::SequenceEnd => {
                if let Some(Frame::Sequence { start, items }) = self.stack.pop() {
                    self.attach(YamlNode::Sequence(YamlSequence {
                        items,
                        span: Span {
                            start,
                            end: mark.index(),
                        },
                    }));
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mapping_with_ordered_keys() {
        let doc = parse_yaml("version: \"1.0\"\nqueries: []\n").unwrap();
        let root = doc.root_mapping().expect("root should be a mapping");

        assert_eq!(root.entries.len(), 2);
        assert_eq!(root.entries[0].key, "version");
        assert_eq!(root.entries[1].key, "queries");
        assert_eq!(root.get_str("version"), Some("1.0"));
        assert_eq!(
            root.get("queries").map(|n| n.kind()),
            Some(YamlNodeKind::Sequence)
        );
    }

    #[test]
    fn test_sequence_item_spans_point_at_item_start() {
        let text = "queries:\n  - name: first\n  - name: second\n";
        let doc = parse_yaml(text).unwrap();
        let root = doc.root_mapping().unwrap();
        let seq = root.get("queries").and_then(|n| n.as_sequence()).unwrap();

        assert_eq!(seq.items.len(), 2);
        let first = seq.items[0].span();
        let second = seq.items[1].span();
        // Spans start on the line each item is declared on.
        let line_of = |offset: usize| text.chars().take(offset).filter(|c| *c == '\n').count();
        assert_eq!(line_of(first.start), 1);
        assert_eq!(line_of(second.start), 2);
        assert!(second.start > first.start);
    }

    #[test]
    fn test_scalar_spans_start_exactly_end_approximately() {
        let text = "label: \"Network Device\"\nkind: Text\n";
        let doc = parse_yaml(text).unwrap();
        let root = doc.root_mapping().unwrap();

        let plain = root.get("kind").unwrap().span();
        assert_eq!(&text[plain.start..plain.end], "Text");

        // Quoted scalar: the end is value-length based, so it stops short of
        // the source extent (which includes the quotes). The start still
        // lands on the value's own line, which is all navigation uses.
        let quoted = root.get("label").unwrap().span();
        assert_eq!(quoted.end - quoted.start, "Network Device".chars().count());
        assert!(quoted.start > text.find(':').unwrap());
        assert!(quoted.end <= text.find('\n').unwrap());
    }

    #[test]
    fn test_empty_document_has_no_root() {
        let doc = parse_yaml("").unwrap();
        assert!(doc.root.is_none());
        assert!(doc.root_mapping().is_none());
    }

    #[test]
    fn test_scalar_root_is_not_a_mapping() {
        let doc = parse_yaml("just a string").unwrap();
        assert!(doc.root.is_some());
        assert!(doc.root_mapping().is_none());
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let result = parse_yaml("key: [unclosed");
        assert!(result.is_err());
    }

    #[test]
    fn test_nested_mapping_lookup() {
        let text = "nodes:\n  - name: Device\n    namespace: Infra\n    attributes:\n      - name: hostname\n        kind: Text\n";
        let doc = parse_yaml(text).unwrap();
        let root = doc.root_mapping().unwrap();
        let nodes = root.get("nodes").and_then(|n| n.as_sequence()).unwrap();
        let device = nodes.items[0].as_mapping().unwrap();

        assert_eq!(device.get_str("name"), Some("Device"));
        assert_eq!(device.get_str("namespace"), Some("Infra"));
        let attrs = device
            .get("attributes")
            .and_then(|n| n.as_sequence())
            .unwrap();
        assert_eq!(attrs.items.len(), 1);
        assert_eq!(
            attrs.items[0].as_mapping().unwrap().get_str("kind"),
            Some("Text")
        );
    }

    #[test]
    fn test_reparse_is_structurally_identical() {
        let text = "nodes:\n  - name: Device\n    namespace: Infra\n";
        let first = parse_yaml(text).unwrap();
        let second = parse_yaml(text).unwrap();
        assert_eq!(first, second);
    }
}
