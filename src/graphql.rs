//! GraphQL query parsing and variable extraction.
//!
//! Manifest `queries` entries reference `.gql` documents whose declared
//! variables drive the host's "execute query" input form. This module parses
//! a query document and partitions its variables into required and optional
//! sets: a variable is required iff the outermost wrapper of its declared
//! type is NonNull, and its reported type is the named-type leaf after
//! unwrapping all List/NonNull wrappers (`[String!]!` reports `String`).
//!
//! Extraction is a pure function of the document text: re-parsing identical
//! text yields an identical result, in declaration order, aggregated across
//! all operations in the document.

use std::path::Path;

use graphql_parser::query::{parse_query, Definition, OperationDefinition, Type};
use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// One declared query variable with its GraphQL named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRef {
    pub name: String,
    pub graphql_type: String,
}

/// The typed variable manifest of one query document.
///
/// `required` and `optional` partition exactly the set of variable
/// definitions in the document; no variable appears in both.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryVariables {
    pub required: Vec<VariableRef>,
    pub optional: Vec<VariableRef>,
    pub raw_text: String,
}

/// Extract the variable manifest from a GraphQL document.
///
/// A document with zero variable definitions yields two empty vectors.
/// `path` is only used to label the error when the document fails to parse.
pub fn extract_variables(text: &str, path: &Path) -> Result<QueryVariables, IndexError> {
    let document =
        parse_query::<String>(text).map_err(|err| IndexError::syntax(path, err))?;

    let mut required = Vec::new();
    let mut optional = Vec::new();

    for definition in &document.definitions {
        let variable_definitions = match definition {
            Definition::Operation(operation) => match operation {
                OperationDefinition::Query(query) => &query.variable_definitions,
                OperationDefinition::Mutation(mutation) => &mutation.variable_definitions,
                OperationDefinition::Subscription(subscription) => {
                    &subscription.variable_definitions
                }
                OperationDefinition::SelectionSet(_) => continue,
            },
            Definition::Fragment(_) => continue,
        };

        for variable in variable_definitions {
            let reference = VariableRef {
                name: variable.name.clone(),
                graphql_type: named_type(&variable.var_type).to_string(),
            };
            if matches!(variable.var_type, Type::NonNullType(_)) {
                required.push(reference);
            } else {
                optional.push(reference);
            }
        }
    }

    Ok(QueryVariables {
        required,
        optional,
        raw_text: text.to_string(),
    })
}

/// Unwrap List/NonNull wrappers down to the named-type leaf.
fn named_type<'a, 'doc>(ty: &'a Type<'doc, String>) -> &'a str {
    match ty {
        Type::NamedType(name) => name,
        Type::ListType(inner) | Type::NonNullType(inner) => named_type(inner),
    }
}

/// The GraphQL-over-HTTP request body shape the host's network client posts.
///
/// The client itself lives in the host layer; this keeps the extractor's
/// output compatible with its `{query, variables} -> {data, errors}` wire
/// shape.
pub fn request_body(query: &str, variables: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "query": query,
        "variables": variables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> QueryVariables {
        extract_variables(text, Path::new("test.gql")).expect("document should parse")
    }

    #[test]
    fn test_wrapper_unwrapping_and_classification() {
        let vars = extract("query($x: [String!]!, $y: Int) { device }");

        assert_eq!(
            vars.required,
            vec![VariableRef {
                name: "x".to_string(),
                graphql_type: "String".to_string(),
            }]
        );
        assert_eq!(
            vars.optional,
            vec![VariableRef {
                name: "y".to_string(),
                graphql_type: "Int".to_string(),
            }]
        );
    }

    #[test]
    fn test_inner_non_null_alone_is_optional() {
        // Outermost wrapper is a List, so the variable itself may be omitted.
        let vars = extract("query($tags: [String!]) { device }");
        assert!(vars.required.is_empty());
        assert_eq!(vars.optional[0].graphql_type, "String");
    }

    #[test]
    fn test_no_variables_yields_empty_partitions() {
        let vars = extract("query { device { name } }");
        assert!(vars.required.is_empty());
        assert!(vars.optional.is_empty());
        assert!(vars.raw_text.contains("device"));
    }

    #[test]
    fn test_multiple_operations_aggregate() {
        let text = "query A($a: ID!) { x }\nmutation B($b: String) { y }";
        let vars = extract(text);
        assert_eq!(vars.required.len(), 1);
        assert_eq!(vars.required[0].name, "a");
        assert_eq!(vars.optional.len(), 1);
        assert_eq!(vars.optional[0].name, "b");
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        let text = "query($branch: String!, $limit: Int, $offset: Int, $name: ID!) { x }";
        let vars = extract(text);

        let mut names: Vec<&str> = vars
            .required
            .iter()
            .chain(vars.optional.iter())
            .map(|v| v.name.as_str())
            .collect();
        names.sort_unstable();
        assert_eq!(names, vec!["branch", "limit", "name", "offset"]);
        assert!(vars
            .required
            .iter()
            .all(|r| vars.optional.iter().all(|o| o.name != r.name)));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "query($branch: String!, $limit: Int) { device { name } }";
        assert_eq!(extract(text), extract(text));
    }

    #[test]
    fn test_parse_failure_carries_path() {
        let err = extract_variables("query {", Path::new("broken.gql")).unwrap_err();
        match err {
            IndexError::DocumentSyntax { path, .. } => {
                assert_eq!(path, Path::new("broken.gql"));
            }
            other => panic!("expected DocumentSyntax, got {other:?}"),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = request_body("query { x }", serde_json::json!({ "branch": "main" }));
        assert_eq!(body["query"], "query { x }");
        assert_eq!(body["variables"]["branch"], "main");
    }
}
