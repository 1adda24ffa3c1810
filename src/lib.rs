//! infralens: the indexing core behind Infrahub editor integrations
//!
//! This crate parses a workspace's Infrahub artifacts (the `.infrahub.yml`
//! manifest, the GraphQL query documents it references, and the schema YAML
//! files under the configured search paths) into a navigable in-memory
//! catalog, and keeps that catalog consistent as files change on disk.
//!
//! # Overview
//!
//! The host editor layer (tree views, commands, the network client) is out
//! of scope; this library exposes the parts with actual algorithmic
//! content:
//!
//! - **Catalog building**: manifest sections, typed query variables, and
//!   schema artifacts with source positions
//! - **Definition resolution**: case-insensitive `namespace + name` lookup
//!   for go-to-definition
//! - **Document outline**: symbol trees for schema files
//! - **Change reaction**: manifest file watching with rename tolerance and
//!   atomic catalog snapshot swaps
//!
//! # Architecture
//!
//! Data flows one direction: file bytes → [`yaml_ast`]/[`graphql`] parsers →
//! [`catalog`] → [`gotodef`]/[`symbol`] resolvers, with [`reactor`] sitting
//! beside the catalog to trigger re-derivation. Parsed documents and built
//! catalogs are immutable; everything is re-read and rebuilt wholesale on
//! change.
//!
//! # Usage
//!
//! ```ignore
//! use infralens::catalog::Catalog;
//! use infralens::config::Settings;
//!
//! let settings = Settings::new(&workspace_root)?;
//! let catalog = Catalog::build(&settings, &workspace_root)?;
//! ```

// Core modules - parsing and the artifact catalog
pub mod catalog;
pub mod graphql;
pub mod yaml_ast;

// Navigation features consumed by the host
pub mod gotodef;
pub mod symbol;

// Change reaction
pub mod reactor;

// Configuration and errors
pub mod config;
pub mod error;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
