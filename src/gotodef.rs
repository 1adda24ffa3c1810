use tower_lsp::lsp_types::{Location, Position, Range, Url};

use crate::catalog::Catalog;

/// Resolve an identifier like `InfraDevice` to its defining schema artifact.
///
/// Matching is case-insensitive on the concatenated `namespace + name`. The
/// returned location points at the line the artifact starts on (column 0),
/// derived from the buffer the catalog was built from. `None` means nothing
/// matched; that is an answer, not an error.
pub fn find_definition(catalog: &Catalog, identifier: &str) -> Option<Location> {
    let artifact = catalog.artifact(identifier)?;
    let uri = Url::from_file_path(&artifact.file).ok()?;

    Some(Location {
        uri,
        range: Range {
            start: Position {
                line: artifact.line,
                character: 0,
            },
            end: Position {
                line: artifact.line,
                character: 1,
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::test_utils::{create_test_workspace, write_file};

    fn device_catalog() -> (tempfile::TempDir, Catalog) {
        let (temp_dir, root) = create_test_workspace();
        write_file(
            &root.join("schemas/device.yml"),
            "version: \"1.0\"\nnodes:\n  - name: Device\n    namespace: Infra\n",
        );
        let catalog = Catalog::build(&Settings::default(), &root).unwrap();
        (temp_dir, catalog)
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let (_temp_dir, catalog) = device_catalog();

        for identifier in ["infradevice", "InfraDevice", "INFRADEVICE"] {
            let location = find_definition(&catalog, identifier)
                .unwrap_or_else(|| panic!("{identifier} should resolve"));
            assert!(location.uri.path().ends_with("schemas/device.yml"));
            // `- name: Device` sits on line 2 of the schema file.
            assert_eq!(location.range.start.line, 2);
            assert_eq!(location.range.start.character, 0);
        }
    }

    #[test]
    fn test_unknown_identifier_resolves_to_nothing() {
        let (_temp_dir, catalog) = device_catalog();
        assert!(find_definition(&catalog, "InfraSwitch").is_none());
    }

    #[test]
    fn test_all_lookups_return_the_same_location() {
        let (_temp_dir, catalog) = device_catalog();
        let a = find_definition(&catalog, "infradevice").unwrap();
        let b = find_definition(&catalog, "INFRADEVICE").unwrap();
        assert_eq!(a, b);
    }
}
