use std::path::Path;

use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// Paths (relative to the workspace root) searched recursively for
    /// schema YAML files.
    pub schema_search_paths: Vec<String>,
    /// Parse the GraphQL documents referenced by manifest query entries and
    /// attach their variable manifests.
    pub resolve_query_variables: bool,
    /// Log a warning when two schema files define the same
    /// `namespace + name`. The later definition wins either way.
    pub warn_on_duplicate_artifacts: bool,
}

impl Settings {
    pub fn new(root_dir: &Path) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/infralens/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.infralens",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            )
            .set_default("schema_search_paths", vec!["schemas".to_string()])?
            .set_default("resolve_query_variables", true)?
            .set_default("warn_on_duplicate_artifacts", false)?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            schema_search_paths: vec!["schemas".to_string()],
            resolve_query_variables: true,
            warn_on_duplicate_artifacts: false,
        }
    }
}
