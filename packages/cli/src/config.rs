use pagewright_components::SiteComponents;
use pagewright_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "pagewright.config.json";

/// Pagewright configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(flatten)]
    pub editor: EditorConfig,

    /// JSON list of the site's global components
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components_file: Option<String>,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn components_path(&self, cwd: &Path) -> Option<PathBuf> {
        self.components_file.as_ref().map(|file| cwd.join(file))
    }
}

/// Read a component list, or an empty site when there is none
pub fn load_site(path: Option<&Path>) -> anyhow::Result<SiteComponents> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Cannot read components file {}: {}", path.display(), e))?;
            Ok(SiteComponents::from_json(&json)?)
        }
        None => Ok(SiteComponents::new()),
    }
}
