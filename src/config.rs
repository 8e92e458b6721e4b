use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::scanner::ScanOptions;

/// Name of the optional config file at the project root.
pub const CONFIG_FILE: &str = "relgraph.toml";

/// Configuration loaded from `relgraph.toml` at the project root.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RelGraphConfig {
    /// Additional path patterns to exclude from scanning (beyond .gitignore and node_modules).
    pub exclude: Option<Vec<String>>,
    /// Pattern-recognition settings for the scanner.
    pub scan: ScanOptions,
}

impl RelGraphConfig {
    /// Load configuration from `relgraph.toml` in the given root directory.
    ///
    /// Returns a default configuration if the file does not exist or cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!("failed to parse {CONFIG_FILE}: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                warn!("failed to read {CONFIG_FILE}: {err}. Using defaults.");
                Self::default()
            }
        }
    }
}
