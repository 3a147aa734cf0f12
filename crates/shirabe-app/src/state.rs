use std::path::{Path, PathBuf};

use anyhow::Context;
use shirabe_config::Config;
use shirabe_core::dictionary::Dictionary;
use shirabe_core::registry::DictionaryRegistry;

pub struct AppState {
    pub config: Config,
    pub registry: DictionaryRegistry,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let mut registry = DictionaryRegistry::new();
        shirabe_lang_japanese::register(&mut registry);

        Self { config, registry }
    }

    /// Dictionary files to search: the given ones, or the configured ones
    pub fn dictionary_paths(&self, given: &[PathBuf]) -> Vec<PathBuf> {
        if !given.is_empty() {
            return given.to_vec();
        }
        if !self.config.dictionary.enabled {
            tracing::debug!("Configured dictionaries are disabled");
            return vec![];
        }
        self.config
            .dictionary
            .paths
            .iter()
            .map(PathBuf::from)
            .collect()
    }

    /// Detect the format of `path` and load it
    pub fn open_dictionary(&self, path: &Path) -> anyhow::Result<Box<dyn Dictionary>> {
        let descriptor = path
            .to_str()
            .with_context(|| format!("Dictionary path is not valid UTF-8: {}", path.display()))?;
        self.registry
            .create(descriptor)
            .with_context(|| format!("Failed to open dictionary {}", path.display()))
    }
}

/// Defaults and `SHIRABE_*` variables, or the given JSON file
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            Config::load(path).with_context(|| format!("Failed to load {}", path.display()))
        }
        None => Ok(Config::new()),
    }
}
