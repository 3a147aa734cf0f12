use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use self::dictionary::DictionaryConfig;
use self::logging::LoggingConfig;
use self::search::SearchConfig;

pub mod dictionary;
pub mod logging;
pub mod search;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub dictionary: DictionaryConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Defaults overridden by `SHIRABE_*` environment variables
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    /// Read a JSON config file, then apply the environment overrides.
    /// Sections and keys missing from the file keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&text)?;
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Override settings from variables looked up with `var`.
    ///
    /// - `SHIRABE_DICTIONARIES`: dictionary paths, separated like `PATH`
    /// - `SHIRABE_SEARCH_MODE`: search mode name
    /// - `SHIRABE_MAX_RESULTS`: result limit, ignored if not a number
    /// - `SHIRABE_LOG`: log filter
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(paths) = var("SHIRABE_DICTIONARIES") {
            self.dictionary.paths = env::split_paths(&paths)
                .filter(|path| !path.as_os_str().is_empty())
                .map(|path| path.to_string_lossy().into_owned())
                .collect();
        }

        if let Some(mode) = var("SHIRABE_SEARCH_MODE") {
            self.search.mode = mode;
        }

        if let Some(max_results) = var("SHIRABE_MAX_RESULTS").and_then(|v| v.parse().ok()) {
            self.search.max_results = max_results;
        }

        if let Some(filter) = var("SHIRABE_LOG") {
            self.logging.filter = filter;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.dictionary.enabled);
        assert!(config.dictionary.paths.is_empty());
        assert_eq!(config.search.mode, "exact");
        assert_eq!(config.search.fields, ["word", "reading", "translation"]);
        assert_eq!(config.search.max_results, 50);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        let separator = if cfg!(windows) { ";" } else { ":" };
        let paths = format!("/dict/kanjidic{separator}/dict/kanjd212");

        config.apply_overrides(vars(&[
            ("SHIRABE_DICTIONARIES", paths.as_str()),
            ("SHIRABE_SEARCH_MODE", "prefix"),
            ("SHIRABE_MAX_RESULTS", "5"),
            ("SHIRABE_LOG", "debug"),
        ]));

        assert_eq!(config.dictionary.paths, ["/dict/kanjidic", "/dict/kanjd212"]);
        assert_eq!(config.search.mode, "prefix");
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_invalid_number_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(vars(&[("SHIRABE_MAX_RESULTS", "many")]));
        assert_eq!(config.search.max_results, 50);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shirabe.json");
        std::fs::write(
            &path,
            r#"{ "dictionary": { "paths": ["kanjidic"] }, "search": { "max_results": 10 } }"#,
        )
        .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let config: Config = serde_json::from_str(&text).unwrap();
        assert!(config.dictionary.enabled);
        assert_eq!(config.dictionary.paths, ["kanjidic"]);
        assert_eq!(config.search.mode, "exact");
        assert_eq!(config.search.max_results, 10);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut config = Config::default();
        config.dictionary.paths.push("kanjidic".to_string());
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert_eq!(serde_json::from_str::<Config>(&json).unwrap(), config);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
