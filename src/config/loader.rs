//! Configuration file loader.

use std::path::{Path, PathBuf};

use super::PanelConfig;

/// Configuration loader that searches multiple locations.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Search paths in order of priority.
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default search paths.
    #[must_use]
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        // 1. Current directory: .relay-panel.toml
        search_paths.push(PathBuf::from(".relay-panel.toml"));

        // 2. User config directory: ~/.config/relay-panel/config.toml
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("relay-panel").join("config.toml"));
        }

        Self::with_paths(search_paths)
    }

    /// Create a config loader with a specific config file path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self::with_paths(vec![path])
    }

    /// Create a config loader over `search_paths`, first match wins.
    #[must_use]
    pub fn with_paths(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// Load configuration from the first available file, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub fn load(&self) -> Result<PanelConfig, ConfigError> {
        for path in &self.search_paths {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                return Self::load_from_path(path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(PanelConfig::default())
    }

    /// Load configuration from a specific path.
    fn load_from_path(path: &Path) -> Result<PanelConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_loader_default_paths() {
        let loader = ConfigLoader::new();
        assert!(!loader.search_paths.is_empty());
        assert!(loader.search_paths[0].ends_with(".relay-panel.toml"));
        if let Some(user) = loader.search_paths.get(1) {
            assert!(user.ends_with("relay-panel/config.toml"));
        }
    }

    #[test]
    fn test_config_loader_returns_defaults_when_no_file() {
        let loader = ConfigLoader::with_path(PathBuf::from("/nonexistent/path.toml"));
        let config = loader.load().unwrap();
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                base_url = "http://relay.local:8080"
                pins = [17, 27, 22, 23]
                token = "s3cret"
                request_timeout_secs = 3
            "#,
        )
        .unwrap();

        let config = ConfigLoader::with_path(path).load().unwrap();
        assert_eq!(config.base_url, "http://relay.local:8080");
        assert_eq!(config.pins, vec![17, 27, 22, 23]);
        assert_eq!(config.token.as_deref(), Some("s3cret"));
        assert_eq!(config.request_timeout_secs, Some(3));
        assert_eq!(config.token_env, "RELAY_PANEL_TOKEN");
        assert!(config.token_field);
    }

    #[test]
    fn test_later_search_path_used_when_earlier_missing() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join(".relay-panel.toml");
        let user = dir.path().join("config.toml");
        std::fs::write(&user, "base_url = \"http://user:1\"").unwrap();

        let loader = ConfigLoader::with_paths(vec![local.clone(), user]);
        assert_eq!(loader.load().unwrap().base_url, "http://user:1");

        std::fs::write(&local, "base_url = \"http://local:2\"").unwrap();
        assert_eq!(loader.load().unwrap().base_url, "http://local:2");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "pins = \"not a list\"").unwrap();

        let error = ConfigLoader::with_path(path).load().unwrap_err();
        assert!(matches!(error, ConfigError::ParseError { .. }));
        assert!(error.to_string().contains("Failed to parse config file"));
    }
}
