//! Configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::Pin;

/// Configuration for the relay panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Base URL of the relay backend.
    pub base_url: String,
    /// Pins to show as cards. Empty means ask the backend at startup.
    pub pins: Vec<Pin>,
    /// Initial token value.
    pub token: Option<String>,
    /// Environment variable read for the token when `token` is unset.
    pub token_env: String,
    /// Whether the panel has a token field at all.
    pub token_field: bool,
    /// Overall request timeout in seconds. Unset uses network defaults.
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5003".to_string()
}

fn default_token_env() -> String {
    "RELAY_PANEL_TOKEN".to_string()
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            pins: Vec::new(),
            token: None,
            token_env: default_token_env(),
            token_field: true,
            request_timeout_secs: None,
        }
    }
}

impl PanelConfig {
    /// Initial token: the configured value, else the environment variable.
    #[must_use]
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(&self.token_env).ok())
            .filter(|t| !t.trim().is_empty())
    }

    /// Request timeout, if configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_config_defaults() {
        let config = PanelConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:5003");
        assert!(config.pins.is_empty());
        assert_eq!(config.token, None);
        assert_eq!(config.token_env, "RELAY_PANEL_TOKEN");
        assert!(config.token_field);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_resolve_token_prefers_config_value() {
        let config = PanelConfig {
            token: Some("from-config".to_string()),
            token_env: "RELAY_PANEL_TEST_TOKEN_PREFERS".to_string(),
            ..Default::default()
        };
        std::env::set_var("RELAY_PANEL_TEST_TOKEN_PREFERS", "from-env");
        assert_eq!(config.resolve_token().as_deref(), Some("from-config"));
    }

    #[test]
    fn test_resolve_token_falls_back_to_env() {
        let config = PanelConfig {
            token_env: "RELAY_PANEL_TEST_TOKEN_FALLBACK".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_token(), None);

        std::env::set_var("RELAY_PANEL_TEST_TOKEN_FALLBACK", "from-env");
        assert_eq!(config.resolve_token().as_deref(), Some("from-env"));
    }

    #[test]
    fn test_blank_token_is_none() {
        let config = PanelConfig {
            token: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_token(), None);
    }

    #[test]
    fn test_request_timeout() {
        let config = PanelConfig {
            request_timeout_secs: Some(5),
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
    }
}
