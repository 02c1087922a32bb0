//! Relay backend wire types and the HTTP transport.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::{ActionError, FetchError};
use super::token::TokenGate;

/// Relay pin identifier.
pub type Pin = u32;

/// Endpoint listing every relay and its state.
pub const RELAYS_PATH: &str = "/api/relays";

/// Path of the relay collection endpoint.
#[must_use]
pub fn relays_path() -> String {
    RELAYS_PATH.to_string()
}

/// Path of the command endpoint for one relay and one action.
#[must_use]
pub fn action_path(pin: Pin, action: Action) -> String {
    format!("/api/relay/{pin}/{action}")
}

/// Requested state transition for a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    On,
    Off,
    Toggle,
}

impl Action {
    /// All actions, in button order.
    pub const ALL: [Self; 3] = [Self::On, Self::Off, Self::Toggle];

    /// Path segment used by the command endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Toggle => "toggle",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized action name.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Unknown action: {0} (expected on, off or toggle)")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "toggle" => Ok(Self::Toggle),
            _ => Err(ParseActionError(s.to_string())),
        }
    }
}

/// Decoded `GET /api/relays` body.
///
/// Only `state` is required. A `pins` value that is not a list of pins and
/// state keys that are not pin numbers are skipped rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Configured pins, when the backend reports them.
    #[serde(default, deserialize_with = "lenient_pins")]
    pub pins: Vec<Pin>,
    /// Relay state keyed by pin; `true` is ON.
    #[serde(deserialize_with = "pin_keyed_state")]
    pub state: BTreeMap<Pin, bool>,
}

fn lenient_pins<'de, D>(deserializer: D) -> Result<Vec<Pin>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let pins = value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_u64().and_then(|n| Pin::try_from(n).ok()))
                .collect()
        })
        .unwrap_or_default();
    Ok(pins)
}

fn pin_keyed_state<'de, D>(deserializer: D) -> Result<BTreeMap<Pin, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, bool>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, on)| key.trim().parse::<Pin>().ok().map(|pin| (pin, on)))
        .collect())
}

/// Text surfaced for a refused command: the body verbatim, or the status
/// line when the body could not be read.
fn rejection_body(status: StatusCode, body: Option<String>) -> String {
    body.unwrap_or_else(|| status.to_string())
}

impl StateSnapshot {
    /// Whether `pin` is ON. Pins missing from the snapshot are OFF.
    #[must_use]
    pub fn is_on(&self, pin: Pin) -> bool {
        self.state.get(&pin).copied().unwrap_or(false)
    }

    /// Pins the backend knows about: the reported list, else the state keys.
    #[must_use]
    pub fn known_pins(&self) -> Vec<Pin> {
        if self.pins.is_empty() {
            self.state.keys().copied().collect()
        } else {
            self.pins.clone()
        }
    }
}

/// Transport to the relay backend.
///
/// URLs passed in are paths already authorized by the token gate.
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// GET the relay collection and decode the snapshot.
    async fn fetch_state(&self, url: &str) -> Result<StateSnapshot, FetchError>;

    /// POST a relay command. The success body is ignored.
    async fn send_action(&self, url: &str) -> Result<(), ActionError>;
}

/// Ask the backend which pins exist, for panels built without a pin list.
///
/// # Errors
///
/// Returns the fetch error if the state request fails.
pub async fn discover_pins(
    api: &dyn RelayApi,
    gate: &TokenGate,
) -> Result<Vec<Pin>, FetchError> {
    let snapshot = api.fetch_state(&gate.authorize(RELAYS_PATH)).await?;
    Ok(snapshot.known_pins())
}

/// `RelayApi` over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpRelayApi {
    client: Client,
    base_url: String,
}

impl HttpRelayApi {
    /// Create a transport for `base_url` using network stack default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, None)
    }

    /// Create a transport with an optional overall request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn full_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RelayApi for HttpRelayApi {
    async fn fetch_state(&self, url: &str) -> Result<StateSnapshot, FetchError> {
        let url = self.full_url(url);
        tracing::debug!(url = %url, "Fetching relay state");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        response
            .json::<StateSnapshot>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn send_action(&self, url: &str) -> Result<(), ActionError> {
        let url = self.full_url(url);
        tracing::debug!(url = %url, "Sending relay command");

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| ActionError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(
                    status = %status,
                    error = %e,
                    "Failed to read command error body"
                );
                None
            }
        };
        Err(ActionError::Rejected {
            status,
            body: rejection_body(status, body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(relays_path(), "/api/relays");
        assert_eq!(action_path(13, Action::Toggle), "/api/relay/13/toggle");
        assert_eq!(action_path(4, Action::On), "/api/relay/4/on");
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("on".parse::<Action>(), Ok(Action::On));
        assert_eq!(" OFF ".parse::<Action>(), Ok(Action::Off));
        assert_eq!("toggle".parse::<Action>(), Ok(Action::Toggle));
        assert_eq!(
            "flip".parse::<Action>(),
            Err(ParseActionError("flip".to_string()))
        );
    }

    #[test]
    fn test_snapshot_decodes_string_keys() {
        let snapshot: StateSnapshot =
            serde_json::from_str(r#"{"state": {"13": true, "14": false}}"#).unwrap();
        assert!(snapshot.is_on(13));
        assert!(!snapshot.is_on(14));
        assert!(snapshot.pins.is_empty());
        assert_eq!(snapshot.known_pins(), vec![13, 14]);
    }

    #[test]
    fn test_snapshot_missing_pin_is_off() {
        let snapshot: StateSnapshot = serde_json::from_str(r#"{"state": {}}"#).unwrap();
        assert!(!snapshot.is_on(17));
    }

    #[test]
    fn test_snapshot_prefers_reported_pins() {
        let snapshot: StateSnapshot =
            serde_json::from_str(r#"{"pins": [17, 27, 22], "state": {"17": true}}"#).unwrap();
        assert_eq!(snapshot.known_pins(), vec![17, 27, 22]);
    }

    #[test]
    fn test_snapshot_ignores_null_pins() {
        let snapshot: StateSnapshot =
            serde_json::from_str(r#"{"pins": null, "state": {"13": true}}"#).unwrap();
        assert!(snapshot.pins.is_empty());
        assert!(snapshot.is_on(13));
    }

    #[test]
    fn test_snapshot_skips_non_pin_entries() {
        let snapshot: StateSnapshot = serde_json::from_str(
            r#"{"pins": ["a", 17, -1, 27], "state": {"13": true, "gpio": false}}"#,
        )
        .unwrap();
        assert_eq!(snapshot.pins, vec![17, 27]);
        assert!(snapshot.is_on(13));
        assert_eq!(snapshot.state.len(), 1);
    }

    #[test]
    fn test_rejection_body_falls_back_to_status() {
        assert_eq!(
            rejection_body(StatusCode::BAD_REQUEST, Some("relay busy".to_string())),
            "relay busy"
        );
        assert_eq!(
            rejection_body(StatusCode::BAD_GATEWAY, None),
            "502 Bad Gateway"
        );
    }

    #[test]
    fn test_snapshot_without_state_is_rejected() {
        let result = serde_json::from_str::<StateSnapshot>(r#"{"pins": [17]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_full_url_joins_base() {
        let api = HttpRelayApi::new("http://relay.local:5003/").unwrap();
        assert_eq!(
            api.full_url("/api/relays?token=x"),
            "http://relay.local:5003/api/relays?token=x"
        );
        assert_eq!(api.base_url(), "http://relay.local:5003/");
    }
}
