//! Optional access token read from a token field and attached to request URLs.

use std::sync::{Arc, RwLock};

/// Query parameter carrying the access token.
pub const TOKEN_PARAM: &str = "token";

/// A source of the current token value, typically an editable input.
pub trait TokenField: Send + Sync {
    /// Raw field contents, untrimmed.
    fn value(&self) -> String;
}

/// Editable token value shared between the input side and the panel.
///
/// Clones share the same underlying value, so an edit made through one
/// handle is seen by every request issued afterwards.
#[derive(Debug, Clone, Default)]
pub struct TokenInput {
    value: Arc<RwLock<String>>,
}

impl TokenInput {
    /// Create a field holding `initial`.
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            value: Arc::new(RwLock::new(initial.into())),
        }
    }

    /// Replace the field contents.
    pub fn set(&self, value: impl Into<String>) {
        let value = value.into();
        match self.value.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }
}

impl TokenField for TokenInput {
    fn value(&self) -> String {
        match self.value.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Token state as shown by the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// A non-empty token was attached to the last successful refresh.
    Present,
    /// The last successful refresh went out without a token.
    Missing,
    /// The last refresh failed.
    ConnectionError,
}

impl TokenStatus {
    /// Text shown in the status element.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Present => "token present",
            Self::Missing => "no token",
            Self::ConnectionError => "connection error",
        }
    }

    /// Style class applied to the status element.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Present => "token-ok",
            Self::Missing | Self::ConnectionError => "token-bad",
        }
    }
}

/// Reads the optional token field and authorizes outgoing URLs with it.
///
/// Without a field every URL passes through untouched.
#[derive(Clone, Default)]
pub struct TokenGate {
    field: Option<Arc<dyn TokenField>>,
}

impl std::fmt::Debug for TokenGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGate")
            .field("has_field", &self.field.is_some())
            .finish()
    }
}

impl TokenGate {
    /// Create a gate over an optional token field.
    #[must_use]
    pub fn new(field: Option<Arc<dyn TokenField>>) -> Self {
        Self { field }
    }

    /// Whether a token field exists at all.
    #[must_use]
    pub fn has_field(&self) -> bool {
        self.field.is_some()
    }

    /// Trimmed field value, or empty when there is no field.
    #[must_use]
    pub fn current_token(&self) -> String {
        self.field
            .as_ref()
            .map(|field| field.value().trim().to_string())
            .unwrap_or_default()
    }

    /// Append `token=<value>` to `url` when a token is set.
    #[must_use]
    pub fn authorize(&self, url: &str) -> String {
        let token = self.current_token();
        if token.is_empty() {
            return url.to_string();
        }
        let sep = if url.contains('?') { '&' } else { '?' };
        format!("{url}{sep}{TOKEN_PARAM}={}", encode_component(&token))
    }

    /// Status to display after a successful refresh.
    #[must_use]
    pub fn status(&self) -> TokenStatus {
        if self.current_token().is_empty() {
            TokenStatus::Missing
        } else {
            TokenStatus::Present
        }
    }
}

/// Percent-encode a URI component, leaving `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
/// intact and encoding spaces as `%20`.
#[must_use]
pub fn encode_component(input: &str) -> String {
    // form_urlencoded keeps `*-._` and alphanumerics; widen to the full
    // component-safe set and swap `+` back to `%20`.
    let encoded: String = url::form_urlencoded::byte_serialize(input.as_bytes()).collect();
    encoded
        .replace('+', "%20")
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%7E", "~")
}
