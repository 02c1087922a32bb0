//! Capabilities a panel rendering exposes to the controller.

use std::sync::Arc;

use crate::client::{Pin, TokenField, TokenStatus};

/// Rendered state of one relay card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    On,
    Off,
}

impl RelayState {
    /// Label text for the card.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }

    /// Style class for the card. Exactly one of `on`/`off` is ever applied.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for RelayState {
    fn from(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}

/// The set of relay cards, one per pin, fixed when the panel is built.
pub trait CardSurface: Send + Sync {
    /// Pins of every card, in display order.
    fn pins(&self) -> Vec<Pin>;

    /// Set the label text and on/off class of the card for `pin`.
    fn render(&self, pin: Pin, state: RelayState);
}

/// Element showing token and connection status.
pub trait StatusIndicator: Send + Sync {
    fn show(&self, status: TokenStatus);
}

/// Blocking user notification.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// References to the elements a controller drives.
///
/// The status indicator and token field are optional; without them the
/// corresponding behavior is skipped.
#[derive(Clone)]
pub struct PanelElements {
    pub cards: Arc<dyn CardSurface>,
    pub notifier: Arc<dyn Notifier>,
    pub status: Option<Arc<dyn StatusIndicator>>,
    pub token: Option<Arc<dyn TokenField>>,
}

impl PanelElements {
    /// Elements with no status indicator and no token field.
    #[must_use]
    pub fn new(cards: Arc<dyn CardSurface>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            cards,
            notifier,
            status: None,
            token: None,
        }
    }

    /// Attach a status indicator.
    #[must_use]
    pub fn with_status(mut self, status: Arc<dyn StatusIndicator>) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach a token field.
    #[must_use]
    pub fn with_token(mut self, token: Arc<dyn TokenField>) -> Self {
        self.token = Some(token);
        self
    }
}

impl std::fmt::Debug for PanelElements {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelElements")
            .field("pins", &self.cards.pins())
            .field("has_status", &self.status.is_some())
            .field("has_token", &self.token.is_some())
            .finish()
    }
}
