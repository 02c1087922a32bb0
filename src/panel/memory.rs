//! In-process panel rendering.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::client::{Pin, TokenField, TokenStatus};

use super::view::{CardSurface, Notifier, PanelElements, RelayState, StatusIndicator};

/// What one card currently displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSnapshot {
    pub pin: Pin,
    /// Label text; empty until the first render.
    pub label: String,
    /// `on` or `off`; `None` until the first render.
    pub class: Option<&'static str>,
    /// Number of renders applied to this card.
    pub renders: usize,
}

impl CardSnapshot {
    fn new(pin: Pin) -> Self {
        Self {
            pin,
            label: String::new(),
            class: None,
            renders: 0,
        }
    }
}

/// Panel that keeps cards, status and alerts in memory.
#[derive(Debug, Default)]
pub struct MemoryPanel {
    cards: Mutex<Vec<CardSnapshot>>,
    status: Mutex<Option<TokenStatus>>,
    alerts: Mutex<Vec<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl MemoryPanel {
    /// Create a panel with one card per pin.
    #[must_use]
    pub fn new(pins: impl IntoIterator<Item = Pin>) -> Self {
        Self {
            cards: Mutex::new(pins.into_iter().map(CardSnapshot::new).collect()),
            ..Self::default()
        }
    }

    /// Elements wired to this panel, including its status indicator.
    #[must_use]
    pub fn elements(self: &Arc<Self>, token: Option<Arc<dyn TokenField>>) -> PanelElements {
        PanelElements {
            cards: self.clone(),
            notifier: self.clone(),
            status: Some(self.clone()),
            token,
        }
    }

    /// Current contents of the card for `pin`.
    #[must_use]
    pub fn card(&self, pin: Pin) -> Option<CardSnapshot> {
        lock(&self.cards).iter().find(|c| c.pin == pin).cloned()
    }

    /// Current contents of every card.
    #[must_use]
    pub fn cards(&self) -> Vec<CardSnapshot> {
        lock(&self.cards).clone()
    }

    /// Last status shown, if any.
    #[must_use]
    pub fn status(&self) -> Option<TokenStatus> {
        *lock(&self.status)
    }

    /// Status text, empty when nothing was shown yet.
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        self.status().map_or("", TokenStatus::text)
    }

    /// Every alert raised so far, oldest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<String> {
        lock(&self.alerts).clone()
    }
}

impl CardSurface for MemoryPanel {
    fn pins(&self) -> Vec<Pin> {
        lock(&self.cards).iter().map(|c| c.pin).collect()
    }

    fn render(&self, pin: Pin, state: RelayState) {
        let mut cards = lock(&self.cards);
        for card in cards.iter_mut().filter(|c| c.pin == pin) {
            card.label = state.label().to_string();
            card.class = Some(state.class());
            card.renders += 1;
        }
    }
}

impl StatusIndicator for MemoryPanel {
    fn show(&self, status: TokenStatus) {
        *lock(&self.status) = Some(status);
    }
}

impl Notifier for MemoryPanel {
    fn alert(&self, message: &str) {
        lock(&self.alerts).push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cards_are_unrendered() {
        let panel = MemoryPanel::new([13, 14]);
        assert_eq!(panel.pins(), vec![13, 14]);
        let card = panel.card(13).unwrap();
        assert_eq!(card.label, "");
        assert_eq!(card.class, None);
        assert_eq!(card.renders, 0);
        assert!(panel.card(99).is_none());
    }

    #[test]
    fn test_render_replaces_class() {
        let panel = MemoryPanel::new([13]);
        panel.render(13, RelayState::On);
        panel.render(13, RelayState::Off);

        let card = panel.card(13).unwrap();
        assert_eq!(card.label, "OFF");
        assert_eq!(card.class, Some("off"));
        assert_eq!(card.renders, 2);
    }

    #[test]
    fn test_render_unknown_pin_is_ignored() {
        let panel = MemoryPanel::new([13]);
        panel.render(99, RelayState::On);
        assert_eq!(panel.card(13).unwrap().renders, 0);
    }

    #[test]
    fn test_status_and_alerts() {
        let panel = MemoryPanel::new([]);
        assert_eq!(panel.status_text(), "");

        panel.show(TokenStatus::Missing);
        assert_eq!(panel.status(), Some(TokenStatus::Missing));
        assert_eq!(panel.status_text(), "no token");

        panel.alert("Error: one");
        panel.alert("Error: two");
        assert_eq!(panel.alerts(), vec!["Error: one", "Error: two"]);
    }
}
