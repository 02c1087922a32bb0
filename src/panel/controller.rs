//! Panel controller: state refresh and relay commands.
//!
//! Every change goes through the backend first: a command is only reflected
//! on the cards once a following refresh reports it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::client::{
    action_path, relays_path, Action, ActionError, FetchError, Pin, RelayApi, StateSnapshot,
    TokenGate, TokenStatus,
};

use super::view::{PanelElements, RelayState};

/// Result of one `refresh()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The snapshot was rendered onto the cards.
    Applied(StateSnapshot),
    /// A refresh issued later had already rendered; nothing was touched.
    Superseded,
    /// The refresh failed and the error status was shown.
    Failed(String),
}

impl RefreshOutcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Result of one `dispatch()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The backend accepted the command and the panel was refreshed.
    Confirmed(RefreshOutcome),
    /// The backend refused the command; `message` was shown to the user.
    Rejected { status: u16, message: String },
    /// The backend could not be reached; `message` was shown to the user.
    Unreachable { message: String },
}

/// Controller for one relay panel.
///
/// Cheap to share behind an `Arc`; overlapping calls are allowed.
pub struct RelayPanelClient {
    api: Arc<dyn RelayApi>,
    elements: PanelElements,
    gate: TokenGate,
    /// Generation handed to the most recently issued refresh.
    issued: AtomicU64,
    /// Generation of the most recent refresh that reached the panel.
    rendered: Mutex<u64>,
}

impl std::fmt::Debug for RelayPanelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayPanelClient")
            .field("elements", &self.elements)
            .field("gate", &self.gate)
            .field("issued", &self.issued.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl RelayPanelClient {
    /// Create a controller over `api` driving `elements`.
    #[must_use]
    pub fn new(api: Arc<dyn RelayApi>, elements: PanelElements) -> Self {
        let gate = TokenGate::new(elements.token.clone());
        Self {
            api,
            elements,
            gate,
            issued: AtomicU64::new(0),
            rendered: Mutex::new(0),
        }
    }

    /// Token gate used for every request.
    #[must_use]
    pub fn gate(&self) -> &TokenGate {
        &self.gate
    }

    /// Pins of the cards this controller drives.
    #[must_use]
    pub fn pins(&self) -> Vec<Pin> {
        self.elements.cards.pins()
    }

    /// Re-read relay state from the backend and render it.
    pub async fn refresh(&self) -> RefreshOutcome {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let url = self.gate.authorize(&relays_path());
        let result = self.api.fetch_state(&url).await;

        let mut rendered = self.rendered.lock().await;
        if *rendered > generation {
            tracing::debug!(generation, latest = *rendered, "Discarding superseded refresh");
            return RefreshOutcome::Superseded;
        }

        match result {
            Ok(snapshot) => {
                *rendered = generation;
                self.apply(&snapshot);
                RefreshOutcome::Applied(snapshot)
            }
            Err(error) => {
                self.report_fetch_failure(&error);
                RefreshOutcome::Failed(error.to_string())
            }
        }
    }

    /// Send `action` for `pin`, then refresh on success.
    pub async fn dispatch(&self, pin: Pin, action: Action) -> DispatchOutcome {
        let url = self.gate.authorize(&action_path(pin, action));
        tracing::info!(pin, action = %action, "Dispatching relay command");

        match self.api.send_action(&url).await {
            Ok(()) => DispatchOutcome::Confirmed(self.refresh().await),
            Err(error) => {
                let message = error.user_message();
                match &error {
                    ActionError::Rejected { status, .. } => {
                        tracing::warn!(pin, action = %action, status = %status, "Relay command rejected");
                        self.elements.notifier.alert(&message);
                        DispatchOutcome::Rejected {
                            status: status.as_u16(),
                            message,
                        }
                    }
                    ActionError::Transport(_) => {
                        tracing::error!(pin, action = %action, error = %error, "Relay command failed");
                        self.elements.notifier.alert(&message);
                        DispatchOutcome::Unreachable { message }
                    }
                }
            }
        }
    }

    fn apply(&self, snapshot: &StateSnapshot) {
        self.show_status(self.gate.status());
        for pin in self.elements.cards.pins() {
            self.elements
                .cards
                .render(pin, RelayState::from(snapshot.is_on(pin)));
        }
    }

    fn report_fetch_failure(&self, error: &FetchError) {
        self.show_status(TokenStatus::ConnectionError);
        tracing::error!(error = %error, "Relay state refresh failed");
    }

    fn show_status(&self, status: TokenStatus) {
        if let Some(indicator) = &self.elements.status {
            indicator.show(status);
        }
    }
}
