//! Interactive session: turns typed commands into panel work.
//!
//! Commands run concurrently, like clicks on a page, but the session owns
//! every task it starts so closing it waits for in-flight commands and
//! their follow-up refreshes.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::client::TokenInput;

use super::controller::RelayPanelClient;
use super::input::PanelCommand;

/// Error for a command the session cannot carry out.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("This panel has no token field")]
    NoTokenField,
}

/// Whether the session keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
    Continue,
    Quit,
}

/// Interactive driver for one panel.
pub struct PanelSession {
    client: Arc<RelayPanelClient>,
    token: Option<TokenInput>,
    tasks: JoinSet<()>,
}

impl std::fmt::Debug for PanelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelSession")
            .field("client", &self.client)
            .field("in_flight", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl PanelSession {
    /// Create a session over `client`; `token` is the field edits go to.
    #[must_use]
    pub fn new(client: Arc<RelayPanelClient>, token: Option<TokenInput>) -> Self {
        Self {
            client,
            token,
            tasks: JoinSet::new(),
        }
    }

    /// Number of commands still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Start `command`. `List` and `Help` only concern the rendering and are
    /// left to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoTokenField`] for a token edit on a panel
    /// without a token field.
    pub fn submit(&mut self, command: PanelCommand) -> Result<SessionFlow, SessionError> {
        match command {
            PanelCommand::Press { pin, action } => {
                let client = self.client.clone();
                self.tasks.spawn(async move {
                    client.dispatch(pin, action).await;
                });
            }
            PanelCommand::SetToken(value) => {
                let input = self.token.as_ref().ok_or(SessionError::NoTokenField)?;
                input.set(value.unwrap_or_default());
                self.spawn_refresh();
            }
            PanelCommand::Refresh => self.spawn_refresh(),
            PanelCommand::List | PanelCommand::Help => {}
            PanelCommand::Quit => return Ok(SessionFlow::Quit),
        }
        self.reap();
        Ok(SessionFlow::Continue)
    }

    /// Wait for every started command to complete.
    pub async fn finish(mut self) {
        while let Some(result) = self.tasks.join_next().await {
            log_join_error(result);
        }
    }

    /// Cancel every started command.
    pub async fn abort(mut self) {
        self.tasks.abort_all();
        while self.tasks.join_next().await.is_some() {}
    }

    fn spawn_refresh(&mut self) {
        let client = self.client.clone();
        self.tasks.spawn(async move {
            client.refresh().await;
        });
    }

    /// Drop bookkeeping for commands that already completed.
    fn reap(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            log_join_error(result);
        }
    }
}

fn log_join_error(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            tracing::error!(error = %e, "Panel command panicked");
        }
    }
}
