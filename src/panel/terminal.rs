//! Terminal rendering of the relay panel.
//!
//! Cards and status changes are printed as colored, timestamped lines on
//! stdout; alerts go to stderr.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use owo_colors::OwoColorize;

use crate::client::{Pin, TokenStatus};

use super::controller::RefreshOutcome;
use super::view::{CardSurface, Notifier, RelayState, StatusIndicator};

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Plain text of a card line.
#[must_use]
pub fn format_card(pin: Pin, state: RelayState) -> String {
    format!("relay {pin:>3} {}", state.label())
}

/// Panel printed to the terminal.
#[derive(Debug)]
pub struct TerminalPanel {
    pins: Vec<Pin>,
    /// Last state printed per pin, so unchanged cards stay quiet.
    shown: Mutex<BTreeMap<Pin, RelayState>>,
}

impl TerminalPanel {
    /// Create a panel with one card per pin.
    #[must_use]
    pub fn new(pins: Vec<Pin>) -> Self {
        Self {
            pins,
            shown: Mutex::new(BTreeMap::new()),
        }
    }

    /// Print every card with its last known state.
    pub fn print_summary(&self) {
        let shown = self.shown.lock().unwrap_or_else(PoisonError::into_inner);
        for pin in &self.pins {
            match shown.get(pin) {
                Some(state) => print_card(*pin, *state),
                None => println!("{} relay {pin:>3} {}", "[RELAY]".dimmed(), "?".dimmed()),
            }
        }
        let _ = io::stdout().flush();
    }

    /// Print the full card list after a one-shot command, unless the refresh
    /// already printed every card. Returns whether the list was printed.
    pub fn print_outcome(&self, outcome: &RefreshOutcome) -> bool {
        if outcome.is_applied() {
            return false;
        }
        self.print_summary();
        true
    }

    /// Print the interactive command help.
    pub fn print_help() {
        println!(
            "{} on <pin> | off <pin> | toggle <pin> | token [value] | refresh | list | quit",
            "[HELP]".blue().bold()
        );
        let _ = io::stdout().flush();
    }
}

fn print_card(pin: Pin, state: RelayState) {
    let line = format_card(pin, state);
    match state {
        RelayState::On => println!("{} {}", "[RELAY]".green().bold(), line.green()),
        RelayState::Off => println!("{} {}", "[RELAY]".red().bold(), line.red()),
    }
}

impl CardSurface for TerminalPanel {
    fn pins(&self) -> Vec<Pin> {
        self.pins.clone()
    }

    fn render(&self, pin: Pin, state: RelayState) {
        let previous = self
            .shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pin, state);
        if previous != Some(state) {
            print!("{} ", timestamp().dimmed());
            print_card(pin, state);
            let _ = io::stdout().flush();
        }
    }
}

impl StatusIndicator for TerminalPanel {
    fn show(&self, status: TokenStatus) {
        let tag = "[TOKEN]";
        match status {
            TokenStatus::Present => println!(
                "{} {} {}",
                timestamp().dimmed(),
                tag.green().bold(),
                status.text()
            ),
            TokenStatus::Missing => println!(
                "{} {} {}",
                timestamp().dimmed(),
                tag.yellow().bold(),
                status.text()
            ),
            TokenStatus::ConnectionError => println!(
                "{} {} {}",
                timestamp().dimmed(),
                tag.red().bold(),
                status.text().red()
            ),
        }
        let _ = io::stdout().flush();
    }
}

impl Notifier for TerminalPanel {
    fn alert(&self, message: &str) {
        eprintln!("{} {}", "[ALERT]".red().bold(), message.red());
        let _ = io::stderr().flush();
    }
}
