//! Relay panel: view capabilities, the controller that drives them, and
//! two renderings (in-memory and terminal).

mod controller;
mod input;
mod memory;
mod session;
mod terminal;
mod view;

pub use controller::{DispatchOutcome, RefreshOutcome, RelayPanelClient};
pub use input::{InputError, PanelCommand};
pub use memory::{CardSnapshot, MemoryPanel};
pub use session::{PanelSession, SessionError, SessionFlow};
pub use terminal::{format_card, TerminalPanel};
pub use view::*;
