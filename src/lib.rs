//! Relay Panel - terminal controller for a REST relay-switching backend.

pub mod client;
pub mod config;
pub mod panel;
