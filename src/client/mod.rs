//! HTTP side of the relay panel: token handling, wire types and transport.

mod api;
mod error;
mod token;

pub use api::*;
pub use error::{ActionError, FetchError};
pub use token::*;
