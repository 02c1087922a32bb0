//! Relay client error types.

use reqwest::StatusCode;

/// Failure while refreshing relay state.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("State request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("State request returned HTTP {0}")]
    Status(StatusCode),

    /// The body was not a valid state snapshot.
    #[error("Failed to decode state: {0}")]
    Decode(String),
}

/// Failure while sending a relay command.
#[derive(thiserror::Error, Debug)]
pub enum ActionError {
    /// The request never produced a response.
    #[error("Command request failed: {0}")]
    Transport(String),

    /// The backend refused the command; `body` is its error text.
    #[error("Command rejected with HTTP {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

impl ActionError {
    /// Message shown to the user, prefixed with `Error: `.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(message) => format!("Error: {message}"),
            Self::Rejected { body, .. } => format!("Error: {body}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_status_display() {
        let error = FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            error.to_string(),
            "State request returned HTTP 500 Internal Server Error"
        );
    }

    #[test]
    fn test_rejected_user_message_is_body_verbatim() {
        let error = ActionError::Rejected {
            status: StatusCode::BAD_REQUEST,
            body: "relay busy".to_string(),
        };
        assert_eq!(error.user_message(), "Error: relay busy");
        assert!(error.to_string().contains("HTTP 400"));
    }

    #[test]
    fn test_transport_user_message() {
        let error = ActionError::Transport("connection refused".to_string());
        assert_eq!(error.user_message(), "Error: connection refused");
    }
}
