//! Interactive panel commands typed on stdin.

use crate::client::{Action, Pin};

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    /// Press a card button.
    Press { pin: Pin, action: Action },
    /// Replace the token field contents; `None` clears it.
    SetToken(Option<String>),
    /// Re-read relay state.
    Refresh,
    /// Print every card.
    List,
    Help,
    Quit,
}

/// Error for input that is not a panel command.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Missing pin for {0}")]
    MissingPin(Action),
    #[error("Invalid pin: {0}")]
    InvalidPin(String),
}

impl PanelCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown commands or a missing or invalid pin.
    pub fn parse(line: &str) -> Result<Option<Self>, InputError> {
        let line = line.trim();
        let Some((word, rest)) = split_word(line) else {
            return Ok(None);
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "refresh" | "r" => Self::Refresh,
            "list" | "ls" => Self::List,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            "token" => {
                let value = rest.trim();
                Self::SetToken((!value.is_empty()).then(|| value.to_string()))
            }
            other => {
                let action = other
                    .parse::<Action>()
                    .map_err(|_| InputError::UnknownCommand(word.to_string()))?;
                let pin = rest.trim();
                if pin.is_empty() {
                    return Err(InputError::MissingPin(action));
                }
                let pin = pin
                    .parse::<Pin>()
                    .map_err(|_| InputError::InvalidPin(pin.to_string()))?;
                Self::Press { pin, action }
            }
        };
        Ok(Some(command))
    }
}

fn split_word(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(line.split_once(char::is_whitespace).unwrap_or((line, "")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_press() {
        assert_eq!(
            PanelCommand::parse("toggle 13"),
            Ok(Some(PanelCommand::Press {
                pin: 13,
                action: Action::Toggle
            }))
        );
        assert_eq!(
            PanelCommand::parse("  ON   17 "),
            Ok(Some(PanelCommand::Press {
                pin: 17,
                action: Action::On
            }))
        );
    }

    #[test]
    fn test_parse_press_errors() {
        assert_eq!(
            PanelCommand::parse("off"),
            Err(InputError::MissingPin(Action::Off))
        );
        assert_eq!(
            PanelCommand::parse("off x"),
            Err(InputError::InvalidPin("x".to_string()))
        );
        assert_eq!(
            PanelCommand::parse("flip 3"),
            Err(InputError::UnknownCommand("flip".to_string()))
        );
    }

    #[test]
    fn test_parse_token() {
        assert_eq!(
            PanelCommand::parse("token abc def"),
            Ok(Some(PanelCommand::SetToken(Some("abc def".to_string()))))
        );
        assert_eq!(
            PanelCommand::parse("token"),
            Ok(Some(PanelCommand::SetToken(None)))
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(PanelCommand::parse(""), Ok(None));
        assert_eq!(PanelCommand::parse("   "), Ok(None));
        assert_eq!(PanelCommand::parse("refresh"), Ok(Some(PanelCommand::Refresh)));
        assert_eq!(PanelCommand::parse("ls"), Ok(Some(PanelCommand::List)));
        assert_eq!(PanelCommand::parse("?"), Ok(Some(PanelCommand::Help)));
        assert_eq!(PanelCommand::parse("quit"), Ok(Some(PanelCommand::Quit)));
    }
}
