//! Control-channel commands and responses.
//!
//! The generic message bus delivers UTF-8 text commands. Two forms are
//! recognized: `win-title <text>` sets the window title, and a lone integer
//! injects a logical key press. Each request carries a [`Completion`] the
//! render thread resolves with a structured response.

use crate::handshake::Completion;
use crate::input::LogicalKey;

/// Structured reply to a control command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlResponse {
    /// Command accepted and executed.
    Ok,
    /// Command rejected.
    BadRequest(String),
}

/// A queued control command awaiting the render thread.
#[derive(Debug)]
pub struct ControlRequest {
    /// Raw command text.
    pub text: String,
    /// Reply slot.
    pub done: Completion<ControlResponse>,
}

/// A recognized control command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    /// Set the window title.
    WinTitle(String),
    /// Inject a logical key press.
    Key(LogicalKey),
    /// Integer that decodes to no known key.
    UnknownKey,
    /// Anything else.
    Unknown,
}

impl Command {
    pub(crate) fn parse(text: &str) -> Command {
        if let Some(title) = text.strip_prefix("win-title ") {
            return Command::WinTitle(title.to_string());
        }
        if let Ok(code) = text.trim().parse::<i64>() {
            return match LogicalKey::from_code(code) {
                Some(key) => Command::Key(key),
                None => Command::UnknownKey,
            };
        }
        Command::Unknown
    }
}

/// Sink for logical keys the render loop does not handle itself, and for
/// the quit request. The embedding pipeline implements this to route keys
/// onto its control bus.
pub trait KeySink: Send {
    /// A translated key with no local handler.
    fn forward_key(&self, key: LogicalKey);

    /// The quit key was pressed.
    fn request_exit(&self);
}

/// A sink that drops keys and ignores exit requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullKeySink;

impl KeySink for NullKeySink {
    fn forward_key(&self, _key: LogicalKey) {}

    fn request_exit(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_win_title() {
        assert_eq!(
            Command::parse("win-title studio feed 1"),
            Command::WinTitle("studio feed 1".to_string())
        );
    }

    #[test]
    fn test_parse_key_code() {
        assert_eq!(Command::parse("100"), Command::Key(LogicalKey::Char('d')));
        assert_eq!(Command::parse(" 102 "), Command::Key(LogicalKey::Char('f')));
    }

    #[test]
    fn test_parse_bad_key_code() {
        assert_eq!(Command::parse("-7"), Command::UnknownKey);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(Command::parse("set-gamma 2.2"), Command::Unknown);
        assert_eq!(Command::parse("win-title"), Command::Unknown);
    }
}
