//! Session Events
//!
//! User-visible outcomes of inbound frames.

use serde::{Deserialize, Serialize};

/// Events surfaced to the caller after an inbound frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    /// Server accepted the login
    Connected {
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },

    /// A join/exit receipt came back
    ReceiptConfirmed { message: String },

    /// A game event was recorded from a MESSAGE frame
    EventReceived {
        game: String,
        user: String,
        event_name: String,
    },

    /// Logout receipt arrived; the session is over
    LoggedOut,

    /// Server sent an ERROR frame; the session is over
    ServerError {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl SessionEvent {
    /// Whether the session ends after this event
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::LoggedOut | Self::ServerError { .. })
    }

    /// Text shown to the user
    pub fn display_text(&self) -> String {
        match self {
            Self::Connected { .. } => "Login successful".to_string(),
            Self::ReceiptConfirmed { message } => message.clone(),
            Self::EventReceived {
                game,
                user,
                event_name,
            } => format!("Received '{}' from {} on {}", event_name, user, game),
            Self::LoggedOut => "Logout successful".to_string(),
            Self::ServerError { message, detail } => match detail {
                Some(detail) => format!("Error: {}\n{}", message, detail),
                None => format!("Error: {}", message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = SessionEvent::ReceiptConfirmed {
            message: "Joined channel a_b".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"receiptConfirmed","message":"Joined channel a_b"}"#);
    }

    #[test]
    fn test_terminal_events() {
        assert!(SessionEvent::LoggedOut.is_terminal());
        assert!(SessionEvent::ServerError {
            message: "bad".to_string(),
            detail: None
        }
        .is_terminal());
        assert!(!SessionEvent::Connected { version: None }.is_terminal());
    }

    #[test]
    fn test_display_text() {
        let event = SessionEvent::ServerError {
            message: "Not logged in".to_string(),
            detail: Some("You must log in first".to_string()),
        };
        assert_eq!(event.display_text(), "Error: Not logged in\nYou must log in first");
    }
}
