//! Session State Management
//!
//! Subscription table, receipt correlation and the logout handshake of a
//! single logged-in session.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::stomp::frame::{self, Frame};

/// Status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Session is accepting commands
    Active,
    /// DISCONNECT sent, waiting for its receipt
    LoggingOut,
    /// Logout confirmed or the server reported an error
    Terminated,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::LoggingOut => write!(f, "logging-out"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// Action a pending receipt confirms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingReceipt {
    Joined(String),
    Exited(String),
    Logout,
}

impl PendingReceipt {
    /// Message shown once the receipt comes back
    pub fn display_message(&self) -> String {
        match self {
            Self::Joined(game) => format!("Joined channel {}", game),
            Self::Exited(game) => format!("Exited channel {}", game),
            Self::Logout => "Logged out".to_string(),
        }
    }
}

/// Subscription and receipt bookkeeping for one session
#[derive(Debug, Default)]
pub struct SessionState {
    /// Next subscription id to hand out
    next_subscription_id: u64,
    /// Next receipt id to hand out
    next_receipt_id: u64,
    /// Active subscriptions (destination -> subscription id)
    subscriptions: HashMap<String, u64>,
    /// Receipts waiting for the server (receipt id -> action)
    pending: HashMap<u64, PendingReceipt>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_subscription(&mut self) -> u64 {
        let id = self.next_subscription_id;
        self.next_subscription_id += 1;
        id
    }

    fn allocate_receipt(&mut self, pending: PendingReceipt) -> u64 {
        let id = self.next_receipt_id;
        self.next_receipt_id += 1;
        self.pending.insert(id, pending);
        id
    }

    /// SUBSCRIBE to `/game`
    pub fn join(&mut self, game: &str) -> Option<Frame> {
        if game.is_empty() {
            return None;
        }

        let destination = format!("/{}", game);
        let id = self.allocate_subscription();
        if let Some(old) = self.subscriptions.insert(destination.clone(), id) {
            debug!("Resubscribing to {} (replacing id {})", destination, old);
        }
        let receipt = self.allocate_receipt(PendingReceipt::Joined(game.to_string()));

        Some(frame::subscribe(&destination, id, receipt))
    }

    /// UNSUBSCRIBE from `/game`; `None` if not subscribed
    pub fn exit(&mut self, game: &str) -> Option<Frame> {
        let destination = format!("/{}", game);
        let Some(id) = self.subscriptions.remove(&destination) else {
            debug!("Not subscribed to {}", destination);
            return None;
        };
        let receipt = self.allocate_receipt(PendingReceipt::Exited(game.to_string()));

        Some(frame::unsubscribe(id, receipt))
    }

    /// DISCONNECT; only the latest logout receipt is tracked
    pub fn logout(&mut self) -> Frame {
        self.pending.retain(|_, p| *p != PendingReceipt::Logout);
        let receipt = self.allocate_receipt(PendingReceipt::Logout);
        frame::disconnect(receipt)
    }

    /// Consume a receipt, returning its message or an empty string if unknown
    pub fn on_receipt(&mut self, receipt_id: u64) -> String {
        match self.pending.remove(&receipt_id) {
            Some(pending) => pending.display_message(),
            None => {
                debug!("Ignoring unknown receipt {}", receipt_id);
                String::new()
            }
        }
    }

    pub fn is_logout_receipt(&self, receipt_id: u64) -> bool {
        matches!(self.pending.get(&receipt_id), Some(PendingReceipt::Logout))
    }

    /// Subscription id for a destination
    pub fn subscription_id(&self, destination: &str) -> Option<u64> {
        self.subscriptions.get(destination).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_header(frame: &Frame, key: &str) -> u64 {
        frame.header(key).unwrap().parse().unwrap()
    }

    #[test]
    fn test_join_frame() {
        let mut state = SessionState::new();
        let frame = state.join("france_italy").unwrap();

        assert_eq!(frame.command, crate::stomp::Command::Subscribe);
        assert_eq!(frame.header("destination"), Some("/france_italy"));
        assert_eq!(frame.header("id"), Some("0"));
        assert_eq!(frame.header("receipt"), Some("0"));
        assert_eq!(state.subscription_id("/france_italy"), Some(0));
        assert_eq!(state.on_receipt(0), "Joined channel france_italy");
    }

    #[test]
    fn test_join_empty_game() {
        let mut state = SessionState::new();
        assert!(state.join("").is_none());
        assert_eq!(state.pending.len(), 0);
    }

    #[test]
    fn test_exit_unknown_is_noop() {
        let mut state = SessionState::new();
        assert!(state.exit("france_italy").is_none());
        assert_eq!(state.pending.len(), 0);
    }

    #[test]
    fn test_exit_after_join() {
        let mut state = SessionState::new();
        state.join("france_italy").unwrap();
        let frame = state.exit("france_italy").unwrap();

        assert_eq!(frame.command, crate::stomp::Command::Unsubscribe);
        assert_eq!(frame.header("id"), Some("0"));
        assert_eq!(frame.header("receipt"), Some("1"));
        assert_eq!(state.subscriptions.len(), 0);
        assert_eq!(state.on_receipt(1), "Exited channel france_italy");
        assert!(state.exit("france_italy").is_none());
    }

    #[test]
    fn test_ids_strictly_increase() {
        let mut state = SessionState::new();
        let mut subscriptions = Vec::new();
        let mut receipts = Vec::new();

        for round in 0..3 {
            let join = state.join("a_b").unwrap();
            subscriptions.push(id_header(&join, "id"));
            receipts.push(id_header(&join, "receipt"));

            let exit = state.exit("a_b").unwrap();
            receipts.push(id_header(&exit, "receipt"));

            if round == 1 {
                receipts.push(id_header(&state.logout(), "receipt"));
            }
        }

        assert!(subscriptions.windows(2).all(|w| w[0] < w[1]));
        assert!(receipts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_receipt_consumed_once() {
        let mut state = SessionState::new();
        state.join("a_b").unwrap();
        assert_eq!(state.on_receipt(0), "Joined channel a_b");
        assert_eq!(state.on_receipt(0), "");
        assert_eq!(state.on_receipt(42), "");
    }

    #[test]
    fn test_last_logout_wins() {
        let mut state = SessionState::new();
        let first = id_header(&state.logout(), "receipt");
        let second = id_header(&state.logout(), "receipt");

        assert!(!state.is_logout_receipt(first));
        assert!(state.is_logout_receipt(second));
        // predicate does not consume
        assert!(state.is_logout_receipt(second));
        assert_eq!(state.on_receipt(second), "Logged out");
        assert!(!state.is_logout_receipt(second));
    }
}
