//! Session Engine
//!
//! Composition root for one logged-in session. Routes user commands to the
//! session state and inbound frames to the aggregator or the receipt table.
//!
//! The receive task and the command task share one engine; every operation
//! runs under a single mutex and never holds it across an await point.

use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio::sync::watch;

use super::events::SessionEvent;
use super::state::{SessionState, SessionStatus};
use crate::games::{AggregateResult, EventAggregator, EventsFile};
use crate::stomp::frame::{self, Command, Frame};

struct EngineInner {
    state: SessionState,
    aggregator: EventAggregator,
    status: SessionStatus,
}

/// Synchronized facade over session state and event aggregation
pub struct SessionEngine {
    /// Logged-in user
    username: String,
    /// All mutable session data
    inner: Mutex<EngineInner>,
    /// Status broadcaster so the command loop wakes on termination
    status_tx: watch::Sender<SessionStatus>,
}

impl SessionEngine {
    /// Create an engine for a logged-in user
    pub fn new(username: impl Into<String>) -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::Active);
        Self {
            username: username.into(),
            inner: Mutex::new(EngineInner {
                state: SessionState::new(),
                aggregator: EventAggregator::new(),
                status: SessionStatus::Active,
            }),
            status_tx,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.lock().status
    }

    pub fn is_terminated(&self) -> bool {
        self.status() == SessionStatus::Terminated
    }

    /// Subscribe to status changes
    pub fn watch_status(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    fn set_status(&self, inner: &mut EngineInner, status: SessionStatus) {
        if inner.status != status {
            info!("Session {}: {} -> {}", self.username, inner.status, status);
            inner.status = status;
            self.status_tx.send_replace(status);
        }
    }

    /// Turn a user command line into an outbound frame
    ///
    /// Handles `join`, `exit`, `add` and `logout`; anything else, and every
    /// command after the session terminated, yields `None`.
    pub fn handle_command(&self, line: &str) -> Option<Frame> {
        let mut inner = self.inner.lock();
        if inner.status == SessionStatus::Terminated {
            debug!("Session terminated, ignoring command: {}", line);
            return None;
        }

        let (command, rest) = split_word(line);
        match command {
            "join" => inner.state.join(split_word(rest).0),
            "exit" => inner.state.exit(split_word(rest).0),
            "add" => {
                let (game, text) = split_word(rest);
                if game.is_empty() {
                    return None;
                }
                Some(frame::send(&format!("/{}", game), None, text))
            }
            "logout" => {
                let frame = inner.state.logout();
                self.set_status(&mut inner, SessionStatus::LoggingOut);
                Some(frame)
            }
            _ => None,
        }
    }

    /// Build SEND frames for every event in an events file
    ///
    /// Each event is also recorded locally, since the server does not echo a
    /// session's own SEND frames back to it.
    pub fn report(&self, file: &EventsFile, file_name: &str) -> Vec<Frame> {
        let mut inner = self.inner.lock();
        if inner.status == SessionStatus::Terminated {
            return Vec::new();
        }

        let mut frames = Vec::with_capacity(file.events.len());
        for event in &file.events {
            let destination = format!("/{}", event.game_key());
            frames.push(frame::send(&destination, Some(file_name), event.to_body(&self.username)));
            inner.aggregator.ingest_sent(event.clone(), &self.username);
        }
        info!("Reporting {} events from {}", frames.len(), file_name);
        frames
    }

    /// Render the summary for a game as seen by `user`
    pub fn summarize(&self, game: &str, user: &str) -> AggregateResult<String> {
        self.inner.lock().aggregator.summarize(game, user)
    }

    /// Decode and handle raw inbound frame text; malformed frames are dropped
    pub fn handle_inbound(&self, text: &str) -> Option<SessionEvent> {
        match Frame::decode(text) {
            Ok(frame) => self.handle_inbound_frame(&frame),
            Err(e) => {
                debug!("Dropping malformed frame: {}", e);
                None
            }
        }
    }

    /// Route a decoded inbound frame
    pub fn handle_inbound_frame(&self, frame: &Frame) -> Option<SessionEvent> {
        let mut inner = self.inner.lock();

        match frame.command {
            Command::Connected => Some(SessionEvent::Connected {
                version: frame.header("version").map(str::to_string),
            }),
            Command::Message => inner
                .aggregator
                .ingest(frame)
                .map(|(game, user, event_name)| SessionEvent::EventReceived {
                    game,
                    user,
                    event_name,
                }),
            Command::Receipt => {
                let receipt_id = frame.header("receipt-id")?.parse::<u64>().ok()?;
                if inner.state.is_logout_receipt(receipt_id) {
                    inner.state.on_receipt(receipt_id);
                    self.set_status(&mut inner, SessionStatus::Terminated);
                    return Some(SessionEvent::LoggedOut);
                }

                let message = inner.state.on_receipt(receipt_id);
                if message.is_empty() {
                    None
                } else {
                    Some(SessionEvent::ReceiptConfirmed { message })
                }
            }
            Command::Error => {
                let message = frame.header("message").unwrap_or_default().to_string();
                let detail = Some(frame.body.trim_end().to_string()).filter(|d| !d.is_empty());
                warn!("Server error: {}", message);
                self.set_status(&mut inner, SessionStatus::Terminated);
                Some(SessionEvent::ServerError { message, detail })
            }
            other => {
                debug!("Ignoring inbound {} frame", other);
                None
            }
        }
    }
}

/// Split off the first whitespace-delimited word
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(at) => (&text[..at], text[at..].trim_start()),
        None => (text, ""),
    }
}
