//! Session Management Module
//!
//! One logged-in STOMP session:
//! - Subscription table and receipt correlation
//! - Logout handshake and session status
//! - Engine facade shared by the receive and command tasks

pub mod engine;
pub mod events;
pub mod state;

pub use engine::SessionEngine;
pub use events::SessionEvent;
pub use state::{PendingReceipt, SessionState, SessionStatus};
