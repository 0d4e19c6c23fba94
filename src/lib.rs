//! STOMP game-report client
//!
//! Frame codec, session state machine and game event aggregation for a
//! STOMP 1.2 style client, plus the TCP transport, report storage and the
//! interactive command loop that drive them.

pub mod commands;
pub mod config;
pub mod games;
pub mod session;
pub mod stomp;
pub mod storage;

pub use commands::{Client, ClientError};
pub use config::ClientConfig;
pub use session::{SessionEngine, SessionEvent, SessionStatus};
