//! STOMP Error Types
//!
//! Error handling for frame parsing and transport operations

use thiserror::Error;

/// Frame parse failures
///
/// The receive path drops these without replying to the peer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame has no command line")]
    MissingCommand,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Malformed header line: {0}")]
    MalformedHeader(String),
}

/// Transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Transport not connected")]
    NotConnected,

    #[error("Frame is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for frame parsing
pub type FrameResult<T> = Result<T, FrameError>;

/// Result type alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;
