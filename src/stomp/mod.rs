//! STOMP Protocol Module
//!
//! Wire-level pieces of the client:
//! - Frame codec (command, headers, body)
//! - Transport abstraction and the TCP implementation
//! - Frame and transport errors

pub mod error;
pub mod frame;
pub mod tcp;
pub mod transport;

pub use error::{FrameError, FrameResult, TransportError, TransportResult};
pub use frame::{Command, Frame};
pub use tcp::TcpTransport;
pub use transport::{Transport, TransportConfig};
