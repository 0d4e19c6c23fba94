//! STOMP Transport Abstraction
//!
//! Byte-level frame delivery. The engine never touches sockets; it hands
//! encoded frames to a `Transport` and receives raw frame text back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::TransportResult;
use super::frame::Frame;

/// Frame terminator appended by the transport
pub const FRAME_TERMINATOR: u8 = b'\0';

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransportConfig {
    #[serde(rename = "tcp")]
    Tcp {
        host: String,
        port: u16,
    },
}

impl TransportConfig {
    /// Parse a `host:port` address as given to the `login` command
    pub fn from_address(address: &str) -> Option<Self> {
        let (host, port) = address.rsplit_once(':')?;
        if host.is_empty() {
            return None;
        }
        let port = port.parse().ok()?;
        Some(Self::Tcp {
            host: host.to_string(),
            port,
        })
    }

    /// Host part of the address
    pub fn host(&self) -> &str {
        match self {
            Self::Tcp { host, .. } => host,
        }
    }
}

/// Transport trait - delivers terminated frames in both directions
///
/// Both methods take `&self` so one transport can be shared between the
/// receive task and the command task.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one frame; the terminator is appended here
    async fn send_frame(&self, frame: &[u8]) -> TransportResult<()>;

    /// Receive the next frame without its terminator; `None` once the peer closed
    async fn receive_frame(&self) -> TransportResult<Option<String>>;

    /// Close the connection
    async fn close(&self) -> TransportResult<()>;

    /// Get transport type name
    fn transport_type(&self) -> &'static str;
}

/// Encode and send a frame
pub async fn send(transport: &dyn Transport, frame: &Frame) -> TransportResult<()> {
    transport.send_frame(frame.encode().as_bytes()).await
}
