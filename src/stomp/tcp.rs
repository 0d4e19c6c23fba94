//! TCP Transport
//!
//! NUL-terminated frames over a tokio TCP stream. Reader and writer halves
//! are locked independently so receiving never blocks sending.

use async_trait::async_trait;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use super::error::{TransportError, TransportResult};
use super::transport::{Transport, TransportConfig, FRAME_TERMINATOR};

/// TCP transport implementation
pub struct TcpTransport {
    /// Buffered read half
    reader: Mutex<BufReader<OwnedReadHalf>>,
    /// Write half
    writer: Mutex<OwnedWriteHalf>,
    /// Connection status
    connected: AtomicBool,
    /// Remote address, for logging
    peer: String,
}

impl TcpTransport {
    /// Connect using a transport configuration
    pub async fn connect(config: &TransportConfig) -> TransportResult<Self> {
        match config {
            TransportConfig::Tcp { host, port } => {
                let stream = TcpStream::connect((host.as_str(), *port))
                    .await
                    .map_err(|e| TransportError::ConnectionFailed(format!("{}:{}: {}", host, port, e)))?;
                Ok(Self::from_stream(stream))
            }
        }
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream) -> Self {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let (read_half, write_half) = stream.into_split();
        info!("Connected to {}", peer);

        Self {
            reader: Mutex::new(BufReader::new(read_half)),
            writer: Mutex::new(write_half),
            connected: AtomicBool::new(true),
            peer,
        }
    }

    /// Check if the transport is connected
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send_frame(&self, frame: &[u8]) -> TransportResult<()> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        let mut bytes = Vec::with_capacity(frame.len() + 1);
        bytes.extend_from_slice(frame);
        bytes.push(FRAME_TERMINATOR);

        let mut writer = self.writer.lock().await;
        writer.write_all(&bytes).await?;
        writer.flush().await?;
        debug!("Sent {} byte frame to {}", frame.len(), self.peer);
        Ok(())
    }

    async fn receive_frame(&self) -> TransportResult<Option<String>> {
        let mut reader = self.reader.lock().await;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader.read_until(FRAME_TERMINATOR, &mut buf).await?;
            if read == 0 {
                self.connected.store(false, Ordering::SeqCst);
                return Ok(None);
            }

            if buf.last() == Some(&FRAME_TERMINATOR) {
                buf.pop();
            }

            // heart-beat EOLs between frames
            let start = buf
                .iter()
                .position(|b| *b != b'\n' && *b != b'\r')
                .unwrap_or(buf.len());
            if start == buf.len() {
                continue;
            }

            let text = String::from_utf8(buf.split_off(start))?;
            return Ok(Some(text));
        }
    }

    async fn close(&self) -> TransportResult<()> {
        if self.connected.swap(false, Ordering::SeqCst) {
            let mut writer = self.writer.lock().await;
            writer.shutdown().await?;
            info!("Closed connection to {}", self.peer);
        }
        Ok(())
    }

    fn transport_type(&self) -> &'static str {
        "tcp"
    }
}
