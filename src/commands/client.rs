//! Interactive Client
//!
//! Reads command lines, logs in over a transport and drives one
//! `SessionEngine` per login. The receive task runs alongside the command
//! loop until the session terminates or the connection drops.

use log::{debug, error, info, warn};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::config::ClientConfig;
use crate::games::{AggregateError, EventsFile, LoaderError};
use crate::session::{SessionEngine, SessionStatus};
use crate::storage::{Storage, StorageError};
use crate::stomp::frame;
use crate::stomp::transport::{self, Transport, TransportConfig};
use crate::stomp::{TcpTransport, TransportError};

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Events file error: {0}")]
    Loader(#[from] LoaderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Summary error: {0}")]
    Summary(#[from] AggregateError),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Command-line client
pub struct Client {
    config: ClientConfig,
    storage: Arc<dyn Storage>,
}

impl Client {
    pub fn new(config: ClientConfig, storage: Arc<dyn Storage>) -> Self {
        Self { config, storage }
    }

    /// Process command lines until input ends
    pub async fn run<R>(&self, input: R) -> Result<(), ClientError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            let words: Vec<&str> = line.split_whitespace().collect();
            match words.as_slice() {
                [] => {}
                ["login", address, username, password] => {
                    match self.login(address, username, password).await {
                        Ok((transport, engine)) => {
                            self.run_session(transport, engine, &mut lines).await;
                        }
                        Err(e) => println!("Could not connect: {}", e),
                    }
                }
                ["login", ..] => println!("Usage: login {{host}}:{{port}} {{username}} {{password}}"),
                _ => println!("Please login first"),
            }
        }

        Ok(())
    }

    /// Connect and send the CONNECT frame
    async fn login(
        &self,
        address: &str,
        username: &str,
        password: &str,
    ) -> Result<(Arc<dyn Transport>, Arc<SessionEngine>), ClientError> {
        let config = TransportConfig::from_address(address)
            .ok_or_else(|| ClientError::InvalidAddress(address.to_string()))?;

        let transport: Arc<dyn Transport> = Arc::new(TcpTransport::connect(&config).await?);
        let connect = frame::connect(
            &self.config.accept_version,
            self.config.connect_host(config.host()),
            username,
            password,
        );
        transport::send(transport.as_ref(), &connect).await?;

        info!("Logging in as {} via {}", username, transport.transport_type());
        Ok((transport, Arc::new(SessionEngine::new(username))))
    }

    /// Command loop for one logged-in session
    async fn run_session<R>(
        &self,
        transport: Arc<dyn Transport>,
        engine: Arc<SessionEngine>,
        lines: &mut Lines<R>,
    ) where
        R: AsyncBufRead + Unpin,
    {
        let mut receiver = tokio::spawn(receive_loop(transport.clone(), engine.clone()));
        let mut receiver_done = false;
        let mut status = engine.watch_status();

        while !engine.is_terminated() {
            // after DISCONNECT only the logout receipt or a hang-up ends the session
            let reading = engine.status() == SessionStatus::Active;
            tokio::select! {
                line = lines.next_line(), if reading => match line {
                    Ok(Some(line)) => self.dispatch(&line, transport.as_ref(), &engine).await,
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read input: {}", e);
                        break;
                    }
                },
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = &mut receiver => {
                    receiver_done = true;
                    break;
                }
            }
        }

        if !receiver_done {
            receiver.abort();
        }
        if let Err(e) = transport.close().await {
            warn!("Error closing connection: {}", e);
        }
    }

    /// Handle one command line inside a session
    async fn dispatch(&self, line: &str, transport: &dyn Transport, engine: &SessionEngine) {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["login", ..] => {
                println!("The client is already logged in, log out before trying again")
            }
            ["report", file] => match self.report(Path::new(file), transport, engine).await {
                Ok(count) => println!("Reported {} events from {}", count, file),
                Err(e) => println!("Error: {}", e),
            },
            ["report", ..] => println!("Usage: report {{file}}"),
            ["summary", game, user, file] => match self.summary(game, user, Path::new(file), engine) {
                Ok(()) => println!("Summary report saved to {}", file),
                Err(e) => println!("Error: {}", e),
            },
            ["summary", ..] => println!("Usage: summary {{game_name}} {{user}} {{file}}"),
            _ => {
                let Some(frame) = engine.handle_command(line) else {
                    debug!("No frame for command: {}", line);
                    return;
                };
                if let Err(e) = transport::send(transport, &frame).await {
                    error!("Failed to send {} frame: {}", frame.command, e);
                }
            }
        }
    }

    async fn report(
        &self,
        path: &Path,
        transport: &dyn Transport,
        engine: &SessionEngine,
    ) -> Result<usize, ClientError> {
        let events = EventsFile::load(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let frames = engine.report(&events, &file_name);
        for frame in &frames {
            transport::send(transport, frame).await?;
        }
        Ok(frames.len())
    }

    fn summary(&self, game: &str, user: &str, path: &Path, engine: &SessionEngine) -> Result<(), ClientError> {
        let text = engine.summarize(game, user)?;
        self.storage.write(path, &text)?;
        Ok(())
    }
}

/// Feed inbound frames to the engine until the session ends
async fn receive_loop(transport: Arc<dyn Transport>, engine: Arc<SessionEngine>) {
    loop {
        match transport.receive_frame().await {
            Ok(Some(text)) => {
                debug!("<<< {}", text);
                if let Some(event) = engine.handle_inbound(&text) {
                    println!("{}", event.display_text());
                    if event.is_terminal() {
                        break;
                    }
                }
            }
            Ok(None) => {
                println!("Disconnected from server.");
                break;
            }
            Err(e) => {
                error!("Receive failed: {}", e);
                break;
            }
        }
    }
}
