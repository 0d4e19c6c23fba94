//! STOMP Frame Codec
//!
//! Builds and parses the text wire format:
//! command line, `key:value` headers, a blank line, then the body.
//! The NUL terminator is owned by the transport and never appears here.

use std::fmt;
use std::str::FromStr;

use super::error::{FrameError, FrameResult};

/// Frame command tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Connect,
    Subscribe,
    Unsubscribe,
    Send,
    Disconnect,
    Message,
    Receipt,
    Error,
    Connected,
}

impl Command {
    /// Wire token for this command
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Subscribe => "SUBSCRIBE",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::Send => "SEND",
            Self::Disconnect => "DISCONNECT",
            Self::Message => "MESSAGE",
            Self::Receipt => "RECEIPT",
            Self::Error => "ERROR",
            Self::Connected => "CONNECTED",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONNECT" => Ok(Self::Connect),
            "SUBSCRIBE" => Ok(Self::Subscribe),
            "UNSUBSCRIBE" => Ok(Self::Unsubscribe),
            "SEND" => Ok(Self::Send),
            "DISCONNECT" => Ok(Self::Disconnect),
            "MESSAGE" => Ok(Self::Message),
            "RECEIPT" => Ok(Self::Receipt),
            "ERROR" => Ok(Self::Error),
            "CONNECTED" => Ok(Self::Connected),
            other => Err(FrameError::UnknownCommand(other.to_string())),
        }
    }
}

/// One protocol message unit
///
/// Header keys are unique: setting a key that already exists overwrites the
/// value in place, which gives the last-write-wins lookup the protocol needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    /// Create an empty frame for a command
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Builder-style header setter
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(key, value);
        self
    }

    /// Builder-style body setter
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a header, overwriting an existing value for the same key
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.headers.push((key, value)),
        }
    }

    /// Case-sensitive header lookup
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Serialize to wire text (without the NUL terminator)
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(64 + self.body.len());
        out.push_str(self.command.as_str());
        out.push('\n');
        for (key, value) in &self.headers {
            out.push_str(key);
            out.push(':');
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out
    }

    /// Parse wire text into a frame
    pub fn decode(text: &str) -> FrameResult<Self> {
        let (command_line, mut rest) = text.split_once('\n').unwrap_or((text, ""));
        let token = command_line.trim();
        if token.is_empty() {
            return Err(FrameError::MissingCommand);
        }

        let mut frame = Frame::new(token.parse()?);

        while !rest.is_empty() {
            let (line, tail) = rest.split_once('\n').unwrap_or((rest, ""));
            rest = tail;
            let line = line.strip_suffix('\r').unwrap_or(line);

            if line.is_empty() {
                frame.body = rest.to_string();
                return Ok(frame);
            }

            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| FrameError::MalformedHeader(line.to_string()))?;
            frame.set_header(key.trim(), value.trim());
        }

        Ok(frame)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// CONNECT frame for a login attempt
pub fn connect(accept_version: &str, host: &str, login: &str, passcode: &str) -> Frame {
    Frame::new(Command::Connect)
        .with_header("accept-version", accept_version)
        .with_header("host", host)
        .with_header("login", login)
        .with_header("passcode", passcode)
}

pub fn subscribe(destination: &str, id: u64, receipt: u64) -> Frame {
    Frame::new(Command::Subscribe)
        .with_header("destination", destination)
        .with_header("id", id.to_string())
        .with_header("receipt", receipt.to_string())
}

pub fn unsubscribe(id: u64, receipt: u64) -> Frame {
    Frame::new(Command::Unsubscribe)
        .with_header("id", id.to_string())
        .with_header("receipt", receipt.to_string())
}

/// SEND frame; `file` names the events file a report came from
pub fn send(destination: &str, file: Option<&str>, body: impl Into<String>) -> Frame {
    let mut frame = Frame::new(Command::Send).with_header("destination", destination);
    if let Some(file) = file {
        frame.set_header("file", file);
    }
    frame.with_body(body)
}

pub fn disconnect(receipt: u64) -> Frame {
    Frame::new(Command::Disconnect).with_header("receipt", receipt.to_string())
}
