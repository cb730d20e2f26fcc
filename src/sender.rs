//! One-shot TCP sender for order messages.
//!
//! Every call opens its own connection, writes the whole payload once, reads
//! one response chunk and drops the stream.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::str::FromStr;
use std::string::FromUtf8Error;
use std::time::Duration;

use log::{debug, error, info};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::configure::AppConfig;
use crate::message_codec::encode_message;
use crate::models::OrderMessage;

const LOG_TARGET: &str = "sender";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7001;
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// How the response is read off the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    /// A single `read`; anything past the first chunk is dropped.
    #[default]
    Single,
    /// Keep reading until the peer closes or the buffer is full.
    UntilEof,
}

impl FromStr for ReadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(ReadMode::Single),
            "until_eof" => Ok(ReadMode::UntilEof),
            _ => Err(format!("Unknown read mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SenderConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on response bytes kept.
    pub buffer_size: usize,
    pub read_mode: ReadMode,
    /// `None` blocks until the OS gives up.
    pub connect_timeout: Option<Duration>,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl SenderConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        SenderConfig {
            host: host.into(),
            port,
            buffer_size: DEFAULT_BUFFER_SIZE,
            read_mode: ReadMode::Single,
            connect_timeout: None,
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        SenderConfig {
            host: config.host.clone(),
            port: config.port,
            buffer_size: config.buffer_size,
            read_mode: config.read_mode,
            connect_timeout: config.connect_timeout(),
        }
    }

    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// A zero-length buffer would turn every response into an empty string.
    pub fn validate(&self) -> Result<(), String> {
        if self.buffer_size == 0 {
            return Err("buffer_size must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// What was sent and what came back.
#[derive(Debug, Clone, PartialEq)]
pub struct SendReport {
    pub target: String,
    pub payload: String,
    pub response: String,
}

#[derive(Debug)]
pub enum SendError {
    Encode(serde_json::Error),
    Connect { target: String, source: io::Error },
    Transport(io::Error),
    Decode(FromUtf8Error),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "failed to encode message: {}", e),
            Self::Connect { target, source } => {
                write!(f, "failed to connect to {}: {}", target, source)
            }
            Self::Transport(e) => write!(f, "transport failure: {}", e),
            Self::Decode(e) => write!(f, "failed to decode response: {}", e),
        }
    }
}

impl std::error::Error for SendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode(e) => Some(e),
            Self::Connect { source, .. } => Some(source),
            Self::Transport(e) => Some(e),
            Self::Decode(e) => Some(e),
        }
    }
}

enum Progress<'a> {
    Connected(&'a str),
    Sent(&'a str),
}

pub struct MessageSender {
    config: SenderConfig,
}

impl MessageSender {
    pub fn new(config: SenderConfig) -> Self {
        MessageSender { config }
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Send one message and return the first response chunk.
    pub fn send(
        &self,
        message_type: &str,
        message_data: &Map<String, Value>,
    ) -> Result<SendReport, SendError> {
        self.transmit(message_type, message_data, |_| {})
    }

    pub fn send_order(&self, message: &OrderMessage) -> Result<SendReport, SendError> {
        self.send(message.message_type().as_str(), &message.fields())
    }

    /// Send one message and print each step to `out`.
    ///
    /// Failures are printed as `Error: ...` and swallowed. The returned
    /// report is `None` when the send failed.
    pub fn send_and_report<W: Write>(
        &self,
        out: &mut W,
        message_type: &str,
        message_data: &Map<String, Value>,
    ) -> Option<SendReport> {
        let result = self.transmit(message_type, message_data, |progress| {
            let _ = match progress {
                Progress::Connected(target) => writeln!(out, "Connected to {}", target),
                Progress::Sent(payload) => writeln!(out, "Sent: {}", payload),
            };
        });

        match result {
            Ok(report) => {
                let _ = writeln!(out, "Response: {}", report.response);
                Some(report)
            }
            Err(e) => {
                error!(target: LOG_TARGET, "{} to {} failed: {}", message_type, self.config.target(), e);
                let _ = writeln!(out, "Error: {}", e);
                None
            }
        }
    }

    pub fn send_order_and_report<W: Write>(
        &self,
        out: &mut W,
        message: &OrderMessage,
    ) -> Option<SendReport> {
        self.send_and_report(out, message.message_type().as_str(), &message.fields())
    }

    fn transmit<F>(
        &self,
        message_type: &str,
        message_data: &Map<String, Value>,
        mut progress: F,
    ) -> Result<SendReport, SendError>
    where
        F: FnMut(Progress<'_>),
    {
        let target = self.config.target();
        // Dropped on every return path below, which closes the socket.
        let mut stream = self.connect(&target)?;
        info!(target: LOG_TARGET, "Connected to {}", target);
        progress(Progress::Connected(&target));

        let payload = encode_message(message_type, message_data).map_err(SendError::Encode)?;
        stream
            .write_all(payload.as_bytes())
            .map_err(SendError::Transport)?;
        info!(target: LOG_TARGET, "Sent {} ({} bytes)", message_type, payload.len());
        progress(Progress::Sent(&payload));

        let bytes = self.receive(&mut stream)?;
        debug!(target: LOG_TARGET, "Received {} bytes from {}", bytes.len(), target);
        let response = String::from_utf8(bytes).map_err(SendError::Decode)?;

        Ok(SendReport {
            target,
            payload,
            response,
        })
    }

    fn connect(&self, target: &str) -> Result<TcpStream, SendError> {
        let connect_err = |source: io::Error| SendError::Connect {
            target: target.to_string(),
            source,
        };
        let addr = (self.config.host.as_str(), self.config.port);

        let Some(timeout) = self.config.connect_timeout else {
            return TcpStream::connect(addr).map_err(connect_err);
        };

        let mut last_err = None;
        for socket_addr in addr.to_socket_addrs().map_err(connect_err)? {
            match TcpStream::connect_timeout(&socket_addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(connect_err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "no address resolved")
        })))
    }

    fn receive(&self, stream: &mut TcpStream) -> Result<Vec<u8>, SendError> {
        let mut buf = vec![0u8; self.config.buffer_size];
        let filled = match self.config.read_mode {
            ReadMode::Single => stream.read(&mut buf).map_err(SendError::Transport)?,
            ReadMode::UntilEof => {
                let mut filled = 0;
                while filled < buf.len() {
                    match stream.read(&mut buf[filled..]) {
                        Ok(0) => break,
                        Ok(n) => filled += n,
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(SendError::Transport(e)),
                    }
                }
                filled
            }
        };
        buf.truncate(filled);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_local_server() {
        let config = SenderConfig::default();
        assert_eq!(config.target(), "127.0.0.1:7001");
        assert_eq!(config.buffer_size, 1024);
        assert_eq!(config.read_mode, ReadMode::Single);
        assert!(config.connect_timeout.is_none());
    }

    #[test]
    fn test_zero_buffer_size_rejected() {
        let mut config = SenderConfig::default();
        assert!(config.validate().is_ok());

        config.buffer_size = 0;
        assert_eq!(
            config.validate().unwrap_err(),
            "buffer_size must be greater than 0"
        );
    }

    #[test]
    fn test_read_mode_from_str() {
        assert_eq!("single".parse::<ReadMode>(), Ok(ReadMode::Single));
        assert_eq!("until_eof".parse::<ReadMode>(), Ok(ReadMode::UntilEof));
        assert!("loop".parse::<ReadMode>().is_err());
    }

    #[test]
    fn test_connect_error_display_names_target() {
        let err = SendError::Connect {
            target: "127.0.0.1:7001".to_string(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert_eq!(err.to_string(), "failed to connect to 127.0.0.1:7001: refused");
        assert!(std::error::Error::source(&err).is_some());
    }
}
