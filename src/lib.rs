//! LinkProbe: a robots-gated, one-URL-at-a-time page prober
//!
//! This crate fetches web pages over raw TCP/HTTP. Every input URL is
//! deduplicated by host and by resolved IPv4 address, probed for a
//! `/robots.txt` with a HEAD request, and only fetched with GET when the
//! probe answers 4xx. Downloaded pages are handed to a link extractor.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use std::fmt;
use std::net::SocketAddrV4;
use std::time::Duration;
use thiserror::Error;

/// Top-level error for LinkProbe operations
///
/// These are the failures that end a run. Per-URL failures never surface
/// here; they are folded into a [`state::UrlOutcome`] instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{path} could not be opened for reading: {source}")]
    Input {
        path: String,
        source: std::io::Error,
    },

    #[error("Buffer error: {0}")]
    Buffer(#[from] crawler::BufferError),

    #[error("Connection error: {0}")]
    Fetch(#[from] FetchError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("supplied argument for thread count invalid: {0}")]
    InvalidWorkerCount(String),
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("invalid scheme: {0}")]
    InvalidScheme(String),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("invalid host")]
    InvalidHost,
}

/// Errors raised while resolving, connecting, sending or receiving
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("DNS lookup failed for {host}: {source}")]
    Dns {
        host: String,
        source: std::io::Error,
    },

    #[error("no IPv4 address found for {host}")]
    NoAddress { host: String },

    #[error("socket() generated error: {0}")]
    Socket(std::io::Error),

    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: SocketAddrV4,
        source: std::io::Error,
    },

    #[error("connect to {addr} timed out after {elapsed:?}")]
    ConnectTimeout {
        addr: SocketAddrV4,
        elapsed: Duration,
    },

    #[error("send failed: {0}")]
    Send(std::io::Error),

    #[error("recv failed: {0}")]
    Receive(std::io::Error),

    #[error("socket timeout: no data within {waited:?}")]
    SocketTimeout { waited: Duration },

    #[error("connection timeout after {elapsed:?}")]
    ConnectionTimeout { elapsed: Duration },

    #[error("exceeded max size of {limit} bytes")]
    ExceededMaxSize { limit: usize },

    #[error("non-HTTP header")]
    NonHttpResponse,

    #[error("malformed HTTP status line")]
    MalformedStatus,

    #[error("buffer error: {0}")]
    Buffer(#[from] crawler::BufferError),

    #[error("socket is not {expected}")]
    SocketState { expected: &'static str },
}

impl FetchError {
    /// Classifies this error for outcome reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Dns { .. }
            | Self::NoAddress { .. }
            | Self::Socket(_)
            | Self::Connect { .. }
            | Self::Send(_)
            | Self::Receive(_)
            | Self::SocketState { .. } => ErrorKind::Network,
            Self::ConnectTimeout { .. }
            | Self::SocketTimeout { .. }
            | Self::ConnectionTimeout { .. } => ErrorKind::Timeout,
            Self::NonHttpResponse | Self::MalformedStatus => ErrorKind::Protocol,
            Self::ExceededMaxSize { .. } | Self::Buffer(_) => ErrorKind::Resource,
        }
    }
}

/// Failure categories for a single URL
///
/// None of these abort the run; they only end processing of the URL that
/// produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// Malformed URL or unparseable page content
    Parse,
    /// DNS, connect, send or receive failure
    Network,
    /// Connect deadline, readiness wait or total read deadline exceeded
    Timeout,
    /// Missing `HTTP/` signature or unparseable status code
    Protocol,
    /// Buffer growth failure or response size limit
    Resource,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Protocol => "protocol",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias for LinkProbe operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, DynamicBuffer};
pub use state::{Stage, UrlOutcome};
pub use crate::url::{parse_url, ParsedUrl};
