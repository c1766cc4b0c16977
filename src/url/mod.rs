//! URL handling module for LinkProbe
//!
//! This module decomposes raw input lines of the form
//! `http://<host>[:<port>][/<path>][?<query>][#<fragment>]` into the pieces
//! the fetch pipeline needs. Only the `http` scheme is supported and the
//! fragment is never sent.

mod parser;

pub use parser::{parse_port, parse_url};

/// Port used when the URL does not name one
pub const DEFAULT_PORT: u16 = 80;

/// Lower port bound; a port must be strictly greater than this
pub const MIN_PORT: u32 = 1;

/// Upper port bound (inclusive)
pub const MAX_PORT: u32 = 65535;

/// The only supported scheme
pub const HTTP_SCHEME: &str = "http";

/// A validated, immutable URL decomposition
///
/// A `ParsedUrl` only exists for input that parsed completely: the host is
/// non-empty and the port satisfies `MIN_PORT < port <= MAX_PORT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    scheme: String,
    host: String,
    port: u16,
    path: String,
    query: String,
    request: String,
}

impl ParsedUrl {
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path including the leading `/`, defaults to `/`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query including the leading `?`, empty when absent
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Request target sent on the wire (`path + query`)
    pub fn request(&self) -> &str {
        &self.request
    }

    /// Base URL handed to link extraction, `scheme://host[:port]`
    ///
    /// The port is only included when it differs from [`DEFAULT_PORT`].
    pub fn base_url(&self) -> String {
        if self.port == DEFAULT_PORT {
            format!("{}://{}", self.scheme, self.host)
        } else {
            format!("{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}
