//! HTTP/1.1 request serialization

use std::fmt;

/// Request methods issued by the crawler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Used for the robots.txt probe
    Head,
    /// Used for the page fetch
    Get,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "HEAD",
            Self::Get => "GET",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the full request text
///
/// Every request asks the server to close the connection, which is how the
/// response reader detects the end of the response.
///
/// # Example
///
/// ```
/// use linkprobe::crawler::{build_request, Method};
///
/// let request = build_request(Method::Head, "/robots.txt", "example.com", "LinkProbe/1.2");
/// assert!(request.starts_with("HEAD /robots.txt HTTP/1.1\r\n"));
/// assert!(request.ends_with("Connection: close\r\n\r\n"));
/// ```
pub fn build_request(method: Method, target: &str, host: &str, user_agent: &str) -> String {
    format!(
        "{} {} HTTP/1.1\r\nUser-agent: {}\r\nHost: {}\r\nConnection: close\r\n\r\n",
        method, target, user_agent, host
    )
}
