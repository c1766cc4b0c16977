use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for LinkProbe
///
/// Every section and key is optional; missing values fall back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub buffer: BufferConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Response size limits and timers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum bytes accepted for the robots.txt probe
    #[serde(rename = "robots-max-bytes")]
    pub robots_max_bytes: usize,

    /// Maximum bytes accepted for a page
    #[serde(rename = "page-max-bytes")]
    pub page_max_bytes: usize,

    /// Total budget for a connect or a whole read (milliseconds)
    #[serde(rename = "connection-timeout-ms")]
    pub connection_timeout_ms: u64,

    /// Longest single wait for the socket to become readable (milliseconds)
    #[serde(rename = "read-wait-timeout-ms")]
    pub read_wait_timeout_ms: u64,
}

impl FetchConfig {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn read_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.read_wait_timeout_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            robots_max_bytes: 16 * 1024,
            page_max_bytes: 2 * 1024 * 1024,
            connection_timeout_ms: 10_000,
            read_wait_timeout_ms: 10_000,
        }
    }
}

/// Receive buffer sizing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Size of a freshly allocated buffer
    #[serde(rename = "initial-size")]
    pub initial_size: usize,

    /// Free space below which the buffer doubles
    #[serde(rename = "grow-threshold")]
    pub grow_threshold: usize,

    /// Capacity above which the buffer is reallocated between URLs
    #[serde(rename = "reset-threshold")]
    pub reset_threshold: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_size: 8 * 1024,
            grow_threshold: 1024,
            reset_threshold: 32 * 1024,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// Formats the `User-agent` header value: `Name/Version`
    pub fn agent_string(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "LinkProbe".to_string(),
            crawler_version: "1.2".to_string(),
        }
    }
}
