use crate::config::types::{BufferConfig, Config, FetchConfig, UserAgentConfig};
use crate::ConfigError;

/// Smallest accepted worker count
pub const MIN_WORKERS: usize = 1;

/// Largest accepted worker count; the crawler runs a single sequential worker
pub const MAX_WORKERS: usize = 1;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_buffer_config(&config.buffer)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Parses the worker count argument
///
/// Parsing and the range check are separate steps: the text must be a plain
/// base-10 integer, and the value must lie in `MIN_WORKERS..=MAX_WORKERS`.
pub fn parse_worker_count(raw: &str) -> Result<usize, ConfigError> {
    let count: usize = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidWorkerCount(raw.to_string()))?;

    if !(MIN_WORKERS..=MAX_WORKERS).contains(&count) {
        return Err(ConfigError::InvalidWorkerCount(raw.to_string()));
    }

    Ok(count)
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.robots_max_bytes == 0 || config.page_max_bytes == 0 {
        return Err(ConfigError::Validation(
            "robots-max-bytes and page-max-bytes must be greater than 0".to_string(),
        ));
    }

    if config.robots_max_bytes > config.page_max_bytes {
        return Err(ConfigError::Validation(format!(
            "robots-max-bytes ({}) must not exceed page-max-bytes ({})",
            config.robots_max_bytes, config.page_max_bytes
        )));
    }

    if config.connection_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "connection-timeout-ms must be greater than 0".to_string(),
        ));
    }

    if config.read_wait_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "read-wait-timeout-ms must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_buffer_config(config: &BufferConfig) -> Result<(), ConfigError> {
    if config.grow_threshold == 0 {
        return Err(ConfigError::Validation(
            "grow-threshold must be greater than 0".to_string(),
        ));
    }

    if config.grow_threshold >= config.initial_size {
        return Err(ConfigError::Validation(format!(
            "grow-threshold ({}) must be smaller than initial-size ({})",
            config.grow_threshold, config.initial_size
        )));
    }

    if config.initial_size > config.reset_threshold {
        return Err(ConfigError::Validation(format!(
            "initial-size ({}) must not exceed reset-threshold ({})",
            config.initial_size, config.reset_threshold
        )));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() || config.crawler_version.contains(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "crawler-version must be a non-empty token, got '{}'",
            config.crawler_version
        )));
    }

    Ok(())
}
