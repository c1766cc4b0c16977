//! Crawler module for raw HTTP page fetching
//!
//! This module contains the fetch pipeline, including:
//! - URL input loading
//! - DNS resolution and the reusable TCP connection
//! - Request writing and the bounded response reader
//! - Status line verification and link extraction
//! - Overall per-URL coordination

mod buffer;
mod connection;
mod coordinator;
mod input;
mod parser;
mod request;
mod resolver;
mod verify;

pub use buffer::{BufferError, DynamicBuffer};
pub use connection::{Connection, Timeouts};
pub use coordinator::Coordinator;
pub use input::UrlList;
pub use parser::{
    header_block, parse_html, response_body, ExtractError, HtmlLinkExtractor, LinkExtractor,
    HEADER_TERMINATOR,
};
pub use request::{build_request, Method};
pub use resolver::{resolve, Resolution};
pub use verify::{
    find_subslice, status_code, verify_header, HeaderCheck, HTTP_SIGNATURE, PAGE_OK,
    ROBOTS_ABSENT,
};

use crate::config::Config;
use crate::output::RunStatistics;
use crate::CrawlError;

/// Runs a complete crawl over `urls`
///
/// This is the main entry point for a run. It will:
/// 1. Allocate the shared buffer and open the socket
/// 2. Drive every line through the pipeline
/// 3. Close the socket
///
/// # Returns
///
/// * `Ok(RunStatistics)` - All lines were processed (some may have failed)
/// * `Err(CrawlError)` - Startup or buffer reallocation failed
pub async fn crawl(
    config: Config,
    urls: &UrlList,
    print_headers: bool,
) -> Result<RunStatistics, CrawlError> {
    let mut coordinator = Coordinator::new(config)?.print_headers(print_headers);
    let result = coordinator.run(urls.iter()).await;
    coordinator.shutdown();
    result
}
