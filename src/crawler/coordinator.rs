//! Crawler coordinator - per-URL pipeline orchestration
//!
//! The coordinator owns every piece of run-wide state: the one reusable
//! [`Connection`], the shared [`DynamicBuffer`] and the host/address dedup
//! sets. Each input line is driven through the [`Stage`] sequence:
//!
//! ```text
//! ParseUrl -> CheckHostDedup -> ResolveDns -> CheckIpDedup
//!   -> ConnectRobots -> WriteRobotsHead -> ReadRobots -> VerifyRobots[400,499]
//!   -> ResetConnection
//!   -> ConnectPage -> WritePageGet -> ReadPage -> VerifyPage[200,299]
//!   -> ExtractLinks -> Done
//! ```
//!
//! The first stage that fails ends the line with a [`UrlOutcome`] and the run
//! moves on. Only startup failures and a failed buffer reset end the run.

use crate::config::{validate, Config};
use crate::crawler::buffer::DynamicBuffer;
use crate::crawler::connection::{Connection, Timeouts};
use crate::crawler::parser::{header_block, ExtractError, HtmlLinkExtractor, LinkExtractor};
use crate::crawler::request::Method;
use crate::crawler::resolver::resolve;
use crate::crawler::verify::{verify_header, PAGE_OK, ROBOTS_ABSENT};
use crate::output::RunStatistics;
use crate::state::{SeenSets, Stage, UrlOutcome};
use crate::url::parse_url;
use crate::{CrawlError, ErrorKind, FetchError, UrlError};
use std::time::Instant;

/// Request target for the robots probe
const ROBOTS_PATH: &str = "/robots.txt";

/// Why a line stopped before [`Stage::Done`]
enum Abort {
    Duplicate,
    Rejected { status: u32 },
    Failed { kind: ErrorKind, message: String },
}

impl From<FetchError> for Abort {
    fn from(err: FetchError) -> Self {
        Abort::Failed {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<UrlError> for Abort {
    fn from(err: UrlError) -> Self {
        Abort::Failed {
            kind: ErrorKind::Parse,
            message: err.to_string(),
        }
    }
}

impl From<ExtractError> for Abort {
    fn from(err: ExtractError) -> Self {
        Abort::Failed {
            kind: ErrorKind::Parse,
            message: err.to_string(),
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<E = HtmlLinkExtractor> {
    config: Config,
    connection: Connection,
    buffer: DynamicBuffer,
    seen: SeenSets,
    extractor: E,
    stage: Stage,
    print_headers: bool,
}

impl Coordinator<HtmlLinkExtractor> {
    /// Creates a coordinator using the default HTML link extractor
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Socket and buffer are ready
    /// * `Err(CrawlError)` - The initial socket or buffer could not be created
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        Self::with_extractor(config, HtmlLinkExtractor::new())
    }
}

impl<E: LinkExtractor> Coordinator<E> {
    /// Creates a coordinator that hands downloaded pages to `extractor`
    ///
    /// Fails with `CrawlError::Config` if `config` does not validate.
    pub fn with_extractor(config: Config, extractor: E) -> Result<Self, CrawlError> {
        validate(&config)?;

        let buffer = DynamicBuffer::new(config.buffer.initial_size, config.buffer.grow_threshold)?;
        let connection = Connection::open(
            Timeouts::from(&config.fetch),
            config.user_agent.agent_string(),
        )?;

        Ok(Self {
            config,
            connection,
            buffer,
            seen: SeenSets::new(),
            extractor,
            stage: Stage::ParseUrl,
            print_headers: false,
        })
    }

    /// Prints the header block of every successfully parsed page to stdout
    pub fn print_headers(mut self, enabled: bool) -> Self {
        self.print_headers = enabled;
        self
    }

    pub fn seen(&self) -> &SeenSets {
        &self.seen
    }

    pub fn buffer(&self) -> &DynamicBuffer {
        &self.buffer
    }

    /// Processes every line in order and returns the run totals
    ///
    /// Individual URL failures never end the run.
    pub async fn run<I, S>(&mut self, lines: I) -> Result<RunStatistics, CrawlError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stats = RunStatistics::new();

        for line in lines {
            let outcome = self.process_line(line.as_ref()).await?;
            stats.record(&outcome);
        }

        stats.finish();
        tracing::info!(
            "Run completed: {} lines, {} pages crawled, {} links",
            stats.lines_processed,
            stats.pages_crawled,
            stats.total_links
        );

        Ok(stats)
    }

    /// Processes a single input line
    ///
    /// # Errors
    ///
    /// Only a failure to reallocate the shared buffer is returned; everything
    /// else is reported through the [`UrlOutcome`].
    pub async fn process_line(&mut self, raw: &str) -> Result<UrlOutcome, CrawlError> {
        let line: String = raw.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
        tracing::info!("URL: {}", line);

        if let Err(e) = self.connection.reset() {
            tracing::warn!("Resetting connection failed: {}", e);
        }

        if self
            .buffer
            .reset_if_oversized(self.config.buffer.reset_threshold)?
        {
            tracing::debug!("Buffer reallocated at {} bytes", self.buffer.capacity());
        }

        self.stage = Stage::ParseUrl;
        let outcome = match self.crawl_line(&line).await {
            Ok(links) => UrlOutcome::Crawled { links },
            Err(Abort::Duplicate) => UrlOutcome::Duplicate { stage: self.stage },
            Err(Abort::Rejected { status }) => UrlOutcome::Rejected {
                stage: self.stage,
                status,
            },
            Err(Abort::Failed { kind, message }) => {
                tracing::warn!("{} failed ({}): {}", self.stage, kind, message);
                UrlOutcome::Failed {
                    stage: self.stage,
                    kind,
                    message,
                }
            }
        };

        Ok(outcome)
    }

    async fn crawl_line(&mut self, line: &str) -> Result<usize, Abort> {
        self.enter(Stage::ParseUrl);
        let url = parse_url(line)?;
        tracing::info!("Parsing URL... host {}, port {}", url.host(), url.port());

        self.enter(Stage::CheckHostDedup);
        if !self.seen.insert_host(url.host()) {
            tracing::info!("Checking host uniqueness... failed");
            return Err(Abort::Duplicate);
        }
        tracing::info!("Checking host uniqueness... passed");

        self.enter(Stage::ResolveDns);
        let resolution = resolve(url.host()).await?;
        tracing::info!(
            "Doing DNS... done in {} ms, found {}",
            resolution.elapsed.as_millis(),
            resolution.addr
        );

        self.enter(Stage::CheckIpDedup);
        if !self.seen.insert_addr(resolution.addr) {
            tracing::info!("Checking IP uniqueness... failed");
            return Err(Abort::Duplicate);
        }
        tracing::info!("Checking IP uniqueness... passed");

        self.enter(Stage::ConnectRobots);
        let elapsed = self.connection.connect(resolution.addr, url.port()).await?;
        tracing::info!("Connecting on robots... done in {} ms", elapsed.as_millis());

        self.enter(Stage::WriteRobotsHead);
        self.connection
            .write_request(&url, Method::Head, Some(ROBOTS_PATH))
            .await?;

        self.enter(Stage::ReadRobots);
        let bytes = self
            .connection
            .read_response(&mut self.buffer, self.config.fetch.robots_max_bytes)
            .await?;
        tracing::info!(
            "Loading... done in {} ms with {} bytes",
            self.connection.elapsed().as_millis(),
            bytes
        );

        self.enter(Stage::VerifyRobots);
        let check = verify_header(self.buffer.as_bytes(), ROBOTS_ABSENT.0, ROBOTS_ABSENT.1)?;
        tracing::info!("Verifying header... status code {}", check.code);
        if !check.in_range {
            return Err(Abort::Rejected { status: check.code });
        }

        self.enter(Stage::ResetConnection);
        self.connection.reset()?;

        self.enter(Stage::ConnectPage);
        let elapsed = self.connection.connect(resolution.addr, url.port()).await?;
        tracing::info!("Connecting on page... done in {} ms", elapsed.as_millis());

        self.enter(Stage::WritePageGet);
        self.connection.write_request(&url, Method::Get, None).await?;

        self.enter(Stage::ReadPage);
        let bytes = self
            .connection
            .read_response(&mut self.buffer, self.config.fetch.page_max_bytes)
            .await?;
        tracing::info!(
            "Loading... done in {} ms with {} bytes",
            self.connection.elapsed().as_millis(),
            bytes
        );

        self.enter(Stage::VerifyPage);
        let check = verify_header(self.buffer.as_bytes(), PAGE_OK.0, PAGE_OK.1)?;
        tracing::info!("Verifying header... status code {}", check.code);
        if !check.in_range {
            return Err(Abort::Rejected { status: check.code });
        }

        self.enter(Stage::ExtractLinks);
        let started = Instant::now();
        let links = self
            .extractor
            .extract(self.buffer.as_bytes(), &url.base_url())?;
        tracing::info!(
            "Parsing page... done in {} ms with {} links",
            started.elapsed().as_millis(),
            links
        );

        if self.print_headers {
            let headers =
                header_block(self.buffer.as_bytes()).ok_or(ExtractError::MissingHeaderEnd)?;
            println!("{}", "_".repeat(83));
            println!("{}", String::from_utf8_lossy(headers));
        }

        self.enter(Stage::Done);
        Ok(links)
    }

    fn enter(&mut self, stage: Stage) {
        debug_assert!(
            stage == Stage::ParseUrl || self.stage.next() == Some(stage),
            "stage {} entered after {}",
            stage,
            self.stage
        );
        self.stage = stage;
    }

    /// Releases the socket; later calls are no-ops
    pub fn shutdown(&mut self) {
        if self.connection.close() {
            tracing::debug!("Connection closed");
        }
    }
}
