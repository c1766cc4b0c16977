//! LinkProbe main entry point
//!
//! This is the command-line interface for the LinkProbe page prober.

use anyhow::Context;
use clap::Parser;
use linkprobe::config::{load_config_with_hash, parse_worker_count, Config};
use linkprobe::crawler::{crawl, UrlList};
use linkprobe::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// LinkProbe: a robots-gated page prober
///
/// LinkProbe reads one URL per line, skips hosts and addresses it has
/// already visited, and only downloads a page when the site serves no
/// robots.txt. Links in each downloaded page are counted.
#[derive(Parser, Debug)]
#[command(name = "linkprobe")]
#[command(version = "1.2.0")]
#[command(about = "A robots-gated page prober", long_about = None)]
struct Cli {
    /// Number of worker threads (must be 1)
    #[arg(value_name = "THREADS", value_parser = parse_worker_count)]
    threads: usize,

    /// File with one URL per line
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Print the HTTP header block of every parsed page
    #[arg(long)]
    print_headers: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    tracing::debug!("Running with {} worker thread", cli.threads);

    let urls = UrlList::load(&cli.input).context("failed to read input file")?;

    let stats = crawl(config, &urls, cli.print_headers)
        .await
        .context("crawl aborted")?;

    if !cli.quiet {
        println!();
        print_statistics(&stats);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkprobe=info,warn"),
            1 => EnvFilter::new("linkprobe=debug,info"),
            2 => EnvFilter::new("linkprobe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
