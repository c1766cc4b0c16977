//! Run statistics
//!
//! This module tallies per-URL outcomes while a run progresses and prints a
//! summary once the input list is exhausted.

use crate::state::{Stage, UrlOutcome};
use crate::ErrorKind;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Totals for one run
#[derive(Debug, Clone)]
pub struct RunStatistics {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the last line finished, once the run is over
    pub finished_at: Option<DateTime<Utc>>,

    /// Number of input lines handled
    pub lines_processed: u64,

    /// Pages fetched and handed to the link extractor
    pub pages_crawled: u64,

    /// Sum of links over all crawled pages
    pub total_links: u64,

    /// Lines skipped because the host was already seen
    pub duplicate_hosts: u64,

    /// Lines skipped because the address was already seen
    pub duplicate_addrs: u64,

    /// Status codes outside the accepted range, by stage
    pub rejections: BTreeMap<Stage, u64>,

    /// Failures by the stage they occurred in
    pub failures_by_stage: BTreeMap<Stage, u64>,

    /// Failures by category
    pub failures_by_kind: BTreeMap<ErrorKind, u64>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            lines_processed: 0,
            pages_crawled: 0,
            total_links: 0,
            duplicate_hosts: 0,
            duplicate_addrs: 0,
            rejections: BTreeMap::new(),
            failures_by_stage: BTreeMap::new(),
            failures_by_kind: BTreeMap::new(),
        }
    }

    /// Adds one line's outcome to the totals
    pub fn record(&mut self, outcome: &UrlOutcome) {
        self.lines_processed += 1;

        match outcome {
            UrlOutcome::Crawled { links } => {
                self.pages_crawled += 1;
                self.total_links += *links as u64;
            }
            UrlOutcome::Duplicate { stage } => match stage {
                Stage::CheckIpDedup => self.duplicate_addrs += 1,
                _ => self.duplicate_hosts += 1,
            },
            UrlOutcome::Rejected { stage, .. } => {
                *self.rejections.entry(*stage).or_insert(0) += 1;
            }
            UrlOutcome::Failed { stage, kind, .. } => {
                *self.failures_by_stage.entry(*stage).or_insert(0) += 1;
                *self.failures_by_kind.entry(*kind).or_insert(0) += 1;
            }
        }
    }

    /// Marks the run as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total_failures(&self) -> u64 {
        self.failures_by_kind.values().sum()
    }

    pub fn total_rejections(&self) -> u64 {
        self.rejections.values().sum()
    }

    /// Wall-clock duration in seconds, if the run has finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Run Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!("  Lines processed: {}", stats.lines_processed);
    println!("  Pages crawled: {}", stats.pages_crawled);
    println!("  Total links found: {}", stats.total_links);
    println!();

    println!("Skipped:");
    println!("  Duplicate hosts: {}", stats.duplicate_hosts);
    println!("  Duplicate addresses: {}", stats.duplicate_addrs);
    for (stage, count) in &stats.rejections {
        println!("  Rejected at {}: {}", stage, count);
    }
    println!();

    if !stats.failures_by_stage.is_empty() {
        println!("Failures by Stage:");
        for (stage, count) in &stats.failures_by_stage {
            println!("  {}: {}", stage, count);
        }
        println!();

        println!("Failures by Kind:");
        let mut kind_counts: Vec<_> = stats.failures_by_kind.iter().collect();
        kind_counts.sort_by(|a, b| b.1.cmp(a.1));
        for (kind, count) in kind_counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    let success_rate = if stats.lines_processed > 0 {
        (stats.pages_crawled as f64 / stats.lines_processed as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} lines crawled)",
        success_rate, stats.pages_crawled, stats.lines_processed
    );
}
