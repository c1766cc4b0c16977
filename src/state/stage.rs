//! Pipeline stage definitions for tracking per-URL progress
//!
//! Every input line walks these stages strictly in order. Processing stops
//! at the first stage that fails; there are no retries.

use crate::ErrorKind;
use std::fmt;

/// A stage of the per-URL fetch pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    ParseUrl,
    CheckHostDedup,
    ResolveDns,
    CheckIpDedup,
    ConnectRobots,
    WriteRobotsHead,
    ReadRobots,
    VerifyRobots,
    ResetConnection,
    ConnectPage,
    WritePageGet,
    ReadPage,
    VerifyPage,
    ExtractLinks,
    /// Terminal success state
    Done,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 15] = [
        Self::ParseUrl,
        Self::CheckHostDedup,
        Self::ResolveDns,
        Self::CheckIpDedup,
        Self::ConnectRobots,
        Self::WriteRobotsHead,
        Self::ReadRobots,
        Self::VerifyRobots,
        Self::ResetConnection,
        Self::ConnectPage,
        Self::WritePageGet,
        Self::ReadPage,
        Self::VerifyPage,
        Self::ExtractLinks,
        Self::Done,
    ];

    /// The stage that follows this one, or None for [`Stage::Done`]
    pub fn next(&self) -> Option<Self> {
        let index = Self::ALL.iter().position(|stage| stage == self)?;
        Self::ALL.get(index + 1).copied()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true for the two uniqueness checks
    pub fn is_dedup_check(&self) -> bool {
        matches!(self, Self::CheckHostDedup | Self::CheckIpDedup)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParseUrl => "parse_url",
            Self::CheckHostDedup => "check_host_dedup",
            Self::ResolveDns => "resolve_dns",
            Self::CheckIpDedup => "check_ip_dedup",
            Self::ConnectRobots => "connect_robots",
            Self::WriteRobotsHead => "write_robots_head",
            Self::ReadRobots => "read_robots",
            Self::VerifyRobots => "verify_robots",
            Self::ResetConnection => "reset_connection",
            Self::ConnectPage => "connect_page",
            Self::WritePageGet => "write_page_get",
            Self::ReadPage => "read_page",
            Self::VerifyPage => "verify_page",
            Self::ExtractLinks => "extract_links",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final result of processing one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlOutcome {
    /// The page was fetched and its links counted
    Crawled { links: usize },

    /// Host or address was already seen; skipped at `stage`
    Duplicate { stage: Stage },

    /// A status check returned a code outside the accepted range
    Rejected { stage: Stage, status: u32 },

    /// A stage failed
    Failed {
        stage: Stage,
        kind: ErrorKind,
        message: String,
    },
}

impl UrlOutcome {
    /// The stage processing ended at
    pub fn stage(&self) -> Stage {
        match self {
            Self::Crawled { .. } => Stage::Done,
            Self::Duplicate { stage } | Self::Rejected { stage, .. } | Self::Failed { stage, .. } => {
                *stage
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Crawled { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::ParseUrl.next(), Some(Stage::CheckHostDedup));
        assert_eq!(Stage::CheckIpDedup.next(), Some(Stage::ConnectRobots));
        assert_eq!(Stage::VerifyRobots.next(), Some(Stage::ResetConnection));
        assert_eq!(Stage::ExtractLinks.next(), Some(Stage::Done));
        assert_eq!(Stage::Done.next(), None);
    }

    #[test]
    fn test_all_is_sorted() {
        let mut sorted = Stage::ALL;
        sorted.sort();
        assert_eq!(sorted, Stage::ALL);
    }

    #[test]
    fn test_is_terminal() {
        assert!(Stage::Done.is_terminal());
        assert!(!Stage::ExtractLinks.is_terminal());
    }

    #[test]
    fn test_dedup_checks() {
        assert!(Stage::CheckHostDedup.is_dedup_check());
        assert!(Stage::CheckIpDedup.is_dedup_check());
        assert!(!Stage::ResolveDns.is_dedup_check());
    }

    #[test]
    fn test_display() {
        assert_eq!(Stage::ReadRobots.to_string(), "read_robots");
        assert_eq!(format!("{}", Stage::Done), "done");
    }

    #[test]
    fn test_outcome_stage() {
        assert_eq!(UrlOutcome::Crawled { links: 3 }.stage(), Stage::Done);
        assert_eq!(
            UrlOutcome::Rejected {
                stage: Stage::VerifyRobots,
                status: 200
            }
            .stage(),
            Stage::VerifyRobots
        );

        let failed = UrlOutcome::Failed {
            stage: Stage::ReadPage,
            kind: ErrorKind::Timeout,
            message: "connection timeout".to_string(),
        };
        assert!(failed.is_failure());
        assert!(!failed.is_success());
        assert_eq!(failed.stage(), Stage::ReadPage);
    }
}
