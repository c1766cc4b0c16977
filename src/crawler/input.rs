//! Newline-delimited URL input

use crate::CrawlError;
use std::path::Path;

/// The URLs to visit, one entry per input line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlList {
    lines: Vec<String>,
}

impl UrlList {
    /// Reads the whole input file
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::Input` if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, CrawlError> {
        let bytes = std::fs::read(path).map_err(|source| CrawlError::Input {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!("Opened {} with size {}", path.display(), bytes.len());

        Ok(Self::from_bytes(&bytes))
    }

    /// Splits raw file content into lines
    ///
    /// Every CR and LF is stripped from each line. A final newline does not
    /// start an extra empty entry; empty lines in the middle are kept.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
        if body.is_empty() {
            return Self::default();
        }

        let lines = body
            .split(|&b| b == b'\n')
            .map(|line| {
                let line: Vec<u8> = line.iter().copied().filter(|&b| b != b'\r').collect();
                String::from_utf8_lossy(&line).into_owned()
            })
            .collect();

        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for UrlList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for UrlList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}
