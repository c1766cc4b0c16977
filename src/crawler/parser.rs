//! HTML link extraction
//!
//! The pipeline hands the raw response (status line, headers and body) to a
//! [`LinkExtractor`]. The default implementation parses the body with
//! `scraper` and counts the links it would follow.

use crate::crawler::verify::find_subslice;
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Separator between the HTTP header block and the body
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Link extraction failures
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid base URL {url}: {source}")]
    BaseUrl { url: String, source: url::ParseError },

    #[error("response has no header terminator")]
    MissingHeaderEnd,
}

/// Counts the links found in a downloaded page
pub trait LinkExtractor {
    /// Returns the number of links in `response`, resolved against `base_url`
    fn extract(&self, response: &[u8], base_url: &str) -> Result<usize, ExtractError>;
}

/// Default extractor backed by an HTML5 parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, response: &[u8], base_url: &str) -> Result<usize, ExtractError> {
        let base = Url::parse(base_url).map_err(|source| ExtractError::BaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        let html = String::from_utf8_lossy(response_body(response));
        Ok(parse_html(&html, &base).len())
    }
}

/// Returns the header block of a raw response, without the terminator
pub fn header_block(response: &[u8]) -> Option<&[u8]> {
    find_subslice(response, HEADER_TERMINATOR).map(|end| &response[..end])
}

/// Returns the body of a raw response
///
/// A response without a header terminator is treated as all body.
pub fn response_body(response: &[u8]) -> &[u8] {
    match find_subslice(response, HEADER_TERMINATOR) {
        Some(end) => &response[end + HEADER_TERMINATOR.len()..],
        None => response,
    }
}

/// Parses HTML content and returns every followable link as an absolute URL
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
///
/// # Example
///
/// ```
/// use linkprobe::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("http://example.com/").unwrap();
/// assert_eq!(parse_html(html, &base_url), vec!["http://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("http://example.com/page").unwrap()
    }

    fn response(body: &str) -> Vec<u8> {
        format!("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n{}", body).into_bytes()
    }

    #[test]
    fn test_extract_counts_links_in_body() {
        let raw = response(
            r#"<html><body>
                <a href="/page1">Link 1</a>
                <a href="page2">Link 2</a>
                <a href="https://other.com/page3">Link 3</a>
            </body></html>"#,
        );
        let count = HtmlLinkExtractor::new()
            .extract(&raw, "http://example.com")
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_extract_rejects_bad_base_url() {
        let raw = response("<html></html>");
        let result = HtmlLinkExtractor::new().extract(&raw, "not a url");
        assert!(matches!(result, Err(ExtractError::BaseUrl { .. })));
    }

    #[test]
    fn test_extract_tolerates_invalid_utf8() {
        let mut raw = response(r#"<a href="/a">A</a>"#);
        raw.extend_from_slice(&[0xff, 0xfe]);
        let count = HtmlLinkExtractor::new()
            .extract(&raw, "http://example.com")
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_header_block_and_body() {
        let raw = response("<p>hi</p>");
        assert_eq!(
            header_block(&raw).unwrap(),
            b"HTTP/1.1 200 OK\r\nContent-Type: text/html"
        );
        assert_eq!(response_body(&raw), b"<p>hi</p>");

        assert!(header_block(b"HTTP/1.1 200 OK\r\n").is_none());
        assert_eq!(response_body(b"no headers"), b"no headers");
    }

    #[test]
    fn test_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        assert_eq!(parse_html(html, &base_url()), vec!["http://example.com/other"]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,<h1>Test</h1>">Data</a>
            <a href="ftp://example.com/file">FTP</a>
        </body></html>"#;
        assert!(parse_html(html, &base_url()).is_empty());
    }

    #[test]
    fn test_skip_download_and_fragment_links() {
        let html = r##"<html><body>
            <a href="/file.pdf" download>Download</a>
            <a href="#section">Jump</a>
            <a href="">Empty</a>
        </body></html>"##;
        assert!(parse_html(html, &base_url()).is_empty());
    }

    #[test]
    fn test_canonical_link_counted() {
        let html = r#"<html><head><link rel="canonical" href="http://example.com/canonical" /></head><body></body></html>"#;
        let links = parse_html(html, &base_url());
        assert_eq!(links, vec!["http://example.com/canonical"]);
    }
}
