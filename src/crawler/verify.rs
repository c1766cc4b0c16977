//! HTTP status line verification
//!
//! Responses are kept as raw bytes. The status code is found by locating the
//! first `HTTP/` signature and reading the whitespace-delimited token after
//! the version marker.

use crate::FetchError;

/// Marker that every accepted response must contain
pub const HTTP_SIGNATURE: &[u8] = b"HTTP/";

/// Status range that means no robots.txt is served
pub const ROBOTS_ABSENT: (u16, u16) = (400, 499);

/// Status range that means the page fetch succeeded
pub const PAGE_OK: (u16, u16) = (200, 299);

/// Result of checking a status code against an inclusive range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderCheck {
    /// The status code found in the response
    pub code: u32,
    /// Whether `code` fell inside the requested range
    pub in_range: bool,
}

/// Finds the first occurrence of `needle` in `haystack`
pub fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Extracts the status code from a raw response
///
/// # Errors
///
/// * `FetchError::NonHttpResponse` - no `HTTP/` signature in `response`
/// * `FetchError::MalformedStatus` - the token after the version is not a number
pub fn status_code(response: &[u8]) -> Result<u32, FetchError> {
    let start = find_subslice(response, HTTP_SIGNATURE).ok_or(FetchError::NonHttpResponse)?;

    let mut tokens = response[start..]
        .split(|b| b.is_ascii_whitespace())
        .filter(|token| !token.is_empty());

    // First token is the version marker itself, e.g. "HTTP/1.1"
    tokens.next();
    let token = tokens.next().ok_or(FetchError::MalformedStatus)?;

    parse_status_token(token).ok_or(FetchError::MalformedStatus)
}

/// Verifies that the response status lies within `min..=max`
///
/// # Example
///
/// ```
/// use linkprobe::crawler::verify_header;
///
/// let response = b"HTTP/1.1 404 Not Found\r\n\r\n";
/// assert!(verify_header(response, 400, 499).unwrap().in_range);
/// assert!(!verify_header(response, 200, 299).unwrap().in_range);
/// ```
pub fn verify_header(response: &[u8], min: u16, max: u16) -> Result<HeaderCheck, FetchError> {
    let code = status_code(response)?;
    Ok(HeaderCheck {
        code,
        in_range: (u32::from(min)..=u32::from(max)).contains(&code),
    })
}

/// Reads the leading decimal digits of a status token
///
/// Trailing non-digit bytes are ignored, so `200,` still yields 200. Codes
/// too large for a `u32` saturate; they are still a number, just out of any
/// accepted range.
fn parse_status_token(token: &[u8]) -> Option<u32> {
    let digits: Vec<u32> = token
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .map(|b| u32::from(b - b'0'))
        .collect();
    if digits.is_empty() {
        return None;
    }
    Some(
        digits
            .into_iter()
            .fold(0u32, |code, digit| code.saturating_mul(10).saturating_add(digit)),
    )
}
