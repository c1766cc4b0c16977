use crate::url::{ParsedUrl, DEFAULT_PORT, HTTP_SCHEME, MAX_PORT, MIN_PORT};
use crate::{UrlError, UrlResult};

/// Parses a raw URL line into a [`ParsedUrl`]
///
/// # Parsing Rules
///
/// 1. Empty input is rejected
/// 2. `://` is required and the scheme before it must be exactly `http`
/// 3. Everything from the first `#` is dropped
/// 4. `?` to the end is the query, then `/` to the end is the path
/// 5. `request` is `path + query`, with `/` as the default path
/// 6. A `:` in what remains introduces a port (see [`parse_port`]); a
///    trailing `:` with nothing after it is invalid
/// 7. The rest is the host and must be non-empty
///
/// # Examples
///
/// ```
/// use linkprobe::url::parse_url;
///
/// let url = parse_url("http://example.com/a?b#frag").unwrap();
/// assert_eq!(url.host(), "example.com");
/// assert_eq!(url.port(), 80);
/// assert_eq!(url.request(), "/a?b");
///
/// assert!(parse_url("https://example.com/").is_err());
/// ```
pub fn parse_url(raw: &str) -> UrlResult<ParsedUrl> {
    if raw.is_empty() {
        return Err(UrlError::Empty);
    }

    let (scheme, rest) = raw
        .split_once("://")
        .ok_or_else(|| UrlError::InvalidScheme(raw.to_string()))?;

    if scheme != HTTP_SCHEME {
        return Err(UrlError::InvalidScheme(scheme.to_string()));
    }

    // Fragments are never sent
    let rest = match rest.find('#') {
        Some(pos) => &rest[..pos],
        None => rest,
    };

    let (rest, query) = match rest.find('?') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, ""),
    };

    let (authority, path) = match rest.find('/') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, "/"),
    };

    let (host, port) = match authority.find(':') {
        Some(pos) => {
            let port = parse_port(&authority[pos + 1..])?;
            (&authority[..pos], port)
        }
        None => (authority, DEFAULT_PORT),
    };

    if host.is_empty() {
        return Err(UrlError::InvalidHost);
    }

    let request = format!("{}{}", path, query);

    Ok(ParsedUrl {
        scheme: scheme.to_string(),
        host: host.to_string(),
        port,
        path: path.to_string(),
        query: query.to_string(),
        request,
    })
}

/// Parses and range-checks a port suffix
///
/// The text must be entirely ASCII digits and the value must satisfy
/// `MIN_PORT < port <= MAX_PORT`. Note that this rejects port `1` itself.
pub fn parse_port(raw: &str) -> UrlResult<u16> {
    let value = parse_decimal(raw).ok_or_else(|| UrlError::InvalidPort(raw.to_string()))?;

    if value <= MIN_PORT || value > MAX_PORT {
        return Err(UrlError::InvalidPort(raw.to_string()));
    }

    u16::try_from(value).map_err(|_| UrlError::InvalidPort(raw.to_string()))
}

/// Parses an unsigned base-10 integer that must consume the whole input
fn parse_decimal(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
