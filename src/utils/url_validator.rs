//! Link target validation.
//!
//! A link target must be an absolute `http` or `https` URL with a host.
//! Accepted URLs are returned in the canonical form produced by the `url`
//! crate: lowercase scheme and host, default port dropped, empty path
//! written as `/`. Fragments are kept since profile links often point at
//! an anchor.

use url::Url;

/// Upper bound on a stored link target.
pub const URL_MAX_LEN: usize = 2048;

/// Errors that can occur while validating a link target.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL must be at most {URL_MAX_LEN} characters")]
    TooLong,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Validates `input` as a link target and returns its canonical form.
///
/// # Errors
///
/// Rejects empty or oversized input, relative or malformed URLs, and any
/// scheme other than `http`/`https` (`javascript:`, `data:`, `file:`, ...).
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     validate_link_url("HTTPS://Example.COM:443/Shop#new").unwrap(),
///     "https://example.com/Shop#new"
/// );
/// ```
pub fn validate_link_url(input: &str) -> Result<String, UrlValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlValidationError::Empty);
    }
    if input.len() > URL_MAX_LEN {
        return Err(UrlValidationError::TooLong);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlValidationError::MissingHost),
    }

    let normalized = url.to_string();
    if normalized.len() > URL_MAX_LEN {
        return Err(UrlValidationError::TooLong);
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_https() {
        assert_eq!(
            validate_link_url("https://youtube.com/@me").unwrap(),
            "https://youtube.com/@me"
        );
    }

    #[test]
    fn test_adds_root_path() {
        assert_eq!(
            validate_link_url("http://example.com").unwrap(),
            "http://example.com/"
        );
    }

    #[test]
    fn test_lowercases_host_and_drops_default_port() {
        assert_eq!(
            validate_link_url("HTTPS://EXAMPLE.COM:443/Path").unwrap(),
            "https://example.com/Path"
        );
    }

    #[test]
    fn test_keeps_custom_port_query_and_fragment() {
        assert_eq!(
            validate_link_url("http://example.com:8080/a?b=1#c").unwrap(),
            "http://example.com:8080/a?b=1#c"
        );
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(
            validate_link_url("  https://example.com/x  ").unwrap(),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(validate_link_url("   "), Err(UrlValidationError::Empty));
    }

    #[test]
    fn test_rejects_relative() {
        assert!(matches!(
            validate_link_url("/just/a/path"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
        assert!(matches!(
            validate_link_url("not a url"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_rejects_dangerous_schemes() {
        for input in [
            "javascript:alert(1)",
            "data:text/html,hi",
            "file:///etc/passwd",
            "ftp://example.com/file",
            "mailto:me@example.com",
        ] {
            assert_eq!(
                validate_link_url(input),
                Err(UrlValidationError::UnsupportedProtocol),
                "{input}"
            );
        }
    }

    #[test]
    fn test_rejects_oversized() {
        let input = format!("https://example.com/{}", "a".repeat(URL_MAX_LEN));
        assert_eq!(validate_link_url(&input), Err(UrlValidationError::TooLong));
    }
}
