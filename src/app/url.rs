//! URL validation and normalization.

use log::warn;
use url::Url;

use crate::config::MAX_URL_LENGTH;

/// Prefix of `url` safe to put in a log line.
fn preview(url: &str) -> &str {
    let mut end = url.len().min(50);
    while !url.is_char_boundary(end) {
        end -= 1;
    }
    &url[..end]
}

/// Normalizes a page URL from user input.
///
/// Input without a scheme gets `https://`. Returns `None` (after a warning)
/// for URLs that are too long, unparsable, host-less, or not http(s).
pub fn validate_and_normalize_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    if candidate.len() > MAX_URL_LENGTH {
        warn!(
            "Skipping URL longer than {MAX_URL_LENGTH} characters: {}...",
            preview(&candidate)
        );
        return None;
    }

    let parsed = match Url::parse(&candidate) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Skipping invalid URL {raw:?}: {e}");
            return None;
        }
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        warn!("Skipping URL with unsupported scheme: {raw}");
        return None;
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        warn!("Skipping URL without a host: {raw}");
        return None;
    }

    Some(candidate)
}

#[cfg(test)]
mod tests {
    use super::validate_and_normalize_url;

    #[test]
    fn test_adds_https_when_scheme_missing() {
        assert_eq!(
            validate_and_normalize_url("example.com/path?q=1"),
            Some("https://example.com/path?q=1".to_string())
        );
        assert_eq!(
            validate_and_normalize_url("  example.com:8080 "),
            Some("https://example.com:8080".to_string())
        );
    }

    #[test]
    fn test_keeps_existing_scheme() {
        assert_eq!(
            validate_and_normalize_url("http://example.com"),
            Some("http://example.com".to_string())
        );
        assert_eq!(
            validate_and_normalize_url("https://[2001:db8::1]:8080/a"),
            Some("https://[2001:db8::1]:8080/a".to_string())
        );
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert_eq!(validate_and_normalize_url("ftp://example.com"), None);
        assert_eq!(validate_and_normalize_url("file:///etc/passwd"), None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(validate_and_normalize_url("not a url at all!!!"), None);
        assert_eq!(validate_and_normalize_url(""), None);
    }

    #[test]
    fn test_rejects_overlong_urls() {
        let long = format!("https://example.com/{}", "a".repeat(2100));
        assert_eq!(validate_and_normalize_url(&long), None);

        let multibyte = format!("https://example.com/{}", "é".repeat(1100));
        assert_eq!(validate_and_normalize_url(&multibyte), None);
    }
}
