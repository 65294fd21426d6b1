// SPDX-FileCopyrightText: 2026 Relaybox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! URL normalization for the shortener.

use std::sync::LazyLock;

use regex::Regex;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .unwrap()
});

/// Adds `https://` when the scheme is missing and checks the result.
///
/// Returns `None` for anything that does not look like an http(s) URL.
pub fn normalize_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let url = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    URL_PATTERN.is_match(&url).then_some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_missing_scheme() {
        assert_eq!(
            normalize_url("example.com/path").as_deref(),
            Some("https://example.com/path")
        );
    }

    #[test]
    fn keeps_existing_scheme() {
        assert_eq!(
            normalize_url("http://example.com").as_deref(),
            Some("http://example.com")
        );
        assert_eq!(
            normalize_url("https://sub.example.co.uk:8443/a?b=c").as_deref(),
            Some("https://sub.example.co.uk:8443/a?b=c")
        );
    }

    #[test]
    fn accepts_localhost_and_ip() {
        assert!(normalize_url("http://localhost:5000").is_some());
        assert!(normalize_url("http://127.0.0.1/stats").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert!(normalize_url("not a url").is_none());
        assert!(normalize_url("ftp://example.com").is_none());
        assert!(normalize_url("https://nodot").is_none());
    }
}
