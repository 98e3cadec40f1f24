//! Normalization and validation of target URLs.

use crate::error::{CoreError, Result};
use regex::Regex;
use std::sync::LazyLock;

const DEFAULT_SCHEME: &str = "http://";

/// Absolute http(s) URL: optional `www.`, a host whose last label is 1-6
/// characters, then an optional path/query/fragment from a safe character set.
static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b(?:[-a-zA-Z0-9()@:%_+.~#?&/=]*)$",
    )
    .expect("url shape pattern is valid")
});

/// Turns raw user input into a normalized absolute URL.
///
/// A missing scheme defaults to `http://`. An `http`/`https` scheme is
/// matched case-insensitively and lowercased, so the function is idempotent.
pub fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::MissingUrl);
    }

    let normalized = match split_scheme(trimmed) {
        Some((scheme, rest)) => {
            let scheme = scheme.to_ascii_lowercase();
            if scheme != "http" && scheme != "https" {
                return Err(CoreError::InvalidUrl(format!(
                    "scheme must be http or https, got '{}'",
                    scheme
                )));
            }
            format!("{scheme}://{rest}")
        }
        None => format!("{DEFAULT_SCHEME}{trimmed}"),
    };

    if !is_valid_url(&normalized) {
        return Err(CoreError::InvalidUrl(normalized));
    }

    Ok(normalized)
}

/// Checks a URL that already carries its scheme against the accepted shape.
pub fn is_valid_url(url: &str) -> bool {
    URL_SHAPE.is_match(url)
}

/// Splits `scheme://rest` when the prefix looks like a URI scheme.
///
/// A dotted prefix such as `example.com://x` is a host, not a scheme.
fn split_scheme(url: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = url.split_once("://")?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let is_scheme = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-'));
    is_scheme.then_some((scheme, rest))
}
