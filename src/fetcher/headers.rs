use crate::fetcher::errors::FetchError;
use once_cell::sync::Lazy;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::collections::HashMap;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.14; rv:65.0) Gecko/20100101 Firefox/65.0";
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml,application/rss+xml;q=0.9,image/webp,*/*;q=0.8";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US;q=0.7,ru;q=0.3";

static DEFAULT_HEADERS: Lazy<HeaderMap> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
    );
    headers
});

/// Headers sent with every request unless overridden.
pub fn default_headers() -> &'static HeaderMap {
    &DEFAULT_HEADERS
}

/// Builds the outbound header set for one request: `defaults ∪ overrides`.
///
/// Names are matched case-insensitively, so an override for `user-agent`
/// replaces the default `User-Agent`. Overrides are applied in sorted key
/// order; when two keys differ only in case, the one sorting last wins.
/// Neither input is modified.
pub fn merge_headers(
    defaults: &HeaderMap,
    overrides: &HashMap<String, String>,
) -> Result<HeaderMap, FetchError> {
    let mut merged = defaults.clone();
    let mut ordered: Vec<_> = overrides.iter().collect();
    ordered.sort_unstable_by(|a, b| a.0.cmp(b.0));
    for (name, value) in ordered {
        let header_name =
            HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| FetchError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value.trim()).map_err(|e| FetchError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        merged.insert(header_name, header_value);
    }
    Ok(merged)
}
