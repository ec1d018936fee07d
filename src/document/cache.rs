//! HTTP conditional caching: Last-Modified and ETag.

use std::path::Path;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::front::CachePlan;

/// Format a timestamp as an HTTP date (RFC 7231, always GMT).
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Modification time of a file, if it can be read.
pub fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

/// Latest dependency time of a plan, truncated to whole seconds.
pub fn last_modified(plan: &CachePlan) -> Option<DateTime<Utc>> {
    plan.files
        .iter()
        .filter_map(|f| file_mtime(f))
        .chain(plan.timestamps.iter().copied())
        .max()
        .and_then(|t| DateTime::from_timestamp(t.timestamp(), 0))
}

/// True when the client's `If-Modified-Since` is not older than `last_modified`.
pub fn not_modified_since(headers: &HeaderMap, last_modified: DateTime<Utc>) -> bool {
    headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_http_date)
        .is_some_and(|since| since >= last_modified)
}

/// Quoted SHA-256 of the body followed by the self URL.
pub fn etag(body: &[u8], self_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    hasher.update(self_url.as_bytes());
    format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// `If-None-Match` contains `etag` (weak prefixes ignored) or `*`.
pub fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

/// Attach `Last-Modified` and `Cache-Control`.
pub fn set_validators(headers: &mut HeaderMap, last_modified: DateTime<Utc>, max_age: u64) {
    if let Ok(value) = HeaderValue::from_str(&http_date(last_modified)) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("must-revalidate, max-age={max_age}")) {
        headers.insert(header::CACHE_CONTROL, value);
    }
}

/// Empty 304 carrying the given validators.
pub fn not_modified(validators: HeaderMap) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NOT_MODIFIED;
    *response.headers_mut() = validators;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_http_date_round_trip() {
        let t = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        assert_eq!(http_date(t), "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT"), Some(t));
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[test]
    fn test_last_modified_uses_latest_dependency() {
        let older = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
        let plan = CachePlan {
            files: vec!["/definitely/not/here".into()],
            timestamps: vec![older, newer],
            use_etag: true,
        };
        assert_eq!(last_modified(&plan), Some(newer));
        assert_eq!(last_modified(&CachePlan::default()), None);
    }

    #[test]
    fn test_if_modified_since() {
        let lm = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
        let mut headers = HeaderMap::new();
        assert!(!not_modified_since(&headers, lm));

        headers.insert(header::IF_MODIFIED_SINCE, HeaderValue::from_static("Mon, 01 May 2023 12:00:00 GMT"));
        assert!(not_modified_since(&headers, lm));

        headers.insert(header::IF_MODIFIED_SINCE, HeaderValue::from_static("Mon, 01 May 2023 11:59:59 GMT"));
        assert!(!not_modified_since(&headers, lm));
    }

    #[test]
    fn test_etag_depends_on_url_and_matches_lists() {
        let a = etag(b"<p>hi</p>", "https://blog.example.org/");
        let b = etag(b"<p>hi</p>", "https://blog.example.org/?x");
        assert_ne!(a, b);
        assert!(a.starts_with('"') && a.ends_with('"'));
        assert_eq!(a.len(), 66);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_str(&format!("\"other\", W/{a}")).unwrap(),
        );
        assert!(etag_matches(&headers, &a));
        assert!(!etag_matches(&headers, &b));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
        assert!(etag_matches(&headers, &b));
    }
}
