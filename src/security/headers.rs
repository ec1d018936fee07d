//! Security and robots headers.
//!
//! # Responsibilities
//! - `X-Frame-Options` (SAMEORIGIN, or ALLOW-FROM a declared origin)
//! - `Permissions-Policy` opting out of interest-cohort tracking
//! - `X-Robots-Tag` values derived from the blog robots policy
//!
//! # Design Decisions
//! - Every header is gated by a blog setting
//! - An origin that does not parse falls back to SAMEORIGIN

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::config::BlogSettings;

pub const X_FRAME_OPTIONS: HeaderName = HeaderName::from_static("x-frame-options");
pub const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");
pub const X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

/// Reduce an origin to `scheme://host[:port]`.
pub fn frame_origin(origin: &str) -> Option<String> {
    let url = Url::parse(origin).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Value of `X-Frame-Options` for an optional allowed origin.
pub fn frame_options(allowed_origin: Option<&str>) -> String {
    allowed_origin
        .and_then(frame_origin)
        .map(|origin| format!("ALLOW-FROM {origin}"))
        .unwrap_or_else(|| "SAMEORIGIN".to_string())
}

/// Add the document security headers enabled in `settings`.
pub fn apply_security_headers(
    headers: &mut HeaderMap,
    settings: &BlogSettings,
    allowed_origin: Option<&str>,
) {
    if settings.prevents_clickjacking {
        if let Ok(value) = HeaderValue::from_str(&frame_options(allowed_origin)) {
            headers.insert(X_FRAME_OPTIONS, value);
        }
    }
    if settings.prevents_floc {
        headers.insert(PERMISSIONS_POLICY, HeaderValue::from_static("interest-cohort=()"));
    }
}

/// Combine a base robots policy with an override.
///
/// Each of INDEX, FOLLOW and ARCHIVE takes its value from the override when
/// present there, else from the base. A positive ARCHIVE is left out.
pub fn robots_policy(base: &str, over: &str) -> String {
    let split = |s: &str| -> Vec<String> {
        s.split(',')
            .map(|p| p.trim().to_ascii_uppercase())
            .filter(|p| !p.is_empty())
            .collect()
    };
    let (base, over) = (split(base), split(over));

    let mut parts = Vec::new();
    for key in ["INDEX", "FOLLOW", "ARCHIVE"] {
        let negated = format!("NO{key}");
        let pick = |list: &[String]| {
            if list.contains(&negated) {
                Some(negated.clone())
            } else if list.iter().any(|p| p == key) {
                Some(key.to_string())
            } else {
                None
            }
        };
        let value = pick(&over).or_else(|| pick(&base)).unwrap_or_else(|| key.to_string());
        if value != "ARCHIVE" {
            parts.push(value);
        }
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_origin_reduction() {
        assert_eq!(
            frame_origin("https://admin.example.org/admin/post?id=3"),
            Some("https://admin.example.org".into())
        );
        assert_eq!(
            frame_origin("http://localhost:8081/admin"),
            Some("http://localhost:8081".into())
        );
        assert_eq!(frame_origin("not a url"), None);
    }

    #[test]
    fn test_frame_options_values() {
        assert_eq!(frame_options(None), "SAMEORIGIN");
        assert_eq!(frame_options(Some("garbage")), "SAMEORIGIN");
        assert_eq!(
            frame_options(Some("https://admin.example.org/")),
            "ALLOW-FROM https://admin.example.org"
        );
    }

    #[test]
    fn test_apply_respects_settings() {
        let mut headers = HeaderMap::new();
        apply_security_headers(&mut headers, &BlogSettings::default(), None);
        assert_eq!(headers[&X_FRAME_OPTIONS], "SAMEORIGIN");
        assert_eq!(headers[&PERMISSIONS_POLICY], "interest-cohort=()");

        let settings = BlogSettings {
            prevents_clickjacking: false,
            prevents_floc: false,
            ..Default::default()
        };
        let mut headers = HeaderMap::new();
        apply_security_headers(&mut headers, &settings, None);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_robots_policy() {
        assert_eq!(robots_policy("INDEX,FOLLOW", ""), "INDEX, FOLLOW");
        assert_eq!(robots_policy("INDEX,NOFOLLOW", ""), "INDEX, NOFOLLOW");
        assert_eq!(robots_policy("NOINDEX, NOFOLLOW, NOARCHIVE", ""), "NOINDEX, NOFOLLOW, NOARCHIVE");
        assert_eq!(robots_policy("INDEX,FOLLOW,ARCHIVE", ""), "INDEX, FOLLOW");
        assert_eq!(robots_policy("INDEX,FOLLOW", "NOINDEX"), "NOINDEX, FOLLOW");
        assert_eq!(robots_policy("", ""), "INDEX, FOLLOW");
    }
}
