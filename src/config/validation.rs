//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addressing (site URL, base path, framing origin)
//! - Validate value ranges (page sizes > 0, timeouts > 0)
//! - Reject route keys and theme names that cannot appear in a URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FrontConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{BlogSettings, FrontConfig};

/// Route types whose url key may be overridden.
pub const ROUTE_TYPES: &[&str] = &[
    "lang", "posts", "post", "preview", "category", "archive", "feed", "trackback", "webmention",
    "rsd", "files",
];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a whole configuration.
pub fn validate_config(config: &FrontConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("listener.bind_address", "must be a socket address"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    match Url::parse(&config.site.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            if !url.path().ends_with('/') {
                errors.push(ValidationError::new("site.url", "must end with '/'"));
            }
        }
        _ => errors.push(ValidationError::new("site.url", "must be an absolute http(s) URL")),
    }

    let base = &config.site.base_path;
    if !base.starts_with('/') || !base.ends_with('/') {
        errors.push(ValidationError::new("site.base_path", "must start and end with '/'"));
    }

    if let Some(origin) = &config.site.trusted_frame_origin {
        if Url::parse(origin).map(|u| u.host().is_none()).unwrap_or(true) {
            errors.push(ValidationError::new("site.trusted_frame_origin", "must be an absolute URL"));
        }
    }

    for (kind, key) in &config.site.route_keys {
        if !ROUTE_TYPES.contains(&kind.as_str()) {
            errors.push(ValidationError::new(format!("site.route_keys.{kind}"), "unknown route type"));
        }
        if !is_url_token(key) {
            errors.push(ValidationError::new(
                format!("site.route_keys.{kind}"),
                "must be non-empty and contain only letters, digits, '-' or '_'",
            ));
        }
    }

    if !is_url_token(&config.theme.name) {
        errors.push(ValidationError::new("theme.name", "must be a plain directory name"));
    }
    if let Some(parent) = &config.theme.parent {
        if !is_url_token(parent) {
            errors.push(ValidationError::new("theme.parent", "must be a plain directory name"));
        }
    }

    for kind in config.files.modules.keys() {
        if !is_url_token(kind) {
            errors.push(ValidationError::new(format!("files.modules.{kind}"), "invalid namespace"));
        }
    }

    validate_blog(&config.blog, &mut errors);

    let mut seen = HashSet::new();
    for (i, user) in config.auth.users.iter().enumerate() {
        if user.id.is_empty() || user.id.contains('/') {
            errors.push(ValidationError::new(format!("auth.users[{i}].id"), "must be non-empty without '/'"));
        }
        if user.secret.is_empty() {
            errors.push(ValidationError::new(format!("auth.users[{i}].secret"), "must not be empty"));
        }
        if !seen.insert(user.id.as_str()) {
            errors.push(ValidationError::new(format!("auth.users[{i}].id"), "duplicate user id"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks shared with hot reload of the `[blog]` section.
/// Longest comment or trackback window, about a century. `0` means no limit.
const MAX_TTL_DAYS: u32 = 36_500;

fn validate_blog(blog: &BlogSettings, errors: &mut Vec<ValidationError>) {
    for (field, value) in [
        ("blog.nb_post_per_page", blog.nb_post_per_page),
        ("blog.nb_post_per_feed", blog.nb_post_per_feed),
        ("blog.nb_comment_per_feed", blog.nb_comment_per_feed),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    for (field, value) in [
        ("blog.comments_ttl_days", blog.comments_ttl_days),
        ("blog.trackbacks_ttl_days", blog.trackbacks_ttl_days),
    ] {
        if value > MAX_TTL_DAYS {
            errors.push(ValidationError::new(
                field,
                format!("must be at most {MAX_TTL_DAYS} days"),
            ));
        }
    }
}

fn is_url_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::UserConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&FrontConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = FrontConfig::default();
        config.site.url = "https://blog.example.org/no-slash".into();
        config.site.base_path = "/blog".into();
        config.blog.nb_post_per_page = 0;
        config.theme.name = "../etc".into();
        config.site.route_keys.insert("post".into(), "en try".into());

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "site.url",
                "site.base_path",
                "site.route_keys.post",
                "theme.name",
                "blog.nb_post_per_page",
            ]
        );
    }

    #[test]
    fn test_unknown_route_type_and_duplicate_users() {
        let mut config = FrontConfig::default();
        config.site.route_keys.insert("tag".into(), "tags".into());
        let user = UserConfig {
            id: "admin".into(),
            secret: "s3cret".into(),
            permissions: vec!["admin".into()],
        };
        config.auth.users = vec![user.clone(), user];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].to_string(), "site.route_keys.tag: unknown route type");
        assert_eq!(errors[1].to_string(), "auth.users[1].id: duplicate user id");
    }

    #[test]
    fn test_ttl_windows_are_bounded() {
        let mut config = FrontConfig::default();
        config.blog.comments_ttl_days = MAX_TTL_DAYS;
        assert!(validate_config(&config).is_ok());

        config.blog.comments_ttl_days = 100_000_000;
        config.blog.trackbacks_ttl_days = MAX_TTL_DAYS + 1;
        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["blog.comments_ttl_days", "blog.trackbacks_ttl_days"]);
    }

    #[test]
    fn test_trusted_origin_must_be_absolute() {
        let mut config = FrontConfig::default();
        config.site.trusted_frame_origin = Some("admin.example.org".into());
        assert!(validate_config(&config).is_err());

        config.site.trusted_frame_origin = Some("https://admin.example.org/".into());
        assert!(validate_config(&config).is_ok());
    }
}
