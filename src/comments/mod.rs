//! Comment submission.
//!
//! # Data Flow
//! ```text
//! POST post/{slug} with c_name, c_mail, c_site, c_content
//!     → honeypot (f_mail filled ⇒ 412, cycle ends)
//!     → transform hook, else markup + sanitize
//!     → CommentDraft in the request context
//!     → preview ⇒ stop, nothing stored
//!     → email check, before hook, Blog::insert_comment, after hook
//!     → 302 to the post URL with pub=0|1
//! ```
//!
//! # Design Decisions
//! - Comment ids and moderation status come from the blog store
//! - Validation failures re-render the page with the input preserved

pub mod pipeline;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::http::PublicRequest;

pub use pipeline::process;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email regex should compile")
});

/// A submitted comment as redisplayed to its author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentDraft {
    pub author: String,
    pub email: String,
    pub site: String,
    pub raw_content: String,
    pub content: String,
    pub preview: bool,
}

/// The fields of a comment form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentForm<'a> {
    pub name: &'a str,
    pub mail: &'a str,
    pub site: &'a str,
    pub content: &'a str,
    pub preview: bool,
    /// Hidden field only bots fill in.
    pub honeypot: Option<&'a str>,
}

impl<'a> CommentForm<'a> {
    /// `None` unless all four comment fields were posted.
    pub fn from_request(req: &'a PublicRequest) -> Option<Self> {
        Some(Self {
            name: req.form_field("c_name")?,
            mail: req.form_field("c_mail")?,
            site: req.form_field("c_site")?,
            content: req.form_field("c_content")?,
            preview: req.form_field("preview").is_some_and(|v| !v.is_empty()),
            honeypot: req.form_field("f_mail"),
        })
    }

    pub fn is_spam_trap_filled(&self) -> bool {
        self.honeypot.is_some_and(|v| !v.is_empty())
    }
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{header, HeaderMap, HeaderValue, Method};

    fn form(body: &'static str) -> PublicRequest {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        PublicRequest::new(Method::POST, "/post/x".parse().unwrap(), headers, Bytes::from(body))
    }

    #[test]
    fn test_email_validation() {
        assert!(is_email("a@b.co"));
        assert!(is_email("first.last+tag@sub.example.org"));
        assert!(!is_email("a@b"));
        assert!(!is_email("not an email"));
        assert!(!is_email(""));
    }

    #[test]
    fn test_form_requires_all_fields() {
        let req = form("c_name=A&c_mail=a%40b.co&c_site=&c_content=hi");
        let parsed = CommentForm::from_request(&req).unwrap();
        assert_eq!(parsed.name, "A");
        assert!(!parsed.preview);
        assert!(!parsed.is_spam_trap_filled());

        let partial = form("c_name=A&c_mail=a%40b.co&c_content=hi");
        assert!(CommentForm::from_request(&partial).is_none());
    }

    #[test]
    fn test_preview_and_honeypot_flags() {
        let req = form("c_name=A&c_mail=a%40b.co&c_site=&c_content=hi&preview=Preview&f_mail=x");
        let parsed = CommentForm::from_request(&req).unwrap();
        assert!(parsed.preview);
        assert!(parsed.is_spam_trap_filled());

        let empty_trap = form("c_name=A&c_mail=a%40b.co&c_site=&c_content=hi&f_mail=");
        assert!(!CommentForm::from_request(&empty_trap).unwrap().is_spam_trap_filled());
    }
}
