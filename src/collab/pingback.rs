//! Inbound trackbacks and webmentions.
//!
//! Both land as trackback comments on the target post, subject to the post's
//! trackback acceptance.

use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::collab::blog::{Blog, NewComment, Post, PostFilter};
use crate::collab::templates::escape_html;
use crate::http::PublicRequest;

const EXCERPT_MAX_CHARS: usize = 255;

pub trait Pings: Send + Sync {
    fn receive_trackback(&self, req: &PublicRequest, post_id: u64) -> Response;

    fn receive_webmention(&self, req: &PublicRequest) -> Response;
}

/// Ping receiver writing into the blog store.
pub struct PingReceiver {
    blog: Arc<dyn Blog>,
    /// Public URL prefix of posts, e.g. `https://blog.example.org/post/`.
    post_prefix: String,
}

impl PingReceiver {
    pub fn new(blog: Arc<dyn Blog>, post_prefix: impl Into<String>) -> Self {
        Self {
            blog,
            post_prefix: post_prefix.into(),
        }
    }

    fn accepting_post(&self, filter: PostFilter) -> Option<Post> {
        self.blog
            .posts(&PostFilter {
                limit: Some(1),
                ..filter
            })
            .ok()?
            .into_iter()
            .next()
            .filter(|post| self.blog.trackbacks_accepted_for(post))
    }
}

fn trackback_reply(error: Option<&str>) -> Response {
    let body = match error {
        None => "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<response>\n  <error>0</error>\n</response>\n".to_string(),
        Some(message) => format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<response>\n  <error>1</error>\n  <message>{}</message>\n</response>\n",
            escape_html(message)
        ),
    };
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml; charset=UTF-8")],
        body,
    )
        .into_response()
}

fn is_web_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

impl Pings for PingReceiver {
    fn receive_trackback(&self, req: &PublicRequest, post_id: u64) -> Response {
        if !req.is_post() {
            return trackback_reply(Some("Trackback pings must be sent with POST"));
        }
        let Some(source) = req.form_field("url").filter(|u| is_web_url(u)) else {
            return trackback_reply(Some("A valid url parameter is required"));
        };
        let Some(post) = self.accepting_post(PostFilter {
            id: Some(post_id),
            ..Default::default()
        }) else {
            return trackback_reply(Some("Trackbacks are not allowed for this post or weblog"));
        };

        let title = req.form_field("title").filter(|t| !t.is_empty()).unwrap_or(source);
        let excerpt = truncate_chars(req.form_field("excerpt").unwrap_or_default(), EXCERPT_MAX_CHARS);
        let blog_name = req
            .form_field("blog_name")
            .filter(|n| !n.is_empty())
            .unwrap_or("Anonymous blog");

        let comment = NewComment {
            post_id: post.id,
            author: blog_name.to_string(),
            email: String::new(),
            site: source.to_string(),
            content: format!(
                "<p><strong>{}</strong></p>\n<p>{}</p>",
                escape_html(title),
                escape_html(&excerpt)
            ),
            ip: req.client_ip(),
            trackback: true,
            status: None,
        };

        match self.blog.insert_comment(comment) {
            Ok(stored) => {
                tracing::info!(post_id = post.id, comment_id = stored.id, "Trackback received");
                trackback_reply(None)
            }
            Err(e) => {
                tracing::error!(post_id = post.id, error = %e, "Failed to store trackback");
                trackback_reply(Some("Unable to store the trackback"))
            }
        }
    }

    fn receive_webmention(&self, req: &PublicRequest) -> Response {
        let bad_request = |message: &'static str| (StatusCode::BAD_REQUEST, message).into_response();

        if !req.is_post() {
            return bad_request("Webmentions must be sent with POST");
        }
        let (Some(source), Some(target)) = (req.form_field("source"), req.form_field("target")) else {
            return bad_request("source and target are required");
        };
        if !is_web_url(source) || !is_web_url(target) || source == target {
            return bad_request("source and target must be distinct http(s) URLs");
        }
        let Some(slug) = target
            .strip_prefix(self.post_prefix.as_str())
            .map(|s| s.split(['?', '#']).next().unwrap_or_default())
            .filter(|s| !s.is_empty())
        else {
            return bad_request("target is not a post of this blog");
        };
        let Some(post) = self.accepting_post(PostFilter {
            url: Some(slug.to_string()),
            ..Default::default()
        }) else {
            return bad_request("target does not accept webmentions");
        };

        let comment = NewComment {
            post_id: post.id,
            author: Url::parse(source)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_default(),
            email: String::new(),
            site: source.to_string(),
            content: format!("<p>Mentioned at {}</p>", escape_html(source)),
            ip: req.client_ip(),
            trackback: true,
            status: None,
        };

        match self.blog.insert_comment(comment) {
            Ok(stored) => {
                tracing::info!(post_id = post.id, comment_id = stored.id, "Webmention received");
                StatusCode::ACCEPTED.into_response()
            }
            Err(e) => {
                tracing::error!(post_id = post.id, error = %e, "Failed to store webmention");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
