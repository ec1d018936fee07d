//! Per-request context.
//!
//! Created when dispatch starts, filled by handlers, serialized for the
//! template and dropped with the response.

use std::path::PathBuf;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::collab::{ArchiveMonth, Category, Comment, Lang, Post};
use crate::comments::CommentDraft;

/// Dependencies of a document for Last-Modified computation.
#[derive(Debug, Clone)]
pub struct CachePlan {
    pub files: Vec<PathBuf>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub use_etag: bool,
}

impl Default for CachePlan {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            timestamps: Vec::new(),
            use_etag: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestContext {
    /// Resolved route type, `default` for the default handler.
    pub route: String,
    pub args: Option<String>,
    pub page: u32,
    pub lang: Option<String>,
    pub preview: bool,
    pub feed_subtitle: Option<String>,
    pub form_error: Option<String>,
    pub comment_preview: Option<CommentDraft>,

    pub search: Option<String>,
    pub search_count: usize,

    pub post: Option<Post>,
    pub post_url: Option<String>,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub category: Option<Category>,
    pub categories: Vec<Category>,
    pub archive: Option<ArchiveMonth>,
    pub archives: Vec<ArchiveMonth>,
    pub langs: Vec<Lang>,

    /// Origin allowed to frame this document (preview).
    pub frame_origin: Option<String>,
    pub current_template: String,
    pub content_type: String,
    pub http_cache: bool,
    pub http_etag: bool,

    pub entries_per_page: Option<u32>,
    pub comments_per_page: Option<u32>,
    pub short_feed_items: bool,

    pub blog_url: String,

    #[serde(skip)]
    pub cache_plan: CachePlan,

    /// Handler-declared response headers, merged by the document server.
    #[serde(skip)]
    pub extra_headers: HeaderMap,
}

impl RequestContext {
    pub fn new(route: impl Into<String>, args: Option<String>) -> Self {
        Self {
            route: route.into(),
            args,
            page: 1,
            http_cache: true,
            http_etag: true,
            ..Default::default()
        }
    }
}
