//! Blog data collaborator.
//!
//! The front only reads blog content and hands new comments over; storage,
//! id assignment and moderation belong to the implementation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    #[default]
    Published,
    Pending,
    Scheduled,
    Unpublished,
}

fn yes() -> bool {
    true
}

/// A blog entry as seen by the public side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    /// URL slug, unique per blog.
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub lang: String,
    /// Category url, if any.
    #[serde(default)]
    pub category: Option<String>,
    /// Never rendered.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default)]
    pub status: PostStatus,
    pub published_at: DateTime<Utc>,
    #[serde(default = "yes")]
    pub comments_open: bool,
    #[serde(default = "yes")]
    pub trackbacks_open: bool,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
}

impl Post {
    /// The post password, when one is set.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub post_count: usize,
}

/// One month of the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMonth {
    pub year: i32,
    pub month: u32,
    pub post_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lang {
    pub code: String,
    pub post_count: usize,
}

/// Post selection.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub id: Option<u64>,
    pub url: Option<String>,
    pub category_url: Option<String>,
    pub lang: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub search: Option<String>,
    /// Preview mode: pending, scheduled and unpublished posts are visible.
    pub include_unpublished: bool,
    pub limit: Option<usize>,
    pub offset: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DateFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LangFilter {
    pub lang: Option<String>,
}

/// Moderation state of a stored comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Published,
    Pending,
    Spam,
}

/// A comment about to be inserted.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub post_id: u64,
    pub author: String,
    pub email: String,
    pub site: String,
    pub content: String,
    pub ip: Option<String>,
    pub trackback: bool,
    /// Forced status; `None` lets the store apply the blog's moderation default.
    pub status: Option<CommentStatus>,
}

/// A stored comment or trackback.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub author: String,
    #[serde(skip)]
    pub email: String,
    pub site: String,
    pub content: String,
    #[serde(skip)]
    pub ip: Option<String>,
    pub trackback: bool,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
}

/// Comment selection.
///
/// Without `post_id`, only comments of published posts without a password
/// are returned.
#[derive(Debug, Clone, Default)]
pub struct CommentFilter {
    pub post_id: Option<u64>,
    pub category_url: Option<String>,
    pub lang: Option<String>,
    pub published_only: bool,
    pub newest_first: bool,
    pub limit: Option<usize>,
}

/// Result of a successful insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredComment {
    pub id: u64,
    pub status: CommentStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    #[error("post {0} does not exist")]
    UnknownPost(u64),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Read access to blog content plus the comment insert path.
///
/// Implementations must serialize comment id assignment.
pub trait Blog: Send + Sync {
    fn posts(&self, filter: &PostFilter) -> Result<Vec<Post>, BlogError>;

    /// Number of posts matching `filter`, ignoring limit and offset.
    fn count_posts(&self, filter: &PostFilter) -> Result<usize, BlogError>;

    fn categories(&self, filter: &CategoryFilter) -> Result<Vec<Category>, BlogError>;

    fn dates(&self, filter: &DateFilter) -> Result<Vec<ArchiveMonth>, BlogError>;

    fn langs(&self, filter: &LangFilter) -> Result<Vec<Lang>, BlogError>;

    fn comments(&self, filter: &CommentFilter) -> Result<Vec<Comment>, BlogError>;

    fn insert_comment(&self, comment: NewComment) -> Result<StoredComment, BlogError>;

    /// Post flag, blog flag and age cutoff.
    fn comments_accepted_for(&self, post: &Post) -> bool;

    fn trackbacks_accepted_for(&self, post: &Post) -> bool;

    /// Publish scheduled posts whose date has passed. Returns how many changed.
    fn publish_due_posts(&self) -> Result<usize, BlogError>;

    /// Last content change, used for HTTP cache validation.
    fn updated_at(&self) -> DateTime<Utc>;
}
