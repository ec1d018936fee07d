//! In-memory blog store.
//!
//! Seeded from a JSON file at boot; comments live for the lifetime of the
//! process. Comment ids come from an atomic counter so concurrent submissions
//! never share an id.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Datelike, Utc};
use dashmap::DashMap;
use serde::Deserialize;

use crate::collab::blog::{
    ArchiveMonth, Blog, BlogError, Category, CategoryFilter, Comment, CommentFilter,
    CommentStatus, DateFilter, Lang, LangFilter, NewComment, Post, PostFilter, PostStatus,
    StoredComment,
};
use crate::config::BlogSettings;

/// Initial content of the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogSeed {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Comment acceptance and moderation rules.
#[derive(Debug, Clone, Copy)]
pub struct CommentPolicy {
    pub allow_comments: bool,
    pub comments_pub: bool,
    pub comments_ttl_days: u32,
    pub allow_trackbacks: bool,
    pub trackbacks_ttl_days: u32,
}

impl CommentPolicy {
    pub fn from_settings(settings: &BlogSettings) -> Self {
        Self {
            allow_comments: settings.allow_comments,
            comments_pub: settings.comments_pub,
            comments_ttl_days: settings.comments_ttl_days,
            allow_trackbacks: settings.allow_trackbacks,
            trackbacks_ttl_days: settings.trackbacks_ttl_days,
        }
    }
}

impl Default for CommentPolicy {
    fn default() -> Self {
        Self::from_settings(&BlogSettings::default())
    }
}

/// Blog store kept entirely in memory.
pub struct MemoryBlog {
    posts: RwLock<Vec<Post>>,
    categories: Vec<Category>,
    comments: DashMap<u64, Vec<Comment>>,
    next_comment_id: AtomicU64,
    policy: CommentPolicy,
    updated_at: RwLock<DateTime<Utc>>,
}

impl MemoryBlog {
    pub fn new(seed: BlogSeed, policy: CommentPolicy) -> Self {
        Self {
            posts: RwLock::new(seed.posts),
            categories: seed.categories,
            comments: DashMap::new(),
            next_comment_id: AtomicU64::new(1),
            policy,
            updated_at: RwLock::new(Utc::now()),
        }
    }

    /// Load the seed from a JSON file.
    pub fn load_from_file(path: &Path, policy: CommentPolicy) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let seed: BlogSeed = serde_json::from_reader(BufReader::new(file))?;
        tracing::info!(
            posts = seed.posts.len(),
            categories = seed.categories.len(),
            "Loaded blog seed from {}",
            path.display()
        );
        Ok(Self::new(seed, policy))
    }

    /// Comments stored for a post, oldest first.
    pub fn comments_for(&self, post_id: u64) -> Vec<Comment> {
        self.comments
            .get(&post_id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Total number of stored comments and trackbacks.
    pub fn comment_count(&self) -> usize {
        self.comments.iter().map(|r| r.value().len()).sum()
    }

    fn read_posts(&self) -> Result<RwLockReadGuard<'_, Vec<Post>>, BlogError> {
        self.posts
            .read()
            .map_err(|_| BlogError::Storage("post store lock poisoned".into()))
    }

    fn write_posts(&self) -> Result<RwLockWriteGuard<'_, Vec<Post>>, BlogError> {
        self.posts
            .write()
            .map_err(|_| BlogError::Storage("post store lock poisoned".into()))
    }

    fn touch(&self) {
        if let Ok(mut updated) = self.updated_at.write() {
            *updated = Utc::now();
        }
    }

    fn published(post: &Post) -> bool {
        post.status == PostStatus::Published
    }
}

/// A cutoff before the earliest representable date keeps the post open.
fn within_ttl(published_at: DateTime<Utc>, ttl_days: u32) -> bool {
    if ttl_days == 0 {
        return true;
    }
    chrono::Duration::try_days(i64::from(ttl_days))
        .and_then(|ttl| Utc::now().checked_sub_signed(ttl))
        .map_or(true, |cutoff| cutoff < published_at)
}

fn matches(post: &Post, filter: &PostFilter) -> bool {
    if !filter.include_unpublished && !MemoryBlog::published(post) {
        return false;
    }
    if filter.id.is_some_and(|id| id != post.id) {
        return false;
    }
    if filter.url.as_deref().is_some_and(|url| url != post.url) {
        return false;
    }
    if let Some(cat) = &filter.category_url {
        if post.category.as_deref() != Some(cat.as_str()) {
            return false;
        }
    }
    if filter.lang.as_deref().is_some_and(|lang| lang != post.lang) {
        return false;
    }
    if filter.year.is_some_and(|y| y != post.published_at.year()) {
        return false;
    }
    if filter.month.is_some_and(|m| m != post.published_at.month()) {
        return false;
    }
    if let Some(search) = &filter.search {
        let haystack = format!("{} {} {}", post.title, post.excerpt, post.content).to_lowercase();
        if !search
            .split_whitespace()
            .all(|word| haystack.contains(&word.to_lowercase()))
        {
            return false;
        }
    }
    true
}

impl Blog for MemoryBlog {
    fn posts(&self, filter: &PostFilter) -> Result<Vec<Post>, BlogError> {
        let posts = self.read_posts()?;
        let mut selected: Vec<Post> = posts.iter().filter(|p| matches(p, filter)).cloned().collect();
        selected.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(selected
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect())
    }

    fn count_posts(&self, filter: &PostFilter) -> Result<usize, BlogError> {
        Ok(self.read_posts()?.iter().filter(|p| matches(p, filter)).count())
    }

    fn categories(&self, filter: &CategoryFilter) -> Result<Vec<Category>, BlogError> {
        let posts = self.read_posts()?;
        Ok(self
            .categories
            .iter()
            .filter(|c| filter.url.as_deref().map_or(true, |url| url == c.url))
            .map(|c| Category {
                post_count: posts
                    .iter()
                    .filter(|p| Self::published(p) && p.category.as_deref() == Some(c.url.as_str()))
                    .count(),
                ..c.clone()
            })
            .collect())
    }

    fn dates(&self, filter: &DateFilter) -> Result<Vec<ArchiveMonth>, BlogError> {
        let posts = self.read_posts()?;
        let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
        for post in posts.iter().filter(|p| Self::published(p)) {
            let (year, month) = (post.published_at.year(), post.published_at.month());
            if filter.year.is_some_and(|y| y != year)
                || filter.month.is_some_and(|m| m != month)
                || filter.lang.as_deref().is_some_and(|l| l != post.lang)
            {
                continue;
            }
            *months.entry((year, month)).or_default() += 1;
        }
        Ok(months
            .into_iter()
            .rev()
            .map(|((year, month), post_count)| ArchiveMonth {
                year,
                month,
                post_count,
            })
            .collect())
    }

    fn langs(&self, filter: &LangFilter) -> Result<Vec<Lang>, BlogError> {
        let posts = self.read_posts()?;
        let mut langs: BTreeMap<&str, usize> = BTreeMap::new();
        for post in posts.iter().filter(|p| Self::published(p) && !p.lang.is_empty()) {
            if filter.lang.as_deref().is_some_and(|l| l != post.lang) {
                continue;
            }
            *langs.entry(post.lang.as_str()).or_default() += 1;
        }
        Ok(langs
            .into_iter()
            .map(|(code, post_count)| Lang {
                code: code.to_string(),
                post_count,
            })
            .collect())
    }

    fn comments(&self, filter: &CommentFilter) -> Result<Vec<Comment>, BlogError> {
        let posts = self.read_posts()?;
        let visible = |post_id: u64| {
            posts.iter().find(|p| p.id == post_id).is_some_and(|post| {
                if filter.post_id.is_none()
                    && (!Self::published(post) || post.password().is_some())
                {
                    return false;
                }
                filter
                    .category_url
                    .as_deref()
                    .map_or(true, |cat| post.category.as_deref() == Some(cat))
                    && filter.lang.as_deref().map_or(true, |lang| lang == post.lang)
            })
        };

        let mut selected: Vec<Comment> = self
            .comments
            .iter()
            .filter(|entry| filter.post_id.map_or(true, |id| id == *entry.key()))
            .filter(|entry| visible(*entry.key()))
            .flat_map(|entry| entry.value().clone())
            .filter(|c| !filter.published_only || c.status == CommentStatus::Published)
            .collect();

        selected.sort_by_key(|c| c.id);
        if filter.newest_first {
            selected.reverse();
        }
        selected.truncate(filter.limit.unwrap_or(usize::MAX));
        Ok(selected)
    }

    fn insert_comment(&self, comment: NewComment) -> Result<StoredComment, BlogError> {
        if !self.read_posts()?.iter().any(|p| p.id == comment.post_id) {
            return Err(BlogError::UnknownPost(comment.post_id));
        }

        let id = self.next_comment_id.fetch_add(1, Ordering::SeqCst);
        let status = comment.status.unwrap_or(if self.policy.comments_pub {
            CommentStatus::Published
        } else {
            CommentStatus::Pending
        });

        self.comments.entry(comment.post_id).or_default().push(Comment {
            id,
            post_id: comment.post_id,
            author: comment.author,
            email: comment.email,
            site: comment.site,
            content: comment.content,
            ip: comment.ip,
            trackback: comment.trackback,
            status,
            created_at: Utc::now(),
        });
        self.touch();

        Ok(StoredComment { id, status })
    }

    fn comments_accepted_for(&self, post: &Post) -> bool {
        post.comments_open
            && self.policy.allow_comments
            && within_ttl(post.published_at, self.policy.comments_ttl_days)
    }

    fn trackbacks_accepted_for(&self, post: &Post) -> bool {
        post.trackbacks_open
            && self.policy.allow_trackbacks
            && within_ttl(post.published_at, self.policy.trackbacks_ttl_days)
    }

    fn publish_due_posts(&self) -> Result<usize, BlogError> {
        let now = Utc::now();
        let mut published = 0;
        for post in self.write_posts()?.iter_mut() {
            if post.status == PostStatus::Scheduled && post.published_at <= now {
                post.status = PostStatus::Published;
                published += 1;
            }
        }
        if published > 0 {
            tracing::info!(count = published, "Published scheduled posts");
            self.touch();
        }
        Ok(published)
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
            .read()
            .map(|t| *t)
            .unwrap_or_else(|e| *e.into_inner())
    }
}
