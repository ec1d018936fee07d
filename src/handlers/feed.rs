//! Atom and RSS 2 feeds.
//!
//! Feed paths, after an optional `xx[-yy]/` language prefix:
//!
//! | path                              | template              |
//! |-----------------------------------|-----------------------|
//! | `rss2/xslt`                       | `rss2.xsl`            |
//! | `{atom,rss2}/comments/{id}`       | `{type}-comments.xml` |
//! | `[category/{slug}/]{atom,rss2}`   | `{type}.xml`          |
//! | `[category/{slug}/]{atom,rss2}/comments` | `{type}-comments.xml` |

use std::sync::LazyLock;

use axum::http::HeaderValue;
use regex::Regex;

use crate::collab::{CategoryFilter, CommentFilter, LangFilter, PostFilter};
use crate::document::{serve, ServeOptions};
use crate::error::FrontError;
use crate::front::{Env, Reply, RequestContext};
use crate::handlers::home::publish_due_posts;
use crate::security::headers::{robots_policy, X_ROBOTS_TAG};

static LANG_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]{2}(?:-[a-z]{2})?)/(.*)$").expect("feed lang regex should compile")
});

static POST_COMMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(atom|rss2)/comments/([0-9]+)$").expect("post comments feed regex should compile")
});

static ENTRIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:category/(.+)/)?(atom|rss2)(/comments)?$").expect("feed regex should compile")
});

const STYLESHEET: &str = "rss2/xslt";
const STYLESHEET_MAX_AGE_SECS: u64 = 60 * 60;

/// What a feed path asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedKind {
    Stylesheet,
    PostComments { format: String, post_id: u64 },
    Entries {
        format: String,
        category: Option<String>,
        comments: bool,
    },
}

impl FeedKind {
    /// Classify a feed path without its language prefix.
    pub fn parse(path: &str) -> Option<Self> {
        if path == STYLESHEET {
            return Some(FeedKind::Stylesheet);
        }
        if let Some(caps) = POST_COMMENTS.captures(path) {
            return Some(FeedKind::PostComments {
                format: caps[1].to_string(),
                post_id: caps[2].parse().ok()?,
            });
        }
        ENTRIES.captures(path).map(|caps| FeedKind::Entries {
            format: caps[2].to_string(),
            category: caps.get(1).map(|m| m.as_str().to_string()),
            comments: caps.get(3).is_some(),
        })
    }
}

/// Template and MIME type of a feed.
pub fn feed_template(format: &str, comments: bool) -> (String, &'static str) {
    let template = if comments {
        format!("{format}-comments.xml")
    } else {
        format!("{format}.xml")
    };
    let mime = if format == "atom" {
        "application/atom+xml"
    } else {
        "application/xml"
    };
    (template, mime)
}

pub fn feed(env: &Env<'_>, ctx: &mut RequestContext, args: Option<&str>) -> Result<Reply, FrontError> {
    let mut path = args.unwrap_or_default();

    if let Some(caps) = LANG_PREFIX.captures(path) {
        let code = caps.get(1).map_or("", |m| m.as_str());
        let langs = env.blog().langs(&LangFilter {
            lang: Some(code.to_string()),
        })?;
        if langs.is_empty() {
            return Err(FrontError::NotFound);
        }
        ctx.langs = langs;
        ctx.lang = Some(code.to_string());
        path = caps.get(2).map_or("", |m| m.as_str());
    }

    let kind = FeedKind::parse(path).ok_or(FrontError::NotFound)?;
    let (format, comments, category, post_id) = match kind {
        FeedKind::Stylesheet => {
            let options = ServeOptions {
                max_age_secs: STYLESHEET_MAX_AGE_SECS,
                ..ServeOptions::with_content_type("text/xml")
            };
            let response = serve(env, ctx, "rss2.xsl", options)?;
            return Ok(Reply::Done(response));
        }
        FeedKind::PostComments { format, post_id } => (format, true, None, Some(post_id)),
        FeedKind::Entries {
            format,
            category,
            comments,
        } => (format, comments, category, None),
    };

    if let Some(slug) = &category {
        let found = env
            .blog()
            .categories(&CategoryFilter {
                url: Some(slug.clone()),
            })?
            .into_iter()
            .next()
            .ok_or(FrontError::NotFound)?;
        ctx.feed_subtitle = Some(format!(" - {}", found.title));
        ctx.categories = vec![found.clone()];
        ctx.category = Some(found);
    } else if let Some(id) = post_id {
        let found = env
            .blog()
            .posts(&PostFilter {
                id: Some(id),
                limit: Some(1),
                ..Default::default()
            })?
            .into_iter()
            .next()
            .ok_or(FrontError::NotFound)?;
        ctx.feed_subtitle = Some(format!(" - {}", found.title));
        ctx.post_url = Some(env.site().url_for("post", &found.url));
        ctx.post = Some(found);
    }

    if comments {
        ctx.comments_per_page = Some(env.settings.nb_comment_per_feed);
        let locked = ctx.post.as_ref().is_some_and(|p| p.password().is_some());
        if !locked {
            ctx.comments = env.blog().comments(&CommentFilter {
                post_id,
                category_url: category.clone(),
                lang: ctx.lang.clone(),
                published_only: true,
                newest_first: true,
                limit: Some(env.settings.nb_comment_per_feed as usize),
            })?;
        }
    } else {
        ctx.entries_per_page = Some(env.settings.nb_post_per_feed);
        ctx.short_feed_items = env.settings.short_feed_items;
        ctx.posts = env.blog().posts(&PostFilter {
            category_url: category.clone(),
            lang: ctx.lang.clone(),
            limit: Some(env.settings.nb_post_per_feed as usize),
            ..Default::default()
        })?;
    }

    let robots = robots_policy(&env.settings.robots_policy, "");
    if let Ok(value) = HeaderValue::from_str(&robots) {
        ctx.extra_headers.insert(X_ROBOTS_TAG, value);
    }

    let (template, mime) = feed_template(&format, comments);
    let response = serve(env, ctx, &template, ServeOptions::with_content_type(mime))?;

    if !comments && category.is_none() {
        publish_due_posts(env);
    }
    Ok(Reply::Done(response))
}
