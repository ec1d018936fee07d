//! Single post and its signed preview.

use std::sync::LazyLock;

use axum::http::{header, HeaderName, HeaderValue};
use regex::Regex;

use crate::collab::{CommentFilter, PostFilter};
use crate::comments;
use crate::document::{serve, ServeOptions};
use crate::error::FrontError;
use crate::front::{Env, Reply, RequestContext};
use crate::security::password::{self, GateOutcome};

/// `user/key/slug` where key is 40 lowercase hex digits.
static PREVIEW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)/([0-9a-f]{40})/(.+?)$").expect("preview regex should compile")
});

const X_PINGBACK: HeaderName = HeaderName::from_static("x-pingback");

/// Permission levels allowed to preview.
const PREVIEW_LEVELS: &[&str] = &["usage", "contentadmin"];

pub fn post(env: &Env<'_>, ctx: &mut RequestContext, args: Option<&str>) -> Result<Reply, FrontError> {
    let slug = args.filter(|a| !a.is_empty()).ok_or(FrontError::NotFound)?;

    let post = env
        .blog()
        .posts(&PostFilter {
            url: Some(slug.to_string()),
            include_unpublished: ctx.preview,
            limit: Some(1),
            ..Default::default()
        })?
        .into_iter()
        .next()
        .ok_or(FrontError::NotFound)?;

    ctx.post_url = Some(env.site().url_for("post", &post.url));
    ctx.post = Some(post.clone());
    ctx.posts = vec![post.clone()];

    if let Some(secret) = post.password() {
        if !ctx.preview {
            match password::check(env.req, post.id, secret, env.site().base_path()) {
                GateOutcome::Open { set_cookie } => {
                    if let Some(cookie) = set_cookie {
                        ctx.extra_headers.append(header::SET_COOKIE, cookie);
                    }
                }
                GateOutcome::Locked => {
                    tracing::debug!(post_id = post.id, "Password required");
                    ctx.post = None;
                    ctx.posts.clear();
                    let response = serve(env, ctx, "password-form.html", ServeOptions::uncached())?;
                    return Ok(Reply::Done(response));
                }
            }
        }
    }

    if let Some(reply) = comments::process(env, ctx, &post) {
        return Ok(reply);
    }

    if env.blog().trackbacks_accepted_for(&post) {
        if let Ok(value) = HeaderValue::from_str(&env.site().xmlrpc_url()) {
            ctx.extra_headers.insert(X_PINGBACK, value);
        }
        let link = format!("<{}>; rel=\"webmention\"", env.site().url_for("webmention", ""));
        if let Ok(value) = HeaderValue::from_str(&link) {
            ctx.extra_headers.append(header::LINK, value);
        }
    }

    ctx.comments = env.blog().comments(&CommentFilter {
        post_id: Some(post.id),
        published_only: true,
        ..Default::default()
    })?;

    let response = serve(env, ctx, "post.html", ServeOptions::default())?;
    Ok(Reply::Done(response))
}

/// Preview through a signed `user/key/slug` URL, then the post handler.
pub fn preview(
    env: &Env<'_>,
    ctx: &mut RequestContext,
    args: Option<&str>,
) -> Result<Reply, FrontError> {
    let caps = args
        .and_then(|a| PREVIEW.captures(a))
        .ok_or(FrontError::NotFound)?;
    let (user_id, key, slug) = (&caps[1], &caps[2], &caps[3]);

    let auth = &env.services().auth;
    if !auth.check_user_key(user_id, key) || !auth.check_permission(user_id, PREVIEW_LEVELS) {
        tracing::info!(user = user_id, "Rejected preview request");
        return Err(FrontError::NotFound);
    }

    ctx.preview = true;
    ctx.frame_origin = env.site().trusted_frame_origin().map(str::to_string);
    post(env, ctx, Some(slug))
}
