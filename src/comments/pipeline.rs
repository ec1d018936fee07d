//! The comment pipeline run by the post handler.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::collab::{CommentStatus, MarkupMode, NewComment, Post};
use crate::comments::{is_email, CommentDraft, CommentForm};
use crate::front::{Env, Reply, RequestContext};
use crate::observability::metrics;

/// Body of the honeypot rejection.
pub const HONEYPOT_MESSAGE: &str = "So Long, and Thanks For All the Fish";

/// Handle a comment submission on `post`.
///
/// Returns a reply only when the cycle must end here (honeypot or redirect).
/// `None` means the post page should be rendered, possibly with a preview or
/// a form error in `ctx`.
pub fn process(env: &Env<'_>, ctx: &mut RequestContext, post: &Post) -> Option<Reply> {
    let form = CommentForm::from_request(env.req)?;
    if !env.blog().comments_accepted_for(post) {
        return None;
    }

    if form.is_spam_trap_filled() {
        tracing::info!(
            post_id = post.id,
            ip = ?env.req.client_ip(),
            "Spam trap triggered, rejecting comment"
        );
        metrics::record_comment("honeypot");
        return Some(Reply::Halt(honeypot_response()));
    }

    let content = if form.content.is_empty() {
        String::new()
    } else {
        let html = env.behaviors().transform_comment(form.content).unwrap_or_else(|| {
            let mode = if env.settings.wiki_comments {
                MarkupMode::Rich
            } else {
                MarkupMode::Restricted
            };
            env.services().markup.to_html(form.content, mode)
        });
        env.services().markup.sanitize(&html)
    };

    ctx.comment_preview = Some(CommentDraft {
        author: form.name.to_string(),
        email: form.mail.to_string(),
        site: form.site.to_string(),
        raw_content: form.content.to_string(),
        content: content.clone(),
        preview: form.preview,
    });

    if form.preview {
        metrics::record_comment("preview");
        return None;
    }

    let mut comment = NewComment {
        post_id: post.id,
        author: form.name.to_string(),
        email: form.mail.trim().to_string(),
        site: form.site.trim().to_string(),
        content,
        ip: env.req.client_ip(),
        trackback: false,
        status: None,
    };

    if !is_email(&comment.email) {
        ctx.form_error = Some("You must provide a valid email address.".to_string());
        metrics::record_comment("invalid");
        return None;
    }
    if let Err(message) = env.behaviors().before_comment_create(&mut comment) {
        ctx.form_error = Some(message);
        metrics::record_comment("rejected");
        return None;
    }

    let stored = match env.blog().insert_comment(comment.clone()) {
        Ok(stored) => stored,
        Err(e) => {
            tracing::error!(post_id = post.id, error = %e, "Failed to store comment");
            ctx.form_error = Some("Your comment could not be saved.".to_string());
            metrics::record_comment("error");
            return None;
        }
    };
    env.behaviors().after_comment_create(&comment, &stored);

    let published = stored.status == CommentStatus::Published;
    metrics::record_comment(if published { "published" } else { "pending" });
    tracing::info!(
        post_id = post.id,
        comment_id = stored.id,
        status = ?stored.status,
        "Comment stored"
    );

    let suffix: String = env
        .behaviors()
        .comment_redirect_suffix(&stored)
        .chars()
        .filter(|c| is_url_safe(*c))
        .collect();
    let location = format!(
        "{}{}pub={}{}",
        env.site().url_for("post", &post.url),
        env.site().redirect_separator(),
        u8::from(published),
        suffix
    );

    Some(Reply::Halt(redirect(&location, ctx)))
}

fn honeypot_response() -> Response {
    (
        StatusCode::PRECONDITION_FAILED,
        [(header::CONTENT_TYPE, "text/plain; charset=UTF-8")],
        HONEYPOT_MESSAGE,
    )
        .into_response()
}

/// 302 carrying any headers the handler already declared (e.g. the password cookie).
fn redirect(location: &str, ctx: &mut RequestContext) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    let headers = response.headers_mut();
    for (name, value) in std::mem::take(&mut ctx.extra_headers).iter() {
        headers.append(name.clone(), value.clone());
    }
    if let Ok(value) = HeaderValue::from_str(location) {
        headers.insert(header::LOCATION, value);
    }
    response
}

fn is_url_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~:/?#[]@!$&'()*+,;=%".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_safe_filter() {
        let filtered: String = "#c12 <script>".chars().filter(|c| is_url_safe(*c)).collect();
        assert_eq!(filtered, "#c12script");
    }

    #[test]
    fn test_honeypot_response() {
        let response = honeypot_response();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=UTF-8"
        );
    }
}
