//! Home, static home and search.

use std::sync::LazyLock;

use regex::Regex;

use crate::collab::PostFilter;
use crate::document::{serve, ServeOptions};
use crate::error::FrontError;
use crate::front::{Env, Reply, RequestContext};

static PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|/)page/([0-9]+)$").expect("page regex should compile"));

/// Split a trailing `page/N` segment off `args`.
///
/// Returns what precedes the segment and `N`, or `None` when there is no such
/// segment or `N` is zero.
pub fn page_number(args: &str) -> Option<(&str, u32)> {
    let caps = PAGE.captures(args)?;
    let n = caps[2].parse::<u32>().ok().filter(|n| *n > 0)?;
    let start = caps.get(0)?.start();
    Some((&args[..start], n))
}

/// Fill `ctx.posts` with one page of posts matching `filter`.
pub(crate) fn list_posts(
    env: &Env<'_>,
    ctx: &mut RequestContext,
    filter: PostFilter,
) -> Result<(), FrontError> {
    let per_page = *ctx
        .entries_per_page
        .get_or_insert(env.settings.nb_post_per_page);
    let per_page = per_page.max(1) as usize;
    ctx.posts = env.blog().posts(&PostFilter {
        limit: Some(per_page),
        offset: (ctx.page.max(1) as usize - 1) * per_page,
        ..filter
    })?;
    Ok(())
}

/// Publish scheduled posts whose date has passed; failures only get logged.
pub(crate) fn publish_due_posts(env: &Env<'_>) {
    if let Err(e) = env.blog().publish_due_posts() {
        tracing::warn!(error = %e, "Failed to publish scheduled posts");
    }
}

fn wants_search(env: &Env<'_>) -> bool {
    env.req.query_param("q").is_some_and(|q| !q.trim().is_empty())
}

/// Paginated post list. Only `page/N` is accepted as an argument.
pub fn home(env: &Env<'_>, ctx: &mut RequestContext, args: Option<&str>) -> Result<Reply, FrontError> {
    if let Some(args) = args.filter(|a| !a.is_empty()) {
        match page_number(args) {
            Some(("", n)) => ctx.page = n,
            _ => return Err(FrontError::NotFound),
        }
    }

    if wants_search(env) {
        return search(env, ctx);
    }

    list_posts(
        env,
        ctx,
        PostFilter {
            lang: ctx.lang.clone(),
            ..Default::default()
        },
    )?;
    let response = serve(env, ctx, "home.html", ServeOptions::default())?;
    publish_due_posts(env);
    Ok(Reply::Done(response))
}

/// Static home page; the post list lives under the `posts` route.
pub fn static_home(
    env: &Env<'_>,
    ctx: &mut RequestContext,
    args: Option<&str>,
) -> Result<Reply, FrontError> {
    if args.is_some_and(|a| !a.is_empty()) {
        return Err(FrontError::NotFound);
    }
    if wants_search(env) {
        return search(env, ctx);
    }

    ctx.route = "static".to_string();
    let response = serve(env, ctx, "static.html", ServeOptions::default())?;
    publish_due_posts(env);
    Ok(Reply::Done(response))
}

pub fn search(env: &Env<'_>, ctx: &mut RequestContext) -> Result<Reply, FrontError> {
    if env.settings.no_search {
        return Err(FrontError::NotFound);
    }

    ctx.route = "search".to_string();
    let query = env
        .req
        .query_param("q")
        .map(|q| q.trim().to_string())
        .unwrap_or_default();

    if !query.is_empty() {
        let filter = PostFilter {
            search: Some(query.clone()),
            lang: ctx.lang.clone(),
            ..Default::default()
        };
        ctx.search_count = env.blog().count_posts(&filter)?;
        list_posts(env, ctx, filter)?;
    }
    ctx.search = Some(query);

    let response = serve(env, ctx, "search.html", ServeOptions::default())?;
    Ok(Reply::Done(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number() {
        assert_eq!(page_number("page/2"), Some(("", 2)));
        assert_eq!(page_number("/page/12"), Some(("", 12)));
        assert_eq!(page_number("fr/page/3"), Some(("fr", 3)));
        assert_eq!(page_number("page/0"), None);
        assert_eq!(page_number("page/"), None);
        assert_eq!(page_number("pages/2"), None);
        assert_eq!(page_number("mypage/2"), None);
        assert_eq!(page_number("page/2/extra"), None);
    }
}
