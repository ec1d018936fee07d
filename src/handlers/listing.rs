//! Filtered listings: language, category and archive.

use std::sync::LazyLock;

use regex::Regex;

use crate::collab::{CategoryFilter, DateFilter, LangFilter, PostFilter};
use crate::document::{serve, ServeOptions};
use crate::error::FrontError;
use crate::front::{Env, Reply, RequestContext};
use crate::handlers::home::{home, list_posts, page_number};

static ARCHIVE_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/([0-9]{4})/([0-9]{2})$").expect("archive month regex should compile")
});

/// Split an optional trailing `page/N`; a zero page is not a page.
fn split_page(args: &str) -> (&str, Option<u32>) {
    match page_number(args) {
        Some((rest, n)) => (rest, Some(n)),
        None => (args, None),
    }
}

/// Posts in one language, then the home page.
pub fn lang(env: &Env<'_>, ctx: &mut RequestContext, args: Option<&str>) -> Result<Reply, FrontError> {
    let (code, page) = split_page(args.unwrap_or_default());
    if code.is_empty() {
        return Err(FrontError::NotFound);
    }

    let langs = env.blog().langs(&LangFilter {
        lang: Some(code.to_string()),
    })?;
    if langs.is_empty() {
        return Err(FrontError::NotFound);
    }

    ctx.langs = langs;
    ctx.lang = Some(code.to_string());
    if let Some(n) = page {
        ctx.page = n;
    }
    home(env, ctx, None)
}

pub fn category(
    env: &Env<'_>,
    ctx: &mut RequestContext,
    args: Option<&str>,
) -> Result<Reply, FrontError> {
    let (slug, page) = split_page(args.unwrap_or_default());
    if slug.is_empty() {
        return Err(FrontError::NotFound);
    }

    let category = env
        .blog()
        .categories(&CategoryFilter {
            url: Some(slug.to_string()),
        })?
        .into_iter()
        .next()
        .ok_or(FrontError::NotFound)?;

    if let Some(n) = page {
        ctx.page = n;
    }
    list_posts(
        env,
        ctx,
        PostFilter {
            category_url: Some(category.url.clone()),
            lang: ctx.lang.clone(),
            ..Default::default()
        },
    )?;
    ctx.categories = vec![category.clone()];
    ctx.category = Some(category);

    let response = serve(env, ctx, "category.html", ServeOptions::default())?;
    Ok(Reply::Done(response))
}

/// Archive index, or one month as `/YYYY/MM`.
pub fn archive(
    env: &Env<'_>,
    ctx: &mut RequestContext,
    args: Option<&str>,
) -> Result<Reply, FrontError> {
    let args = args.unwrap_or_default();

    if args.is_empty() {
        ctx.archives = env.blog().dates(&DateFilter::default())?;
        let response = serve(env, ctx, "archive.html", ServeOptions::default())?;
        return Ok(Reply::Done(response));
    }

    let caps = ARCHIVE_MONTH.captures(args).ok_or(FrontError::NotFound)?;
    let year = caps[1].parse::<i32>().map_err(|_| FrontError::NotFound)?;
    let month = caps[2].parse::<u32>().map_err(|_| FrontError::NotFound)?;

    let month_entry = env
        .blog()
        .dates(&DateFilter {
            year: Some(year),
            month: Some(month),
            lang: ctx.lang.clone(),
        })?
        .into_iter()
        .next()
        .ok_or(FrontError::NotFound)?;

    ctx.posts = env.blog().posts(&PostFilter {
        year: Some(year),
        month: Some(month),
        lang: ctx.lang.clone(),
        ..Default::default()
    })?;
    ctx.archives = vec![month_entry.clone()];
    ctx.archive = Some(month_entry);

    let response = serve(env, ctx, "archive_month.html", ServeOptions::default())?;
    Ok(Reply::Done(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_page() {
        assert_eq!(split_page("fr"), ("fr", None));
        assert_eq!(split_page("fr/page/2"), ("fr", Some(2)));
        assert_eq!(split_page("rust/page/0"), ("rust/page/0", None));
    }

    #[test]
    fn test_archive_month_shape() {
        assert!(ARCHIVE_MONTH.is_match("/2024/05"));
        assert!(!ARCHIVE_MONTH.is_match("/2024/5"));
        assert!(!ARCHIVE_MONTH.is_match("2024/05"));
        assert!(!ARCHIVE_MONTH.is_match("/2024/05/extra"));
    }
}
