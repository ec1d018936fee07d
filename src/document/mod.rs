//! Document server: template resolution, conditional GET and rendering.
//!
//! # Data Flow
//! ```text
//! serve(template, options)
//!     → fill per-page defaults
//!     → resolve template (missing ⇒ configuration error, never 404)
//!     → before_get_data hook
//!     → Last-Modified check ⇒ 304 before rendering
//!     → Content-Type, handler headers, security headers, document_headers hook
//!     → render, serve_document hook
//!     → ETag check ⇒ 304, else 200 with ETag
//! ```
//!
//! # Design Decisions
//! - POST responses are never cached
//! - The Last-Modified check runs before the renderer is invoked

pub mod cache;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;

use crate::collab::RenderedDocument;
use crate::error::FrontError;
use crate::front::{Env, RequestContext};
use crate::security::apply_security_headers;

/// How a template is served.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub content_type: String,
    pub http_cache: bool,
    pub etag: bool,
    pub status: StatusCode,
    /// `max-age` sent with `Last-Modified`.
    pub max_age_secs: u64,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            content_type: "text/html".to_string(),
            http_cache: true,
            etag: true,
            status: StatusCode::OK,
            max_age_secs: 0,
        }
    }
}

impl ServeOptions {
    pub fn with_content_type(content_type: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            ..Default::default()
        }
    }

    /// No Last-Modified, no ETag.
    pub fn uncached() -> Self {
        Self {
            http_cache: false,
            ..Default::default()
        }
    }
}

/// Render `template` against `ctx`.
pub fn serve(
    env: &Env<'_>,
    ctx: &mut RequestContext,
    template: &str,
    options: ServeOptions,
) -> Result<Response, FrontError> {
    if ctx.entries_per_page.is_none() {
        ctx.entries_per_page = Some(env.settings.nb_post_per_page);
    }

    let templates = &env.services().templates;
    let Some(template_file) = templates.resolve(template) else {
        tracing::error!(template, "Template not found in any theme directory");
        return Err(FrontError::MissingTemplate(template.to_string()));
    };

    ctx.current_template = template.to_string();
    ctx.content_type = options.content_type.clone();
    ctx.http_cache = options.http_cache && !env.req.is_post();
    ctx.http_etag = options.etag;

    env.behaviors().before_get_data(ctx);

    let mut headers = HeaderMap::new();
    let mut use_etag = false;
    if ctx.http_cache {
        let mut plan = std::mem::take(&mut ctx.cache_plan);
        plan.files.push(template_file);
        plan.timestamps.push(env.blog().updated_at());
        if let Some(last_modified) = cache::last_modified(&plan) {
            cache::set_validators(&mut headers, last_modified, options.max_age_secs);
            if cache::not_modified_since(&env.req.headers, last_modified) {
                tracing::debug!(template, "Document not modified since client copy");
                return Ok(cache::not_modified(headers));
            }
        }
        use_etag = plan.use_etag && ctx.http_etag;
    }

    if let Ok(value) = HeaderValue::from_str(&format!("{}; charset=UTF-8", options.content_type)) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    let extra = std::mem::take(&mut ctx.extra_headers);
    for (name, value) in extra.iter() {
        headers.append(name.clone(), value.clone());
    }
    apply_security_headers(&mut headers, &env.settings, ctx.frame_origin.as_deref());
    env.behaviors().document_headers(&mut headers);

    let content = templates.render(template, ctx)?;
    let mut doc = RenderedDocument {
        content,
        content_type: options.content_type,
        template: template.to_string(),
        headers,
    };
    env.behaviors().serve_document(&mut doc);

    if use_etag {
        let etag = cache::etag(&doc.content, &env.site().self_url(env.req));
        if let Ok(value) = HeaderValue::from_str(&etag) {
            doc.headers.insert(header::ETAG, value);
        }
        if cache::etag_matches(&env.req.headers, &etag) {
            let mut validators = HeaderMap::new();
            for name in [header::ETAG, header::LAST_MODIFIED, header::CACHE_CONTROL] {
                if let Some(value) = doc.headers.get(&name) {
                    validators.insert(name.clone(), value.clone());
                }
            }
            return Ok(cache::not_modified(validators));
        }
    }

    let mut response = Response::new(Body::from(doc.content));
    *response.status_mut() = options.status;
    *response.headers_mut() = doc.headers;
    Ok(response)
}
