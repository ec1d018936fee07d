//! Error handlers consulted before the generic error boundary.

use axum::http::StatusCode;
use axum::response::Response;

use crate::document::{serve, ServeOptions};
use crate::error::FrontError;
use crate::front::{Env, RequestContext};

/// A link in the error-handler chain.
///
/// Returning `None` passes the error on to the next handler, and finally to
/// the boundary mapping in [`FrontError`].
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, env: &Env<'_>, ctx: &mut RequestContext, err: &FrontError) -> Option<Response>;
}

/// Renders the theme's `404.html` for unknown documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThemedNotFound;

pub const NOT_FOUND_TEMPLATE: &str = "404.html";

impl ErrorHandler for ThemedNotFound {
    fn handle(&self, env: &Env<'_>, ctx: &mut RequestContext, err: &FrontError) -> Option<Response> {
        if !matches!(err, FrontError::NotFound) {
            return None;
        }
        env.services().templates.resolve(NOT_FOUND_TEMPLATE)?;

        ctx.route = "404".to_string();
        let options = ServeOptions {
            status: StatusCode::NOT_FOUND,
            ..ServeOptions::uncached()
        };
        match serve(env, ctx, NOT_FOUND_TEMPLATE, options) {
            Ok(mut response) => {
                env.behaviors().after_document(ctx, &mut response);
                Some(response)
            }
            Err(e) => {
                tracing::error!(error = %e, "Unable to render the not-found page");
                None
            }
        }
    }
}
