//! Public files from the theme, module and core directories.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;

use crate::document::cache;
use crate::error::FrontError;
use crate::front::{CachePlan, Env, Reply};
use crate::observability::metrics;

/// `files/{relative path}`
pub fn files(env: &Env<'_>, args: Option<&str>) -> Result<Reply, FrontError> {
    let relative = args.unwrap_or_default();
    let Some(file) = env.files().resolve(relative) else {
        tracing::info!(path = relative, "Rejected file request");
        metrics::record_file("rejected");
        return Err(FrontError::NotFound);
    };

    let mut plan = CachePlan {
        files: vec![file.path.clone()],
        ..Default::default()
    };
    plan.files.extend_from_slice(env.files().deploy_stamps());

    let mut headers = HeaderMap::new();
    if let Some(last_modified) = cache::last_modified(&plan) {
        cache::set_validators(&mut headers, last_modified, env.files().max_age_secs());
        if cache::not_modified_since(&env.req.headers, last_modified) {
            metrics::record_file("not_modified");
            return Ok(Reply::Done(cache::not_modified(headers)));
        }
    }

    let bytes = std::fs::read(&file.path)?;
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(file.mime));

    metrics::record_file("served");
    let mut response = Response::new(Body::from(bytes));
    *response.headers_mut() = headers;
    Ok(Reply::Done(response))
}
