//! Front controller errors and their HTTP boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::collab::{BlogError, TemplateError};

/// Errors a content handler can raise.
///
/// Validation problems (bad email, wrong password) never appear here: handlers
/// report them inline in the rendered page.
#[derive(Debug, thiserror::Error)]
pub enum FrontError {
    /// Unknown content or malformed arguments.
    #[error("document not found")]
    NotFound,

    /// A template the handler needs does not exist. This is a deployment
    /// problem and is never reported as a 404.
    #[error("template {0} is missing")]
    MissingTemplate(String),

    #[error(transparent)]
    Render(#[from] TemplateError),

    #[error(transparent)]
    Blog(#[from] BlogError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrontError {
    pub fn status(&self) -> StatusCode {
        match self {
            FrontError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FrontError {
    fn into_response(self) -> Response {
        match self {
            FrontError::NotFound => (StatusCode::NOT_FOUND, "Document not found").into_response(),
            other => {
                tracing::error!(error = %other, "Unable to serve document");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
