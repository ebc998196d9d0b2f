//! Web error type
//!
//! Handlers return `Result<_, WebError>`. The error response itself carries
//! no body; [`render_error_pages`](super::middleware::render_error_pages)
//! sees the [`ErrorPage`] marker and renders `404.html` or `error.html` with
//! the full page context.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::services::{AccountServiceError, NewsServiceError};
use crate::templates::TemplateError;

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Not found")]
    NotFound,

    /// Anything unexpected; logged, never shown to the client
    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

/// Response extension asking the error page layer to fill in the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPage {
    NotFound,
    Internal,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, page) = match self {
            WebError::NotFound => (StatusCode::NOT_FOUND, ErrorPage::NotFound),
            WebError::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorPage::Internal)
            }
        };
        let mut response = status.into_response();
        response.extensions_mut().insert(page);
        response
    }
}

impl From<AccountServiceError> for WebError {
    fn from(e: AccountServiceError) -> Self {
        match e {
            AccountServiceError::InternalError(e) => WebError::Internal(e),
            other => WebError::Internal(other.into()),
        }
    }
}

impl From<NewsServiceError> for WebError {
    fn from(e: NewsServiceError) -> Self {
        match e {
            NewsServiceError::NotFound => WebError::NotFound,
            NewsServiceError::InternalError(e) => WebError::Internal(e),
            other => WebError::Internal(other.into()),
        }
    }
}

impl From<TemplateError> for WebError {
    fn from(e: TemplateError) -> Self {
        WebError::Internal(e.into())
    }
}
