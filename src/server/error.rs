//! Error type for page requests
//!
//! Handlers normally turn these into themed pages; the `IntoResponse`
//! rendering below is the bare fallback used when even the themed page
//! cannot be rendered.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::error::ContentError;
use crate::helpers::html_escape;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// No article carries the requested id
    #[error("article not found: {0}")]
    ArticleNotFound(String),

    /// No route or static file matches the path
    #[error("not found: {0}")]
    NotFound(String),

    /// The article exists but its Markdown body does not
    #[error("article body not found: {0}")]
    BodyNotFound(String),

    /// Any other failure to load content
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    /// Rendering or serving failed
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PageError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::ArticleNotFound(_) | Self::BodyNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Content(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (title, message) = if status == StatusCode::NOT_FOUND {
            ("Not Found", "The page you are looking for could not be found.")
        } else {
            tracing::error!(error = %self, "page request failed");
            (
                "Something went wrong",
                "This page could not be loaded. Please try again later.",
            )
        };

        let body = format!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{}</title></head>\
             <body><main class=\"error-page\"><h1>{}</h1><p>{}</p></main></body></html>",
            html_escape(title),
            html_escape(title),
            html_escape(message)
        );
        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = PageError::ArticleNotFound("a9".to_string());
        assert_eq!(err.to_string(), "article not found: a9");
    }

    #[test]
    fn test_status() {
        assert_eq!(
            PageError::BodyNotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        let content = PageError::from(ContentError::Status {
            resource: "content/site.json".into(),
            status: 503,
        });
        assert_eq!(content.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response() {
        let response = PageError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = PageError::ArticleNotFound("a1".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
