//! Error-to-page rendering.
//!
//! Every failure degrades to a rendered page: unknown slugs, usernames
//! and post IDs get the custom not-found page, unauthenticated access
//! to a login-required route redirects to the login path with a return
//! path, and store or cache failures get a generic error page.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use quill_common::AppError;

use crate::templates::{NotFoundTemplate, ServerErrorTemplate};

/// Handler result type.
pub type PageResult<T> = Result<T, PageError>;

/// An [`AppError`] on its way to becoming a rendered page.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// The login path anonymous visitors are sent to, with a return path.
#[must_use]
pub fn login_redirect(next: &str) -> String {
    format!("/auth/login/?next={next}")
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let err = self.0;

        if err.is_server_error() {
            tracing::error!(error = %err, code = err.error_code(), "Server error occurred");
        } else {
            tracing::debug!(error = %err, code = err.error_code(), "Client error occurred");
        }

        match &err {
            AppError::Unauthenticated(next) => Redirect::to(&login_redirect(next)).into_response(),
            _ if err.status_code() == StatusCode::NOT_FOUND => {
                (StatusCode::NOT_FOUND, render_not_found()).into_response()
            }
            _ => {
                let body = ServerErrorTemplate
                    .render()
                    .unwrap_or_else(|_| "Something went wrong".to_string());
                (err.status_code(), Html(body)).into_response()
            }
        }
    }
}

/// Render the custom not-found page body.
#[must_use]
pub fn render_not_found() -> Html<String> {
    Html(
        NotFoundTemplate
            .render()
            .unwrap_or_else(|_| "Page not found".to_string()),
    )
}
