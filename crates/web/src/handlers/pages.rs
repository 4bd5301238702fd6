//! Static pages and the not-found fallback.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::error::{PageResult, render_not_found};
use crate::extractors::MaybeAuthUser;
use crate::templates::{AboutAuthorTemplate, AboutTechTemplate, render};

/// `GET /about/author/`.
pub async fn about_author(MaybeAuthUser(viewer): MaybeAuthUser) -> PageResult<Html<String>> {
    render(&AboutAuthorTemplate { viewer })
}

/// `GET /about/tech/`.
pub async fn about_tech(MaybeAuthUser(viewer): MaybeAuthUser) -> PageResult<Html<String>> {
    render(&AboutTechTemplate { viewer })
}

/// Fallback for unmatched paths: the custom 404 page.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, render_not_found()).into_response()
}
