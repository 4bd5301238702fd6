//! Page handlers and routing.

pub mod feed;
pub mod follows;
pub mod pages;
pub mod posts;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use serde::Deserialize;

use crate::state::AppState;
use quill_core::PageRequest;

/// The `?page=` query parameter, kept raw so bad input can fail closed.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    /// Raw page number.
    pub page: Option<String>,
}

impl PageParams {
    /// Resolve to a fail-closed page request.
    #[must_use]
    pub fn request(&self) -> PageRequest {
        PageRequest::from_param(self.page.as_deref())
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(feed::index))
        .route("/follow/", get(feed::follow_feed))
        .route("/group/{slug}/", get(feed::group_feed))
        .route("/create/", get(posts::create_form).post(posts::create))
        .route("/posts/{id}/", get(posts::detail))
        .route("/posts/{id}/comment/", post(posts::add_comment))
        .route("/posts/{id}/edit/", get(posts::edit_form).post(posts::edit))
        .route("/profile/{username}/", get(feed::profile_feed))
        .route("/profile/{username}/follow/", get(follows::follow))
        .route("/profile/{username}/unfollow/", get(follows::unfollow))
        .route("/about/author/", get(pages::about_author))
        .route("/about/tech/", get(pages::about_tech))
        .fallback(pages::not_found)
        .layer(from_fn_with_state(
            state.clone(),
            crate::middleware::auth_middleware,
        ))
        .with_state(state)
}
