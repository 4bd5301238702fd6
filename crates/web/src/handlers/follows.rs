//! Follow and unfollow actions.
//!
//! Both are idempotent: refreshing a follow link or unfollowing twice
//! changes nothing. Both redirect back to the profile they came from.

use axum::extract::{Path, State};
use axum::response::Redirect;

use crate::error::PageResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// `GET /profile/{username}/follow/` — start following an author.
pub async fn follow(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(username): Path<String>,
) -> PageResult<Redirect> {
    let author = state.user_service.get_by_username(&username).await?;
    state.follow_service.follow(&viewer.id, &author.id).await?;

    Ok(Redirect::to(&format!("/profile/{username}/")))
}

/// `GET /profile/{username}/unfollow/` — stop following an author.
pub async fn unfollow(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(username): Path<String>,
) -> PageResult<Redirect> {
    let author = state.user_service.get_by_username(&username).await?;
    state.follow_service.unfollow(&viewer.id, &author.id).await?;

    Ok(Redirect::to(&format!("/profile/{username}/")))
}
