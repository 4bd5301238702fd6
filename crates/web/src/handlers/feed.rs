//! Feed pages.

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};

use crate::error::PageResult;
use crate::extractors::{AuthUser, MaybeAuthUser};
use crate::handlers::PageParams;
use crate::state::AppState;
use crate::templates::{FollowTemplate, GroupTemplate, IndexTemplate, ProfileTemplate, render};

/// `GET /` — the global feed.
///
/// The rendered page is cached under a single key for every visitor
/// and page number; whoever misses first re-renders for everyone.
pub async fn index(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(params): Query<PageParams>,
) -> PageResult<Response> {
    if let Some(html) = state.feed_cache.get_index().await {
        return Ok(Html(html).into_response());
    }

    let page = state.feed_service.global(params.request()).await?;
    let html = render(&IndexTemplate { viewer, page })?;

    state.feed_cache.store_index(&html.0).await;
    Ok(html.into_response())
}

/// `GET /group/{slug}/` — a group's feed. 404 for unknown slugs.
pub async fn group_feed(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> PageResult<Html<String>> {
    let feed = state.feed_service.group(&slug, params.request()).await?;

    render(&GroupTemplate {
        viewer,
        group: feed.group,
        page: feed.page,
    })
}

/// `GET /profile/{username}/` — an author's feed. 404 for unknown
/// usernames.
pub async fn profile_feed(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> PageResult<Html<String>> {
    let feed = state
        .feed_service
        .profile(&username, viewer.as_ref(), params.request())
        .await?;

    render(&ProfileTemplate {
        viewer,
        author: feed.author,
        following: feed.following,
        page: feed.page,
    })
}

/// `GET /follow/` — the viewer's aggregated follow feed.
pub async fn follow_feed(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Query(params): Query<PageParams>,
) -> PageResult<Html<String>> {
    let page = state
        .feed_service
        .follow(&viewer.id, params.request())
        .await?;

    render(&FollowTemplate {
        viewer: Some(viewer),
        page,
    })
}
