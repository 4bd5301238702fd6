//! Application state.

use quill_core::{
    CommentService, FeedCache, FeedService, FollowService, GroupService, PostService, UserService,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Feed composition.
    pub feed_service: FeedService,
    /// Follow graph.
    pub follow_service: FollowService,
    /// Post writes and detail pages.
    pub post_service: PostService,
    /// Comments.
    pub comment_service: CommentService,
    /// Group resolution.
    pub group_service: GroupService,
    /// User resolution and token authentication.
    pub user_service: UserService,
    /// Cache of the rendered index page.
    pub feed_cache: FeedCache,
}
