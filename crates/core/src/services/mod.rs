//! Business logic services.

pub mod comment;
pub mod feed;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

pub use comment::{CommentService, CommentView, NewComment};
pub use feed::{FeedService, GroupFeed, PostView, ProfileFeed};
pub use follow::FollowService;
pub use group::GroupService;
pub use post::{NewPost, PostDetail, PostService, UpdatePost};
pub use user::UserService;
