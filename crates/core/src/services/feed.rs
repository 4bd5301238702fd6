//! Feed composition.
//!
//! Four feed variants, all ordered newest-first and paginated: the
//! global index, a single group, a single author's profile, and the
//! aggregated feed of everyone a user follows. Each variant is a count
//! plus a limit/offset slice against the store; the full feed is never
//! loaded into memory.

use std::collections::HashMap;

use crate::pagination::{POSTS_PER_PAGE, Page, PageRequest};
use quill_common::AppResult;
use quill_db::entities::{group, post, user};
use quill_db::repositories::{FollowRepository, GroupRepository, PostRepository, UserRepository};
use tracing::warn;

/// A post joined with what templates need to render it.
#[derive(Debug, Clone)]
pub struct PostView {
    /// The post itself.
    pub post: post::Model,
    /// The post's author.
    pub author: user::Model,
    /// The group the post belongs to, if any.
    pub group: Option<group::Model>,
}

/// A group feed page plus the group it belongs to.
#[derive(Debug, Clone)]
pub struct GroupFeed {
    /// The resolved group.
    pub group: group::Model,
    /// The requested page of the group's posts.
    pub page: Page<PostView>,
}

/// A profile feed page plus the author and the viewer's relation.
#[derive(Debug, Clone)]
pub struct ProfileFeed {
    /// The profile's author.
    pub author: user::Model,
    /// The requested page of the author's posts.
    pub page: Page<PostView>,
    /// Whether the viewer already follows this author. False for
    /// anonymous viewers and for authors viewing their own profile.
    pub following: bool,
}

/// Feed composition service.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
    group_repo: GroupRepository,
    user_repo: UserRepository,
    follow_repo: FollowRepository,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        group_repo: GroupRepository,
        user_repo: UserRepository,
        follow_repo: FollowRepository,
    ) -> Self {
        Self {
            post_repo,
            group_repo,
            user_repo,
            follow_repo,
        }
    }

    /// The global feed: all posts.
    pub async fn global(&self, req: PageRequest) -> AppResult<Page<PostView>> {
        let total = self.post_repo.count_all().await?;
        let (number, offset) = req.resolve(total);
        let posts = self.post_repo.find_page(POSTS_PER_PAGE, offset).await?;
        Ok(Page::new(self.hydrate(posts).await?, total, number))
    }

    /// A group's feed. Fails with `GroupNotFound` for an unknown slug.
    pub async fn group(&self, slug: &str, req: PageRequest) -> AppResult<GroupFeed> {
        let group = self.group_repo.get_by_slug(slug).await?;

        let total = self.post_repo.count_by_group(&group.id).await?;
        let (number, offset) = req.resolve(total);
        let posts = self
            .post_repo
            .find_by_group(&group.id, POSTS_PER_PAGE, offset)
            .await?;

        let page = Page::new(self.hydrate(posts).await?, total, number);
        Ok(GroupFeed { group, page })
    }

    /// An author's profile feed. Fails with `UserNotFound` for an
    /// unknown username.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<&user::Model>,
        req: PageRequest,
    ) -> AppResult<ProfileFeed> {
        let author = self.user_repo.get_by_username(username).await?;

        let following = match viewer {
            Some(viewer) if viewer.id != author.id => {
                self.follow_repo.is_following(&viewer.id, &author.id).await?
            }
            _ => false,
        };

        let total = self.post_repo.count_by_author(&author.id).await?;
        let (number, offset) = req.resolve(total);
        let posts = self
            .post_repo
            .find_by_author(&author.id, POSTS_PER_PAGE, offset)
            .await?;

        let page = Page::new(self.hydrate(posts).await?, total, number);
        Ok(ProfileFeed {
            author,
            page,
            following,
        })
    }

    /// The aggregated feed of everyone `viewer_id` follows.
    ///
    /// An empty follow set short-circuits to an empty page without
    /// touching the post table.
    pub async fn follow(&self, viewer_id: &str, req: PageRequest) -> AppResult<Page<PostView>> {
        let authors = self.follow_repo.followed_author_ids(viewer_id).await?;
        if authors.is_empty() {
            return Ok(Page::empty());
        }

        let total = self.post_repo.count_by_authors(&authors).await?;
        let (number, offset) = req.resolve(total);
        let posts = self
            .post_repo
            .find_by_authors(&authors, POSTS_PER_PAGE, offset)
            .await?;

        Ok(Page::new(self.hydrate(posts).await?, total, number))
    }

    /// Join a page of posts with their authors and groups.
    ///
    /// Authors and groups are loaded in one batched query each. A post
    /// whose author row is gone (deleted mid-request) is dropped.
    async fn hydrate(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostView>> {
        let mut author_ids: Vec<String> = posts.iter().map(|p| p.author_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();

        let mut group_ids: Vec<String> = posts.iter().filter_map(|p| p.group_id.clone()).collect();
        group_ids.sort();
        group_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let groups: HashMap<String, group::Model> = self
            .group_repo
            .find_by_ids(&group_ids)
            .await?
            .into_iter()
            .map(|g| (g.id.clone(), g))
            .collect();

        Ok(posts
            .into_iter()
            .filter_map(|post| {
                let Some(author) = authors.get(&post.author_id).cloned() else {
                    warn!(post = %post.id, "Post author missing, dropping from feed");
                    return None;
                };
                let group = post.group_id.as_ref().and_then(|id| groups.get(id).cloned());
                Some(PostView {
                    post,
                    author,
                    group,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quill_common::AppError;
    use quill_db::entities::follow;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            display_name: None,
            bio: None,
            token: None,
            created_at: Utc::now().into(),
        }
    }

    fn test_group(id: &str, slug: &str) -> group::Model {
        group::Model {
            id: id.to_string(),
            title: format!("Group {slug}"),
            slug: slug.to_string(),
            description: "A test group".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn test_post(id: &str, author_id: &str, group_id: Option<&str>) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            group_id: group_id.map(ToString::to_string),
            text: "Hello".to_string(),
            image: None,
            created_at: Utc::now().into(),
        }
    }

    fn test_edge(id: &str, follower_id: &str, author_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            author_id: author_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn count_result(n: i64) -> Vec<std::collections::BTreeMap<&'static str, sea_orm::Value>> {
        vec![maplit::btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(n))
        }]
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> FeedService {
        FeedService::new(
            PostRepository::new(Arc::clone(&db)),
            GroupRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            FollowRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_global_feed_page_math() {
        // count -> posts -> authors (no groups on these posts)
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_result(12)])
                .append_query_results([[test_post("p1", "u1", None), test_post("p2", "u1", None)]])
                .append_query_results([[test_user("u1", "leo")]])
                .into_connection(),
        );

        let page = service(db).global(PageRequest::first()).await.unwrap();

        assert_eq!(page.number, 1);
        assert_eq!(page.total_items, 12);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_next());
        assert!(!page.has_previous());
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].author.username, "leo");
    }

    #[tokio::test]
    async fn test_global_feed_clamps_out_of_range_page() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_result(42)])
                .append_query_results([[test_post("p41", "u1", None)]])
                .append_query_results([[test_user("u1", "leo")]])
                .into_connection(),
        );

        let page = service(db).global(PageRequest::new(99)).await.unwrap();

        assert_eq!(page.number, 5);
        assert_eq!(page.total_pages, 5);
        assert!(!page.has_next());
    }

    #[tokio::test]
    async fn test_group_feed_unknown_slug() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group::Model>::new()])
                .into_connection(),
        );

        let result = service(db).group("missing", PageRequest::first()).await;
        assert!(matches!(result, Err(AppError::GroupNotFound(_))));
    }

    #[tokio::test]
    async fn test_group_feed_contains_group_posts() {
        // group -> count -> posts -> authors -> groups
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_group("g1", "cats")]])
                .append_query_results([count_result(1)])
                .append_query_results([[test_post("p1", "u1", Some("g1"))]])
                .append_query_results([[test_user("u1", "leo")]])
                .append_query_results([[test_group("g1", "cats")]])
                .into_connection(),
        );

        let feed = service(db).group("cats", PageRequest::first()).await.unwrap();

        assert_eq!(feed.group.slug, "cats");
        assert_eq!(feed.page.items.len(), 1);
        assert_eq!(feed.page.items[0].post.id, "p1");
        assert_eq!(
            feed.page.items[0].group.as_ref().map(|g| g.slug.as_str()),
            Some("cats")
        );
    }

    #[tokio::test]
    async fn test_profile_feed_unknown_username() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let result = service(db)
            .profile("nobody", None, PageRequest::first())
            .await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_profile_feed_sets_following_for_viewer() {
        // author -> is_following -> count -> posts -> authors
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("u2", "ada")]])
                .append_query_results([[test_edge("f1", "u1", "u2")]])
                .append_query_results([count_result(1)])
                .append_query_results([[test_post("p1", "u2", None)]])
                .append_query_results([[test_user("u2", "ada")]])
                .into_connection(),
        );

        let viewer = test_user("u1", "leo");
        let feed = service(db)
            .profile("ada", Some(&viewer), PageRequest::first())
            .await
            .unwrap();

        assert!(feed.following);
        assert_eq!(feed.author.username, "ada");
    }

    #[tokio::test]
    async fn test_profile_feed_own_profile_skips_follow_lookup() {
        // author -> count -> posts -> authors; no follow query runs
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("u1", "leo")]])
                .append_query_results([count_result(0)])
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let viewer = test_user("u1", "leo");
        let feed = service(db)
            .profile("leo", Some(&viewer), PageRequest::first())
            .await
            .unwrap();

        assert!(!feed.following);
        assert!(feed.page.items.is_empty());
        assert_eq!(feed.page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_follow_feed_empty_when_following_nobody() {
        // Only the follow edge query runs; the post table is not touched.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow::Model>::new()])
                .into_connection(),
        );

        let page = service(db).follow("u1", PageRequest::first()).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_follow_feed_contains_followed_authors_posts() {
        // edges -> count -> posts -> authors
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_edge("f1", "u1", "u2")]])
                .append_query_results([count_result(1)])
                .append_query_results([[test_post("p2", "u2", None)]])
                .append_query_results([[test_user("u2", "ada")]])
                .into_connection(),
        );

        let page = service(db).follow("u1", PageRequest::first()).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].post.id, "p2");
        assert_eq!(page.items[0].author.username, "ada");
    }
}
