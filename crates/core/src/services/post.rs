//! Post service.

use crate::cache::FeedCache;
use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::entities::{group, post, user};
use quill_db::repositories::{GroupRepository, PostRepository, UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a post.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPost {
    /// Post text.
    #[validate(length(min = 1, max = 10_000, message = "Text must not be empty"))]
    pub text: String,
    /// Optional group to attach the post to.
    pub group_id: Option<String>,
    /// Optional image path, already stored by the media pipeline.
    pub image: Option<String>,
}

/// Input for editing a post. Same shape as [`NewPost`]; the creation
/// timestamp is never touched.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePost {
    /// Replacement text.
    #[validate(length(min = 1, max = 10_000, message = "Text must not be empty"))]
    pub text: String,
    /// Replacement group, or none to detach.
    pub group_id: Option<String>,
    /// Replacement image path.
    pub image: Option<String>,
}

/// A single post with everything its detail page shows.
#[derive(Debug, Clone)]
pub struct PostDetail {
    /// The post.
    pub post: post::Model,
    /// Its author.
    pub author: user::Model,
    /// Its group, if any.
    pub group: Option<group::Model>,
    /// How many posts the author has in total.
    pub author_post_count: u64,
}

/// Post service.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    feed_cache: FeedCache,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
        feed_cache: FeedCache,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            group_repo,
            feed_cache,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post authored by `author`.
    pub async fn create(&self, author: &user::Model, input: NewPost) -> AppResult<post::Model> {
        input.validate()?;
        self.check_group(input.group_id.as_deref()).await?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            group_id: Set(input.group_id),
            text: Set(input.text),
            image: Set(input.image),
            created_at: Set(Utc::now().into()),
        };

        let post = self.post_repo.create(model).await?;
        self.feed_cache.on_post_write().await;
        Ok(post)
    }

    /// Edit a post. Only the author may edit.
    pub async fn update(
        &self,
        author_id: &str,
        post_id: &str,
        input: UpdatePost,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let existing = self.post_repo.get_by_id(post_id).await?;
        if existing.author_id != author_id {
            return Err(AppError::Forbidden(
                "Only the author may edit a post".to_string(),
            ));
        }

        self.check_group(input.group_id.as_deref()).await?;

        let model = post::ActiveModel {
            id: Set(existing.id),
            author_id: Set(existing.author_id),
            group_id: Set(input.group_id),
            text: Set(input.text),
            image: Set(input.image.or(existing.image)),
            created_at: Set(existing.created_at),
        };

        let post = self.post_repo.update(model).await?;
        self.feed_cache.on_post_write().await;
        Ok(post)
    }

    /// Everything the post detail page shows.
    pub async fn detail(&self, post_id: &str) -> AppResult<PostDetail> {
        let post = self.post_repo.get_by_id(post_id).await?;
        let author = self.user_repo.get_by_id(&post.author_id).await?;
        let group = match &post.group_id {
            Some(group_id) => self.group_repo.find_by_id(group_id).await?,
            None => None,
        };
        let author_post_count = self.post_repo.count_by_author(&post.author_id).await?;

        Ok(PostDetail {
            post,
            author,
            group,
            author_post_count,
        })
    }

    /// Fetch a post for the edit form, checking authorship.
    pub async fn for_edit(&self, author_id: &str, post_id: &str) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != author_id {
            return Err(AppError::Forbidden(
                "Only the author may edit a post".to_string(),
            ));
        }
        Ok(post)
    }

    async fn check_group(&self, group_id: Option<&str>) -> AppResult<()> {
        if let Some(group_id) = group_id
            && self.group_repo.find_by_id(group_id).await?.is_none()
        {
            return Err(AppError::Validation("Unknown group".to_string()));
        }
        Ok(())
    }
}
