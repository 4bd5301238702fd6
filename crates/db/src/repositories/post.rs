//! Post repository.
//!
//! All feed queries return posts newest-first (creation time, post ID
//! as tiebreaker) and slice with limit/offset so the paginator never
//! loads a full feed into memory.

use std::sync::Arc;

use crate::entities::{Post, post};
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn newest_first(query: Select<Post>) -> Select<Post> {
        query
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count all posts.
    pub async fn count_all(&self) -> AppResult<u64> {
        Post::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a slice of the global feed (newest first).
    pub async fn find_page(&self, limit: u64, offset: u64) -> AppResult<Vec<post::Model>> {
        Self::newest_first(Post::find())
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts in a group.
    pub async fn count_by_group(&self, group_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::GroupId.eq(group_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a slice of a group's feed (newest first).
    pub async fn find_by_group(
        &self,
        group_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        Self::newest_first(Post::find().filter(post::Column::GroupId.eq(group_id)))
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts by an author.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a slice of an author's feed (newest first).
    pub async fn find_by_author(
        &self,
        author_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        Self::newest_first(Post::find().filter(post::Column::AuthorId.eq(author_id)))
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts by any of the given authors.
    ///
    /// Returns 0 without querying when the author set is empty.
    pub async fn count_by_authors(&self, author_ids: &[String]) -> AppResult<u64> {
        if author_ids.is_empty() {
            return Ok(0);
        }

        Post::find()
            .filter(post::Column::AuthorId.is_in(author_ids.to_vec()))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a slice of the aggregated feed of the given authors (newest
    /// first). Returns an empty slice without querying when the author
    /// set is empty.
    pub async fn find_by_authors(
        &self,
        author_ids: &[String],
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }

        Self::newest_first(Post::find().filter(post::Column::AuthorId.is_in(author_ids.to_vec())))
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
