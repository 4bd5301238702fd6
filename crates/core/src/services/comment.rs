//! Comment service.

use chrono::Utc;
use quill_common::{AppResult, IdGenerator};
use quill_db::entities::{comment, user};
use quill_db::repositories::{CommentRepository, PostRepository, UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;
use validator::Validate;

/// Input for adding a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewComment {
    /// Comment text.
    #[validate(length(min = 1, max = 2_000, message = "Text must not be empty"))]
    pub text: String,
}

/// A comment joined with its author.
#[derive(Debug, Clone)]
pub struct CommentView {
    /// The comment.
    pub comment: comment::Model,
    /// Its author.
    pub author: user::Model,
}

/// Comment service.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment to a post. Fails with `PostNotFound` when the
    /// post does not exist.
    pub async fn add(
        &self,
        author: &user::Model,
        post_id: &str,
        input: NewComment,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id),
            author_id: Set(author.id.clone()),
            text: Set(input.text),
            created_at: Set(Utc::now().into()),
        };

        self.comment_repo.create(model).await
    }

    /// All comments on a post, newest first, with their authors.
    pub async fn for_post(&self, post_id: &str) -> AppResult<Vec<CommentView>> {
        let comments = self.comment_repo.find_by_post(post_id).await?;

        let mut author_ids: Vec<String> =
            comments.iter().map(|c| c.author_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(comments
            .into_iter()
            .filter_map(|comment| {
                let Some(author) = authors.get(&comment.author_id).cloned() else {
                    warn!(comment = %comment.id, "Comment author missing, dropping");
                    return None;
                };
                Some(CommentView { comment, author })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_common::AppError;
    use quill_db::entities::post;
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

    fn test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            group_id: None,
            text: "Hello".to_string(),
            image: None,
            created_at: Utc::now().into(),
        }
    }

    fn test_comment(id: &str, post_id: &str, author_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            author_id: author_id.to_string(),
            text: "Nice post".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> CommentService {
        CommentService::new(
            CommentRepository::new(Arc::clone(&db)),
            PostRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_add_rejects_empty_text() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db)
            .add(
                &test_user("u1", "leo"),
                "p1",
                NewComment {
                    text: String::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_to_missing_post() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let result = service(db)
            .add(
                &test_user("u1", "leo"),
                "missing",
                NewComment {
                    text: "Nice post".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_for_post_joins_authors() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_comment("c1", "p1", "u1")]])
                .append_query_results([[test_user("u1", "leo")]])
                .into_connection(),
        );

        let views = service(db).for_post("p1").await.unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].author.username, "leo");
    }

    #[tokio::test]
    async fn test_for_post_empty() {
        // No comments: the author lookup short-circuits without a query.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );

        let views = service(db).for_post("p-lonely").await.unwrap();
        assert!(views.is_empty());
    }
}
