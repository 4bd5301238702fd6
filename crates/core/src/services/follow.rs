//! Follow graph service.
//!
//! Maintains directed "reader follows author" edges. Every operation
//! is an idempotent no-op on invalid input: following yourself or an
//! author you already follow changes nothing, and unfollowing an
//! absent edge changes nothing. Nothing here raises for those cases.
//!
//! The store backs the application checks with a unique
//! (follower, author) index and a no-self-follow check constraint, so
//! two concurrent identical follows cannot produce a duplicate edge.

use chrono::Utc;
use quill_common::{AppResult, IdGenerator};
use quill_db::entities::follow;
use quill_db::repositories::FollowRepository;
use sea_orm::Set;
use tracing::debug;

/// Follow graph service.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub fn new(follow_repo: FollowRepository) -> Self {
        Self {
            follow_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a follow edge from `follower_id` to `author_id`.
    ///
    /// Self-follows and already-existing edges are silent no-ops.
    pub async fn follow(&self, follower_id: &str, author_id: &str) -> AppResult<()> {
        if follower_id == author_id {
            debug!(user = %follower_id, "Ignoring self-follow");
            return Ok(());
        }

        if self.follow_repo.is_following(follower_id, author_id).await? {
            debug!(follower = %follower_id, author = %author_id, "Already following");
            return Ok(());
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            author_id: Set(author_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.follow_repo.create(model).await?;
        Ok(())
    }

    /// Remove the follow edge from `follower_id` to `author_id`.
    ///
    /// No-op when the edge does not exist.
    pub async fn unfollow(&self, follower_id: &str, author_id: &str) -> AppResult<()> {
        self.follow_repo.delete_by_pair(follower_id, author_id).await
    }

    /// Whether `follower_id` currently follows `author_id`.
    pub async fn is_following(&self, follower_id: &str, author_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, author_id).await
    }

    /// IDs of every author `follower_id` follows.
    pub async fn followed_authors(&self, follower_id: &str) -> AppResult<Vec<String>> {
        self.follow_repo.followed_author_ids(follower_id).await
    }
}
