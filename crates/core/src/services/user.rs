//! User service.
//!
//! User accounts and session issuance belong to the external auth
//! service; this only resolves users for profiles and request
//! authentication.

use quill_common::AppResult;
use quill_db::entities::user;
use quill_db::repositories::UserRepository;

/// User service.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Resolve a session token to a user, `None` for unknown tokens.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_token(token).await
    }

    /// Resolve a username. Fails with `UserNotFound`.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_username(username).await
    }
}
