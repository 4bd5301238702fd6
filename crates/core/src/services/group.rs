//! Group service.

use quill_common::AppResult;
use quill_db::entities::group;
use quill_db::repositories::GroupRepository;

/// Group service.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self { group_repo }
    }

    /// Resolve a group by slug. Fails with `GroupNotFound`.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_slug(slug).await
    }

    /// All groups, for the post form's group selector.
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.list().await
    }
}
