use async_trait::async_trait;

use crate::domain::entities::{Group, GroupMember};
use crate::domain::repositories::RepositoryError;

/// Group repository trait
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Find group by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Group>, RepositoryError>;

    /// Insert a group together with its owner membership
    async fn create(&self, group: &Group) -> Result<GroupMember, RepositoryError>;

    /// Find a user's membership in a group
    async fn find_member(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Option<GroupMember>, RepositoryError>;

    /// Add a member
    async fn add_member(&self, member: &GroupMember) -> Result<(), RepositoryError>;

    /// List members, earliest first
    async fn list_members(&self, group_id: &str) -> Result<Vec<GroupMember>, RepositoryError>;

    /// Whether the user may host games and manage registrations in the group
    async fn can_manage_game(&self, group_id: &str, user_id: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .find_member(group_id, user_id)
            .await?
            .is_some_and(|member| member.role.can_manage()))
    }
}
