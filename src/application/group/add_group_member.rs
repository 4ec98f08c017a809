use std::sync::Arc;

use crate::domain::entities::{GroupMember, GroupRole};
use crate::domain::repositories::{GroupRepository, RepositoryError};

/// Add group member input
pub struct AddGroupMemberInput {
    pub actor_id: String,
    pub group_id: String,
    pub user_id: String,
    pub role: GroupRole,
}

/// Add group member output
pub struct AddGroupMemberOutput {
    pub member: GroupMember,
}

/// Add group member use case
pub struct AddGroupMember<R: GroupRepository> {
    group_repo: Arc<R>,
}

impl<R: GroupRepository> AddGroupMember<R> {
    pub fn new(group_repo: Arc<R>) -> Self {
        Self { group_repo }
    }

    pub async fn execute(
        &self,
        input: AddGroupMemberInput,
    ) -> Result<AddGroupMemberOutput, AddGroupMemberError> {
        if input.user_id.trim().is_empty() {
            return Err(AddGroupMemberError::Validation("userId is required".into()));
        }
        if input.role == GroupRole::Owner {
            return Err(AddGroupMemberError::Validation(
                "Owner role cannot be granted".into(),
            ));
        }

        self.group_repo
            .find_by_id(&input.group_id)
            .await?
            .ok_or(AddGroupMemberError::GroupNotFound)?;

        if !self
            .group_repo
            .can_manage_game(&input.group_id, &input.actor_id)
            .await?
        {
            return Err(AddGroupMemberError::Forbidden);
        }

        let member = GroupMember {
            group_id: input.group_id,
            user_id: input.user_id,
            role: input.role,
            joined_at: chrono::Utc::now().timestamp_millis(),
        };

        self.group_repo.add_member(&member).await.map_err(|e| match e {
            RepositoryError::AlreadyExists(_) => AddGroupMemberError::AlreadyMember,
            other => AddGroupMemberError::Repository(other),
        })?;

        tracing::info!(
            group_id = %member.group_id,
            user_id = %member.user_id,
            role = member.role.as_str(),
            "Member added"
        );

        Ok(AddGroupMemberOutput { member })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AddGroupMemberError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Group not found")]
    GroupNotFound,
    #[error("Only group hosts can add members")]
    Forbidden,
    #[error("User is already a member of this group")]
    AlreadyMember,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
