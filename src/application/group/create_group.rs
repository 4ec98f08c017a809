use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::{Group, GroupMember};
use crate::domain::repositories::{GroupRepository, RepositoryError};

/// Create group input
pub struct CreateGroupInput {
    pub owner_id: String,
    pub name: String,
}

/// Create group output
pub struct CreateGroupOutput {
    pub group: Group,
    pub owner: GroupMember,
}

/// Create group use case; the creator becomes its owner
pub struct CreateGroup<R: GroupRepository> {
    group_repo: Arc<R>,
}

impl<R: GroupRepository> CreateGroup<R> {
    pub fn new(group_repo: Arc<R>) -> Self {
        Self { group_repo }
    }

    pub async fn execute(&self, input: CreateGroupInput) -> Result<CreateGroupOutput, CreateGroupError> {
        // Validate name
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CreateGroupError::Validation("Group name is required".into()));
        }

        let group = Group::new(Uuid::new_v4().to_string(), name.to_string(), input.owner_id);
        let owner = self.group_repo.create(&group).await?;

        tracing::info!(group_id = %group.id, owner_id = %group.owner_id, "Group created");

        Ok(CreateGroupOutput { group, owner })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreateGroupError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
