use std::sync::Arc;

use crate::domain::entities::{Group, GroupMember};
use crate::domain::repositories::{GroupRepository, RepositoryError};

/// List group members input
pub struct ListGroupMembersInput {
    pub group_id: String,
}

/// List group members output
pub struct ListGroupMembersOutput {
    pub group: Group,
    pub members: Vec<GroupMember>,
}

/// List group members use case
pub struct ListGroupMembers<R: GroupRepository> {
    group_repo: Arc<R>,
}

impl<R: GroupRepository> ListGroupMembers<R> {
    pub fn new(group_repo: Arc<R>) -> Self {
        Self { group_repo }
    }

    pub async fn execute(
        &self,
        input: ListGroupMembersInput,
    ) -> Result<ListGroupMembersOutput, ListGroupMembersError> {
        let group = self
            .group_repo
            .find_by_id(&input.group_id)
            .await?
            .ok_or(ListGroupMembersError::GroupNotFound)?;

        let members = self.group_repo.list_members(&group.id).await?;

        Ok(ListGroupMembersOutput { group, members })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListGroupMembersError {
    #[error("Group not found")]
    GroupNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
