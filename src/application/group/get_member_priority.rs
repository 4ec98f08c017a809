use std::sync::Arc;

use crate::application::registration::PriorityScorer;
use crate::domain::repositories::{GameRepository, GroupRepository, RepositoryError};
use crate::domain::value_objects::PriorityScore;

/// Get member priority input
pub struct GetMemberPriorityInput {
    pub group_id: String,
    pub user_id: String,
}

/// Get member priority output
pub struct GetMemberPriorityOutput {
    pub score: PriorityScore,
}

/// Current waitlist priority of a group member
pub struct GetMemberPriority<G: GameRepository, R: GroupRepository> {
    group_repo: Arc<R>,
    scorer: PriorityScorer<G>,
}

impl<G: GameRepository, R: GroupRepository> GetMemberPriority<G, R> {
    pub fn new(game_repo: Arc<G>, group_repo: Arc<R>, history_window: u32) -> Self {
        Self {
            group_repo,
            scorer: PriorityScorer::new(game_repo, history_window),
        }
    }

    pub async fn execute(
        &self,
        input: GetMemberPriorityInput,
    ) -> Result<GetMemberPriorityOutput, GetMemberPriorityError> {
        self.group_repo
            .find_by_id(&input.group_id)
            .await?
            .ok_or(GetMemberPriorityError::GroupNotFound)?;

        let now = chrono::Utc::now().timestamp_millis();
        let score = self
            .scorer
            .score(&input.user_id, &input.group_id, now)
            .await?;

        Ok(GetMemberPriorityOutput { score })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GetMemberPriorityError {
    #[error("Group not found")]
    GroupNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
