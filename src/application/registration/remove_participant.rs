use std::sync::Arc;

use crate::application::registration::{CapacityGate, ProcessWaitlist, ProcessWaitlistInput};
use crate::domain::entities::GameParticipant;
use crate::domain::repositories::{GameRepository, GroupRepository, RepositoryError};
use crate::domain::services::RankedCandidate;

/// Remove participant input
pub struct RemoveParticipantInput {
    /// Authenticated caller
    pub actor_id: String,
    pub game_id: String,
    pub user_id: String,
}

/// Remove participant output
pub struct RemoveParticipantOutput {
    pub removed: GameParticipant,
    pub promoted: Vec<RankedCandidate>,
}

/// Delete a registry entry; a released confirmed slot goes to the waitlist
pub struct RemoveParticipant<G: GameRepository, R: GroupRepository> {
    game_repo: Arc<G>,
    group_repo: Arc<R>,
    gate: CapacityGate<G>,
    waitlist: ProcessWaitlist<G>,
}

impl<G: GameRepository, R: GroupRepository> RemoveParticipant<G, R> {
    pub fn new(game_repo: Arc<G>, group_repo: Arc<R>, history_window: u32, max_retries: u32) -> Self {
        Self {
            gate: CapacityGate::new(game_repo.clone(), max_retries),
            waitlist: ProcessWaitlist::new(game_repo.clone(), history_window, max_retries),
            game_repo,
            group_repo,
        }
    }

    pub async fn execute(
        &self,
        input: RemoveParticipantInput,
    ) -> Result<RemoveParticipantOutput, RemoveParticipantError> {
        let game = self
            .game_repo
            .find_by_id(&input.game_id)
            .await?
            .ok_or(RemoveParticipantError::GameNotFound)?;

        // Past registrations feed priority scoring
        if game.status.is_terminal() {
            return Err(RemoveParticipantError::GameClosed);
        }

        if input.actor_id != input.user_id
            && !self
                .group_repo
                .can_manage_game(&game.group_id, &input.actor_id)
                .await?
        {
            return Err(RemoveParticipantError::Forbidden);
        }

        let removed = self
            .gate
            .remove_entry(&game.id, &input.user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(_) => RemoveParticipantError::ParticipantNotFound,
                other => RemoveParticipantError::Repository(other),
            })?;

        tracing::info!(
            game_id = %game.id,
            user_id = %input.user_id,
            status = removed.status.as_str(),
            "Participant removed"
        );

        let promoted = if removed.status.holds_slot() {
            let input = ProcessWaitlistInput {
                game_id: game.id.clone(),
                exclude: None,
            };
            match self.waitlist.execute(input).await {
                Ok(output) => output.promoted,
                Err(e) => {
                    tracing::error!(game_id = %game.id, error = %e, "Waitlist processing failed after removal");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(RemoveParticipantOutput { removed, promoted })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveParticipantError {
    #[error("Game not found")]
    GameNotFound,
    #[error("Game is no longer accepting changes")]
    GameClosed,
    #[error("Participant not found")]
    ParticipantNotFound,
    #[error("Not allowed to remove this registration")]
    Forbidden,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
