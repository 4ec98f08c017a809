use std::sync::Arc;

use crate::application::registration::{CapacityGate, ProcessWaitlist, ProcessWaitlistInput};
use crate::domain::entities::{Game, ParticipantStatus, StatusChange};
use crate::domain::repositories::{GameRepository, GroupRepository, RepositoryError};
use crate::domain::services::RankedCandidate;

/// Update participant status input
pub struct UpdateParticipantInput {
    /// Authenticated caller
    pub actor_id: String,
    pub game_id: String,
    pub user_id: String,
    pub status: ParticipantStatus,
}

/// Update participant status output
pub struct UpdateParticipantOutput {
    pub game: Game,
    pub change: StatusChange,
    /// Waitlisted entries promoted into the slot this change released
    pub promoted: Vec<RankedCandidate>,
}

/// Change a registry entry's status and refill any released slot
pub struct UpdateParticipantStatus<G: GameRepository, R: GroupRepository> {
    game_repo: Arc<G>,
    group_repo: Arc<R>,
    gate: CapacityGate<G>,
    waitlist: ProcessWaitlist<G>,
}

impl<G: GameRepository, R: GroupRepository> UpdateParticipantStatus<G, R> {
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
        input: UpdateParticipantInput,
    ) -> Result<UpdateParticipantOutput, UpdateParticipantError> {
        let game = self
            .game_repo
            .find_by_id(&input.game_id)
            .await?
            .ok_or(UpdateParticipantError::GameNotFound)?;

        if game.status.is_terminal() {
            return Err(UpdateParticipantError::GameClosed);
        }

        let current = self
            .game_repo
            .find_participant(&game.id, &input.user_id)
            .await?
            .ok_or(UpdateParticipantError::ParticipantNotFound)?;

        if !self
            .group_repo
            .can_manage_game(&game.group_id, &input.actor_id)
            .await?
        {
            if input.actor_id != input.user_id {
                return Err(UpdateParticipantError::Forbidden);
            }
            // Members may drop out, or accept an invitation
            let allowed = match input.status {
                ParticipantStatus::Declined => true,
                ParticipantStatus::Confirmed => current.status == ParticipantStatus::Invited,
                ParticipantStatus::Waitlist | ParticipantStatus::Invited => false,
            };
            if !allowed {
                return Err(UpdateParticipantError::Forbidden);
            }
        }

        let change = self
            .gate
            .set_status(&game.id, &input.user_id, input.status)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(_) => UpdateParticipantError::ParticipantNotFound,
                RepositoryError::CapacityReached(_) => UpdateParticipantError::GameFull,
                other => UpdateParticipantError::Repository(other),
            })?;

        tracing::info!(
            game_id = %game.id,
            user_id = %input.user_id,
            from = change.previous.as_str(),
            to = change.participant.status.as_str(),
            "Participant status updated"
        );

        let promoted = if change.freed_slot() {
            // A demoted entry must not win its own slot back
            let exclude = (change.participant.status == ParticipantStatus::Waitlist)
                .then(|| input.user_id.clone());
            self.refill(&game.id, exclude).await
        } else {
            Vec::new()
        };

        Ok(UpdateParticipantOutput {
            game,
            change,
            promoted,
        })
    }

    /// The status change is already committed, so a failed refill is only logged
    async fn refill(&self, game_id: &str, exclude: Option<String>) -> Vec<RankedCandidate> {
        let input = ProcessWaitlistInput {
            game_id: game_id.to_string(),
            exclude,
        };
        match self.waitlist.execute(input).await {
            Ok(output) => output.promoted,
            Err(e) => {
                tracing::error!(game_id, error = %e, "Waitlist processing failed after status change");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateParticipantError {
    #[error("Game not found")]
    GameNotFound,
    #[error("Game is no longer accepting changes")]
    GameClosed,
    #[error("Participant not found")]
    ParticipantNotFound,
    #[error("Not allowed to change this registration")]
    Forbidden,
    #[error("Game is full")]
    GameFull,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
