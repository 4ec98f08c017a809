use std::sync::Arc;

use crate::application::registration::CapacityGate;
use crate::domain::entities::{Game, GameParticipant, GameStatus, ParticipantStatus};
use crate::domain::repositories::{ConfirmOutcome, GameRepository, GroupRepository, RepositoryError};

/// Join game input
pub struct JoinGameInput {
    /// Authenticated caller
    pub actor_id: String,
    pub game_id: String,
    /// User to register, defaults to the caller
    pub user_id: Option<String>,
    /// Explicit initial status (host only); capacity-gated join when absent
    pub status: Option<ParticipantStatus>,
}

/// Join game output
pub struct JoinGameOutput {
    pub game: Game,
    pub participant: GameParticipant,
}

/// Join game use case: register through the capacity gate
pub struct JoinGame<G: GameRepository, R: GroupRepository> {
    game_repo: Arc<G>,
    group_repo: Arc<R>,
    gate: CapacityGate<G>,
}

impl<G: GameRepository, R: GroupRepository> JoinGame<G, R> {
    pub fn new(game_repo: Arc<G>, group_repo: Arc<R>, max_retries: u32) -> Self {
        Self {
            gate: CapacityGate::new(game_repo.clone(), max_retries),
            game_repo,
            group_repo,
        }
    }

    pub async fn execute(&self, input: JoinGameInput) -> Result<JoinGameOutput, JoinGameError> {
        let user_id = input.user_id.unwrap_or_else(|| input.actor_id.clone());
        if user_id.trim().is_empty() {
            return Err(JoinGameError::Validation("userId must not be empty".into()));
        }

        // Find game
        let game = self
            .game_repo
            .find_by_id(&input.game_id)
            .await?
            .ok_or(JoinGameError::GameNotFound)?;

        if game.status != GameStatus::Upcoming {
            return Err(JoinGameError::GameNotOpen);
        }

        // Registering someone else or forcing a status is a host action
        if (user_id != input.actor_id || input.status.is_some())
            && !self
                .group_repo
                .can_manage_game(&game.group_id, &input.actor_id)
                .await?
        {
            return Err(JoinGameError::Forbidden);
        }

        let participant = match input.status {
            Some(status) => self
                .gate
                .add_entry(&game.id, &user_id, status)
                .await
                .map_err(JoinGameError::from_registry)?,
            None => {
                let outcome = self
                    .gate
                    .try_confirm(&game.id, &user_id)
                    .await
                    .map_err(JoinGameError::from_registry)?;
                if let ConfirmOutcome::Waitlisted(_) = &outcome {
                    tracing::info!(game_id = %game.id, user_id = %user_id, "Game full, participant waitlisted");
                }
                outcome.into_participant()
            }
        };

        tracing::info!(
            game_id = %game.id,
            user_id = %user_id,
            status = participant.status.as_str(),
            "Participant registered"
        );

        Ok(JoinGameOutput { game, participant })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JoinGameError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Game not found")]
    GameNotFound,
    #[error("Game is not open for registration")]
    GameNotOpen,
    #[error("Only group hosts can register other users")]
    Forbidden,
    #[error("Already registered for this game")]
    AlreadyRegistered,
    #[error("Game is full")]
    GameFull,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl JoinGameError {
    fn from_registry(e: RepositoryError) -> Self {
        match e {
            RepositoryError::AlreadyExists(_) => JoinGameError::AlreadyRegistered,
            RepositoryError::NotFound(_) => JoinGameError::GameNotFound,
            RepositoryError::CapacityReached(_) => JoinGameError::GameFull,
            other => JoinGameError::Repository(other),
        }
    }
}
