use std::sync::Arc;

use crate::domain::entities::{Game, ParticipantRoster};
use crate::domain::repositories::{GameRepository, RepositoryError};

/// Get game input
pub struct GetGameInput {
    pub game_id: String,
}

/// Game with its confirmed and waitlisted user ids
pub struct GetGameOutput {
    pub game: Game,
    pub participant_ids: Vec<String>,
    pub waitlist_ids: Vec<String>,
}

/// Get game use case
pub struct GetGame<G: GameRepository> {
    game_repo: Arc<G>,
}

impl<G: GameRepository> GetGame<G> {
    pub fn new(game_repo: Arc<G>) -> Self {
        Self { game_repo }
    }

    pub async fn execute(&self, input: GetGameInput) -> Result<GetGameOutput, GetGameError> {
        let game = self
            .game_repo
            .find_by_id(&input.game_id)
            .await?
            .ok_or(GetGameError::GameNotFound)?;

        let roster = ParticipantRoster::from_entries(self.game_repo.list_participants(&game.id).await?);

        Ok(GetGameOutput {
            participant_ids: roster.participant_ids(),
            waitlist_ids: roster.waitlist_ids(),
            game,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GetGameError {
    #[error("Game not found")]
    GameNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
