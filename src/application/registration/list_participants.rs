use std::sync::Arc;

use crate::domain::entities::{Game, ParticipantRoster};
use crate::domain::repositories::{GameRepository, RepositoryError};

/// List participants input
pub struct ListParticipantsInput {
    pub game_id: String,
}

/// List participants output
pub struct ListParticipantsOutput {
    pub game: Game,
    pub roster: ParticipantRoster,
}

/// Registry of a game grouped by status
pub struct ListParticipants<G: GameRepository> {
    game_repo: Arc<G>,
}

impl<G: GameRepository> ListParticipants<G> {
    pub fn new(game_repo: Arc<G>) -> Self {
        Self { game_repo }
    }

    pub async fn execute(
        &self,
        input: ListParticipantsInput,
    ) -> Result<ListParticipantsOutput, ListParticipantsError> {
        let game = self
            .game_repo
            .find_by_id(&input.game_id)
            .await?
            .ok_or(ListParticipantsError::GameNotFound)?;

        let entries = self.game_repo.list_participants(&game.id).await?;

        Ok(ListParticipantsOutput {
            game,
            roster: ParticipantRoster::from_entries(entries),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListParticipantsError {
    #[error("Game not found")]
    GameNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
