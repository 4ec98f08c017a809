use std::sync::Arc;

use crate::domain::entities::{Game, GameParticipant, GameStatus, InvalidTransition};
use crate::domain::repositories::{GameRepository, GroupRepository, RepositoryError};

/// Update game status input
pub struct UpdateGameStatusInput {
    pub actor_id: String,
    pub game_id: String,
    pub status: GameStatus,
}

/// Update game status output
pub struct UpdateGameStatusOutput {
    pub game: Game,
    pub previous: GameStatus,
    /// Entries of the game, for notifying them of the change
    pub participants: Vec<GameParticipant>,
}

/// Move a game along its lifecycle
pub struct UpdateGameStatus<G: GameRepository, R: GroupRepository> {
    game_repo: Arc<G>,
    group_repo: Arc<R>,
}

impl<G: GameRepository, R: GroupRepository> UpdateGameStatus<G, R> {
    pub fn new(game_repo: Arc<G>, group_repo: Arc<R>) -> Self {
        Self {
            game_repo,
            group_repo,
        }
    }

    pub async fn execute(
        &self,
        input: UpdateGameStatusInput,
    ) -> Result<UpdateGameStatusOutput, UpdateGameStatusError> {
        let mut game = self
            .game_repo
            .find_by_id(&input.game_id)
            .await?
            .ok_or(UpdateGameStatusError::GameNotFound)?;

        if !self
            .group_repo
            .can_manage_game(&game.group_id, &input.actor_id)
            .await?
        {
            return Err(UpdateGameStatusError::Forbidden);
        }

        let previous = game.status;
        let expected_version = game.version;
        game.transition_to(input.status)?;

        self.game_repo
            .update_status(&game.id, game.status, expected_version)
            .await?;
        game.version = expected_version + 1;

        tracing::info!(
            game_id = %game.id,
            from = previous.as_str(),
            to = game.status.as_str(),
            "Game status changed"
        );

        let participants = self.game_repo.list_participants(&game.id).await?;

        Ok(UpdateGameStatusOutput {
            game,
            previous,
            participants,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateGameStatusError {
    #[error("Game not found")]
    GameNotFound,
    #[error("Only group hosts can change the game status")]
    Forbidden,
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
