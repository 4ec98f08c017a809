use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::Game;
use crate::domain::repositories::{GameRepository, GroupRepository, RepositoryError};

/// Create game input
pub struct CreateGameInput {
    pub host_id: String,
    pub group_id: String,
    pub title: String,
    pub scheduled_time: i64,
    pub max_participants: Option<u32>,
    pub min_participants: u32,
}

/// Create game output
pub struct CreateGameOutput {
    pub game: Game,
}

/// Create game use case
pub struct CreateGame<G: GameRepository, R: GroupRepository> {
    game_repo: Arc<G>,
    group_repo: Arc<R>,
}

impl<G: GameRepository, R: GroupRepository> CreateGame<G, R> {
    pub fn new(game_repo: Arc<G>, group_repo: Arc<R>) -> Self {
        Self {
            game_repo,
            group_repo,
        }
    }

    pub async fn execute(&self, input: CreateGameInput) -> Result<CreateGameOutput, CreateGameError> {
        // Validate title
        if input.title.trim().is_empty() {
            return Err(CreateGameError::Validation("Game title is required".into()));
        }

        // Validate capacity
        if let Some(max) = input.max_participants {
            if max == 0 {
                return Err(CreateGameError::Validation(
                    "maxParticipants must be at least 1".into(),
                ));
            }
            if max < input.min_participants {
                return Err(CreateGameError::Validation(
                    "maxParticipants must not be lower than minParticipants".into(),
                ));
            }
        }

        self.group_repo
            .find_by_id(&input.group_id)
            .await?
            .ok_or(CreateGameError::GroupNotFound)?;

        if !self
            .group_repo
            .can_manage_game(&input.group_id, &input.host_id)
            .await?
        {
            return Err(CreateGameError::Forbidden);
        }

        let game = Game::new(
            Uuid::new_v4().to_string(),
            input.group_id,
            input.title.trim().to_string(),
            input.scheduled_time,
            input.max_participants,
            input.min_participants,
            input.host_id,
        );

        self.game_repo.create(&game).await?;

        tracing::info!(game_id = %game.id, group_id = %game.group_id, "Game created");

        Ok(CreateGameOutput { game })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreateGameError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Group not found")]
    GroupNotFound,
    #[error("Only group hosts can create games")]
    Forbidden,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
