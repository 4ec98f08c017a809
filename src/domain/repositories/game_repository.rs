use async_trait::async_trait;

use crate::domain::entities::{Game, GameParticipant, GameStatus, ParticipantStatus, StatusChange};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("No capacity left: {0}")]
    CapacityReached(String),
    #[error("Concurrent modification: {0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl RepositoryError {
    /// Conflicts are worth retrying; everything else is final
    pub fn is_transient(&self) -> bool {
        matches!(self, RepositoryError::Conflict(_))
    }
}

/// Result of a capacity-gated join
#[derive(Debug, Clone)]
pub enum ConfirmOutcome {
    Confirmed(GameParticipant),
    Waitlisted(GameParticipant),
}

impl ConfirmOutcome {
    pub fn participant(&self) -> &GameParticipant {
        match self {
            ConfirmOutcome::Confirmed(p) | ConfirmOutcome::Waitlisted(p) => p,
        }
    }

    pub fn into_participant(self) -> GameParticipant {
        match self {
            ConfirmOutcome::Confirmed(p) | ConfirmOutcome::Waitlisted(p) => p,
        }
    }
}

/// Game repository trait
///
/// Registry writes run as one transaction over the game row and the entry row.
/// They are the only operations that move `current_participants`, and each
/// bumps the game's `version`, returning `RepositoryError::Conflict` when a
/// concurrent writer got there first.
#[async_trait]
pub trait GameRepository: Send + Sync {
    // ========== Game operations ==========

    /// Find game by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Game>, RepositoryError>;

    /// Insert a new game
    async fn create(&self, game: &Game) -> Result<(), RepositoryError>;

    /// Persist a status change, guarded by the version the caller read
    async fn update_status(
        &self,
        id: &str,
        status: GameStatus,
        expected_version: i64,
    ) -> Result<(), RepositoryError>;

    /// Most recent games of a group scheduled strictly before `before`, newest first
    async fn find_past_games_by_group(
        &self,
        group_id: &str,
        before: i64,
        limit: u32,
    ) -> Result<Vec<Game>, RepositoryError>;

    // ========== Registry reads ==========

    /// Find the entry of a user for a game
    async fn find_participant(
        &self,
        game_id: &str,
        user_id: &str,
    ) -> Result<Option<GameParticipant>, RepositoryError>;

    /// All entries of a game, oldest registration first
    async fn list_participants(&self, game_id: &str) -> Result<Vec<GameParticipant>, RepositoryError>;

    /// Entries of one user across several games (batch query - avoids N+1)
    async fn find_user_entries(
        &self,
        user_id: &str,
        game_ids: &[String],
    ) -> Result<Vec<GameParticipant>, RepositoryError>;

    // ========== Registry writes ==========

    /// Confirm if a slot is open, otherwise waitlist
    async fn try_confirm(&self, game_id: &str, user_id: &str) -> Result<ConfirmOutcome, RepositoryError>;

    /// Add an entry with an explicit status; a confirmed entry takes a slot
    async fn add_participant(
        &self,
        game_id: &str,
        user_id: &str,
        status: ParticipantStatus,
    ) -> Result<GameParticipant, RepositoryError>;

    /// Change an entry's status, adjusting the counter across the confirmed boundary.
    /// With `expected` set, an entry in any other status is treated as not found.
    async fn set_participant_status(
        &self,
        game_id: &str,
        user_id: &str,
        status: ParticipantStatus,
        expected: Option<ParticipantStatus>,
    ) -> Result<StatusChange, RepositoryError>;

    /// Delete an entry, releasing its slot if it held one
    async fn remove_participant(
        &self,
        game_id: &str,
        user_id: &str,
    ) -> Result<GameParticipant, RepositoryError>;
}
