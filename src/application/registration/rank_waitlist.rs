use std::sync::Arc;

use crate::application::registration::PriorityScorer;
use crate::domain::entities::{Game, GameParticipant, ParticipantStatus};
use crate::domain::repositories::{GameRepository, RepositoryError};
use crate::domain::services::{rank_candidates, RankedCandidate};

/// Rank waitlist input
pub struct RankWaitlistInput {
    pub game_id: String,
}

/// Rank waitlist output
pub struct RankWaitlistOutput {
    pub game: Game,
    pub candidates: Vec<RankedCandidate>,
}

/// Waitlisted entries of a game in the order they would be promoted
pub struct RankWaitlist<G: GameRepository> {
    game_repo: Arc<G>,
    scorer: PriorityScorer<G>,
}

impl<G: GameRepository> RankWaitlist<G> {
    pub fn new(game_repo: Arc<G>, history_window: u32) -> Self {
        Self {
            scorer: PriorityScorer::new(game_repo.clone(), history_window),
            game_repo,
        }
    }

    pub async fn execute(&self, input: RankWaitlistInput) -> Result<RankWaitlistOutput, RankWaitlistError> {
        let game = self
            .game_repo
            .find_by_id(&input.game_id)
            .await?
            .ok_or(RankWaitlistError::GameNotFound)?;

        let entries = self.game_repo.list_participants(&game.id).await?;
        let now = chrono::Utc::now().timestamp_millis();
        let candidates = self.rank(&game, entries, None, now).await?;

        Ok(RankWaitlistOutput { game, candidates })
    }

    /// Score and order the waitlisted entries among `entries`, leaving out `exclude`
    pub async fn rank(
        &self,
        game: &Game,
        entries: Vec<GameParticipant>,
        exclude: Option<&str>,
        now: i64,
    ) -> Result<Vec<RankedCandidate>, RepositoryError> {
        let waitlisted: Vec<GameParticipant> = entries
            .into_iter()
            .filter(|entry| entry.status == ParticipantStatus::Waitlist)
            .filter(|entry| exclude != Some(entry.user_id.as_str()))
            .collect();

        if waitlisted.is_empty() {
            return Ok(Vec::new());
        }

        let history = self.scorer.recent_games(&game.group_id, now).await?;

        let mut candidates = Vec::with_capacity(waitlisted.len());
        for participant in waitlisted {
            let score = self
                .scorer
                .score_against(&participant.user_id, &history)
                .await?;
            candidates.push(RankedCandidate { participant, score });
        }

        Ok(rank_candidates(candidates))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RankWaitlistError {
    #[error("Game not found")]
    GameNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
