use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::application::registration::{CapacityGate, RankWaitlist};
use crate::domain::entities::ParticipantStatus;
use crate::domain::repositories::{GameRepository, RepositoryError};
use crate::domain::services::RankedCandidate;

/// Process waitlist input
pub struct ProcessWaitlistInput {
    pub game_id: String,
    /// User left out of this round, e.g. one a host just moved to the waitlist
    pub exclude: Option<String>,
}

/// Process waitlist output
#[derive(Debug, Default)]
pub struct ProcessWaitlistOutput {
    /// Promoted entries, in promotion order
    pub promoted: Vec<RankedCandidate>,
    /// Users whose promotion failed and was skipped
    pub skipped: Vec<String>,
}

impl ProcessWaitlistOutput {
    pub fn promoted_count(&self) -> usize {
        self.promoted.len()
    }
}

/// Fill open slots of a capped game from its waitlist, best score first.
///
/// Every promotion is its own transaction. A failed promotion is logged and
/// skipped; the rest of the batch still runs.
pub struct ProcessWaitlist<G: GameRepository> {
    game_repo: Arc<G>,
    ranker: RankWaitlist<G>,
    gate: CapacityGate<G>,
}

impl<G: GameRepository> ProcessWaitlist<G> {
    pub fn new(game_repo: Arc<G>, history_window: u32, max_retries: u32) -> Self {
        Self {
            ranker: RankWaitlist::new(game_repo.clone(), history_window),
            gate: CapacityGate::new(game_repo.clone(), max_retries),
            game_repo,
        }
    }

    pub async fn execute(
        &self,
        input: ProcessWaitlistInput,
    ) -> Result<ProcessWaitlistOutput, ProcessWaitlistError> {
        let game = self
            .game_repo
            .find_by_id(&input.game_id)
            .await?
            .ok_or(ProcessWaitlistError::GameNotFound)?;

        // Uncapped games never waitlist
        let Some(max_participants) = game.max_participants else {
            return Ok(ProcessWaitlistOutput::default());
        };

        let entries = self.game_repo.list_participants(&game.id).await?;
        let confirmed = entries
            .iter()
            .filter(|entry| entry.status == ParticipantStatus::Confirmed)
            .count() as u32;

        if confirmed >= max_participants {
            return Ok(ProcessWaitlistOutput::default());
        }
        let available_spots = (max_participants - confirmed) as usize;

        let now = chrono::Utc::now().timestamp_millis();
        let ranked = self
            .ranker
            .rank(&game, entries, input.exclude.as_deref(), now)
            .await?;
        if ranked.is_empty() {
            return Ok(ProcessWaitlistOutput::default());
        }

        let gate = &self.gate;
        let game_id = game.id.as_str();

        let output = stream::iter(ranked.into_iter().take(available_spots))
            .fold(ProcessWaitlistOutput::default(), |mut acc, candidate| async move {
                let user_id = candidate.participant.user_id.clone();
                match gate.promote(game_id, &user_id).await {
                    Ok(change) => {
                        tracing::info!(
                            game_id,
                            user_id = %user_id,
                            score = candidate.score.total,
                            "Promoted from waitlist"
                        );
                        acc.promoted.push(RankedCandidate {
                            participant: change.participant,
                            score: candidate.score,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(
                            game_id,
                            user_id = %user_id,
                            error = %e,
                            "Waitlist promotion failed, skipping"
                        );
                        acc.skipped.push(user_id);
                    }
                }
                acc
            })
            .await;

        Ok(output)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessWaitlistError {
    #[error("Game not found")]
    GameNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
