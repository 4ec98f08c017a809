use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::Game;
use crate::domain::repositories::{GameRepository, RepositoryError};
use crate::domain::services::compute_priority;
use crate::domain::value_objects::{Attendance, PriorityScore};

/// Scores users of a group from their recent attendance
pub struct PriorityScorer<G: GameRepository> {
    game_repo: Arc<G>,
    history_window: u32,
}

impl<G: GameRepository> PriorityScorer<G> {
    pub fn new(game_repo: Arc<G>, history_window: u32) -> Self {
        Self {
            game_repo,
            history_window,
        }
    }

    /// Score one user against the group's games scheduled before `now`
    pub async fn score(
        &self,
        user_id: &str,
        group_id: &str,
        now: i64,
    ) -> Result<PriorityScore, RepositoryError> {
        let history = self.recent_games(group_id, now).await?;
        self.score_against(user_id, &history).await
    }

    /// Most recent past games of a group, newest first
    pub async fn recent_games(&self, group_id: &str, now: i64) -> Result<Vec<Game>, RepositoryError> {
        self.game_repo
            .find_past_games_by_group(group_id, now, self.history_window)
            .await
    }

    /// Score one user against an already loaded history (newest first)
    pub async fn score_against(
        &self,
        user_id: &str,
        history: &[Game],
    ) -> Result<PriorityScore, RepositoryError> {
        if history.is_empty() {
            return Ok(PriorityScore::cold_start());
        }

        let game_ids: Vec<String> = history.iter().map(|g| g.id.clone()).collect();
        let statuses: HashMap<String, _> = self
            .game_repo
            .find_user_entries(user_id, &game_ids)
            .await?
            .into_iter()
            .map(|entry| (entry.game_id, entry.status))
            .collect();

        let attendance: Vec<Attendance> = history
            .iter()
            .map(|game| Attendance::from_status(statuses.get(&game.id).copied()))
            .collect();

        Ok(compute_priority(&attendance))
    }
}
