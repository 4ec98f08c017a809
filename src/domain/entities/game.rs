use serde::{Deserialize, Serialize};

/// Game lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Upcoming,
    InProgress,
    Completed,
    Canceled,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Upcoming => "upcoming",
            GameStatus::InProgress => "in_progress",
            GameStatus::Completed => "completed",
            GameStatus::Canceled => "canceled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "upcoming" => Some(GameStatus::Upcoming),
            "in_progress" => Some(GameStatus::InProgress),
            "completed" => Some(GameStatus::Completed),
            "canceled" => Some(GameStatus::Canceled),
            _ => None,
        }
    }

    /// Completed and Canceled games accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::Completed | GameStatus::Canceled)
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step
    pub fn can_transition_to(&self, next: GameStatus) -> bool {
        match (self, next) {
            (GameStatus::Upcoming, GameStatus::InProgress) => true,
            (GameStatus::InProgress, GameStatus::Completed) => true,
            (GameStatus::Upcoming | GameStatus::InProgress, GameStatus::Canceled) => true,
            _ => false,
        }
    }
}

/// Rejected lifecycle change
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot move game from {} to {}", from.as_str(), to.as_str())]
pub struct InvalidTransition {
    pub from: GameStatus,
    pub to: GameStatus,
}

/// Game entity
///
/// `current_participants` is owned by the registry's transactional writes in the
/// game repository; nothing else should assign it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub scheduled_time: i64,
    pub status: GameStatus,
    pub max_participants: Option<u32>,
    pub min_participants: u32,
    pub current_participants: u32,
    pub version: i64,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Game {
    /// Create a new upcoming game with no participants
    pub fn new(
        id: String,
        group_id: String,
        title: String,
        scheduled_time: i64,
        max_participants: Option<u32>,
        min_participants: u32,
        created_by: String,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id,
            group_id,
            title,
            scheduled_time,
            status: GameStatus::Upcoming,
            max_participants,
            min_participants,
            current_participants: 0,
            version: 0,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when another confirmation would exceed `max_participants`
    pub fn is_full(&self) -> bool {
        self.max_participants
            .is_some_and(|max| self.current_participants >= max)
    }

    /// Open confirmed slots, `None` for uncapped games
    pub fn available_spots(&self, confirmed_count: u32) -> Option<u32> {
        self.max_participants
            .map(|max| max.saturating_sub(confirmed_count))
    }

    /// Validate and apply a lifecycle transition
    pub fn transition_to(&mut self, next: GameStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = chrono::Utc::now().timestamp_millis();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(max: Option<u32>) -> Game {
        Game::new(
            "g1".into(),
            "grp".into(),
            "Sunday five-a-side".into(),
            0,
            max,
            0,
            "host".into(),
        )
    }

    #[test]
    fn test_forward_transitions() {
        let mut g = game(None);
        assert!(g.transition_to(GameStatus::InProgress).is_ok());
        assert!(g.transition_to(GameStatus::Completed).is_ok());
        assert_eq!(g.status, GameStatus::Completed);
    }

    #[test]
    fn test_cancel_from_non_terminal_states() {
        let mut g = game(None);
        assert!(g.transition_to(GameStatus::Canceled).is_ok());

        let mut g = game(None);
        g.transition_to(GameStatus::InProgress).unwrap();
        assert!(g.transition_to(GameStatus::Canceled).is_ok());
    }

    #[test]
    fn test_no_transition_out_of_terminal_states() {
        for terminal in [GameStatus::Completed, GameStatus::Canceled] {
            for next in [
                GameStatus::Upcoming,
                GameStatus::InProgress,
                GameStatus::Completed,
                GameStatus::Canceled,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_skipping_and_reversing_is_rejected() {
        let mut g = game(None);
        let err = g.transition_to(GameStatus::Completed).unwrap_err();
        assert_eq!(err.from, GameStatus::Upcoming);
        assert_eq!(err.to, GameStatus::Completed);
        assert_eq!(g.status, GameStatus::Upcoming);

        g.transition_to(GameStatus::InProgress).unwrap();
        assert!(g.transition_to(GameStatus::Upcoming).is_err());
    }

    #[test]
    fn test_capacity_helpers() {
        let mut g = game(Some(2));
        assert!(!g.is_full());
        g.current_participants = 2;
        assert!(g.is_full());
        assert_eq!(g.available_spots(1), Some(1));
        assert_eq!(g.available_spots(5), Some(0));
        assert_eq!(game(None).available_spots(40), None);
        assert!(!game(None).is_full());
    }

    #[test]
    fn test_status_string_round_trip() {
        assert_eq!(GameStatus::from_str("in_progress"), Some(GameStatus::InProgress));
        assert_eq!(GameStatus::from_str("bogus"), None);
    }
}
