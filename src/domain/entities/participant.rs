use serde::{Deserialize, Serialize};

/// Membership status of a user for one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Confirmed,
    Waitlist,
    Invited,
    Declined,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Confirmed => "confirmed",
            ParticipantStatus::Waitlist => "waitlist",
            ParticipantStatus::Invited => "invited",
            ParticipantStatus::Declined => "declined",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(ParticipantStatus::Confirmed),
            "waitlist" => Some(ParticipantStatus::Waitlist),
            "invited" => Some(ParticipantStatus::Invited),
            "declined" => Some(ParticipantStatus::Declined),
            _ => None,
        }
    }

    /// Only confirmed entries hold a slot
    pub fn holds_slot(&self) -> bool {
        match self {
            ParticipantStatus::Confirmed => true,
            ParticipantStatus::Waitlist
            | ParticipantStatus::Invited
            | ParticipantStatus::Declined => false,
        }
    }

    /// Change to the confirmed counter when moving from `self` to `next`
    pub fn slot_delta(&self, next: ParticipantStatus) -> i64 {
        match (self.holds_slot(), next.holds_slot()) {
            (false, true) => 1,
            (true, false) => -1,
            _ => 0,
        }
    }
}

/// Registry entry: one per (game, user)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameParticipant {
    pub id: i64,
    pub game_id: String,
    pub user_id: String,
    pub status: ParticipantStatus,
    pub joined_at: i64,
    pub registered_at: i64,
    pub updated_at: i64,
}

impl GameParticipant {
    /// Create a new registry entry
    pub fn new(game_id: String, user_id: String, status: ParticipantStatus) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: 0, // Set by database
            game_id,
            user_id,
            status,
            joined_at: now,
            registered_at: now,
            updated_at: now,
        }
    }
}

/// Status change applied to a registry entry
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub previous: ParticipantStatus,
    pub participant: GameParticipant,
}

impl StatusChange {
    /// True when this change released a confirmed slot
    pub fn freed_slot(&self) -> bool {
        self.previous.slot_delta(self.participant.status) < 0
    }
}

/// Registry of one game grouped by status, each group in registration order
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRoster {
    pub confirmed: Vec<GameParticipant>,
    pub waitlist: Vec<GameParticipant>,
    pub invited: Vec<GameParticipant>,
    pub declined: Vec<GameParticipant>,
}

impl ParticipantRoster {
    /// Group entries that are already sorted by registration
    pub fn from_entries(entries: Vec<GameParticipant>) -> Self {
        let mut roster = Self::default();
        for entry in entries {
            match entry.status {
                ParticipantStatus::Confirmed => roster.confirmed.push(entry),
                ParticipantStatus::Waitlist => roster.waitlist.push(entry),
                ParticipantStatus::Invited => roster.invited.push(entry),
                ParticipantStatus::Declined => roster.declined.push(entry),
            }
        }
        roster
    }

    pub fn participant_ids(&self) -> Vec<String> {
        self.confirmed.iter().map(|p| p.user_id.clone()).collect()
    }

    pub fn waitlist_ids(&self) -> Vec<String> {
        self.waitlist.iter().map(|p| p.user_id.clone()).collect()
    }

    pub fn total(&self) -> usize {
        self.confirmed.len() + self.waitlist.len() + self.invited.len() + self.declined.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_delta_crosses_confirmed_boundary() {
        use ParticipantStatus::*;
        assert_eq!(Waitlist.slot_delta(Confirmed), 1);
        assert_eq!(Invited.slot_delta(Confirmed), 1);
        assert_eq!(Confirmed.slot_delta(Waitlist), -1);
        assert_eq!(Confirmed.slot_delta(Declined), -1);
        assert_eq!(Confirmed.slot_delta(Confirmed), 0);
        assert_eq!(Waitlist.slot_delta(Declined), 0);
    }

    #[test]
    fn test_freed_slot() {
        let mut participant =
            GameParticipant::new("g".into(), "u".into(), ParticipantStatus::Declined);
        let change = StatusChange {
            previous: ParticipantStatus::Confirmed,
            participant: participant.clone(),
        };
        assert!(change.freed_slot());

        participant.status = ParticipantStatus::Confirmed;
        let change = StatusChange {
            previous: ParticipantStatus::Waitlist,
            participant,
        };
        assert!(!change.freed_slot());
    }

    #[test]
    fn test_roster_groups_by_status_keeping_order() {
        let entries = vec![
            GameParticipant::new("g".into(), "a".into(), ParticipantStatus::Confirmed),
            GameParticipant::new("g".into(), "b".into(), ParticipantStatus::Waitlist),
            GameParticipant::new("g".into(), "c".into(), ParticipantStatus::Confirmed),
            GameParticipant::new("g".into(), "d".into(), ParticipantStatus::Declined),
            GameParticipant::new("g".into(), "e".into(), ParticipantStatus::Waitlist),
        ];
        let roster = ParticipantRoster::from_entries(entries);
        assert_eq!(roster.participant_ids(), vec!["a", "c"]);
        assert_eq!(roster.waitlist_ids(), vec!["b", "e"]);
        assert!(roster.invited.is_empty());
        assert_eq!(roster.declined.len(), 1);
        assert_eq!(roster.total(), 5);
    }
}
