use serde::{Deserialize, Serialize};

use crate::domain::entities::ParticipantStatus;

/// How a user showed up for one past game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attendance {
    Participated,
    Waitlisted,
    Absent,
}

impl Attendance {
    /// Classify a user's registry entry (if any) for a past game
    pub fn from_status(status: Option<ParticipantStatus>) -> Self {
        match status {
            Some(ParticipantStatus::Confirmed) => Attendance::Participated,
            Some(ParticipantStatus::Waitlist) => Attendance::Waitlisted,
            Some(ParticipantStatus::Invited) | Some(ParticipantStatus::Declined) | None => {
                Attendance::Absent
            }
        }
    }
}

/// Waitlist priority of one user within a group, 0 to 100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityScore {
    pub games_considered: u32,
    pub participated: u32,
    pub waitlisted: u32,
    pub max_streak: u32,
    /// 0-40
    pub attendance_rate: f64,
    /// 0-30
    pub regularity: f64,
    /// 0-30
    pub waitlist_history: f64,
    pub total: f64,
}

impl PriorityScore {
    /// Score given to users of a group with no past games
    pub const COLD_START: f64 = 50.0;
    pub const MAX: f64 = 100.0;

    pub fn cold_start() -> Self {
        Self {
            games_considered: 0,
            participated: 0,
            waitlisted: 0,
            max_streak: 0,
            attendance_rate: 0.0,
            regularity: 0.0,
            waitlist_history: 0.0,
            total: Self::COLD_START,
        }
    }

    pub fn is_cold_start(&self) -> bool {
        self.games_considered == 0
    }
}
