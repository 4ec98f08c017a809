use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::entities::GameParticipant;
use crate::domain::value_objects::PriorityScore;

/// Waitlisted entry with its computed priority
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub participant: GameParticipant,
    pub score: PriorityScore,
}

/// Promotion order: highest score first, then first come first served.
/// Row id settles entries registered in the same millisecond.
pub fn promotion_order(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.score
        .total
        .total_cmp(&a.score.total)
        .then_with(|| a.participant.registered_at.cmp(&b.participant.registered_at))
        .then_with(|| a.participant.id.cmp(&b.participant.id))
}

/// Sort candidates into promotion order
pub fn rank_candidates(mut candidates: Vec<RankedCandidate>) -> Vec<RankedCandidate> {
    candidates.sort_by(promotion_order);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ParticipantStatus;

    fn candidate(id: i64, user: &str, registered_at: i64, total: f64) -> RankedCandidate {
        let mut participant =
            GameParticipant::new("g".into(), user.into(), ParticipantStatus::Waitlist);
        participant.id = id;
        participant.registered_at = registered_at;
        let mut score = PriorityScore::cold_start();
        score.total = total;
        RankedCandidate { participant, score }
    }

    fn users(ranked: &[RankedCandidate]) -> Vec<&str> {
        ranked.iter().map(|c| c.participant.user_id.as_str()).collect()
    }

    #[test]
    fn test_higher_score_first() {
        let ranked = rank_candidates(vec![
            candidate(1, "low", 100, 10.0),
            candidate(2, "high", 300, 90.0),
            candidate(3, "mid", 200, 50.0),
        ]);
        assert_eq!(users(&ranked), vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_ties_go_to_earliest_registration() {
        let ranked = rank_candidates(vec![
            candidate(1, "late", 300, 50.0),
            candidate(2, "early", 100, 50.0),
            candidate(3, "middle", 200, 50.0),
        ]);
        assert_eq!(users(&ranked), vec!["early", "middle", "late"]);
    }

    #[test]
    fn test_same_millisecond_falls_back_to_insertion_order() {
        let ranked = rank_candidates(vec![
            candidate(7, "second", 100, 50.0),
            candidate(3, "first", 100, 50.0),
        ]);
        assert_eq!(users(&ranked), vec!["first", "second"]);
    }
}
