use crate::domain::value_objects::{Attendance, PriorityScore};

/// Number of past games considered when scoring
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

const ATTENDANCE_WEIGHT: f64 = 40.0;
const REGULARITY_WEIGHT: f64 = 30.0;
const WAITLIST_WEIGHT: f64 = 30.0;

/// Compute a priority score from a user's attendance, most recent game first.
///
/// An empty history is the cold start case and scores 50. A history where the
/// user never appears scores 0.
pub fn compute_priority(history: &[Attendance]) -> PriorityScore {
    if history.is_empty() {
        return PriorityScore::cold_start();
    }

    let mut participated = 0u32;
    let mut waitlisted = 0u32;
    let mut streak = 0u32;
    let mut max_streak = 0u32;

    for attendance in history {
        match attendance {
            Attendance::Participated => {
                participated += 1;
                streak += 1;
                max_streak = max_streak.max(streak);
            }
            Attendance::Waitlisted => {
                waitlisted += 1;
                streak = 0;
            }
            Attendance::Absent => streak = 0,
        }
    }

    let games = history.len() as f64;
    let attendance_rate = f64::from(participated) / games * ATTENDANCE_WEIGHT;
    let regularity = f64::from(max_streak) / games * REGULARITY_WEIGHT;
    let waitlist_history = f64::from(waitlisted) / games * WAITLIST_WEIGHT;
    let total = (attendance_rate + regularity + waitlist_history).clamp(0.0, PriorityScore::MAX);

    PriorityScore {
        games_considered: history.len() as u32,
        participated,
        waitlisted,
        max_streak,
        attendance_rate,
        regularity,
        waitlist_history,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Attendance::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_cold_start_is_fifty() {
        let score = compute_priority(&[]);
        assert!(score.is_cold_start());
        assert_eq!(score.total, 50.0);
    }

    #[test]
    fn test_always_absent_scores_zero() {
        let score = compute_priority(&[Absent; 10]);
        assert!(!score.is_cold_start());
        assert_eq!(score.total, 0.0);
    }

    #[test]
    fn test_recent_streak_then_absence() {
        // Confirmed in the three most recent games, absent in the other seven
        let mut history = vec![Participated, Participated, Participated];
        history.extend([Absent; 7]);

        let score = compute_priority(&history);
        assert_eq!(score.max_streak, 3);
        assert!(approx(score.attendance_rate, 12.0));
        assert!(approx(score.regularity, 9.0));
        assert!(approx(score.waitlist_history, 0.0));
        assert!(approx(score.total, 21.0));
    }

    #[test]
    fn test_waitlist_component_and_streak_reset() {
        // P P W P A P P P W A
        let history = [
            Participated,
            Participated,
            Waitlisted,
            Participated,
            Absent,
            Participated,
            Participated,
            Participated,
            Waitlisted,
            Absent,
        ];
        let score = compute_priority(&history);
        assert_eq!(score.participated, 6);
        assert_eq!(score.waitlisted, 2);
        assert_eq!(score.max_streak, 3);
        // 24 + 9 + 6
        assert!(approx(score.total, 39.0));
    }

    #[test]
    fn test_perfect_attendance_caps_at_seventy() {
        let score = compute_priority(&[Participated; 4]);
        assert!(approx(score.total, 70.0));
    }

    #[test]
    fn test_always_waitlisted() {
        let score = compute_priority(&[Waitlisted; 5]);
        assert_eq!(score.max_streak, 0);
        assert!(approx(score.total, 30.0));
    }

    #[test]
    fn test_short_history_is_normalised_by_game_count() {
        let score = compute_priority(&[Participated, Absent]);
        // 20 + 15
        assert!(approx(score.total, 35.0));
    }
}
