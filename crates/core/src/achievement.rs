//! Achievement records and the server-side merge rule.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Balance thresholds announced to the player, with the achievement id
/// recorded when each is first reached.
pub const BALANCE_MILESTONES: &[(&str, f64)] = &[
    ("batons_1000", 1_000.0),
    ("batons_1000000", 1_000_000.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl Achievement {
    /// A completed achievement reported by the client.
    pub fn completed(id: &str, progress: f64) -> Self {
        Self {
            id: id.to_string(),
            completed: true,
            progress,
            completed_at: None,
        }
    }
}

/// Merge client-submitted achievements into the stored list.
///
/// - Matching id: progress is overwritten. If the incoming entry is
///   completed and the stored one is not, the stored entry becomes
///   completed with `completed_at = now`. Completion never reverts.
/// - No match: the incoming entry is appended unchanged.
pub fn merge_achievements(
    stored: &mut Vec<Achievement>,
    incoming: Vec<Achievement>,
    now: Timestamp,
) {
    for achievement in incoming {
        match stored.iter_mut().find(|a| a.id == achievement.id) {
            Some(existing) => {
                existing.progress = achievement.progress;
                if achievement.completed && !existing.completed {
                    existing.completed = true;
                    existing.completed_at = Some(now);
                }
            }
            None => stored.push(achievement),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn partial(id: &str, progress: f64) -> Achievement {
        Achievement {
            id: id.to_string(),
            completed: false,
            progress,
            completed_at: None,
        }
    }

    #[test]
    fn appends_unknown_ids() {
        let mut stored = vec![partial("a", 1.0)];
        merge_achievements(&mut stored, vec![partial("b", 2.0)], at(10));
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1], partial("b", 2.0));
    }

    #[test]
    fn updates_progress_on_match() {
        let mut stored = vec![partial("a", 1.0)];
        merge_achievements(&mut stored, vec![partial("a", 7.0)], at(10));
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].progress, 7.0);
        assert!(!stored[0].completed);
    }

    #[test]
    fn stamps_completion_once() {
        let mut stored = vec![partial("a", 1.0)];
        merge_achievements(&mut stored, vec![Achievement::completed("a", 5.0)], at(10));
        assert!(stored[0].completed);
        assert_eq!(stored[0].completed_at, Some(at(10)));

        merge_achievements(&mut stored, vec![Achievement::completed("a", 5.0)], at(99));
        assert_eq!(stored[0].completed_at, Some(at(10)), "first completion time is kept");
    }

    #[test]
    fn completion_never_reverts() {
        let mut stored = vec![partial("a", 1.0)];
        merge_achievements(&mut stored, vec![Achievement::completed("a", 5.0)], at(10));
        merge_achievements(&mut stored, vec![partial("a", 2.0)], at(20));
        assert!(stored[0].completed);
        assert_eq!(stored[0].progress, 2.0);
    }

    #[test]
    fn milestones_are_ascending() {
        for pair in BALANCE_MILESTONES.windows(2) {
            assert!(pair[0].1 < pair[1].1);
        }
    }
}
