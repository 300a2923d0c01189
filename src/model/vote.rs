use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::errors::ResError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteType::Up => "up",
            VoteType::Down => "down",
        }
    }

    fn weight(self) -> i32 {
        match self {
            VoteType::Up => 1,
            VoteType::Down => -1,
        }
    }
}

impl FromStr for VoteType {
    type Err = ResError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(VoteType::Up),
            "down" => Ok(VoteType::Down),
            _ => Err(ResError::Internal),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteTarget {
    Topic,
    Post,
}

impl VoteTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteTarget::Topic => "topic",
            VoteTarget::Post => "post",
        }
    }

    /// Table holding the denormalized vote_score for this target kind.
    pub fn table(self) -> &'static str {
        match self {
            VoteTarget::Topic => "forum_topics",
            VoteTarget::Post => "forum_posts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Added,
    Changed,
    Removed,
}

/// Ledger transition for one cast: what happens to the voter's existing
/// row and how the target's score moves. A repeated vote cancels itself,
/// a flipped vote counts double since the old contribution is reversed.
/// The delta formula assumes exactly two vote types of symmetric weight.
pub fn transition(existing: Option<VoteType>, incoming: VoteType) -> (VoteAction, i32) {
    match existing {
        None => (VoteAction::Added, incoming.weight()),
        Some(prev) if prev == incoming => (VoteAction::Removed, -incoming.weight()),
        Some(_) => (VoteAction::Changed, 2 * incoming.weight()),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct VoteCount {
    pub like_count: i64,
    pub dislike_count: i64,
}

/// Folds one fan-out query's rows into per-target like/dislike counts.
pub fn tally_votes(votes: &[(Uuid, VoteType)]) -> HashMap<Uuid, VoteCount> {
    let mut counts: HashMap<Uuid, VoteCount> = HashMap::with_capacity(votes.len());
    for (target_id, vote_type) in votes {
        let entry = counts.entry(*target_id).or_default();
        match vote_type {
            VoteType::Up => entry.like_count += 1,
            VoteType::Down => entry.dislike_count += 1,
        }
    }
    counts
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub target_type: VoteTarget,
    pub target_id: Uuid,
    pub vote_type: VoteType,
}

#[derive(Debug, Deserialize)]
pub struct VoteStatusQuery {
    pub target_type: VoteTarget,
    pub target_id: Uuid,
}

#[derive(Serialize)]
pub struct VoteReceipt {
    pub action: VoteAction,
    pub vote_change: i32,
    pub new_score: i32,
}

#[derive(Serialize)]
pub struct VoteStatus {
    pub has_voted: bool,
    pub vote_type: Option<VoteType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_vote_is_added() {
        assert_eq!(transition(None, VoteType::Up), (VoteAction::Added, 1));
        assert_eq!(transition(None, VoteType::Down), (VoteAction::Added, -1));
    }

    #[test]
    fn repeated_vote_is_removed() {
        assert_eq!(
            transition(Some(VoteType::Up), VoteType::Up),
            (VoteAction::Removed, -1)
        );
        assert_eq!(
            transition(Some(VoteType::Down), VoteType::Down),
            (VoteAction::Removed, 1)
        );
    }

    #[test]
    fn flipped_vote_is_changed_and_counts_double() {
        assert_eq!(
            transition(Some(VoteType::Down), VoteType::Up),
            (VoteAction::Changed, 2)
        );
        assert_eq!(
            transition(Some(VoteType::Up), VoteType::Down),
            (VoteAction::Changed, -2)
        );
    }

    #[test]
    fn up_then_down_then_down_again() {
        // single voter on one target: 0 -> 1 -> -1 -> 0
        let mut score = 0;
        let mut existing = None;

        let (action, delta) = transition(existing, VoteType::Up);
        score += delta;
        existing = Some(VoteType::Up);
        assert_eq!((action, score), (VoteAction::Added, 1));

        let (action, delta) = transition(existing, VoteType::Down);
        score += delta;
        existing = Some(VoteType::Down);
        assert_eq!((action, score), (VoteAction::Changed, -1));

        let (action, delta) = transition(existing, VoteType::Down);
        score += delta;
        assert_eq!((action, score), (VoteAction::Removed, 0));
    }

    #[test]
    fn double_cast_restores_previous_score() {
        for vote in [VoteType::Up, VoteType::Down] {
            let (_, d1) = transition(None, vote);
            let (_, d2) = transition(Some(vote), vote);
            assert_eq!(d1 + d2, 0);
        }
    }

    #[test]
    fn score_matches_ledger_over_random_sequence() {
        // several voters hammer one target; after every cast the running
        // score must equal ups minus downs in the ledger
        let voters: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let mut ledger: HashMap<Uuid, VoteType> = HashMap::new();
        let mut score: i32 = 0;
        let mut seed: u64 = 0x5DEE_CE66_D;

        for _ in 0..500 {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let voter = voters[(seed >> 33) as usize % voters.len()];
            let vote = if (seed >> 17) & 1 == 0 {
                VoteType::Up
            } else {
                VoteType::Down
            };

            let (action, delta) = transition(ledger.get(&voter).copied(), vote);
            match action {
                VoteAction::Added | VoteAction::Changed => {
                    ledger.insert(voter, vote);
                }
                VoteAction::Removed => {
                    ledger.remove(&voter);
                }
            }
            score += delta;

            let ups = ledger.values().filter(|v| **v == VoteType::Up).count() as i32;
            let downs = ledger.values().filter(|v| **v == VoteType::Down).count() as i32;
            assert_eq!(score, ups - downs);
            assert!(ledger.len() <= voters.len());
        }
    }

    #[test]
    fn tally_groups_by_target() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let votes = vec![
            (a, VoteType::Up),
            (a, VoteType::Up),
            (a, VoteType::Down),
            (b, VoteType::Down),
        ];

        let counts = tally_votes(&votes);
        assert_eq!(counts[&a].like_count, 2);
        assert_eq!(counts[&a].dislike_count, 1);
        assert_eq!(counts[&b].like_count, 0);
        assert_eq!(counts[&b].dislike_count, 1);
        assert!(counts.get(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn vote_type_round_trips_through_wire_and_column_text() {
        assert_eq!(serde_json::to_string(&VoteType::Up).unwrap(), "\"up\"");
        assert_eq!(serde_json::to_string(&VoteType::Down).unwrap(), "\"down\"");
        assert_eq!("up".parse::<VoteType>().unwrap(), VoteType::Up);
        assert_eq!("down".parse::<VoteType>().unwrap(), VoteType::Down);
        assert!("sideways".parse::<VoteType>().is_err());
    }
}
