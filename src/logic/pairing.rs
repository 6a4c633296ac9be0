//! Shared pairing utilities: canonical keys, team capacities and fair sit-out selection.

use std::collections::BTreeMap;

use rand::Rng;

use crate::models::{MatchupKey, PairKey, PlayerId};

/// Canonical key for two players, independent of argument order.
pub fn pair_key(a: PlayerId, b: PlayerId) -> PairKey {
    PairKey::new(a, b)
}

/// Canonical key for a court's matchup: `[A,B] vs [C,D]` == `[D,C] vs [B,A]`.
pub fn matchup_key(teams: &[Vec<PlayerId>]) -> MatchupKey {
    MatchupKey::new(teams)
}

/// Every partnership inside the given teams.
pub fn extract_pairs(teams: &[Vec<PlayerId>]) -> Vec<PairKey> {
    let mut pairs = Vec::new();
    for team in teams {
        for (i, &a) in team.iter().enumerate() {
            for &b in &team[i + 1..] {
                pairs.push(pair_key(a, b));
            }
        }
    }
    pairs
}

/// Split `n` players into `k` teams as evenly as possible; the first `n % k` teams get the extra player.
pub fn compute_capacities(n: usize, k: usize) -> Vec<usize> {
    if k == 0 {
        return Vec::new();
    }
    let base = n / k;
    let extra = n % k;
    (0..k).map(|i| if i < extra { base + 1 } else { base }).collect()
}

/// Result of sit-out rotation for one round.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ActiveSelection {
    pub active: Vec<PlayerId>,
    pub sitting_out: Vec<PlayerId>,
}

/// Pick who plays this round.
///
/// Players are ordered by how often they have sat out (ascending, random tie-break); the front of
/// that order sits out and their counters are incremented. Whoever has sat out most plays.
pub fn select_active_players<R: Rng + ?Sized>(
    players: &[PlayerId],
    active_count: usize,
    sit_out_counts: &mut BTreeMap<PlayerId, u32>,
    rng: &mut R,
) -> ActiveSelection {
    let mut with_tiebreak: Vec<(PlayerId, u32, u32)> = players
        .iter()
        .map(|&p| (p, sit_out_counts.get(&p).copied().unwrap_or(0), rng.gen::<u32>()))
        .collect();
    with_tiebreak.sort_by_key(|&(_, count, t)| (count, t));

    let sit_count = players.len().saturating_sub(active_count);
    let sitting_out: Vec<PlayerId> = with_tiebreak[..sit_count].iter().map(|&(p, _, _)| p).collect();
    let active: Vec<PlayerId> = with_tiebreak[sit_count..].iter().map(|&(p, _, _)| p).collect();

    for &p in &sitting_out {
        *sit_out_counts.entry(p).or_insert(0) += 1;
    }

    ActiveSelection {
        active,
        sitting_out,
    }
}

/// Revert the counter increments of a selection that was not used.
pub fn undo_sit_outs(selection: &ActiveSelection, sit_out_counts: &mut BTreeMap<PlayerId, u32>) {
    for p in &selection.sitting_out {
        if let Some(count) = sit_out_counts.get_mut(p) {
            *count = count.saturating_sub(1);
        }
    }
}

/// Attempt ceilings for a randomized search.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SearchBudget {
    /// Fresh shuffles tried before giving up.
    pub attempts: usize,
    /// Placement steps allowed inside one attempt.
    pub steps_per_attempt: usize,
}

impl SearchBudget {
    pub const fn new(attempts: usize, steps_per_attempt: usize) -> Self {
        Self {
            attempts,
            steps_per_attempt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    #[test]
    fn extract_pairs_covers_each_partnership_once() {
        let ids: Vec<PlayerId> = (0..5).map(|_| Uuid::new_v4()).collect();
        let teams = vec![ids[..3].to_vec(), ids[3..].to_vec()];
        let pairs = extract_pairs(&teams);
        assert_eq!(pairs.len(), 3 + 1);
        assert!(pairs.contains(&pair_key(ids[2], ids[0])));
        assert!(pairs.contains(&pair_key(ids[4], ids[3])));
    }

    #[test]
    fn undo_restores_counts() {
        let ids: Vec<PlayerId> = (0..5).map(|_| Uuid::new_v4()).collect();
        let mut counts = BTreeMap::new();
        let mut rng = StdRng::seed_from_u64(3);
        let selection = select_active_players(&ids, 4, &mut counts, &mut rng);
        assert_eq!(counts.values().sum::<u32>(), 1);
        undo_sit_outs(&selection, &mut counts);
        assert_eq!(counts.values().sum::<u32>(), 0);
    }
}
