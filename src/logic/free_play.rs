//! Free mode: reshuffle all players into K teams every round, never repeating a partnership.
//!
//! 1. Capacities come from [`compute_capacities`].
//! 2. Each attempt shuffles the players and places them one at a time with an explicit-stack
//!    backtracking search (capacity + no used partner in the team).
//! 3. The sequence builder keeps generating rounds until the search gives up, restarting a few
//!    times and keeping the longest sequence.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::logic::pairing::{compute_capacities, extract_pairs, pair_key, SearchBudget};
use crate::models::{GameMatch, PairSet, PlayerId, Round};

/// Players per team for one round, one inner Vec per team.
pub type TeamSplit = Vec<Vec<PlayerId>>;

pub const FREE_ROUND_BUDGET: SearchBudget = SearchBudget::new(200, 2_000);
/// Cheap probe used to decide whether to offer another round.
pub const FEASIBILITY_PROBE_BUDGET: SearchBudget = SearchBudget::new(50, 2_000);
pub const SEQUENCE_RESTARTS: usize = 50;
/// Consecutive non-improving restarts before the sequence search stops.
pub const SEQUENCE_PATIENCE: usize = 15;

/// One round of K teams with no partnership from `used_pairs`, or `None` if the budget ran out.
pub fn generate_round<R: Rng + ?Sized>(
    players: &[PlayerId],
    team_count: usize,
    used_pairs: &PairSet,
    rng: &mut R,
) -> Option<TeamSplit> {
    generate_round_with_budget(players, team_count, used_pairs, FREE_ROUND_BUDGET, rng)
}

pub fn generate_round_with_budget<R: Rng + ?Sized>(
    players: &[PlayerId],
    team_count: usize,
    used_pairs: &PairSet,
    budget: SearchBudget,
    rng: &mut R,
) -> Option<TeamSplit> {
    if team_count == 0 || team_count > players.len() {
        return None;
    }
    let capacities = compute_capacities(players.len(), team_count);
    let mut order = players.to_vec();
    for _ in 0..budget.attempts {
        order.shuffle(rng);
        if let Some(mut teams) =
            place_players(&order, &capacities, used_pairs, budget.steps_per_attempt, rng)
        {
            teams.shuffle(rng);
            return Some(teams);
        }
    }
    log::debug!(
        "no round for {} players in {} teams after {} attempts",
        players.len(),
        team_count,
        budget.attempts
    );
    None
}

/// Whether at least one more round looks possible (smaller budget than real generation).
pub fn can_generate_more<R: Rng + ?Sized>(
    players: &[PlayerId],
    team_count: usize,
    used_pairs: &PairSet,
    rng: &mut R,
) -> bool {
    generate_round_with_budget(players, team_count, used_pairs, FEASIBILITY_PROBE_BUDGET, rng)
        .is_some()
}

/// Backtracking state for one player: teams in try-order and where the player currently sits.
struct Frame {
    team_order: Vec<usize>,
    next: usize,
    placed_in: Option<usize>,
}

impl Frame {
    fn new<R: Rng + ?Sized>(team_count: usize, rng: &mut R) -> Self {
        let mut team_order: Vec<usize> = (0..team_count).collect();
        team_order.shuffle(rng);
        Self {
            team_order,
            next: 0,
            placed_in: None,
        }
    }
}

fn fits(team: &[PlayerId], player: PlayerId, used_pairs: &PairSet) -> bool {
    team.iter().all(|&m| !used_pairs.contains(&pair_key(m, player)))
}

/// Place `order` into teams of the given capacities. Shared with the series builder, which
/// drives it with the seeded RNG.
pub(crate) fn place_players<R: Rng + ?Sized>(
    order: &[PlayerId],
    capacities: &[usize],
    used_pairs: &PairSet,
    max_steps: usize,
    rng: &mut R,
) -> Option<TeamSplit> {
    let mut teams: TeamSplit = capacities.iter().map(|&c| Vec::with_capacity(c)).collect();
    if order.is_empty() {
        return Some(teams);
    }
    let mut stack: Vec<Frame> = Vec::with_capacity(order.len());
    stack.push(Frame::new(capacities.len(), rng));
    let mut steps = 0;

    while let Some(depth) = stack.len().checked_sub(1) {
        steps += 1;
        if steps > max_steps {
            return None;
        }
        let player = order[depth];
        let frame = &mut stack[depth];
        if let Some(t) = frame.placed_in.take() {
            teams[t].pop();
        }

        let mut placed = None;
        while frame.next < frame.team_order.len() {
            let t = frame.team_order[frame.next];
            frame.next += 1;
            if teams[t].len() < capacities[t] && fits(&teams[t], player, used_pairs) {
                placed = Some(t);
                break;
            }
        }

        match placed {
            Some(t) => {
                teams[t].push(player);
                frame.placed_in = Some(t);
                if depth + 1 == order.len() {
                    return Some(teams);
                }
                stack.push(Frame::new(capacities.len(), rng));
            }
            // Dead end: drop this frame so the previous player moves to its next team.
            None => {
                stack.pop();
            }
        }
    }
    None
}

/// Rounds generated greedily until the search gives up.
pub fn build_sequence<R: Rng + ?Sized>(
    players: &[PlayerId],
    team_count: usize,
    initial_used_pairs: &PairSet,
    rng: &mut R,
) -> Vec<TeamSplit> {
    let mut used = initial_used_pairs.clone();
    let mut rounds = Vec::new();
    while let Some(teams) = generate_round(players, team_count, &used, rng) {
        let pairs = extract_pairs(&teams);
        rounds.push(teams);
        // All-singleton teams never consume a pair; one such round is all there is.
        if pairs.is_empty() {
            break;
        }
        used.extend(pairs);
    }
    rounds
}

/// Upper bound on rounds: every round consumes the same number of fresh pairs.
fn max_possible_rounds(players: usize, team_count: usize, initial_used: usize) -> usize {
    let per_round: usize = compute_capacities(players, team_count)
        .iter()
        .map(|&c| c * c.saturating_sub(1) / 2)
        .sum();
    if per_round == 0 {
        return 1;
    }
    let total = players * players.saturating_sub(1) / 2;
    total.saturating_sub(initial_used) / per_round
}

/// Longest sequence found over several randomized restarts. Best effort, not provably optimal.
pub fn generate_optimal_round_sequence<R: Rng + ?Sized>(
    players: &[PlayerId],
    team_count: usize,
    initial_used_pairs: &PairSet,
    rng: &mut R,
) -> Vec<TeamSplit> {
    let bound = max_possible_rounds(players.len(), team_count, initial_used_pairs.len());
    let mut best: Vec<TeamSplit> = Vec::new();
    let mut stale = 0;
    for _ in 0..SEQUENCE_RESTARTS {
        let sequence = build_sequence(players, team_count, initial_used_pairs, rng);
        if sequence.len() > best.len() {
            best = sequence;
            stale = 0;
            if best.len() >= bound {
                break;
            }
        } else {
            stale += 1;
            if stale >= SEQUENCE_PATIENCE {
                break;
            }
        }
    }
    log::debug!(
        "free-mode sequence: {} rounds for {} players in {} teams",
        best.len(),
        players.len(),
        team_count
    );
    best
}

/// Free-mode round: all teams share one "match" on court 1.
pub fn free_round(teams: TeamSplit) -> Round {
    Round::new(vec![GameMatch::new(1, teams)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_for_eight_players_in_two_teams() {
        // 28 pairs, 12 per round.
        assert_eq!(max_possible_rounds(8, 2, 0), 2);
    }

    #[test]
    fn bound_with_singleton_teams() {
        assert_eq!(max_possible_rounds(3, 3, 0), 1);
    }
}
