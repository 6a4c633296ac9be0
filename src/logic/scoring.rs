//! Match winner determination from set scores.

use crate::models::{AdvanceBlock, Round, ScoreEntry, Side};

/// Winner of a scored match, or `None` when it cannot be determined.
///
/// - Only complete sets count.
/// - A set decided by one game needs a tiebreak that is entered, not tied, and won by the side
///   that won more games; otherwise the whole match is undeterminable.
/// - More sets won wins; equal sets fall back to total games; equal games is undeterminable.
pub fn determine_match_winner(entry: &ScoreEntry) -> Option<Side> {
    let mut sets_won = [0u32; 2];
    let mut games = [0u32; 2];
    let mut any_complete = false;

    for set in &entry.sets {
        let Some((a, b)) = set.complete_games() else {
            continue;
        };
        any_complete = true;
        games[0] += a;
        games[1] += b;

        if a.abs_diff(b) == 1 {
            let leader = if a > b { Side::One } else { Side::Two };
            let [Some(tb_a), Some(tb_b)] = set.tiebreak? else {
                return None;
            };
            let tb_winner = match tb_a.cmp(&tb_b) {
                std::cmp::Ordering::Greater => Side::One,
                std::cmp::Ordering::Less => Side::Two,
                std::cmp::Ordering::Equal => return None,
            };
            if tb_winner != leader {
                return None;
            }
        }

        match a.cmp(&b) {
            std::cmp::Ordering::Greater => sets_won[0] += 1,
            std::cmp::Ordering::Less => sets_won[1] += 1,
            std::cmp::Ordering::Equal => {}
        }
    }

    if !any_complete {
        return None;
    }
    decide(sets_won).or_else(|| decide(games))
}

fn decide(counts: [u32; 2]) -> Option<Side> {
    match counts[0].cmp(&counts[1]) {
        std::cmp::Ordering::Greater => Some(Side::One),
        std::cmp::Ordering::Less => Some(Side::Two),
        std::cmp::Ordering::Equal => None,
    }
}

/// Games won by each side over all complete sets.
pub fn games_totals(entry: &ScoreEntry) -> (u32, u32) {
    entry
        .sets
        .iter()
        .filter_map(|s| s.complete_games())
        .fold((0, 0), |(x, y), (a, b)| (x + a, y + b))
}

/// Winner of match `index` in `round`: missing scores and drawn matches are told apart.
pub fn match_winner(round: &Round, index: usize) -> Result<Side, AdvanceBlock> {
    let entry = round
        .score(index)
        .filter(|e| e.has_complete_set())
        .ok_or(AdvanceBlock::MissingScores)?;
    determine_match_winner(entry).ok_or(AdvanceBlock::DrawnMatch)
}

/// Winners of every match, or the reason the round cannot advance yet.
/// Missing scores are reported before drawn matches.
pub fn round_winners(round: &Round) -> Result<Vec<Side>, AdvanceBlock> {
    let results: Vec<Result<Side, AdvanceBlock>> =
        (0..round.matches.len()).map(|i| match_winner(round, i)).collect();
    if results.contains(&Err(AdvanceBlock::MissingScores)) {
        return Err(AdvanceBlock::MissingScores);
    }
    results.into_iter().collect()
}
