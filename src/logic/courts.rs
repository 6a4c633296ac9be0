//! Court scheduling overlay: which matches of a round are on court right now.

use serde::{Deserialize, Serialize};

use crate::logic::scoring::match_winner;
use crate::models::{AdvanceBlock, CourtHandling, Round};

/// Display/edit state of one match under the overlay.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// On court, scores editable.
    Active,
    /// Waiting for a court, read-only.
    Pending,
    /// Winner determined (queue) or batch already played.
    Completed,
}

/// Status of every match of `round` with `court_count` physical courts.
pub fn schedule_round(round: &Round, court_count: usize, handling: CourtHandling) -> Vec<MatchStatus> {
    match handling {
        CourtHandling::Queue => queue_statuses(round, court_count),
        CourtHandling::Batches => batch_statuses(round, court_count),
    }
}

/// First `court_count` undecided matches play; a decided match frees its court.
fn queue_statuses(round: &Round, court_count: usize) -> Vec<MatchStatus> {
    let mut on_court = 0;
    (0..round.matches.len())
        .map(|i| {
            if match_winner(round, i).is_ok() {
                MatchStatus::Completed
            } else if on_court < court_count {
                on_court += 1;
                MatchStatus::Active
            } else {
                MatchStatus::Pending
            }
        })
        .collect()
}

fn batch_statuses(round: &Round, court_count: usize) -> Vec<MatchStatus> {
    let size = court_count.max(1);
    (0..round.matches.len())
        .map(|i| match (i / size).cmp(&round.active_batch) {
            std::cmp::Ordering::Less => MatchStatus::Completed,
            std::cmp::Ordering::Equal => MatchStatus::Active,
            std::cmp::Ordering::Greater => MatchStatus::Pending,
        })
        .collect()
}

pub fn batch_count(round: &Round, court_count: usize) -> usize {
    round.matches.len().div_ceil(court_count.max(1))
}

/// Whether scores for match `index` may be edited.
pub fn is_editable(round: &Round, index: usize, court_count: usize, handling: CourtHandling) -> bool {
    match handling {
        // A decided match stays editable so a wrong score can be corrected.
        CourtHandling::Queue => {
            schedule_round(round, court_count, handling)
                .get(index)
                .is_some_and(|s| *s != MatchStatus::Pending)
        }
        CourtHandling::Batches => index / court_count.max(1) == round.active_batch,
    }
}

/// Move to the next batch once every match in the current one has a winner.
pub fn advance_batch(round: &mut Round, court_count: usize) -> Result<usize, AdvanceBlock> {
    let size = court_count.max(1);
    if round.active_batch + 1 >= batch_count(round, court_count) {
        return Err(AdvanceBlock::NothingToAdvance);
    }
    let start = round.active_batch * size;
    let end = (start + size).min(round.matches.len());
    for i in start..end {
        match_winner(round, i)?;
    }
    round.active_batch += 1;
    Ok(round.active_batch)
}
