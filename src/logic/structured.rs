//! Structured play: singles/doubles rounds on courts with sit-out rotation.
//!
//! 1. Work out how many courts the roster can fill and how many players are active.
//! 2. Choose the active players by sit-out count (see [`select_active_players`]).
//! 3. Shuffle and slice them onto courts; a court whose matchup was already played rejects the
//!    whole attempt.
//! 4. After repeated rejections, re-roll the sit-outs (undoing their counters) and try again.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::logic::pairing::{matchup_key, select_active_players, undo_sit_outs};
use crate::models::{GameMatch, MatchType, MatchupKey, MatchupSet, PlayerId, Round};

/// Shuffles per sit-out selection, and sit-out selections per round.
pub const STRUCTURED_ROUND_ATTEMPTS: usize = 50;
/// Floor for the per-session round cap.
pub const MIN_ROUND_CAP: usize = 10;
pub const MAX_CONSECUTIVE_FAILURES: usize = 3;
const DOUBLES_ROUND_CAP: usize = 50;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CourtConfig {
    pub match_type: MatchType,
    pub court_count: usize,
    /// When false, odd doubles rosters may put 2-vs-1 on a court.
    pub strict_doubles: bool,
}

impl CourtConfig {
    pub fn new(match_type: MatchType, court_count: usize) -> Self {
        Self {
            match_type,
            court_count,
            strict_doubles: true,
        }
    }

    pub fn players_per_court(&self) -> usize {
        self.match_type.players_per_court()
    }

    pub fn min_per_court(&self) -> usize {
        match self.match_type {
            MatchType::Doubles if !self.strict_doubles => 3,
            _ => self.players_per_court(),
        }
    }

    /// Courts actually used: never more than the roster can fill at the minimum court size.
    pub fn courts_in_use(&self, player_count: usize) -> usize {
        self.court_count.min(player_count / self.min_per_court())
    }

    /// Players on court per round.
    pub fn active_count(&self, player_count: usize) -> usize {
        let courts = self.courts_in_use(player_count);
        player_count.clamp(self.min_per_court() * courts, self.players_per_court() * courts)
    }

    /// Size of each court's group. Earlier courts get the full groups.
    pub fn court_sizes(&self, player_count: usize) -> Vec<usize> {
        let courts = self.courts_in_use(player_count);
        let active = self.active_count(player_count);
        let min = self.min_per_court();
        let extra = active - min * courts;
        (0..courts).map(|i| if i < extra { min + 1 } else { min }).collect()
    }
}

/// Split one court's group into the two sides.
fn court_teams(group: &[PlayerId]) -> Vec<Vec<PlayerId>> {
    let split = group.len().div_ceil(2);
    vec![group[..split].to_vec(), group[split..].to_vec()]
}

/// Slice `active` onto courts; `None` if any matchup repeats (against history or within the round).
fn assign_courts(
    active: &[PlayerId],
    sizes: &[usize],
    used_matchups: &MatchupSet,
) -> Option<Vec<(Vec<Vec<PlayerId>>, MatchupKey)>> {
    let mut courts = Vec::with_capacity(sizes.len());
    let mut start = 0;
    for &size in sizes {
        let teams = court_teams(&active[start..start + size]);
        start += size;
        let key = matchup_key(&teams);
        if used_matchups.contains(&key) || courts.iter().any(|(_, k)| k == &key) {
            return None;
        }
        courts.push((teams, key));
    }
    Some(courts)
}

/// Generate one round, recording its matchups and sit-outs. `None` when no fresh round was found.
pub fn generate_structured_round<R: Rng + ?Sized>(
    players: &[PlayerId],
    config: &CourtConfig,
    sit_out_counts: &mut BTreeMap<PlayerId, u32>,
    used_matchups: &mut MatchupSet,
    rng: &mut R,
) -> Option<Round> {
    let sizes = config.court_sizes(players.len());
    if sizes.is_empty() {
        return None;
    }
    let active_count = config.active_count(players.len());

    for _ in 0..STRUCTURED_ROUND_ATTEMPTS {
        let selection = select_active_players(players, active_count, sit_out_counts, rng);
        let mut active = selection.active.clone();
        for _ in 0..STRUCTURED_ROUND_ATTEMPTS {
            active.shuffle(rng);
            let Some(courts) = assign_courts(&active, &sizes, used_matchups) else {
                continue;
            };
            let matches = courts
                .into_iter()
                .enumerate()
                .map(|(i, (teams, key))| {
                    used_matchups.insert(key);
                    GameMatch::new(i as u32 + 1, teams)
                })
                .collect();
            let mut round = Round::new(matches);
            round.sit_outs = selection.sitting_out;
            return Some(round);
        }
        undo_sit_outs(&selection, sit_out_counts);
    }
    log::debug!(
        "no fresh {:?} round for {} players on {} courts",
        config.match_type,
        players.len(),
        sizes.len()
    );
    None
}

/// Round cap for a session: n(n-1)/2 singles, min(50, n(n-1)) doubles, at least 10.
pub fn max_structured_rounds(player_count: usize, match_type: MatchType) -> usize {
    let n = player_count;
    let cap = match match_type {
        MatchType::Singles => n * n.saturating_sub(1) / 2,
        MatchType::Doubles => DOUBLES_ROUND_CAP.min(n * n.saturating_sub(1)),
    };
    cap.max(MIN_ROUND_CAP)
}

/// Rounds until the cap, or until three rounds in a row could not be generated.
pub fn generate_structured_rounds<R: Rng + ?Sized>(
    players: &[PlayerId],
    config: &CourtConfig,
    sit_out_counts: &mut BTreeMap<PlayerId, u32>,
    used_matchups: &mut MatchupSet,
    rng: &mut R,
) -> Vec<Round> {
    let cap = max_structured_rounds(players.len(), config.match_type);
    let mut rounds = Vec::new();
    let mut failures = 0;
    while rounds.len() < cap && failures < MAX_CONSECUTIVE_FAILURES {
        match generate_structured_round(players, config, sit_out_counts, used_matchups, rng) {
            Some(round) => {
                rounds.push(round);
                failures = 0;
            }
            None => failures += 1,
        }
    }
    rounds
}
