//! Tournament series: a reproducible chain of mini-tournaments from one seed string.
//!
//! Every random choice comes from [`SeededRng`], so the same seed, roster and options always
//! produce the same chain. Across the chain, doubles never repeat a partnership and singles never
//! repeat an opening-round matchup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logic::bracket::{build_tournament_run, form_team};
use crate::logic::free_play::place_players;
use crate::logic::pairing::{compute_capacities, extract_pairs, matchup_key, SearchBudget};
use crate::logic::rng::SeededRng;
use crate::models::{
    CourtHandling, MatchType, MatchupKey, PairSet, Player, PlayerId, SeriesConstraints,
    TournamentFormat, TournamentRun, TournamentSeries,
};

/// Re-rolls of a run's tournament-level choice: the singles seeding, or the doubles sit-out.
/// Even doubles rosters have nothing to re-roll and get a single partition pass.
pub const SERIES_RESEED_ATTEMPTS: usize = 150;
/// Team partition attempts per doubles run.
pub const SERIES_PARTITION_BUDGET: SearchBudget = SearchBudget::new(120, 1_000);
pub const MAX_SERIES_TOURNAMENTS: usize = 64;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeriesOptions {
    pub match_type: MatchType,
    pub format: TournamentFormat,
    pub court_count: usize,
    pub court_handling: CourtHandling,
    /// Odd doubles rosters play one 2-vs-1 team instead of sitting a player out.
    pub allow_two_vs_one: bool,
    pub seed: String,
}

/// Precompute the whole chain. Stops when no further valid run can be built.
pub fn build_tournament_series(players: &[Player], options: &SeriesOptions) -> TournamentSeries {
    let mut rng = SeededRng::new(&options.seed);
    let mut constraints = SeriesConstraints::default();
    let mut tournaments: Vec<TournamentRun> = Vec::new();

    while tournaments.len() < MAX_SERIES_TOURNAMENTS {
        let run = match options.match_type {
            MatchType::Singles => next_singles_run(players, options, &mut constraints, &mut rng),
            MatchType::Doubles => next_doubles_run(players, options, &mut constraints, &mut rng),
        };
        let Some(run) = run else {
            break;
        };
        tournaments.push(run);
        // One round-robin pass already uses every singles matchup.
        if options.match_type == MatchType::Singles && options.format == TournamentFormat::RoundRobin {
            break;
        }
    }
    log::info!(
        "series '{}': {} tournament(s) for {} players",
        options.seed,
        tournaments.len(),
        players.len()
    );

    TournamentSeries {
        seed: options.seed.clone(),
        match_type: options.match_type,
        format: options.format,
        court_count: options.court_count,
        court_handling: options.court_handling,
        allow_two_vs_one: options.allow_two_vs_one,
        tournaments,
        current_tournament_index: 0,
        constraints,
    }
}

fn opening_matchups(run: &TournamentRun) -> Vec<MatchupKey> {
    run.rounds
        .first()
        .map(|r| r.matches.iter().map(|m| matchup_key(&m.teams)).collect())
        .unwrap_or_default()
}

fn next_singles_run(
    players: &[Player],
    options: &SeriesOptions,
    constraints: &mut SeriesConstraints,
    rng: &mut SeededRng,
) -> Option<TournamentRun> {
    if players.len() < 2 {
        return None;
    }
    for _ in 0..SERIES_RESEED_ATTEMPTS {
        let mut order: Vec<&Player> = players.iter().collect();
        rng.shuffle(&mut order);
        let teams = order
            .iter()
            .enumerate()
            .map(|(id, p)| form_team(id, &[*p]))
            .collect();
        let run = build_tournament_run(
            teams,
            Vec::new(),
            options.format,
            options.court_count,
            options.court_handling,
        );
        let opening = opening_matchups(&run);
        if opening
            .iter()
            .any(|k| constraints.used_singles_opening_matchups.contains(k))
        {
            continue;
        }
        constraints.used_singles_opening_matchups.extend(opening);
        return Some(run);
    }
    None
}

/// Least-sat-out player not in `excluded`, ties broken by the seeded stream. Increments their count.
fn choose_sit_out(
    players: &[Player],
    excluded: &[PlayerId],
    counts: &mut BTreeMap<PlayerId, u32>,
    rng: &mut SeededRng,
) -> Option<PlayerId> {
    let count_of = |id: &PlayerId| counts.get(id).copied().unwrap_or(0);
    let eligible: Vec<PlayerId> = players
        .iter()
        .map(|p| p.id)
        .filter(|id| !excluded.contains(id))
        .collect();
    let least = eligible.iter().map(count_of).min()?;
    let candidates: Vec<PlayerId> = eligible
        .into_iter()
        .filter(|id| count_of(id) == least)
        .collect();
    let chosen = candidates[rng.random_int(candidates.len())];
    *counts.entry(chosen).or_insert(0) += 1;
    Some(chosen)
}

/// Partition into teams of two (one of one when 2-vs-1 is allowed) avoiding used partnerships.
fn partition_pairs(
    pool: &[PlayerId],
    used_pairs: &PairSet,
    rng: &mut SeededRng,
) -> Option<Vec<Vec<PlayerId>>> {
    let capacities = compute_capacities(pool.len(), pool.len().div_ceil(2));
    let mut order = pool.to_vec();
    for _ in 0..SERIES_PARTITION_BUDGET.attempts {
        rng.shuffle(&mut order);
        let placed = place_players(
            &order,
            &capacities,
            used_pairs,
            SERIES_PARTITION_BUDGET.steps_per_attempt,
            rng,
        );
        if placed.is_some() {
            return placed;
        }
    }
    None
}

fn next_doubles_run(
    players: &[Player],
    options: &SeriesOptions,
    constraints: &mut SeriesConstraints,
    rng: &mut SeededRng,
) -> Option<TournamentRun> {
    let needs_sit_out = players.len() % 2 == 1 && !options.allow_two_vs_one;
    let playing = players.len() - usize::from(needs_sit_out);
    if playing.div_ceil(2) < 2 {
        return None;
    }
    let reseeds = if needs_sit_out { SERIES_RESEED_ATTEMPTS } else { 1 };

    let mut failed_sit_outs: Vec<PlayerId> = Vec::new();
    for _ in 0..reseeds {
        let sitting = if needs_sit_out {
            // Every player already failed as the sit-out for this run.
            let Some(id) = choose_sit_out(
                players,
                &failed_sit_outs,
                &mut constraints.tournament_sit_out_counts,
                rng,
            ) else {
                break;
            };
            Some(id)
        } else {
            None
        };
        let pool: Vec<PlayerId> = players
            .iter()
            .map(|p| p.id)
            .filter(|id| Some(*id) != sitting)
            .collect();

        if let Some(mut groups) = partition_pairs(&pool, &constraints.used_doubles_partner_pairs, rng) {
            rng.shuffle(&mut groups);
            constraints
                .used_doubles_partner_pairs
                .extend(extract_pairs(&groups));
            let teams = groups
                .iter()
                .enumerate()
                .map(|(id, group)| {
                    let members: Vec<&Player> = group
                        .iter()
                        .filter_map(|pid| players.iter().find(|p| p.id == *pid))
                        .collect();
                    form_team(id, &members)
                })
                .collect();
            return Some(build_tournament_run(
                teams,
                sitting.into_iter().collect(),
                options.format,
                options.court_count,
                options.court_handling,
            ));
        }

        if let Some(id) = sitting {
            failed_sit_outs.push(id);
            if let Some(count) = constraints.tournament_sit_out_counts.get_mut(&id) {
                *count = count.saturating_sub(1);
            }
        }
    }
    log::debug!("series '{}': no further doubles partition", options.seed);
    None
}
