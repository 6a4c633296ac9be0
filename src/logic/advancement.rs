//! Bracket advancement: turn a scored round into the next round, or crown a champion.
//!
//! Nothing is mutated unless advancement succeeds; an `Err` means "not ready", never "over".

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::logic::bracket::pair_teams;
use crate::logic::scoring::{games_totals, round_winners};
use crate::models::{
    AdvanceBlock, BracketPool, Round, Side, Team, TeamId, TeamStanding, TournamentFormat,
    TournamentRun,
};

/// What advancing a run produced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Advancement {
    /// A new round was appended to the run.
    NextRound,
    /// The run is complete with this champion.
    Champion(TeamId),
    /// Degenerate end: no team left to crown.
    Exhausted,
}

/// One decided match of the round being advanced.
struct Decided {
    winner: TeamId,
    loser: TeamId,
    /// Games for (winner, loser).
    games: (u32, u32),
    pool: BracketPool,
}

/// Winners and losers of the latest round, in court order.
fn decide_latest_round(run: &TournamentRun) -> Result<(Vec<Decided>, &Round), AdvanceBlock> {
    let round = run.latest_round().ok_or(AdvanceBlock::NothingToAdvance)?;
    let sides = round_winners(round)?;
    let decided = round
        .matches
        .iter()
        .zip(&sides)
        .enumerate()
        .map(|(i, (m, &side))| {
            let (a, b) = round.score(i).map(games_totals).unwrap_or_default();
            Decided {
                winner: m.team_id(side),
                loser: m.team_id(side.other()),
                games: if side == Side::One { (a, b) } else { (b, a) },
                pool: m.pool(),
            }
        })
        .collect();
    Ok((decided, round))
}

fn record(standings: &mut BTreeMap<TeamId, TeamStanding>, d: &Decided) {
    let w = standings.entry(d.winner).or_default();
    w.wins += 1;
    w.games_won += d.games.0;
    w.games_lost += d.games.1;
    let l = standings.entry(d.loser).or_default();
    l.losses += 1;
    l.games_won += d.games.1;
    l.games_lost += d.games.0;
}

fn crown(run: &mut TournamentRun, advancing: &[TeamId]) -> Option<Advancement> {
    match advancing {
        [] => {
            run.finished = true;
            Some(Advancement::Exhausted)
        }
        [champion] => {
            run.bracket.champion = Some(*champion);
            run.finished = true;
            log::info!("champion decided: {}", run.team(*champion).name);
            Some(Advancement::Champion(*champion))
        }
        _ => None,
    }
}

fn teams_for<'a>(run: &'a TournamentRun, ids: &[TeamId]) -> Vec<&'a Team> {
    ids.iter().map(|&id| run.team(id)).collect()
}

/// Advance whatever format the run uses.
pub fn advance_round(run: &mut TournamentRun) -> Result<Advancement, AdvanceBlock> {
    if run.finished {
        return Err(AdvanceBlock::NothingToAdvance);
    }
    match run.tournament_format {
        TournamentFormat::RoundRobin => complete_round_robin(run),
        TournamentFormat::SingleElimination => advance_elimination(run),
        TournamentFormat::Consolation => advance_consolation(run),
    }
}

/// Single elimination: winners plus byes go on, losers are out. An odd field carries one bye.
pub fn advance_elimination(run: &mut TournamentRun) -> Result<Advancement, AdvanceBlock> {
    if run.finished {
        return Err(AdvanceBlock::NothingToAdvance);
    }
    let (decided, round) = decide_latest_round(run)?;
    let mut advancing: Vec<TeamId> = decided.iter().map(|d| d.winner).collect();
    advancing.extend(round.byes.iter().copied());
    let round_number = run.rounds.len() + 1;

    for d in &decided {
        record(&mut run.bracket.standings, d);
        run.bracket.eliminate(d.loser);
    }
    if let Some(done) = crown(run, &advancing) {
        return Ok(done);
    }

    let (matches, bye) = pair_teams(&teams_for(run, &advancing), None, 1);
    let label = if matches.len() == 1 && bye.is_none() {
        "Final".to_string()
    } else {
        format!("Round {}", round_number)
    };
    let mut next = Round::new(matches).with_label(label);
    next.byes = bye.into_iter().collect();
    run.rounds.push(next);
    Ok(Advancement::NextRound)
}

/// Consolation: winners-pool losers drop into the losers pool; losers-pool losers are out.
/// The event ends as soon as the winners pool is down to one team.
pub fn advance_consolation(run: &mut TournamentRun) -> Result<Advancement, AdvanceBlock> {
    if run.finished {
        return Err(AdvanceBlock::NothingToAdvance);
    }
    let (decided, round) = decide_latest_round(run)?;

    let mut winners_pool: Vec<TeamId> = Vec::new();
    let mut losers_pool: Vec<TeamId> = Vec::new();
    let mut dropped: Vec<TeamId> = Vec::new();
    let mut out: Vec<TeamId> = Vec::new();
    for d in &decided {
        match d.pool {
            BracketPool::Winners => {
                winners_pool.push(d.winner);
                dropped.push(d.loser);
            }
            BracketPool::Losers => {
                losers_pool.push(d.winner);
                out.push(d.loser);
            }
        }
    }
    winners_pool.extend(round.byes.iter().copied());
    losers_pool.extend(round.losers_byes.iter().copied());
    losers_pool.extend(dropped);
    let round_number = run.rounds.len() + 1;

    for d in &decided {
        record(&mut run.bracket.standings, d);
    }
    for id in out {
        run.bracket.eliminate(id);
    }
    run.bracket.pools.winners = winners_pool.clone();
    run.bracket.pools.losers = losers_pool.clone();

    // No third-place decision: the losers pool stops with the winners pool.
    if let Some(done) = crown(run, &winners_pool) {
        return Ok(done);
    }

    let (mut matches, winners_bye) =
        pair_teams(&teams_for(run, &winners_pool), Some(BracketPool::Winners), 1);
    let winners_final = matches.len() == 1 && winners_bye.is_none();
    let (losers_matches, losers_bye) = pair_teams(
        &teams_for(run, &losers_pool),
        Some(BracketPool::Losers),
        matches.len() as u32 + 1,
    );
    matches.extend(losers_matches);

    let label = if winners_final {
        "Final".to_string()
    } else {
        format!("Round {}", round_number)
    };
    let mut next = Round::new(matches).with_label(label);
    next.byes = winners_bye.into_iter().collect();
    if let Some(id) = losers_bye {
        // Nothing follows the winners final, so a losers bye there just sits out.
        if winners_final {
            next.sit_outs = run.team(id).players.clone();
        } else {
            next.losers_byes.push(id);
        }
    }
    run.rounds.push(next);
    Ok(Advancement::NextRound)
}

/// Round robin: once every match is decided, rank by wins, then game difference, then team id.
pub fn complete_round_robin(run: &mut TournamentRun) -> Result<Advancement, AdvanceBlock> {
    if run.finished {
        return Err(AdvanceBlock::NothingToAdvance);
    }
    let mut all_decided = Vec::new();
    let mut missing = false;
    let mut drawn = false;
    for round in &run.rounds {
        let sides = match round_winners(round) {
            Ok(sides) => sides,
            Err(AdvanceBlock::MissingScores) => {
                missing = true;
                continue;
            }
            Err(_) => {
                drawn = true;
                continue;
            }
        };
        for (i, (m, &side)) in round.matches.iter().zip(&sides).enumerate() {
            let (a, b) = round.score(i).map(games_totals).unwrap_or_default();
            all_decided.push(Decided {
                winner: m.team_id(side),
                loser: m.team_id(side.other()),
                games: if side == Side::One { (a, b) } else { (b, a) },
                pool: BracketPool::Winners,
            });
        }
    }
    if missing {
        return Err(AdvanceBlock::MissingScores);
    }
    if drawn {
        return Err(AdvanceBlock::DrawnMatch);
    }

    let mut standings: BTreeMap<TeamId, TeamStanding> = run
        .teams
        .iter()
        .map(|t| (t.id, TeamStanding::default()))
        .collect();
    for d in &all_decided {
        record(&mut standings, d);
    }
    run.bracket.standings = standings;

    let champion = run
        .bracket
        .standings
        .iter()
        .max_by_key(|(&id, s)| (s.wins, s.game_difference(), Reverse(id)))
        .map(|(&id, _)| id);
    let advancing: Vec<TeamId> = champion.into_iter().collect();
    Ok(crown(run, &advancing).unwrap_or(Advancement::Exhausted))
}

/// Ranked standings (best first) with the same ordering used to pick a round-robin champion.
pub fn ranked_standings(run: &TournamentRun) -> Vec<(TeamId, TeamStanding)> {
    let mut ranked: Vec<(TeamId, TeamStanding)> =
        run.bracket.standings.iter().map(|(&id, &s)| (id, s)).collect();
    ranked.sort_by_key(|&(id, s)| (Reverse(s.wins), Reverse(s.game_difference()), id));
    ranked
}
