//! Session lifecycle: start, score, move on, modify players, end.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use rand::Rng;

use crate::logic::advancement::{advance_round, Advancement};
use crate::logic::bracket::{build_tournament_run, form_tournament_teams};
use crate::logic::courts::{advance_batch, is_editable};
use crate::logic::free_play::{free_round, generate_optimal_round_sequence, generate_round};
use crate::logic::pairing::{extract_pairs, matchup_key};
use crate::logic::scoring::round_winners;
use crate::logic::series::{build_tournament_series, SeriesOptions};
use crate::logic::structured::{generate_structured_round, generate_structured_rounds, CourtConfig};
use crate::models::{
    AppState, MatchType, MatchupSet, PairSet, PlayerId, Round, ScoreEntry, Session, SessionError,
    SessionMode, SessionSetup, TournamentFormat, TournamentRun,
};

/// Players needed to start a session in this mode.
fn players_required(mode: &SessionMode) -> usize {
    match mode {
        SessionMode::Free { team_count } => (*team_count).max(2),
        SessionMode::Structured {
            match_type,
            strict_doubles,
            ..
        } => CourtConfig {
            match_type: *match_type,
            court_count: 1,
            strict_doubles: *strict_doubles,
        }
        .min_per_court(),
        SessionMode::Tournament {
            match_type,
            allow_two_vs_one,
            ..
        }
        | SessionMode::Series {
            match_type,
            allow_two_vs_one,
            ..
        } => match (match_type, allow_two_vs_one) {
            (MatchType::Singles, _) => 2,
            (MatchType::Doubles, true) => 3,
            (MatchType::Doubles, false) => 4,
        },
    }
}

fn validate_setup(state: &AppState, setup: &SessionSetup) -> Result<(), SessionError> {
    let mut seen = HashSet::new();
    for &id in &setup.players {
        if !state.roster.contains(id) {
            return Err(SessionError::PlayerNotFound(id));
        }
        if !seen.insert(id) {
            return Err(SessionError::DuplicatePlayer(id));
        }
    }
    match &setup.mode {
        SessionMode::Free { team_count: 0 } => return Err(SessionError::InvalidSetup("team count must be at least 1")),
        SessionMode::Structured { court_count: 0, .. }
        | SessionMode::Tournament { court_count: 0, .. }
        | SessionMode::Series { court_count: 0, .. } => {
            return Err(SessionError::InvalidSetup("court count must be at least 1"))
        }
        _ => {}
    }
    let required = players_required(&setup.mode);
    if setup.players.len() < required {
        return Err(SessionError::NotEnoughPlayers {
            required,
            selected: setup.players.len(),
        });
    }
    Ok(())
}

fn court_config(mode: &SessionMode) -> Option<CourtConfig> {
    match mode {
        SessionMode::Structured {
            match_type,
            court_count,
            strict_doubles,
        } => Some(CourtConfig {
            match_type: *match_type,
            court_count: *court_count,
            strict_doubles: *strict_doubles,
        }),
        _ => None,
    }
}

/// Partnerships of every free-mode round.
fn pairs_of(rounds: &[Round]) -> PairSet {
    rounds
        .iter()
        .flat_map(|r| r.matches.iter())
        .flat_map(|m| extract_pairs(&m.teams))
        .collect()
}

fn matchups_of(rounds: &[Round]) -> MatchupSet {
    rounds
        .iter()
        .flat_map(|r| r.matches.iter())
        .map(|m| matchup_key(&m.teams))
        .collect()
}

fn sit_outs_of(rounds: &[Round]) -> BTreeMap<PlayerId, u32> {
    let mut counts = BTreeMap::new();
    for id in rounds.iter().flat_map(|r| r.sit_outs.iter()) {
        *counts.entry(*id).or_insert(0) += 1;
    }
    counts
}

/// Append freshly generated free/structured rounds for the session's current players.
fn extend_rounds<R: Rng + ?Sized>(session: &mut Session, rng: &mut R) {
    match &session.mode {
        SessionMode::Free { team_count } => {
            let sequence =
                generate_optimal_round_sequence(&session.players, *team_count, &session.used_pairs, rng);
            for teams in sequence {
                session.used_pairs.extend(extract_pairs(&teams));
                session.rounds.push(free_round(teams));
            }
        }
        mode => {
            if let Some(config) = court_config(mode) {
                let rounds = generate_structured_rounds(
                    &session.players,
                    &config,
                    &mut session.sit_out_counts,
                    &mut session.used_matchups,
                    rng,
                );
                session.rounds.extend(rounds);
            }
        }
    }
}

/// Start a session: validate the setup, generate its rounds / bracket / series, make it active.
pub fn start_session<R: Rng + ?Sized>(
    state: &mut AppState,
    setup: SessionSetup,
    rng: &mut R,
) -> Result<(), SessionError> {
    if state.active_session.is_some() {
        return Err(SessionError::SessionAlreadyActive);
    }
    validate_setup(state, &setup)?;

    let mut session = Session::new(setup.players, setup.mode);
    match session.mode.clone() {
        SessionMode::Free { .. } | SessionMode::Structured { .. } => {
            extend_rounds(&mut session, rng);
            if session.rounds.is_empty() {
                return Err(SessionError::NoRoundsPossible);
            }
        }
        SessionMode::Tournament {
            match_type,
            format,
            court_count,
            court_handling,
            allow_two_vs_one,
        } => {
            let players = state.roster.resolve(&session.players)?;
            let (teams, sit_outs) =
                form_tournament_teams(&players, match_type, allow_two_vs_one, rng);
            session.tournament = Some(build_tournament_run(
                teams,
                sit_outs,
                format,
                court_count,
                court_handling,
            ));
        }
        SessionMode::Series {
            match_type,
            format,
            court_count,
            court_handling,
            allow_two_vs_one,
            seed,
        } => {
            let players = state.roster.resolve(&session.players)?;
            let series = build_tournament_series(
                &players,
                &SeriesOptions {
                    match_type,
                    format,
                    court_count,
                    court_handling,
                    allow_two_vs_one,
                    seed,
                },
            );
            if series.tournaments.is_empty() {
                return Err(SessionError::NoRoundsPossible);
            }
            session.series = Some(series);
        }
    }

    log::info!(
        "session {} started with {} players ({} rounds pre-generated)",
        session.id,
        session.players.len(),
        session.rounds.len()
    );
    state.active_session = Some(session);
    Ok(())
}

fn active_session_mut(state: &mut AppState) -> Result<&mut Session, SessionError> {
    state.active_session.as_mut().ok_or(SessionError::NoActiveSession)
}

/// Index of the round being played in a run: the latest bracket round, or the first
/// round-robin round that still has an undecided match.
pub fn playing_round_index(run: &TournamentRun) -> usize {
    match run.tournament_format {
        TournamentFormat::RoundRobin => run
            .rounds
            .iter()
            .position(|r| round_winners(r).is_err())
            .unwrap_or(run.rounds.len().saturating_sub(1)),
        _ => run.rounds.len().saturating_sub(1),
    }
}

/// Attach a score to a match. In tournaments the court overlay decides what is editable.
pub fn record_score(
    state: &mut AppState,
    round_index: usize,
    match_index: usize,
    entry: ScoreEntry,
) -> Result<(), SessionError> {
    let session = active_session_mut(state)?;
    let in_tournament = session.tournament.is_some() || session.series.is_some();
    let (round, editable) = if in_tournament {
        let run = session.active_run_mut().ok_or(SessionError::InvalidState)?;
        if run.finished {
            return Err(SessionError::InvalidState);
        }
        let (court_count, handling) = (run.court_count, run.court_handling);
        // Bracket rounds already advanced fed eliminations and pools; they stay frozen.
        let bracket_locked = run.tournament_format != TournamentFormat::RoundRobin
            && round_index != playing_round_index(run);
        let round = run
            .rounds
            .get_mut(round_index)
            .ok_or(SessionError::RoundNotFound(round_index))?;
        if match_index >= round.matches.len() {
            return Err(SessionError::MatchNotFound(match_index));
        }
        let editable = !bracket_locked && is_editable(round, match_index, court_count, handling);
        (round, editable)
    } else {
        let round = session
            .rounds
            .get_mut(round_index)
            .ok_or(SessionError::RoundNotFound(round_index))?;
        (round, true)
    };
    if match_index >= round.matches.len() {
        return Err(SessionError::MatchNotFound(match_index));
    }
    if !editable {
        return Err(SessionError::InvalidState);
    }
    round.set_score(match_index, entry);
    Ok(())
}

/// Free/structured: move to the next round, generating one when the prepared sequence runs out.
pub fn next_round<R: Rng + ?Sized>(state: &mut AppState, rng: &mut R) -> Result<usize, SessionError> {
    let session = active_session_mut(state)?;
    if session.active_run().is_some() {
        return Err(SessionError::InvalidState);
    }
    // A partly scored structured round must be settled before moving on.
    if let (SessionMode::Structured { .. }, Some(round)) =
        (&session.mode, session.rounds.get(session.current_round))
    {
        if round.has_any_score() {
            round_winners(round)?;
        }
    }
    let next = session.current_round + 1;
    if next >= session.rounds.len() {
        let generated = match &session.mode {
            SessionMode::Free { team_count } => {
                generate_round(&session.players, *team_count, &session.used_pairs, rng).map(|teams| {
                    session.used_pairs.extend(extract_pairs(&teams));
                    free_round(teams)
                })
            }
            mode => court_config(mode).and_then(|config| {
                generate_structured_round(
                    &session.players,
                    &config,
                    &mut session.sit_out_counts,
                    &mut session.used_matchups,
                    rng,
                )
            }),
        };
        let round = generated.ok_or(SessionError::NoRoundsPossible)?;
        session.rounds.push(round);
    }
    session.current_round = next;
    Ok(next)
}

/// Tournaments: advance the active run; in a series, a finished run hands over to the next one.
pub fn advance_tournament(state: &mut AppState) -> Result<Advancement, SessionError> {
    let session = active_session_mut(state)?;
    let run = session.active_run_mut().ok_or(SessionError::InvalidState)?;
    let advancement = advance_round(run)?;
    if !matches!(advancement, Advancement::NextRound) {
        if let Some(series) = session.series.as_mut() {
            if series.move_to_next_tournament() {
                log::info!(
                    "series moved to tournament {} of {}",
                    series.current_tournament_index + 1,
                    series.tournaments.len()
                );
            }
        }
    }
    Ok(advancement)
}

/// Batches overlay: put the next batch of the playing round on court.
pub fn advance_court_batch(state: &mut AppState) -> Result<usize, SessionError> {
    let session = active_session_mut(state)?;
    let run = session.active_run_mut().ok_or(SessionError::InvalidState)?;
    let index = playing_round_index(run);
    let court_count = run.court_count;
    let round = run
        .rounds
        .get_mut(index)
        .ok_or(SessionError::RoundNotFound(index))?;
    Ok(advance_batch(round, court_count)?)
}

/// Change who plays mid-session (free/structured). Unplayed rounds after the current one are
/// discarded and regenerated for the new player set; history of kept rounds still counts.
pub fn modify_active_session_players<R: Rng + ?Sized>(
    state: &mut AppState,
    players: Vec<PlayerId>,
    rng: &mut R,
) -> Result<(), SessionError> {
    let mode = state
        .active_session
        .as_ref()
        .ok_or(SessionError::NoActiveSession)?
        .mode
        .clone();
    if !matches!(mode, SessionMode::Free { .. } | SessionMode::Structured { .. }) {
        return Err(SessionError::InvalidState);
    }
    validate_setup(
        state,
        &SessionSetup {
            players: players.clone(),
            mode,
        },
    )?;

    let session = active_session_mut(state)?;
    let keep = (session.current_round + 1).min(session.rounds.len());
    session.rounds.truncate(keep);
    session.used_pairs = pairs_of(&session.rounds);
    session.used_matchups = matchups_of(&session.rounds);
    session.sit_out_counts = sit_outs_of(&session.rounds);
    session.players = players;
    extend_rounds(session, rng);
    log::info!(
        "session {} now has {} players; {} rounds scheduled",
        session.id,
        session.players.len(),
        session.rounds.len()
    );
    Ok(())
}

/// Remove a roster player who is not part of the active session.
pub fn remove_player(state: &mut AppState, id: PlayerId) -> Result<(), SessionError> {
    if state
        .active_session
        .as_ref()
        .is_some_and(|s| s.players.contains(&id))
    {
        return Err(SessionError::InvalidState);
    }
    state.roster.remove(id).map(|_| ())
}

/// Archive the active session into history.
pub fn end_session(state: &mut AppState) -> Result<(), SessionError> {
    let mut session = state
        .active_session
        .take()
        .ok_or(SessionError::NoActiveSession)?;
    session.ended_at = Some(Utc::now());
    log::info!("session {} ended after {} rounds", session.id, session.rounds.len());
    state.history.push(session);
    Ok(())
}
