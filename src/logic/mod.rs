//! Scheduling logic: pairing search, free and structured rounds, brackets, series, sessions.

mod advancement;
mod bracket;
mod courts;
mod free_play;
mod pairing;
mod rng;
mod roster;
mod scoring;
mod series;
mod session;
mod structured;

pub use advancement::{
    advance_consolation, advance_elimination, advance_round, complete_round_robin, ranked_standings,
    Advancement,
};
pub use bracket::{
    auto_form_teams, build_tournament_run, create_initial_bracket, form_team, form_tournament_teams,
    generate_bracket_first_round, generate_round_robin_schedule,
};
pub use courts::{advance_batch, batch_count, is_editable, schedule_round, MatchStatus};
pub use free_play::{
    build_sequence, can_generate_more, free_round, generate_optimal_round_sequence, generate_round,
    generate_round_with_budget, TeamSplit, FEASIBILITY_PROBE_BUDGET, FREE_ROUND_BUDGET,
};
pub use pairing::{
    compute_capacities, extract_pairs, matchup_key, pair_key, select_active_players, undo_sit_outs,
    ActiveSelection, SearchBudget,
};
pub use rng::SeededRng;
pub use roster::import_roster_csv;
pub use scoring::{determine_match_winner, games_totals, match_winner, round_winners};
pub use series::{
    build_tournament_series, SeriesOptions, MAX_SERIES_TOURNAMENTS, SERIES_RESEED_ATTEMPTS,
};
pub use session::{
    advance_court_batch, advance_tournament, end_session, modify_active_session_players,
    next_round, playing_round_index, record_score, remove_player, start_session,
};
pub use structured::{
    generate_structured_round, generate_structured_rounds, max_structured_rounds, CourtConfig,
};
