//! Court rotation: fair rounds, brackets and tournament series for small-group court sports.

pub mod logic;
pub mod models;

pub use logic::{
    advance_court_batch, advance_round, advance_tournament, build_tournament_run,
    build_tournament_series, determine_match_winner, end_session, form_tournament_teams,
    generate_optimal_round_sequence, generate_round, generate_structured_rounds,
    import_roster_csv, modify_active_session_players, next_round, record_score, remove_player,
    start_session, Advancement, CourtConfig, SeededRng, SeriesOptions,
};
pub use models::{
    AdvanceBlock, AppState, GameMatch, MatchType, Player, PlayerId, Roster, Round, ScoreEntry,
    Session, SessionError, SessionMode, SessionSetup, SetScore, Team, TeamId, TournamentFormat,
    TournamentRun, TournamentSeries,
};
