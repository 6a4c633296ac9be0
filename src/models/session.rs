//! Session, setup context, persisted app state and errors.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::game::Round;
use crate::models::keys::{MatchupSet, PairSet};
use crate::models::player::{PlayerId, Roster};
use crate::models::series::TournamentSeries;
use crate::models::tournament::{CourtHandling, MatchType, TournamentFormat, TournamentRun};

/// Why a round cannot be advanced yet. Always recoverable by fixing scores.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdvanceBlock {
    /// At least one match has no usable score.
    MissingScores,
    /// A match is scored but has no winner (tie, missing or contradictory tiebreak).
    DrawnMatch,
    /// Nothing left to advance (tournament complete, or last batch).
    NothingToAdvance,
}

impl std::fmt::Display for AdvanceBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvanceBlock::MissingScores => write!(f, "Enter all scores"),
            AdvanceBlock::DrawnMatch => write!(f, "Resolve drawn match"),
            AdvanceBlock::NothingToAdvance => write!(f, "Nothing left to advance"),
        }
    }
}

/// Errors that can occur during session operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionError {
    /// Player names must be non-empty.
    EmptyPlayerName,
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName,
    /// Player not found on the roster.
    PlayerNotFound(PlayerId),
    /// The same player was selected twice.
    DuplicatePlayer(PlayerId),
    /// Not enough players for the selected mode.
    NotEnoughPlayers { required: usize, selected: usize },
    /// A setup value is out of range (e.g. zero courts).
    InvalidSetup(&'static str),
    /// A session is already running.
    SessionAlreadyActive,
    /// No session is running.
    NoActiveSession,
    /// The session is not in a mode that allows this action.
    InvalidState,
    RoundNotFound(usize),
    MatchNotFound(usize),
    /// Search could not produce a valid round within its budget.
    NoRoundsPossible,
    /// Round cannot be advanced yet.
    Blocked(AdvanceBlock),
    /// Roster CSV could not be read.
    Csv(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::EmptyPlayerName => write!(f, "Player name cannot be empty"),
            SessionError::DuplicatePlayerName => write!(f, "A player with this name already exists"),
            SessionError::PlayerNotFound(_) => write!(f, "Player not found"),
            SessionError::DuplicatePlayer(_) => write!(f, "A player was selected more than once"),
            SessionError::NotEnoughPlayers { required, selected } => {
                write!(f, "Need at least {} players (selected {})", required, selected)
            }
            SessionError::InvalidSetup(reason) => write!(f, "Invalid setup: {}", reason),
            SessionError::SessionAlreadyActive => write!(f, "A session is already active"),
            SessionError::NoActiveSession => write!(f, "No active session"),
            SessionError::InvalidState => write!(f, "Invalid state for this action"),
            SessionError::RoundNotFound(i) => write!(f, "Round {} not found", i),
            SessionError::MatchNotFound(i) => write!(f, "Match {} not found", i),
            SessionError::NoRoundsPossible => write!(f, "No more rounds possible"),
            SessionError::Blocked(block) => write!(f, "{}", block),
            SessionError::Csv(e) => write!(f, "Could not read roster CSV: {}", e),
        }
    }
}

impl From<AdvanceBlock> for SessionError {
    fn from(block: AdvanceBlock) -> Self {
        SessionError::Blocked(block)
    }
}

fn default_true() -> bool {
    true
}

/// What kind of session to run, with its parameters.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionMode {
    /// Teams reshuffled every round, no court structure.
    Free { team_count: usize },
    /// Singles/doubles on courts with sit-out rotation.
    Structured {
        match_type: MatchType,
        court_count: usize,
        /// When false, odd doubles rosters may play 2-vs-1 courts.
        #[serde(default = "default_true")]
        strict_doubles: bool,
    },
    Tournament {
        match_type: MatchType,
        format: TournamentFormat,
        court_count: usize,
        #[serde(default)]
        court_handling: CourtHandling,
        #[serde(default)]
        allow_two_vs_one: bool,
    },
    Series {
        match_type: MatchType,
        format: TournamentFormat,
        court_count: usize,
        #[serde(default)]
        court_handling: CourtHandling,
        #[serde(default)]
        allow_two_vs_one: bool,
        seed: String,
    },
}

/// Explicit setup context for starting a session.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionSetup {
    pub players: Vec<PlayerId>,
    pub mode: SessionMode,
}

/// One playing session, active or archived.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub players: Vec<PlayerId>,
    pub mode: SessionMode,
    /// Free and structured rounds.
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub current_round: usize,
    #[serde(default)]
    pub used_pairs: PairSet,
    #[serde(default)]
    pub used_matchups: MatchupSet,
    #[serde(default)]
    pub sit_out_counts: BTreeMap<PlayerId, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament: Option<TournamentRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<TournamentSeries>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(players: Vec<PlayerId>, mode: SessionMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            players,
            mode,
            rounds: Vec::new(),
            current_round: 0,
            used_pairs: PairSet::new(),
            used_matchups: MatchupSet::new(),
            sit_out_counts: BTreeMap::new(),
            tournament: None,
            series: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// The tournament run currently being played (single tournament or current series run).
    pub fn active_run(&self) -> Option<&TournamentRun> {
        match (&self.tournament, &self.series) {
            (Some(run), _) => Some(run),
            (None, Some(series)) => series.current(),
            (None, None) => None,
        }
    }

    pub fn active_run_mut(&mut self) -> Option<&mut TournamentRun> {
        match (&mut self.tournament, &mut self.series) {
            (Some(run), _) => Some(run),
            (None, Some(series)) => series.current_mut(),
            (None, None) => None,
        }
    }
}

/// Everything a club persists: `{ roster, activeSession, history }`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub roster: Roster,
    pub active_session: Option<Session>,
    pub history: Vec<Session>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
