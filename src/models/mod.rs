//! Data structures: players, keys, rounds, scores, tournaments, series and sessions.

mod game;
mod keys;
mod player;
mod score;
mod series;
mod session;
mod tournament;

pub use game::{BracketPool, GameMatch, Round, Side};
pub use keys::{MatchupKey, MatchupSet, PairKey, PairSet};
pub use player::{Player, PlayerId, Roster};
pub use score::{ScoreEntry, SetScore};
pub use series::{SeriesConstraints, TournamentSeries};
pub use session::{AdvanceBlock, AppState, Session, SessionError, SessionMode, SessionSetup};
pub use tournament::{
    BracketPools, BracketState, CourtHandling, MatchType, RunStatus, Team, TeamId, TeamStanding,
    TournamentFormat, TournamentRun,
};
