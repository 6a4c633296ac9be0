//! Teams, bracket state and a single tournament run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::game::Round;
use crate::models::player::PlayerId;

/// Dense 0-based team handle, fixed for the lifetime of a tournament run.
pub type TeamId = usize;

/// A tournament team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub players: Vec<PlayerId>,
}

/// 1v1 or 2v2 play.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Singles,
    #[default]
    Doubles,
}

impl MatchType {
    pub fn players_per_team(self) -> usize {
        match self {
            MatchType::Singles => 1,
            MatchType::Doubles => 2,
        }
    }

    pub fn players_per_court(self) -> usize {
        self.players_per_team() * 2
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    RoundRobin,
    #[default]
    SingleElimination,
    /// Winners and losers continue in parallel pools.
    Consolation,
}

/// How a round's matches are put on a limited number of courts.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourtHandling {
    /// Next undecided match takes the next free court.
    #[default]
    Queue,
    /// Fixed groups of `court_count` matches, one group at a time.
    Batches,
}

/// Teams still alive in each consolation pool (bookkeeping only).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketPools {
    pub winners: Vec<TeamId>,
    pub losers: Vec<TeamId>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub wins: u32,
    pub losses: u32,
    pub games_won: u32,
    pub games_lost: u32,
}

impl TeamStanding {
    pub fn game_difference(&self) -> i64 {
        i64::from(self.games_won) - i64::from(self.games_lost)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketState {
    pub pools: BracketPools,
    pub eliminated: Vec<TeamId>,
    pub champion: Option<TeamId>,
    pub standings: BTreeMap<TeamId, TeamStanding>,
}

impl BracketState {
    pub fn is_eliminated(&self, id: TeamId) -> bool {
        self.eliminated.contains(&id)
    }

    pub fn eliminate(&mut self, id: TeamId) {
        if !self.eliminated.contains(&id) {
            self.eliminated.push(id);
        }
    }
}

/// Where a tournament run stands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The last round awaits scores (or is ready to be advanced).
    InProgress,
    /// Champion decided or no further matches.
    Complete,
}

/// A self-contained, independently advanceable tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRun {
    pub players: Vec<PlayerId>,
    pub teams: Vec<Team>,
    pub rounds: Vec<Round>,
    pub bracket: BracketState,
    pub tournament_format: TournamentFormat,
    pub tournament_team_size: usize,
    pub all_rounds_generated: bool,
    /// Players left out of this whole run (odd doubles roster).
    #[serde(default)]
    pub sit_outs: Vec<PlayerId>,
    pub court_count: usize,
    #[serde(default)]
    pub court_handling: CourtHandling,
    #[serde(default)]
    pub finished: bool,
}

impl TournamentRun {
    pub fn status(&self) -> RunStatus {
        if self.finished {
            RunStatus::Complete
        } else {
            RunStatus::InProgress
        }
    }

    pub fn team(&self, id: TeamId) -> &Team {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .expect("bracket references a team missing from the run")
    }

    /// Latest generated round (the one awaiting scores in bracket formats).
    pub fn latest_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    pub fn latest_round_mut(&mut self) -> Option<&mut Round> {
        self.rounds.last_mut()
    }

    pub fn champion(&self) -> Option<&Team> {
        self.bracket.champion.map(|id| self.team(id))
    }
}
