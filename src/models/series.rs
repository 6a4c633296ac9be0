//! A precomputed chain of mini-tournaments over one roster.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::keys::{MatchupSet, PairSet};
use crate::models::player::PlayerId;
use crate::models::tournament::{
    CourtHandling, MatchType, RunStatus, TournamentFormat, TournamentRun,
};

/// Anti-repeat state shared by every run of a series.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesConstraints {
    pub used_doubles_partner_pairs: PairSet,
    pub used_singles_opening_matchups: MatchupSet,
    pub tournament_sit_out_counts: BTreeMap<PlayerId, u32>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSeries {
    pub seed: String,
    pub match_type: MatchType,
    pub format: TournamentFormat,
    pub court_count: usize,
    pub court_handling: CourtHandling,
    #[serde(default)]
    pub allow_two_vs_one: bool,
    pub tournaments: Vec<TournamentRun>,
    pub current_tournament_index: usize,
    pub constraints: SeriesConstraints,
}

impl TournamentSeries {
    pub fn current(&self) -> Option<&TournamentRun> {
        self.tournaments.get(self.current_tournament_index)
    }

    pub fn current_mut(&mut self) -> Option<&mut TournamentRun> {
        self.tournaments.get_mut(self.current_tournament_index)
    }

    /// True once the last run of the chain is complete.
    pub fn is_complete(&self) -> bool {
        self.current_tournament_index + 1 >= self.tournaments.len()
            && self
                .current()
                .map_or(true, |run| run.status() == RunStatus::Complete)
    }

    /// Move to the next run once the current one is complete. Returns false at the end of the chain.
    pub fn move_to_next_tournament(&mut self) -> bool {
        let current_done = self
            .current()
            .is_some_and(|run| run.status() == RunStatus::Complete);
        if !current_done || self.current_tournament_index + 1 >= self.tournaments.len() {
            return false;
        }
        self.current_tournament_index += 1;
        true
    }
}
