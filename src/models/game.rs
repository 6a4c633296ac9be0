//! Match (game), Side, BracketPool and Round.

use serde::{Deserialize, Serialize};

use crate::models::player::PlayerId;
use crate::models::score::ScoreEntry;
use crate::models::tournament::TeamId;

/// Which side of a two-team match won.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    /// Position of this side in `GameMatch::teams` / `GameMatch::team_ids`.
    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    pub fn other(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// Pool a consolation-bracket match belongs to.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketPool {
    #[default]
    Winners,
    Losers,
}

/// A single match on one court: two teams (more only in free mode).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMatch {
    /// 1-based display slot.
    pub court: u32,
    /// Player ids per team.
    pub teams: Vec<Vec<PlayerId>>,
    /// Parallel to `teams` when the teams are tournament teams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_ids: Option<Vec<TeamId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bracket_pool: Option<BracketPool>,
}

impl GameMatch {
    pub fn new(court: u32, teams: Vec<Vec<PlayerId>>) -> Self {
        Self {
            court,
            teams,
            team_ids: None,
            bracket_pool: None,
        }
    }

    pub fn between_teams(
        court: u32,
        teams: Vec<Vec<PlayerId>>,
        team_ids: Vec<TeamId>,
        pool: Option<BracketPool>,
    ) -> Self {
        Self {
            court,
            teams,
            team_ids: Some(team_ids),
            bracket_pool: pool,
        }
    }

    /// Tournament team id on the given side. Bracket matches always carry team ids.
    pub fn team_id(&self, side: Side) -> TeamId {
        self.team_ids
            .as_ref()
            .and_then(|ids| ids.get(side.index()).copied())
            .expect("bracket match without team ids")
    }

    pub fn pool(&self) -> BracketPool {
        self.bracket_pool.unwrap_or_default()
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.teams.iter().flatten().copied()
    }
}

/// One round of play: matches, byes, sit-outs and the scores entered so far.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub matches: Vec<GameMatch>,
    /// Teams auto-advanced without playing.
    #[serde(default)]
    pub byes: Vec<TeamId>,
    #[serde(default)]
    pub losers_byes: Vec<TeamId>,
    #[serde(default)]
    pub sit_outs: Vec<PlayerId>,
    /// Aligned with `matches`.
    #[serde(default)]
    pub scores: Vec<Option<ScoreEntry>>,
    #[serde(default, rename = "tournamentRoundLabel", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Batch currently on court when matches are played in batches.
    #[serde(default)]
    pub active_batch: usize,
}

impl Round {
    pub fn new(matches: Vec<GameMatch>) -> Self {
        let scores = vec![None; matches.len()];
        Self {
            matches,
            scores,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn score(&self, match_index: usize) -> Option<&ScoreEntry> {
        self.scores.get(match_index).and_then(Option::as_ref)
    }

    /// Attach a score; the entry's court is normalised to the match's court.
    pub fn set_score(&mut self, match_index: usize, mut entry: ScoreEntry) -> bool {
        let Some(m) = self.matches.get(match_index) else {
            return false;
        };
        entry.court = m.court;
        if self.scores.len() < self.matches.len() {
            self.scores.resize(self.matches.len(), None);
        }
        self.scores[match_index] = Some(entry);
        true
    }

    pub fn has_any_score(&self) -> bool {
        self.scores.iter().any(|s| s.as_ref().is_some_and(ScoreEntry::has_complete_set))
    }

    /// Every player seated on a court this round.
    pub fn active_players(&self) -> Vec<PlayerId> {
        self.matches.iter().flat_map(|m| m.players()).collect()
    }
}
