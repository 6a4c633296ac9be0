//! Canonical keys for partnerships and matchups.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::player::PlayerId;

/// Unordered pair of players. Persisted as `"smaller||larger"`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PairKey(PlayerId, PlayerId);

impl PairKey {
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn players(&self) -> (PlayerId, PlayerId) {
        (self.0, self.1)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = self.players();
        write!(f, "{a}||{b}")
    }
}

impl From<PairKey> for String {
    fn from(key: PairKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PairKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (a, b) = value
            .split_once("||")
            .ok_or_else(|| format!("pair key without separator: {value}"))?;
        let a = a.parse::<PlayerId>().map_err(|e| e.to_string())?;
        let b = b.parse::<PlayerId>().map_err(|e| e.to_string())?;
        Ok(Self::new(a, b))
    }
}

/// Order-independent key for one court's matchup: each side sorted, then the sides sorted.
/// For singles this carries exactly the information of the pair key of the two players.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchupKey(Vec<Vec<PlayerId>>);

impl MatchupKey {
    pub fn new(teams: &[Vec<PlayerId>]) -> Self {
        let mut sides: Vec<Vec<PlayerId>> = teams
            .iter()
            .map(|team| {
                let mut side = team.clone();
                side.sort();
                side
            })
            .collect();
        sides.sort();
        Self(sides)
    }

    pub fn sides(&self) -> &[Vec<PlayerId>] {
        &self.0
    }
}

/// Partnerships already played (free mode, doubles).
pub type PairSet = BTreeSet<PairKey>;

/// Matchups already played (structured mode, singles openings).
pub type MatchupSet = BTreeSet<MatchupKey>;
