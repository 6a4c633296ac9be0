//! Score entries: per-set game counts with optional tiebreaks.

use serde::{Deserialize, Serialize};

/// One set. Game counts are `None` until entered; a set is complete once both are known.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "SetRepr", into = "SetRepr")]
pub struct SetScore {
    pub games: [Option<u32>; 2],
    pub tiebreak: Option<[Option<u32>; 2]>,
}

impl SetScore {
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            games: [Some(a), Some(b)],
            tiebreak: None,
        }
    }

    pub fn with_tiebreak(a: u32, b: u32, tb_a: u32, tb_b: u32) -> Self {
        Self {
            games: [Some(a), Some(b)],
            tiebreak: Some([Some(tb_a), Some(tb_b)]),
        }
    }

    /// Both game counts, if the set is complete.
    pub fn complete_games(&self) -> Option<(u32, u32)> {
        match self.games {
            [Some(a), Some(b)] => Some((a, b)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct TiebreakRepr {
    tb: Option<[Option<u32>; 2]>,
}

/// Wire shape: `[a, b]` or `[a, b, {"tb": [x, y]}]`.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum SetRepr {
    WithTiebreak(Option<u32>, Option<u32>, Option<TiebreakRepr>),
    Plain(Option<u32>, Option<u32>),
}

impl From<SetRepr> for SetScore {
    fn from(repr: SetRepr) -> Self {
        match repr {
            SetRepr::WithTiebreak(a, b, tb) => Self {
                games: [a, b],
                tiebreak: tb.and_then(|t| t.tb),
            },
            SetRepr::Plain(a, b) => Self {
                games: [a, b],
                tiebreak: None,
            },
        }
    }
}

impl From<SetScore> for SetRepr {
    fn from(set: SetScore) -> Self {
        let [a, b] = set.games;
        match set.tiebreak {
            Some(tb) => SetRepr::WithTiebreak(a, b, Some(TiebreakRepr { tb: Some(tb) })),
            None => SetRepr::Plain(a, b),
        }
    }
}

/// Score for one match (identified by its court within the round).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScoreEntryRepr")]
pub struct ScoreEntry {
    pub court: u32,
    pub sets: Vec<SetScore>,
}

impl ScoreEntry {
    pub fn new(court: u32, sets: Vec<SetScore>) -> Self {
        Self { court, sets }
    }

    /// Single-set shorthand.
    pub fn games(court: u32, a: u32, b: u32) -> Self {
        Self::new(court, vec![SetScore::new(a, b)])
    }

    pub fn has_complete_set(&self) -> bool {
        self.sets.iter().any(|s| s.complete_games().is_some())
    }
}

/// Accepts both `{court, sets}` and the legacy `{court, score: [a, b]}`.
#[derive(Deserialize)]
struct ScoreEntryRepr {
    #[serde(default)]
    court: u32,
    #[serde(default)]
    sets: Option<Vec<SetScore>>,
    #[serde(default)]
    score: Option<[Option<u32>; 2]>,
}

impl From<ScoreEntryRepr> for ScoreEntry {
    fn from(repr: ScoreEntryRepr) -> Self {
        let sets = match (repr.sets, repr.score) {
            (Some(sets), _) => sets,
            (None, Some(games)) => vec![SetScore {
                games,
                tiebreak: None,
            }],
            (None, None) => Vec::new(),
        };
        Self {
            court: repr.court,
            sets,
        }
    }
}
