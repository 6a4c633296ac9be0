//! Player and Roster data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::session::SessionError;

/// Unique identifier for a player (used in teams, rounds and pair keys).
pub type PlayerId = Uuid;

/// A player on the club roster. Only the roster knows the display name.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    /// Create a new player with the given name and a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Roster entries as persisted: legacy state stored bare names.
#[derive(Deserialize)]
#[serde(untagged)]
enum RosterEntry {
    Player(Player),
    Name(String),
}

impl From<RosterEntry> for Player {
    fn from(entry: RosterEntry) -> Self {
        match entry {
            RosterEntry::Player(p) => p,
            RosterEntry::Name(name) => Player::new(name),
        }
    }
}

/// Every known player. Names are unique (case-insensitive).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Roster {
    players: Vec<Player>,
}

impl<'de> Deserialize<'de> for Roster {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = Vec::<RosterEntry>::deserialize(deserializer)?;
        Ok(Self {
            players: entries.into_iter().map(Player::from).collect(),
        })
    }
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.get(id).is_some()
    }

    /// Display name for an id; unknown ids (e.g. a player removed after a session ended)
    /// render as "?".
    pub fn name(&self, id: PlayerId) -> &str {
        self.get(id).map(|p| p.name.as_str()).unwrap_or("?")
    }

    pub fn display_names(&self, ids: &[PlayerId]) -> Vec<String> {
        ids.iter().map(|&id| self.name(id).to_string()).collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Player> {
        let name = name.trim();
        self.players.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Add a player. Names are trimmed and must be non-empty and unique (case-insensitive).
    pub fn add(&mut self, name: impl Into<String>) -> Result<PlayerId, SessionError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyPlayerName);
        }
        if self.find_by_name(trimmed).is_some() {
            return Err(SessionError::DuplicatePlayerName);
        }
        let player = Player::new(trimmed);
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    /// Rename a player. Ids are stored everywhere else, so nothing else changes.
    pub fn rename(&mut self, id: PlayerId, name: impl Into<String>) -> Result<(), SessionError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyPlayerName);
        }
        if self
            .players
            .iter()
            .any(|p| p.id != id && p.name.eq_ignore_ascii_case(trimmed))
        {
            return Err(SessionError::DuplicatePlayerName);
        }
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(SessionError::PlayerNotFound(id))?;
        player.name = trimmed.to_string();
        Ok(())
    }

    pub fn remove(&mut self, id: PlayerId) -> Result<Player, SessionError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or(SessionError::PlayerNotFound(id))?;
        Ok(self.players.remove(idx))
    }

    /// Resolve ids to roster players, failing on the first unknown id.
    pub fn resolve(&self, ids: &[PlayerId]) -> Result<Vec<Player>, SessionError> {
        ids.iter()
            .map(|&id| self.get(id).cloned().ok_or(SessionError::PlayerNotFound(id)))
            .collect()
    }
}
