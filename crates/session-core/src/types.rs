//! Public types shared by sessions, registries and the coordinator

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::InvalidSessionId;

/// Number of characters in a session identifier
pub const SESSION_ID_LEN: usize = 6;

/// Short, human-presentable session identifier (six letters `a`-`z`).
///
/// Identifiers are random and only unique among live sessions; the registry
/// refuses to spawn a second live session under an identifier in use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Draw a fresh random identifier
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Draw an identifier from the given random source
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id = (0..SESSION_ID_LEN)
            .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
            .collect();
        Self(id)
    }

    /// Validate and wrap an identifier received from outside
    pub fn parse(value: &str) -> std::result::Result<Self, InvalidSessionId> {
        let well_formed =
            value.len() == SESSION_ID_LEN && value.bytes().all(|b| b.is_ascii_lowercase());
        if well_formed {
            Ok(Self(value.to_string()))
        } else {
            Err(InvalidSessionId {
                value: value.to_string(),
                expected_len: SESSION_ID_LEN,
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = InvalidSessionId;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionId {
    type Error = InvalidSessionId;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

/// Identity of a participant
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Selects which game a new session runs (e.g. `duel`, `party`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameKind(pub String);

impl GameKind {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameKind {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for GameKind {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Opaque input payload forwarded to the active game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameInput(pub serde_json::Value);

impl From<serde_json::Value> for GameInput {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Reasons a game refuses a membership change
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GameRejection {
    #[error("game is full ({max_players} players)")]
    GameFull { max_players: usize },

    #[error("player {player} already joined")]
    AlreadyJoined { player: PlayerId },

    #[error("player {player} is not in this game")]
    NotAPlayer { player: PlayerId },

    #[error("game already started")]
    AlreadyStarted,

    #[error("{message}")]
    Other { message: String },
}

/// Status of one session as reported by the session itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub id: SessionId,
    pub kind: GameKind,
    /// The game could start (or keep running) right now
    pub ready: bool,
    pub started: bool,
    pub players: Vec<PlayerId>,
    pub inputs_handled: u64,
    /// `false` when the session could not be queried
    pub reachable: bool,
}

impl SessionStatus {
    /// Placeholder for a session that did not answer a status request
    pub fn unreachable(id: SessionId, kind: GameKind) -> Self {
        Self {
            id,
            kind,
            ready: false,
            started: false,
            players: Vec::new(),
            inputs_handled: 0,
            reachable: false,
        }
    }
}
