//! Game state machines run inside session actors
//!
//! A [`Game`] is plain synchronous state owned by exactly one session actor,
//! so implementations never need interior locking. The actor serializes every
//! call made through the session's handle.

mod builtin;
mod table;

pub use builtin::BuiltinGames;
pub use table::{TableGame, TableRules};

use crate::errors::RegistryError;
use crate::types::{GameInput, GameKind, GameRejection, PlayerId};

/// Game-level view of a session, before the actor adds identity fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameStatus {
    pub ready: bool,
    pub started: bool,
    pub players: Vec<PlayerId>,
    pub inputs_handled: u64,
}

/// One game instance
pub trait Game: Send + 'static {
    /// Add a participant; capacity and rules are the game's responsibility
    fn add_player(&mut self, player: PlayerId) -> Result<(), GameRejection>;

    /// Remove a participant
    fn remove_player(&mut self, player: &PlayerId) -> Result<(), GameRejection>;

    /// Report the current state; must not have side effects
    fn status(&self) -> GameStatus;

    /// Start the game if it is ready. Idempotent. Returns `true` only when
    /// this call started the game.
    fn start_if_ready(&mut self) -> bool;

    /// Apply an input from a participant
    fn handle_input(&mut self, player: &PlayerId, input: GameInput);
}

/// Creates games by kind
pub trait GameFactory: Send + Sync {
    fn create(&self, kind: &GameKind) -> Result<Box<dyn Game>, RegistryError>;
}

impl<F> GameFactory for F
where
    F: Fn(&GameKind) -> Result<Box<dyn Game>, RegistryError> + Send + Sync,
{
    fn create(&self, kind: &GameKind) -> Result<Box<dyn Game>, RegistryError> {
        self(kind)
    }
}
