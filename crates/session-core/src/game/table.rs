//! Table game: a seat-based game with a player range

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Game, GameStatus};
use crate::types::{GameInput, GameRejection, PlayerId};

/// Seat limits for a [`TableGame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRules {
    pub min_players: usize,
    pub max_players: usize,
}

impl TableRules {
    pub fn new(min_players: usize, max_players: usize) -> Self {
        Self {
            min_players,
            max_players,
        }
    }

    fn admits(&self, players: usize) -> bool {
        (self.min_players..=self.max_players).contains(&players)
    }
}

/// A game that is ready while the number of seated players is within its
/// rules. Seats are fixed once the game starts.
#[derive(Debug, Clone)]
pub struct TableGame {
    rules: TableRules,
    players: Vec<PlayerId>,
    started: bool,
    inputs: HashMap<PlayerId, u64>,
}

impl TableGame {
    pub fn new(rules: TableRules) -> Self {
        Self {
            rules,
            players: Vec::new(),
            started: false,
            inputs: HashMap::new(),
        }
    }

    pub fn rules(&self) -> TableRules {
        self.rules
    }

    /// Number of accepted inputs from one player
    pub fn inputs_from(&self, player: &PlayerId) -> u64 {
        self.inputs.get(player).copied().unwrap_or(0)
    }
}

impl Game for TableGame {
    fn add_player(&mut self, player: PlayerId) -> Result<(), GameRejection> {
        if self.started {
            return Err(GameRejection::AlreadyStarted);
        }
        if self.players.contains(&player) {
            return Err(GameRejection::AlreadyJoined { player });
        }
        if self.players.len() >= self.rules.max_players {
            return Err(GameRejection::GameFull {
                max_players: self.rules.max_players,
            });
        }
        self.players.push(player);
        Ok(())
    }

    fn remove_player(&mut self, player: &PlayerId) -> Result<(), GameRejection> {
        let Some(position) = self.players.iter().position(|p| p == player) else {
            return Err(GameRejection::NotAPlayer {
                player: player.clone(),
            });
        };
        self.players.remove(position);
        Ok(())
    }

    fn status(&self) -> GameStatus {
        GameStatus {
            ready: self.rules.admits(self.players.len()),
            started: self.started,
            players: self.players.clone(),
            inputs_handled: self.inputs.values().sum(),
        }
    }

    fn start_if_ready(&mut self) -> bool {
        if self.started || !self.rules.admits(self.players.len()) {
            return false;
        }
        self.started = true;
        true
    }

    fn handle_input(&mut self, player: &PlayerId, _input: GameInput) {
        if !self.started || !self.players.contains(player) {
            tracing::trace!("Ignoring input from {}", player);
            return;
        }
        *self.inputs.entry(player.clone()).or_default() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn duel() -> TableGame {
        TableGame::new(TableRules::new(2, 2))
    }

    #[test]
    fn test_ready_once_seats_are_filled() {
        let mut game = duel();
        game.add_player("alice".into()).unwrap();
        assert!(!game.status().ready);

        game.add_player("bob".into()).unwrap();
        let status = game.status();
        assert!(status.ready);
        assert!(!status.started);
        assert_eq!(status.players, vec![PlayerId::from("alice"), PlayerId::from("bob")]);
    }

    #[test]
    fn test_membership_rejections() {
        let mut game = duel();
        game.add_player("alice".into()).unwrap();

        assert_eq!(
            game.add_player("alice".into()),
            Err(GameRejection::AlreadyJoined { player: "alice".into() })
        );

        game.add_player("bob".into()).unwrap();
        assert_eq!(
            game.add_player("carol".into()),
            Err(GameRejection::GameFull { max_players: 2 })
        );
        assert_eq!(
            game.remove_player(&"carol".into()),
            Err(GameRejection::NotAPlayer { player: "carol".into() })
        );
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut game = duel();
        assert!(!game.start_if_ready());

        game.add_player("alice".into()).unwrap();
        game.add_player("bob".into()).unwrap();
        assert!(game.start_if_ready());
        assert!(!game.start_if_ready());
        assert!(game.status().started);

        assert_eq!(game.add_player("carol".into()), Err(GameRejection::AlreadyStarted));
    }

    #[test]
    fn test_inputs_only_count_after_start_from_players() {
        let mut game = duel();
        game.add_player("alice".into()).unwrap();
        game.add_player("bob".into()).unwrap();

        game.handle_input(&"alice".into(), GameInput(json!({"move": "up"})));
        assert_eq!(game.status().inputs_handled, 0);

        game.start_if_ready();
        game.handle_input(&"alice".into(), GameInput(json!({"move": "up"})));
        game.handle_input(&"alice".into(), GameInput(json!({"move": "left"})));
        game.handle_input(&"mallory".into(), GameInput(json!({"move": "down"})));

        assert_eq!(game.inputs_from(&"alice".into()), 2);
        assert_eq!(game.inputs_from(&"mallory".into()), 0);
        assert_eq!(game.status().inputs_handled, 2);
    }

    #[test]
    fn test_leaving_below_minimum_clears_readiness() {
        let mut game = duel();
        game.add_player("alice".into()).unwrap();
        game.add_player("bob".into()).unwrap();
        game.remove_player(&"bob".into()).unwrap();
        assert!(!game.status().ready);
    }
}
