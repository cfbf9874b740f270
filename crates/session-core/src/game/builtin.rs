//! Built-in game kinds

use std::collections::HashMap;

use super::{Game, GameFactory, TableGame, TableRules};
use crate::errors::RegistryError;
use crate::types::GameKind;

/// Factory for the table games shipped with arcade.
///
/// Defaults: `duel` seats exactly two players, `party` seats two to eight.
/// Further kinds can be registered with [`BuiltinGames::with_rules`].
#[derive(Debug, Clone)]
pub struct BuiltinGames {
    rules: HashMap<GameKind, TableRules>,
}

impl BuiltinGames {
    pub fn new() -> Self {
        let mut rules = HashMap::new();
        rules.insert(GameKind::from("duel"), TableRules::new(2, 2));
        rules.insert(GameKind::from("party"), TableRules::new(2, 8));
        Self { rules }
    }

    /// Register or override a kind
    pub fn with_rules(mut self, kind: impl Into<GameKind>, rules: TableRules) -> Self {
        self.rules.insert(kind.into(), rules);
        self
    }

    pub fn rules_for(&self, kind: &GameKind) -> Option<TableRules> {
        self.rules.get(kind).copied()
    }

    /// Known kinds, sorted
    pub fn kinds(&self) -> Vec<GameKind> {
        let mut kinds: Vec<_> = self.rules.keys().cloned().collect();
        kinds.sort();
        kinds
    }
}

impl Default for BuiltinGames {
    fn default() -> Self {
        Self::new()
    }
}

impl GameFactory for BuiltinGames {
    fn create(&self, kind: &GameKind) -> Result<Box<dyn Game>, RegistryError> {
        let rules = self
            .rules_for(kind)
            .ok_or_else(|| RegistryError::UnknownKind { kind: kind.clone() })?;
        Ok(Box::new(TableGame::new(rules)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_kinds() {
        let games = BuiltinGames::new();
        assert_eq!(games.kinds(), vec![GameKind::from("duel"), GameKind::from("party")]);
        assert_eq!(games.rules_for(&"party".into()), Some(TableRules::new(2, 8)));
    }

    #[test]
    fn test_unknown_kind_is_refused() {
        let games = BuiltinGames::new();
        let err = games.create(&"chess".into()).err().unwrap();
        assert_eq!(err, RegistryError::UnknownKind { kind: "chess".into() });
    }

    #[test]
    fn test_custom_rules_override() {
        let games = BuiltinGames::new().with_rules("duel", TableRules::new(1, 2));
        let mut game = games.create(&"duel".into()).unwrap();
        game.add_player("solo".into()).unwrap();
        assert!(game.status().ready);
    }
}
