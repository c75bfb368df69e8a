use crate::player::Player;
use serde::{Deserialize, Serialize};

/// Every participant in the space, in the order they joined.
///
/// Names are unique. The players are only reachable through shared
/// references; new states are produced by [`reduce`](crate::reduce) and
/// [`advance`](crate::advance).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldState {
    players: Vec<Player>,
}

impl WorldState {
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

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.players.iter().map(|p| p.name.as_str())
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }

    pub(crate) fn with_players(players: Vec<Player>) -> Self {
        Self { players }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state() {
        let state = WorldState::new();
        assert!(state.is_empty());
        assert_eq!(state.len(), 0);
        assert!(!state.contains("Kai"));
        assert!(state.get("Kai").is_none());
    }

    #[test]
    fn test_lookup_keeps_join_order() {
        let state = WorldState::with_players(vec![
            Player::new("Kai"),
            Player::new("Amy"),
            Player::new("Bo"),
        ]);

        assert_eq!(state.names().collect::<Vec<_>>(), vec!["Kai", "Amy", "Bo"]);
        assert_eq!(state.index_of("Amy"), Some(1));
        assert_eq!(state.get("Bo").map(|p| p.name.as_str()), Some("Bo"));
        assert!(state.contains("Kai"));
        assert!(!state.contains("kai"));
    }
}
