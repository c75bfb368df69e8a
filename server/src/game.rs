use log::{debug, info};
use shared::{advance, reduce, Event, StateError, WorldState};

/// The authoritative world held by the host.
///
/// Owned by the network loop; every event and tick goes through here one
/// at a time.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub tick: u64,
    world: WorldState,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Reduces `event` against the current snapshot and adopts the result.
    ///
    /// On error the snapshot is kept as it was.
    pub fn apply(&mut self, event: &Event) -> Result<(), StateError> {
        self.world = reduce(&self.world, event)?;

        match event {
            Event::Join { name } => {
                info!("Added player {} ({} in town)", name, self.world.len())
            }
            Event::Leave { name } => {
                info!("Removed player {} ({} in town)", name, self.world.len())
            }
            other => debug!(
                "Applied {} for {}",
                other.kind(),
                other.participant().unwrap_or("everyone")
            ),
        }
        Ok(())
    }

    /// Moves the world forward by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.world = advance(&self.world, dt);
        self.tick += 1;
    }

    /// Full-snapshot event used to bring viewers up to date.
    pub fn sync_event(&self) -> Event {
        Event::Sync(self.world.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::{Gesture, Vector2, SPAWN_X, SPAWN_Y};

    fn join(game: &mut GameState, name: &str) {
        game.apply(&Event::Join {
            name: name.to_string(),
        })
        .unwrap();
    }

    #[test]
    fn test_join_then_move_scenario() {
        let mut game = GameState::new();
        join(&mut game, "Kai");

        let kai = game.world().get("Kai").unwrap();
        assert_eq!(kai.position, Vector2::new(SPAWN_X, SPAWN_Y));

        game.apply(&Event::SetTarget {
            name: "Kai".to_string(),
            x: 500.0,
            y: 300.0,
        })
        .unwrap();
        let kai = game.world().get("Kai").unwrap();
        assert_eq!(kai.target, Vector2::new(500.0, 300.0));
        assert_eq!(kai.gesture, Gesture::None);

        game.update(1.0);
        let kai = game.world().get("Kai").unwrap();
        assert_approx_eq!(kai.position.x, SPAWN_X + 100.0, 0.001);
        assert_eq!(kai.position.y, 300.0);
        assert_eq!(game.tick, 1);
    }

    #[test]
    fn test_failed_event_keeps_snapshot() {
        let mut game = GameState::new();
        join(&mut game, "Amy");
        let before = game.world().clone();

        let result = game.apply(&Event::Join {
            name: "Amy".to_string(),
        });

        assert_eq!(
            result,
            Err(StateError::DuplicateParticipant("Amy".to_string()))
        );
        assert_eq!(game.world(), &before);
        assert_eq!(game.world().len(), 1);
    }

    #[test]
    fn test_tick_dismisses_chat_on_host() {
        let mut game = GameState::new();
        join(&mut game, "Kai");
        game.apply(&Event::SendChat {
            name: "Kai".to_string(),
            message: "Hi!".to_string(),
        })
        .unwrap();

        for _ in 0..10 {
            game.update(0.5);
        }
        assert_eq!(game.world().get("Kai").unwrap().chat_message, None);
        assert_eq!(game.tick, 10);
    }

    #[test]
    fn test_sync_event_carries_snapshot() {
        let mut game = GameState::new();
        join(&mut game, "Kai");
        join(&mut game, "Amy");

        match game.sync_event() {
            Event::Sync(snapshot) => assert_eq!(&snapshot, game.world()),
            other => panic!("Expected sync, got {}", other.kind()),
        }
    }
}
