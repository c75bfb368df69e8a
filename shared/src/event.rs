//! Discrete participant actions and the reducer that applies them.

use crate::error::StateError;
use crate::player::{Gesture, Player, Vector2};
use crate::state::WorldState;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named action together with its payload.
///
/// Every variant except [`Event::Sync`] names the participant it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Replace the whole state with the authoritative snapshot.
    Sync(WorldState),
    Join {
        name: String,
    },
    Leave {
        name: String,
    },
    SetTarget {
        name: String,
        x: f32,
        y: f32,
    },
    SendChat {
        name: String,
        message: String,
    },
    SetGesture {
        name: String,
        gesture: Gesture,
    },
}

impl Event {
    /// Name of the event kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Sync(_) => "sync",
            Event::Join { .. } => "join",
            Event::Leave { .. } => "leave",
            Event::SetTarget { .. } => "set_target",
            Event::SendChat { .. } => "send_chat",
            Event::SetGesture { .. } => "set_gesture",
        }
    }

    /// Participant the event applies to, `None` for a sync.
    pub fn participant(&self) -> Option<&str> {
        match self {
            Event::Sync(_) => None,
            Event::Join { name }
            | Event::Leave { name }
            | Event::SetTarget { name, .. }
            | Event::SendChat { name, .. }
            | Event::SetGesture { name, .. } => Some(name),
        }
    }
}

/// Applies one event to `state` and returns the resulting state.
///
/// `state` is never modified. On error nothing is produced and the caller
/// keeps using the state it passed in.
pub fn reduce(state: &WorldState, event: &Event) -> Result<WorldState, StateError> {
    match event {
        Event::Sync(snapshot) => {
            // Names stay unique even for snapshots decoded off the wire.
            let mut seen = HashSet::new();
            if let Some(name) = snapshot.names().find(|name| !seen.insert(*name)) {
                return Err(StateError::DuplicateParticipant(name.to_string()));
            }
            Ok(snapshot.clone())
        }

        Event::Join { name } => {
            if state.contains(name) {
                return Err(StateError::DuplicateParticipant(name.clone()));
            }
            let mut players = state.players().to_vec();
            players.push(Player::new(name.as_str()));
            Ok(WorldState::with_players(players))
        }

        Event::Leave { name } => {
            let index = state
                .index_of(name)
                .ok_or_else(|| StateError::UnknownParticipant(name.clone()))?;
            let mut players = state.players().to_vec();
            players.remove(index);
            Ok(WorldState::with_players(players))
        }

        Event::SetTarget { name, x, y } => update_player(state, name, |player| {
            player.target = Vector2::new(*x, *y);
            player.gesture = Gesture::None;
        }),

        Event::SendChat { name, message } => update_player(state, name, |player| {
            player.chat_message = Some(message.clone());
            player.chat_age = 0.0;
        }),

        Event::SetGesture { name, gesture } => {
            if !state.contains(name) {
                return Err(StateError::UnknownParticipant(name.clone()));
            }
            if !gesture.is_selectable() {
                return Err(StateError::InvalidGesture(gesture.label().to_string()));
            }
            update_player(state, name, |player| player.gesture = *gesture)
        }
    }
}

fn update_player<F>(state: &WorldState, name: &str, apply: F) -> Result<WorldState, StateError>
where
    F: FnOnce(&mut Player),
{
    let index = state
        .index_of(name)
        .ok_or_else(|| StateError::UnknownParticipant(name.to_string()))?;
    let mut players = state.players().to_vec();
    apply(&mut players[index]);
    Ok(WorldState::with_players(players))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Direction;
    use crate::{SPAWN_X, SPAWN_Y};

    fn join(state: &WorldState, name: &str) -> WorldState {
        reduce(
            state,
            &Event::Join {
                name: name.to_string(),
            },
        )
        .unwrap()
    }

    fn populated() -> WorldState {
        let state = join(&WorldState::new(), "Kai");
        let state = join(&state, "Amy");
        join(&state, "Bo")
    }

    #[test]
    fn test_join_adds_player_at_spawn() {
        let state = populated();
        let next = join(&state, "Zed");

        assert_eq!(next.len(), state.len() + 1);
        let zed = next.get("Zed").unwrap();
        assert_eq!(zed.position, Vector2::new(SPAWN_X, SPAWN_Y));
        assert_eq!(zed.target, Vector2::new(SPAWN_X, SPAWN_Y));
        assert_eq!(zed.walk_direction, Direction::None);
        assert_eq!(zed.gesture, Gesture::None);
        assert_eq!(zed.chat_message, None);
        assert_eq!(next.names().last(), Some("Zed"));
    }

    #[test]
    fn test_duplicate_join_is_rejected() {
        let state = join(&WorldState::new(), "Amy");
        let result = reduce(
            &state,
            &Event::Join {
                name: "Amy".to_string(),
            },
        );

        assert_eq!(
            result,
            Err(StateError::DuplicateParticipant("Amy".to_string()))
        );
        assert_eq!(state.names().filter(|n| *n == "Amy").count(), 1);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_leave_removes_only_that_player() {
        let state = populated();
        let next = reduce(
            &state,
            &Event::Leave {
                name: "Amy".to_string(),
            },
        )
        .unwrap();

        assert_eq!(next.names().collect::<Vec<_>>(), vec!["Kai", "Bo"]);
        assert_eq!(next.get("Kai"), state.get("Kai"));
        assert_eq!(next.get("Bo"), state.get("Bo"));
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_events_on_absent_player_fail() {
        let state = populated();
        let events = vec![
            Event::Leave {
                name: "Ghost".to_string(),
            },
            Event::SetTarget {
                name: "Ghost".to_string(),
                x: 1.0,
                y: 2.0,
            },
            Event::SendChat {
                name: "Ghost".to_string(),
                message: "Hi!".to_string(),
            },
            Event::SetGesture {
                name: "Ghost".to_string(),
                gesture: Gesture::Dab,
            },
        ];

        for event in events {
            assert_eq!(
                reduce(&state, &event),
                Err(StateError::UnknownParticipant("Ghost".to_string())),
                "{} should fail",
                event.kind()
            );
        }
    }

    #[test]
    fn test_set_target_clears_gesture() {
        let state = join(&WorldState::new(), "Kai");
        let state = reduce(
            &state,
            &Event::SetGesture {
                name: "Kai".to_string(),
                gesture: Gesture::Sleep,
            },
        )
        .unwrap();
        assert_eq!(state.get("Kai").unwrap().gesture, Gesture::Sleep);

        let state = reduce(
            &state,
            &Event::SetTarget {
                name: "Kai".to_string(),
                x: 0.0,
                y: 0.0,
            },
        )
        .unwrap();

        let kai = state.get("Kai").unwrap();
        assert_eq!(kai.gesture, Gesture::None);
        assert_eq!(kai.target, Vector2::new(0.0, 0.0));
        assert_eq!(kai.position, Vector2::new(SPAWN_X, SPAWN_Y));
    }

    #[test]
    fn test_gesture_keeps_movement_target() {
        let state = join(&WorldState::new(), "Kai");
        let state = reduce(
            &state,
            &Event::SetTarget {
                name: "Kai".to_string(),
                x: 500.0,
                y: 300.0,
            },
        )
        .unwrap();
        let state = reduce(
            &state,
            &Event::SetGesture {
                name: "Kai".to_string(),
                gesture: Gesture::Wave,
            },
        )
        .unwrap();

        let kai = state.get("Kai").unwrap();
        assert_eq!(kai.gesture, Gesture::Wave);
        assert_eq!(kai.target, Vector2::new(500.0, 300.0));
    }

    #[test]
    fn test_resting_gesture_is_invalid() {
        let state = join(&WorldState::new(), "Kai");
        let result = reduce(
            &state,
            &Event::SetGesture {
                name: "Kai".to_string(),
                gesture: Gesture::None,
            },
        );
        assert!(matches!(result, Err(StateError::InvalidGesture(_))));
    }

    #[test]
    fn test_chat_resets_age_and_keeps_gesture() {
        let state = join(&WorldState::new(), "Kai");
        let state = reduce(
            &state,
            &Event::SetGesture {
                name: "Kai".to_string(),
                gesture: Gesture::Cheer,
            },
        )
        .unwrap();
        let mut state = reduce(
            &state,
            &Event::SendChat {
                name: "Kai".to_string(),
                message: "Hi!".to_string(),
            },
        )
        .unwrap();
        state = crate::advance(&state, 1.5);
        assert_eq!(state.get("Kai").unwrap().chat_age, 1.5);

        let state = reduce(
            &state,
            &Event::SendChat {
                name: "Kai".to_string(),
                message: "Big mood".to_string(),
            },
        )
        .unwrap();

        let kai = state.get("Kai").unwrap();
        assert_eq!(kai.chat_message.as_deref(), Some("Big mood"));
        assert_eq!(kai.chat_age, 0.0);
        assert_eq!(kai.gesture, Gesture::Cheer);
    }

    #[test]
    fn test_sync_replaces_state() {
        let local = populated();
        let authoritative = join(&WorldState::new(), "Host");

        let next = reduce(&local, &Event::Sync(authoritative.clone())).unwrap();
        assert_eq!(next, authoritative);
        assert_eq!(local.len(), 3);
    }

    #[test]
    fn test_sync_with_duplicate_names_is_rejected() {
        let local = join(&WorldState::new(), "Kai");
        let doubled = WorldState::with_players(vec![
            Player::new("Kai"),
            Player::new("Amy"),
            Player::new("Kai"),
        ]);

        assert_eq!(
            reduce(&local, &Event::Sync(doubled)),
            Err(StateError::DuplicateParticipant("Kai".to_string()))
        );
        assert_eq!(local.names().collect::<Vec<_>>(), vec!["Kai"]);
    }

    #[test]
    fn test_event_metadata() {
        let event = Event::SetGesture {
            name: "Kai".to_string(),
            gesture: Gesture::Dab,
        };
        assert_eq!(event.kind(), "set_gesture");
        assert_eq!(event.participant(), Some("Kai"));
        assert_eq!(Event::Sync(WorldState::new()).participant(), None);
    }
}
