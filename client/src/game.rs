use log::{debug, info, warn};
use shared::{advance, reduce, Event, Player, WorldState};

/// What a viewer did with one relayed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Accepted,
    /// Older than what the viewer already has, or arrived before the first
    /// snapshot.
    Stale,
    /// The local reducer refused it; the next snapshot will repair the copy.
    Rejected,
}

/// The viewer's local copy of the town.
///
/// Relayed events are reduced in host order and time is advanced every
/// frame, so avatars walk smoothly between host snapshots. A snapshot always
/// replaces whatever the viewer had.
#[derive(Debug, Clone, Default)]
pub struct ViewerState {
    world: WorldState,
    local_name: Option<String>,
    last_sequence: Option<u64>,
    rejected_events: u64,
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn players(&self) -> &[Player] {
        self.world.players()
    }

    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    pub fn set_local_name(&mut self, name: String) {
        info!("Playing as {}", name);
        self.local_name = Some(name);
    }

    pub fn local_player(&self) -> Option<&Player> {
        self.local_name
            .as_deref()
            .and_then(|name| self.world.get(name))
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    pub fn has_snapshot(&self) -> bool {
        self.last_sequence.is_some()
    }

    pub fn rejected_events(&self) -> u64 {
        self.rejected_events
    }

    /// Applies one event relayed by the host under `sequence`.
    pub fn apply_event(&mut self, sequence: u64, event: &Event) -> Applied {
        let fresh = match (event, self.last_sequence) {
            (Event::Sync(_), None) => true,
            (Event::Sync(_), Some(last)) => sequence >= last,
            (_, None) => false,
            (_, Some(last)) => sequence > last,
        };

        if !fresh {
            debug!("Skipping {} event #{}", event.kind(), sequence);
            return Applied::Stale;
        }

        // The sequence moves on even when the reducer refuses the event, so
        // the next snapshot is the only thing that can rewind it.
        self.last_sequence = Some(sequence);

        match reduce(&self.world, event) {
            Ok(next) => {
                self.world = next;
                Applied::Accepted
            }
            Err(e) => {
                warn!("Local copy refused event #{}: {}", sequence, e);
                self.rejected_events += 1;
                Applied::Rejected
            }
        }
    }

    /// Moves local time forward by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.world = advance(&self.world, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::{Gesture, SPAWN_X};

    fn join(name: &str) -> Event {
        Event::Join {
            name: name.to_string(),
        }
    }

    fn synced(players: &[&str], sequence: u64) -> ViewerState {
        let mut world = WorldState::new();
        for name in players {
            world = reduce(&world, &join(name)).unwrap();
        }
        let mut viewer = ViewerState::new();
        assert_eq!(
            viewer.apply_event(sequence, &Event::Sync(world)),
            Applied::Accepted
        );
        viewer
    }

    #[test]
    fn test_events_wait_for_first_snapshot() {
        let mut viewer = ViewerState::new();
        assert_eq!(viewer.apply_event(3, &join("Kai")), Applied::Stale);
        assert!(viewer.players().is_empty());
        assert!(!viewer.has_snapshot());
    }

    #[test]
    fn test_sync_replaces_local_copy() {
        let mut viewer = synced(&["Kai", "Mo"], 2);
        assert_eq!(viewer.players().len(), 2);
        assert_eq!(viewer.last_sequence(), Some(2));

        let replacement = reduce(&WorldState::new(), &join("Zed")).unwrap();
        assert_eq!(
            viewer.apply_event(2, &Event::Sync(replacement.clone())),
            Applied::Accepted
        );
        assert_eq!(viewer.world(), &replacement);
    }

    #[test]
    fn test_relayed_events_in_order() {
        let mut viewer = synced(&["Kai"], 1);

        let target = Event::SetTarget {
            name: "Kai".to_string(),
            x: 436.0,
            y: 236.0,
        };
        assert_eq!(viewer.apply_event(2, &target), Applied::Accepted);
        assert_eq!(viewer.apply_event(3, &join("Mo")), Applied::Accepted);
        assert_eq!(viewer.players().len(), 2);

        viewer.update(0.5);
        let kai = viewer.world().get("Kai").unwrap();
        assert_approx_eq!(kai.position.x, SPAWN_X + 50.0);
    }

    #[test]
    fn test_stale_events_are_skipped() {
        let mut viewer = synced(&["Kai"], 5);

        let gesture = Event::SetGesture {
            name: "Kai".to_string(),
            gesture: Gesture::Wave,
        };
        assert_eq!(viewer.apply_event(5, &gesture), Applied::Stale);
        assert_eq!(viewer.apply_event(4, &gesture), Applied::Stale);
        assert_eq!(viewer.world().get("Kai").unwrap().gesture, Gesture::None);

        let old_sync = Event::Sync(WorldState::new());
        assert_eq!(viewer.apply_event(4, &old_sync), Applied::Stale);
        assert_eq!(viewer.players().len(), 1);
    }

    #[test]
    fn test_refused_event_is_counted() {
        let mut viewer = synced(&["Kai"], 1);

        assert_eq!(viewer.apply_event(2, &join("Kai")), Applied::Rejected);
        assert_eq!(viewer.rejected_events(), 1);
        assert_eq!(viewer.players().len(), 1);
        assert_eq!(viewer.last_sequence(), Some(2));
    }

    #[test]
    fn test_local_player_lookup() {
        let mut viewer = synced(&["Kai", "Mo"], 2);
        assert!(viewer.local_player().is_none());

        viewer.set_local_name("Mo".to_string());
        assert_eq!(viewer.local_name(), Some("Mo"));
        assert_eq!(viewer.local_player().unwrap().name, "Mo");
    }

    #[test]
    fn test_chat_expires_locally() {
        let mut viewer = synced(&["Kai"], 1);
        let chat = Event::SendChat {
            name: "Kai".to_string(),
            message: "Hi!".to_string(),
        };
        viewer.apply_event(2, &chat);

        for _ in 0..5 {
            viewer.update(1.0);
        }
        assert_eq!(viewer.world().get("Kai").unwrap().chat_message, None);
    }
}
