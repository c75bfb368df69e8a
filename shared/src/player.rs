use crate::error::StateError;
use crate::{SPAWN_X, SPAWN_Y};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

///Represents a point in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vector2 {
    ///Value along the x-axis.
    /// Positive direction is to the right.
    pub x: f32,
    ///Value along the y-axis.
    /// Positive direction is down the screen.
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Vector2 { x, y }
    }

    ///Returns the per-axis offset from `self` to `other`.
    pub fn delta_to(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: other.x - self.x,
            y: other.y - self.y,
        }
    }

    ///Returns the sum of two vectors.
    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

/// Facing of a walking avatar, picked from the dominant axis of movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Direction {
    #[default]
    None,
    /// Toward the viewer (down the screen).
    Forward,
    /// Away from the viewer (up the screen).
    Backward,
    Left,
    Right,
}

impl Direction {
    /// Column of this facing in the sprite sheet.
    pub fn sprite_column(self) -> usize {
        match self {
            Direction::None => 0,
            Direction::Left => 1,
            Direction::Right => 2,
            Direction::Forward => 3,
            Direction::Backward => 4,
        }
    }
}

/// Expressive action an avatar can perform.
///
/// `None` is the resting value; every other variant can be selected from the
/// toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Gesture {
    #[default]
    None,
    VeryHappy,
    Dab,
    Cheer,
    Wave,
    Sleep,
}

impl Gesture {
    /// Gestures a participant may select, in toolbar order.
    pub const SELECTABLE: [Gesture; 5] = [
        Gesture::VeryHappy,
        Gesture::Dab,
        Gesture::Cheer,
        Gesture::Wave,
        Gesture::Sleep,
    ];

    pub fn is_selectable(self) -> bool {
        self != Gesture::None
    }

    /// Human readable label shown in the toolbar.
    pub fn label(self) -> &'static str {
        match self {
            Gesture::None => "None",
            Gesture::VeryHappy => "Very Happy",
            Gesture::Dab => "Dab",
            Gesture::Cheer => "Cheer Leader",
            Gesture::Wave => "Wave",
            Gesture::Sleep => "Sleep",
        }
    }

    /// Column of this gesture in the sprite sheet, after the walking frames.
    pub fn sprite_column(self) -> Option<usize> {
        Gesture::SELECTABLE
            .iter()
            .position(|g| *g == self)
            .map(|i| i + 5)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gesture {
    type Err = StateError;

    /// Parses a toolbar label or variant name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Gesture::SELECTABLE
            .iter()
            .copied()
            .find(|g| {
                g.label().eq_ignore_ascii_case(wanted)
                    || format!("{:?}", g).eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| StateError::InvalidGesture(wanted.to_string()))
    }
}

/// One connected avatar and everything needed to draw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub position: Vector2,
    pub target: Vector2,
    pub walk_direction: Direction,
    pub gesture: Gesture,
    /// Time since the animation frame last flipped.
    pub animation_phase: f32,
    pub animation_alt: bool,
    pub chat_message: Option<String>,
    /// Time since `chat_message` was set.
    pub chat_age: f32,
}

impl Player {
    /// Creates a resting player at the spawn point.
    pub fn new(name: impl Into<String>) -> Self {
        let spawn = Vector2::new(SPAWN_X, SPAWN_Y);
        Self {
            name: name.into(),
            position: spawn,
            target: spawn,
            walk_direction: Direction::None,
            gesture: Gesture::None,
            animation_phase: 0.0,
            animation_alt: false,
            chat_message: None,
            chat_age: 0.0,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.position != self.target
    }

    /// Sprite sheet cell `(column, row)` for the current pose.
    pub fn sprite_cell(&self) -> (usize, usize) {
        let column = self
            .gesture
            .sprite_column()
            .unwrap_or_else(|| self.walk_direction.sprite_column());
        let row = if self.animation_alt { 1 } else { 0 };
        (column, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let player = Player::new("Kai");
        assert_eq!(player.name, "Kai");
        assert_eq!(player.position, Vector2::new(SPAWN_X, SPAWN_Y));
        assert_eq!(player.target, player.position);
        assert_eq!(player.walk_direction, Direction::None);
        assert_eq!(player.gesture, Gesture::None);
        assert_eq!(player.chat_message, None);
        assert_eq!(player.chat_age, 0.0);
        assert!(!player.animation_alt);
        assert!(!player.is_moving());
    }

    #[test]
    fn test_vector_delta() {
        let a = Vector2::new(10.0, 20.0);
        let b = Vector2::new(4.0, 50.0);
        assert_eq!(a.delta_to(&b), Vector2::new(-6.0, 30.0));
        assert_eq!(a.add(&a.delta_to(&b)), b);
    }

    #[test]
    fn test_gesture_parsing() {
        assert_eq!("Cheer Leader".parse::<Gesture>(), Ok(Gesture::Cheer));
        assert_eq!("very happy".parse::<Gesture>(), Ok(Gesture::VeryHappy));
        assert_eq!("Sleep".parse::<Gesture>(), Ok(Gesture::Sleep));
        assert_eq!("Dab".parse::<Gesture>(), Ok(Gesture::Dab));
        assert_eq!(
            "Moonwalk".parse::<Gesture>(),
            Err(StateError::InvalidGesture("Moonwalk".to_string()))
        );
        assert!("None".parse::<Gesture>().is_err());
    }

    #[test]
    fn test_selectable_gestures_exclude_none() {
        assert!(!Gesture::None.is_selectable());
        assert!(Gesture::SELECTABLE.iter().all(|g| g.is_selectable()));
        for gesture in Gesture::SELECTABLE {
            assert_eq!(gesture.label().parse::<Gesture>(), Ok(gesture));
        }
    }

    #[test]
    fn test_sprite_cell_prefers_gesture() {
        let mut player = Player::new("Kai");
        player.walk_direction = Direction::Left;
        assert_eq!(player.sprite_cell(), (1, 0));

        player.gesture = Gesture::Wave;
        player.animation_alt = true;
        assert_eq!(player.sprite_cell(), (8, 1));
    }
}
