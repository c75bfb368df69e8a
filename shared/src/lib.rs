//! # Shared world model
//!
//! Types and pure functions used by both the host server and the viewer
//! client. The host holds the authoritative [`WorldState`]; every viewer
//! keeps a local copy of the same value and runs the same functions over it.
//!
//! Two functions are the whole update model:
//!
//! - [`reduce`] applies one discrete [`Event`] (join, leave, move, chat,
//!   gesture, full sync) and returns the next state or a [`StateError`].
//! - [`advance`] moves time forward: positions walk toward their targets,
//!   the two-frame animation flips, and chat bubbles expire.
//!
//! Both take the previous state by reference and return a fresh value, so a
//! snapshot handed to a caller is never modified afterwards.

pub mod actions;
pub mod error;
pub mod event;
pub mod player;
pub mod protocol;
pub mod simulation;
pub mod state;

pub use error::StateError;
pub use event::{reduce, Event};
pub use player::{Direction, Gesture, Player, Vector2};
pub use protocol::Packet;
pub use simulation::{advance, advance_player};
pub use state::WorldState;

/// Speed of avatar movement along each axis (units per second).
pub const MOVE_SPEED: f32 = 100.0;
/// Time a chat bubble stays up before it is dismissed (seconds).
pub const CHAT_DISMISS_TIME: f32 = 5.0;
/// Time between the two animation frames of a sprite (seconds).
pub const ANIMATION_ALT_TIME: f32 = 0.08;

pub const GAME_WIDTH: f32 = 800.0;
pub const GAME_HEIGHT: f32 = 600.0;
/// Source size of one cell in the sprite sheet.
pub const SRC_SPRITE_SIZE: f32 = 135.0;
/// Size an avatar is drawn at.
pub const DSP_SPRITE_SIZE: f32 = 128.0;

/// Spawn coordinates: an avatar placed here is centred in the scene.
pub const SPAWN_X: f32 = (GAME_WIDTH - DSP_SPRITE_SIZE) / 2.0;
pub const SPAWN_Y: f32 = (GAME_HEIGHT - DSP_SPRITE_SIZE) / 2.0;

/// Protocol version sent by clients in their join request.
pub const CLIENT_VERSION: u32 = 1;
/// Longest participant name the host accepts, in characters.
pub const MAX_NAME_LEN: usize = 24;
/// Longest chat message the host relays, in characters.
pub const MAX_CHAT_LEN: usize = 120;
/// Most participants a host admits at once. A snapshot of this many players
/// with the longest names and chats still fits in one datagram.
pub const MAX_PLAYERS: usize = 64;
/// Largest UDP payload. Every receive buffer is this big.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;
