//! Continuous simulation between events.

use crate::player::{Direction, Player, Vector2};
use crate::state::WorldState;
use crate::{ANIMATION_ALT_TIME, CHAT_DISMISS_TIME, MOVE_SPEED};

/// Advances every player by `dt` seconds.
///
/// Safe to call once per frame with a measured, variable `dt`. A `dt` of
/// zero returns an identical state; negative or non-finite values are
/// treated as zero.
pub fn advance(state: &WorldState, dt: f32) -> WorldState {
    if !dt.is_finite() || dt <= 0.0 {
        return state.clone();
    }

    let players = state
        .players()
        .iter()
        .map(|player| advance_player(player, dt))
        .collect();
    WorldState::with_players(players)
}

/// Moves a single player toward its target, steps its animation and ages
/// its chat bubble.
pub fn advance_player(player: &Player, dt: f32) -> Player {
    let mut next = player.clone();
    if !dt.is_finite() || dt <= 0.0 {
        return next;
    }

    if player.is_moving() {
        let max_move = dt * MOVE_SPEED;
        let remaining = player.position.delta_to(&player.target);
        let step = Vector2::new(
            remaining.x.clamp(-max_move, max_move),
            remaining.y.clamp(-max_move, max_move),
        );

        // Land exactly on the target once it is within reach.
        next.position = Vector2::new(
            if remaining.x.abs() <= max_move {
                player.target.x
            } else {
                player.position.x + step.x
            },
            if remaining.y.abs() <= max_move {
                player.target.y
            } else {
                player.position.y + step.y
            },
        );

        if let Some(direction) = walk_direction(step) {
            next.walk_direction = direction;
        }
    } else {
        next.walk_direction = Direction::None;
    }

    if player.animation_phase + dt > ANIMATION_ALT_TIME {
        next.animation_phase = 0.0;
        next.animation_alt = !player.animation_alt;
    } else {
        next.animation_phase = player.animation_phase + dt;
    }

    if player.chat_message.is_some() {
        let age = player.chat_age + dt;
        if age >= CHAT_DISMISS_TIME {
            next.chat_message = None;
            next.chat_age = 0.0;
        } else {
            next.chat_age = age;
        }
    }

    next
}

/// Facing for a movement step. Horizontal wins when both axes moved equally.
/// Returns `None` when the step did not move at all.
fn walk_direction(step: Vector2) -> Option<Direction> {
    let horizontal = step.x.abs() >= step.y.abs();

    if step.x > 0.0 && horizontal {
        Some(Direction::Right)
    } else if step.x < 0.0 && horizontal {
        Some(Direction::Left)
    } else if step.y > 0.0 && !horizontal {
        Some(Direction::Forward)
    } else if step.y < 0.0 && !horizontal {
        Some(Direction::Backward)
    } else {
        None
    }
}
