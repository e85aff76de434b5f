//! Bot steering
//!
//! Bots wander: a heading that occasionally jitters, turned back toward the
//! world centre whenever the cell strays near a boundary. There is no
//! targeting of trash or other cells.

use glam::Vec2;
use rand::Rng;

use super::entity::Cell;
use crate::tuning::Tuning;

/// Distance of the synthetic steering target from the cell
const STEER_REACH: f32 = 1000.0;

/// Update a bot cell's heading (stored in `body.rotation`) and return its
/// steering offset
pub fn steer<R: Rng>(cell: &mut Cell, tuning: &Tuning, rng: &mut R) -> Vec2 {
    if rng.random::<f32>() < tuning.bot_turn_chance {
        cell.body.rotation += rng.random::<f32>() - 0.5;
    }

    let pos = cell.body.pos;
    let margin = tuning.bot_boundary_margin;
    let far = tuning.world_size - margin;
    if pos.x < margin || pos.x > far || pos.y < margin || pos.y > far {
        let to_center = Vec2::splat(tuning.world_size / 2.0) - pos;
        if to_center != Vec2::ZERO {
            cell.body.rotation = to_center.y.atan2(to_center.x);
        }
    }

    Vec2::from_angle(cell.body.rotation) * STEER_REACH
}
