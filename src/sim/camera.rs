//! Follow camera derived from the hero's cells

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::Cell;

const POSITION_SMOOTHING: f32 = 0.1;
const SCALE_SMOOTHING: f32 = 0.05;
const MIN_SCALE: f32 = 0.1;
/// Shake below this is dropped
const SHAKE_THRESHOLD: f32 = 0.5;
const SHAKE_DECAY: f32 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pos: Vec2,
    /// World units to screen pixels
    pub scale: f32,
    /// Shake magnitude in world units
    pub shake: f32,
    /// Offset applied this frame
    pub shake_offset: Vec2,
}

/// Blend factor for per-frame smoothing `k` over `dt` frames
#[inline]
fn smoothing(k: f32, dt: f32) -> f32 {
    1.0 - (1.0 - k).powf(dt)
}

/// Zoom that keeps a hero of total mass `mass` comfortably in view
pub fn target_scale(mass: f32) -> f32 {
    (64.0 / (mass + 100.0)).min(1.0).powf(0.4).max(MIN_SCALE)
}

impl Camera {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            scale: 1.0,
            shake: 0.0,
            shake_offset: Vec2::ZERO,
        }
    }

    /// Position as seen by the renderer, shake included
    #[inline]
    pub fn view_pos(&self) -> Vec2 {
        self.pos + self.shake_offset
    }

    /// Add shake, keeping the larger of the two
    pub fn add_shake(&mut self, amount: f32) {
        self.shake = self.shake.max(amount);
    }

    /// Smoothly track the mass-weighted centroid of `hero` cells.
    ///
    /// With no hero cells the camera holds its position and zoom.
    pub fn update<'a, R: Rng>(&mut self, hero: impl Iterator<Item = &'a Cell>, dt: f32, rng: &mut R) {
        let (weighted, mass) = hero.fold((Vec2::ZERO, 0.0), |(sum, m), cell| {
            (sum + cell.body.pos * cell.mass(), m + cell.mass())
        });

        if mass > 0.0 {
            let centroid = weighted / mass;
            self.pos = self.pos.lerp(centroid, smoothing(POSITION_SMOOTHING, dt));
            self.scale += (target_scale(mass) - self.scale) * smoothing(SCALE_SMOOTHING, dt);
        }

        if self.shake > SHAKE_THRESHOLD {
            self.shake_offset = Vec2::new(
                rng.random::<f32>() - 0.5,
                rng.random::<f32>() - 0.5,
            ) * self.shake;
            self.shake *= SHAKE_DECAY.powf(dt);
        } else {
            self.shake = 0.0;
            self.shake_offset = Vec2::ZERO;
        }
    }
}
