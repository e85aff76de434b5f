//! Trash Wars - a cell-eating arena arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, interactions, spawning, camera)
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser input capture and frame timing
//! - `session`: Frame loop state (world + input + effects + callbacks)
//! - `tuning`: Data-driven game balance

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod color;
pub mod config;
pub mod effects;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod sound;
pub mod tuning;

pub use config::{ConfigError, GameConfig};
pub use session::{Session, SessionHooks};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Reference frame duration; one "elapsed frame" of simulation time
    pub const FRAME_MS: f64 = 16.666;
    /// Largest elapsed-frame multiplier fed to a single step (tab suspend guard)
    pub const MAX_FRAME_MULTIPLIER: f32 = 3.0;

    /// World is a square of this side length
    pub const WORLD_SIZE: f32 = 3000.0;
    /// Starting mass of every cell and the floor that mass decays toward
    pub const BASE_PLAYER_MASS: f32 = 18.0;
    pub const MAX_CELL_MASS: f32 = 12000.0;
    pub const MAX_CELLS_PER_PLAYER: usize = 16;

    pub const VIRUS_MASS: f32 = 100.0;
    pub const VIRUS_COUNT: usize = 20;
    pub const EJECT_MASS: f32 = 12.0;
    pub const EJECT_COST: f32 = 14.0;
    pub const MIN_MASS_SPLIT: f32 = 36.0;
    pub const MIN_MASS_EJECT: f32 = 36.0;

    /// Speed scale; actual speed is `mass^SPEED_EXPONENT * BASE_SPEED`
    pub const BASE_SPEED: f32 = 24.0;
    pub const SPEED_EXPONENT: f32 = -0.43;
    /// Fraction of the previous velocity kept each frame (0 = instant turn)
    pub const INERTIA: f32 = 0.70;
    /// Per-frame mass multiplier while above base mass
    pub const DECAY_RATE: f32 = 0.9999;

    pub const TRASH_COUNT: usize = 300;
    pub const BOT_COUNT: usize = 8;
}

/// Radius of a circle holding `mass` (area proportional to mass)
#[inline]
pub fn mass_to_radius(mass: f32) -> f32 {
    (mass.max(0.0) * 120.0 / std::f32::consts::PI).sqrt()
}

/// Inverse of [`mass_to_radius`]
#[inline]
pub fn radius_to_mass(radius: f32) -> f32 {
    std::f32::consts::PI * radius * radius / 120.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base_mass_radius() {
        let r = mass_to_radius(consts::BASE_PLAYER_MASS);
        assert!((r - 26.221).abs() < 0.01, "radius was {r}");
    }

    #[test]
    fn test_negative_mass_has_zero_radius() {
        assert_eq!(mass_to_radius(-5.0), 0.0);
    }

    proptest! {
        #[test]
        fn mass_radius_roundtrip(mass in 0.01f32..20000.0) {
            let back = radius_to_mass(mass_to_radius(mass));
            prop_assert!((back - mass).abs() <= mass * 1e-4);
        }

        #[test]
        fn radius_is_strictly_increasing(a in 0.0f32..10000.0, delta in 0.5f32..100.0) {
            prop_assert!(mass_to_radius(a + delta) > mass_to_radius(a));
        }
    }
}
