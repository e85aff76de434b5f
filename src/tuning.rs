//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives in [`Tuning`]. Defaults
//! come from [`crate::consts`]; a JSON document may override any subset.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors loading a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning value `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Spawn weighting for one trash kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrashWeight {
    pub kind: crate::sim::TrashKind,
    pub probability: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub world_size: f32,
    pub trash_count: usize,
    pub bot_count: usize,
    /// Bots respawn one at a time while fewer than `bot_count - bot_respawn_slack` remain
    pub bot_respawn_slack: usize,
    pub virus_count: usize,
    /// Trash kinds in draw order; the first entry is the fallback
    pub trash_weights: Vec<TrashWeight>,

    // === Cells ===
    pub base_mass: f32,
    pub max_cell_mass: f32,
    pub max_cells_per_player: usize,
    pub base_speed: f32,
    pub speed_exponent: f32,
    pub inertia: f32,
    pub decay_rate: f32,
    /// Pointer distance (px) at which the hero reaches full speed
    pub hero_throttle_distance: f32,
    pub hero_invincibility_ms: f64,
    pub bot_extra_mass: f32,

    // === Split / eject ===
    pub min_mass_split: f32,
    pub min_mass_eject: f32,
    pub eject_mass: f32,
    pub eject_cost: f32,
    pub eject_speed: f32,
    pub eject_friction: f32,
    pub eject_self_immunity_ms: f64,
    pub merge_cooldown_ms: f64,
    pub split_dash: f32,
    pub dash_decay: f32,
    /// Fraction of the overlap each sibling is pushed per frame
    pub sibling_push: f32,

    // === Interactions ===
    /// Predator mass must exceed prey mass times this
    pub predation_margin: f32,
    /// Cell mass must exceed virus mass times this to burst it
    pub virus_margin: f32,
    pub virus_mass: f32,

    // === Portal ===
    pub portal_interval_ms: f64,
    pub portal_window_ms: f64,
    pub portal_radius: f32,
    pub portal_spawning_ms: f32,
    pub portal_open_ms: f32,
    pub portal_closing_ms: f32,
    /// Milliseconds a portal timer loses per elapsed frame
    pub portal_ms_per_frame: f32,

    // === Bots ===
    pub bot_turn_chance: f32,
    pub bot_boundary_margin: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        use crate::sim::TrashKind;
        Self {
            world_size: WORLD_SIZE,
            trash_count: TRASH_COUNT,
            bot_count: BOT_COUNT,
            bot_respawn_slack: 2,
            virus_count: VIRUS_COUNT,
            trash_weights: vec![
                TrashWeight { kind: TrashKind::Coin, probability: 0.80 },
                TrashWeight { kind: TrashKind::Banana, probability: 0.15 },
                TrashWeight { kind: TrashKind::Diamond, probability: 0.05 },
            ],

            base_mass: BASE_PLAYER_MASS,
            max_cell_mass: MAX_CELL_MASS,
            max_cells_per_player: MAX_CELLS_PER_PLAYER,
            base_speed: BASE_SPEED,
            speed_exponent: SPEED_EXPONENT,
            inertia: INERTIA,
            decay_rate: DECAY_RATE,
            hero_throttle_distance: 150.0,
            hero_invincibility_ms: 3000.0,
            bot_extra_mass: 50.0,

            min_mass_split: MIN_MASS_SPLIT,
            min_mass_eject: MIN_MASS_EJECT,
            eject_mass: EJECT_MASS,
            eject_cost: EJECT_COST,
            eject_speed: 40.0,
            eject_friction: 0.92,
            eject_self_immunity_ms: 300.0,
            merge_cooldown_ms: 15_000.0,
            split_dash: 30.0,
            dash_decay: 0.9,
            sibling_push: 0.1,

            predation_margin: 1.15,
            virus_margin: 1.15,
            virus_mass: VIRUS_MASS,

            portal_interval_ms: 30_000.0,
            portal_window_ms: 50.0,
            portal_radius: 100.0,
            portal_spawning_ms: 5000.0,
            portal_open_ms: 20_000.0,
            portal_closing_ms: 2000.0,
            portal_ms_per_frame: 16.0,

            bot_turn_chance: 0.02,
            bot_boundary_margin: 200.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would break simulation invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        let check = |field: &'static str, value: f64, ok: bool| {
            if ok { Ok(()) } else { Err(TuningError::OutOfRange { field, value }) }
        };
        check("world_size", self.world_size as f64, self.world_size > 0.0)?;
        check("base_mass", self.base_mass as f64, self.base_mass > 0.0)?;
        check(
            "max_cell_mass",
            self.max_cell_mass as f64,
            self.max_cell_mass >= self.base_mass,
        )?;
        check(
            "max_cells_per_player",
            self.max_cells_per_player as f64,
            self.max_cells_per_player >= 1,
        )?;
        check("inertia", self.inertia as f64, (0.0..1.0).contains(&self.inertia))?;
        check("decay_rate", self.decay_rate as f64, (0.0..=1.0).contains(&self.decay_rate))?;
        check(
            "eject_cost",
            self.eject_cost as f64,
            self.eject_cost >= 0.0 && self.eject_cost <= self.min_mass_eject,
        )?;
        check("predation_margin", self.predation_margin as f64, self.predation_margin >= 1.0)?;
        check("virus_margin", self.virus_margin as f64, self.virus_margin >= 1.0)?;
        check(
            "trash_weights",
            self.trash_weights.len() as f64,
            !self.trash_weights.is_empty(),
        )?;
        Ok(())
    }

    /// Minimum number of bot cells before a replacement spawns
    pub fn bot_floor(&self) -> usize {
        self.bot_count.saturating_sub(self.bot_respawn_slack)
    }

    /// Load the LocalStorage override (WASM only), falling back to defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten());

        match json.map(|j| Self::from_json(&j)) {
            Some(Ok(tuning)) => {
                log::info!("Loaded tuning override from LocalStorage");
                tuning
            }
            Some(Err(e)) => {
                log::warn!("Ignoring tuning override: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "trash_wars_tuning";

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
