//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and
//! deterministic:
//! - Elapsed-frame timestep supplied by the caller
//! - Seeded RNG owned by the world
//! - Stable interaction order (ascending mass, then entity ID)
//! - No rendering or platform dependencies

pub mod ai;
pub mod camera;
pub mod collision;
pub mod entity;
pub mod mechanics;
pub mod spawn;
pub mod state;
pub mod tick;

#[cfg(test)]
pub(crate) mod testing;

pub use camera::Camera;
pub use entity::{
    Body, Cell, EjectedMass, Owner, Particle, Portal, PortalState, TrashItem, TrashKind, Virus,
};
pub use state::{GameEvent, GamePhase, HeroProfile, LeaderboardEntry, World};
pub use tick::{StepOutcome, Termination, TickInput, step};
