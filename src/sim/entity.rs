//! Entity records
//!
//! Passive data only: the step in `tick` reads and mutates these. Every
//! entity embeds a [`Body`] with the fields shared by all of them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::{self, Rgba};
use crate::mass_to_radius;

/// Shared base record: identity, placement and size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub color: Rgba,
    pub rotation: f32,
    pub mass: f32,
}

impl Body {
    /// Body whose radius follows its mass
    pub fn massive(id: u32, pos: Vec2, mass: f32, color: Rgba) -> Self {
        let mass = mass.max(0.0);
        Self {
            id,
            pos,
            radius: mass_to_radius(mass),
            color,
            rotation: 0.0,
            mass,
        }
    }

    /// Set mass (clamped at zero) and recompute the radius
    #[inline]
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass.max(0.0);
        self.radius = mass_to_radius(self.mass);
    }

    /// True when `point` lies strictly inside this body's circle
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance(point) < self.radius
    }
}

/// Logical identity controlling one or more cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Owner {
    Hero,
    Bot(u32),
}

impl Owner {
    #[inline]
    pub fn is_hero(self) -> bool {
        self == Owner::Hero
    }
}

/// One circular body belonging to an owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub body: Body,
    pub owner: Owner,
    pub vel: Vec2,
    pub name: String,
    /// Emoji or image reference
    pub skin: String,
    pub created_at: f64,
    /// Sim time (ms) after which this cell may merge with a sibling
    pub merge_at: f64,
    /// Sim time (ms) until which this cell cannot be eaten
    pub invincible_until: Option<f64>,
    /// Split recoil, added to velocity and decayed every frame
    pub dash: Option<Vec2>,
}

impl Cell {
    pub fn new(body: Body, owner: Owner, name: String, skin: String, now: f64) -> Self {
        Self {
            body,
            owner,
            vel: Vec2::ZERO,
            name,
            skin,
            created_at: now,
            merge_at: 0.0,
            invincible_until: None,
            dash: None,
        }
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.body.mass
    }

    #[inline]
    pub fn is_invincible(&self, now: f64) -> bool {
        self.invincible_until.is_some_and(|until| now <= until)
    }

    #[inline]
    pub fn can_merge(&self, now: f64) -> bool {
        now > self.merge_at
    }

    /// Add mass, clamped to `cap`
    pub fn gain(&mut self, amount: f32, cap: f32) {
        self.body.set_mass((self.body.mass + amount).min(cap));
    }
}

/// Trash kinds, cheapest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrashKind {
    Coin,
    Banana,
    Diamond,
}

impl TrashKind {
    /// Mass granted when eaten
    pub fn value(self) -> f32 {
        match self {
            TrashKind::Coin => 1.0,
            TrashKind::Banana => 5.0,
            TrashKind::Diamond => 20.0,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            TrashKind::Coin => 7.0,
            TrashKind::Banana => 10.0,
            TrashKind::Diamond => 14.0,
        }
    }

    pub fn color(self) -> Rgba {
        match self {
            TrashKind::Coin => color::GOLD,
            TrashKind::Banana => [1.0, 0.757, 0.027, 1.0],
            TrashKind::Diamond => [1.0, 0.627, 0.0, 1.0],
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            TrashKind::Coin => "🪙",
            TrashKind::Banana => "🍌",
            TrashKind::Diamond => "💎",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrashItem {
    pub body: Body,
    pub kind: TrashKind,
    pub value: f32,
    /// Phase offset for the idle pulse animation
    pub pulse_offset: f32,
}

impl TrashItem {
    pub fn new(id: u32, pos: Vec2, kind: TrashKind, rotation: f32, pulse_offset: f32) -> Self {
        Self {
            body: Body {
                id,
                pos,
                radius: kind.radius(),
                color: kind.color(),
                rotation,
                mass: kind.value(),
            },
            kind,
            value: kind.value(),
            pulse_offset,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Virus {
    pub body: Body,
    pub spikes: u32,
}

impl Virus {
    pub fn new(id: u32, pos: Vec2, mass: f32) -> Self {
        Self {
            body: Body::massive(id, pos, mass, color::VIRUS_GREEN),
            spikes: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EjectedMass {
    pub body: Body,
    pub vel: Vec2,
    pub owner: Owner,
    pub created_at: f64,
}

/// Extraction portal lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortalState {
    Spawning,
    Open,
    Closing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portal {
    pub body: Body,
    pub state: PortalState,
    /// Remaining time in the current state (ms)
    pub timer: f32,
    pub max_timer: f32,
}

impl Portal {
    pub fn new(id: u32, pos: Vec2, radius: f32, spawning_ms: f32) -> Self {
        Self {
            body: Body {
                id,
                pos,
                radius,
                color: color::PORTAL_PINK,
                rotation: 0.0,
                mass: 0.0,
            },
            state: PortalState::Spawning,
            timer: spawning_ms,
            max_timer: spawning_ms,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state == PortalState::Open
    }

    /// Fade factor: fades in while spawning, out while closing
    pub fn opacity(&self) -> f32 {
        if self.max_timer <= 0.0 {
            return 1.0;
        }
        let remaining = (self.timer / self.max_timer).clamp(0.0, 1.0);
        match self.state {
            PortalState::Spawning => 1.0 - remaining,
            PortalState::Open => 1.0,
            PortalState::Closing => remaining,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub body: Body,
    pub vel: Vec2,
    /// 1.0 at birth, removed at 0
    pub life: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_mass_recomputes_radius() {
        let mut body = Body::massive(1, Vec2::ZERO, 18.0, color::WHITE);
        body.set_mass(23.0);
        assert_eq!(body.radius, mass_to_radius(23.0));
        body.set_mass(-4.0);
        assert_eq!(body.mass, 0.0);
        assert_eq!(body.radius, 0.0);
    }

    #[test]
    fn test_gain_is_capped() {
        let body = Body::massive(1, Vec2::ZERO, 100.0, color::WHITE);
        let mut cell = Cell::new(body, Owner::Hero, "a".into(), "🦝".into(), 0.0);
        cell.gain(50.0, 120.0);
        assert_eq!(cell.mass(), 120.0);
    }

    #[test]
    fn test_invincibility_window() {
        let body = Body::massive(1, Vec2::ZERO, 18.0, color::WHITE);
        let mut cell = Cell::new(body, Owner::Bot(3), "b".into(), "🐀".into(), 0.0);
        assert!(!cell.is_invincible(0.0));
        cell.invincible_until = Some(3000.0);
        assert!(cell.is_invincible(2999.0));
        assert!(!cell.is_invincible(3000.5));
    }

    #[test]
    fn test_portal_opacity() {
        let mut portal = Portal::new(1, Vec2::ZERO, 100.0, 5000.0);
        assert_eq!(portal.opacity(), 0.0);
        portal.timer = 2500.0;
        assert!((portal.opacity() - 0.5).abs() < 1e-6);
        portal.state = PortalState::Open;
        assert_eq!(portal.opacity(), 1.0);
    }

    #[test]
    fn test_closing_portal_fades_out() {
        let mut portal = Portal::new(1, Vec2::ZERO, 100.0, 5000.0);
        portal.state = PortalState::Closing;
        portal.max_timer = 2000.0;
        portal.timer = 2000.0;
        assert_eq!(portal.opacity(), 1.0);
        portal.timer = 500.0;
        assert!((portal.opacity() - 0.25).abs() < 1e-6);
        portal.timer = 0.0;
        assert_eq!(portal.opacity(), 0.0);
    }
}
