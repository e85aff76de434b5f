//! Test helpers for building small, controlled worlds

use glam::Vec2;

use super::entity::{Body, Cell, Owner};
use super::state::World;
use crate::config::GameConfig;
use crate::tuning::Tuning;

/// Tuning with no initial population and no portal spawns
pub fn bare_tuning() -> Tuning {
    Tuning {
        bot_count: 0,
        trash_count: 0,
        virus_count: 0,
        portal_window_ms: 0.0,
        ..Default::default()
    }
}

/// World holding only the hero
pub fn bare_world(seed: u64) -> World {
    World::new(&GameConfig::default(), bare_tuning(), seed)
}

/// Place the hero's first cell at `pos` with `mass` and no spawn protection
pub fn place_hero(world: &mut World, pos: Vec2, mass: f32) {
    let hero = world
        .cells
        .iter_mut()
        .find(|c| c.owner.is_hero())
        .expect("world has a hero");
    hero.body.pos = pos;
    hero.body.set_mass(mass);
    hero.invincible_until = None;
}

/// Add a cell for `owner` and return its id
pub fn add_cell(world: &mut World, owner: Owner, pos: Vec2, mass: f32) -> u32 {
    let id = world.next_entity_id();
    let body = Body::massive(id, pos, mass, crate::color::WHITE);
    world
        .cells
        .push(Cell::new(body, owner, format!("{owner:?}"), "🤖".into(), world.clock_ms));
    id
}

pub fn cell(world: &World, id: u32) -> Option<&Cell> {
    world.cells.iter().find(|c| c.body.id == id)
}
