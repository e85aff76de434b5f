//! Hero commands: split and eject
//!
//! Both act on every hero cell that meets the mass threshold and aim along
//! the pointer direction. Cells below the threshold are skipped silently.

use glam::Vec2;

use super::entity::{Body, EjectedMass, Owner};
use super::state::World;

/// Direction commands aim along; a zero pointer aims along +x
#[inline]
pub fn aim(pointer: Vec2) -> Vec2 {
    pointer.try_normalize().unwrap_or(Vec2::X)
}

/// Split every eligible hero cell in two. Returns the number of new cells.
pub fn split_hero(world: &mut World, pointer: Vec2) -> usize {
    let dir = aim(pointer);
    let now = world.clock_ms;
    let cap = world.tuning.max_cells_per_player;
    let mut count = world.owner_cell_count(Owner::Hero);
    let mut siblings = Vec::new();

    for i in 0..world.cells.len() {
        if count >= cap {
            break;
        }
        let cell = &mut world.cells[i];
        if !cell.owner.is_hero() || cell.mass() < world.tuning.min_mass_split {
            continue;
        }

        let half = cell.mass() / 2.0;
        cell.body.set_mass(half);
        cell.merge_at = now + world.tuning.merge_cooldown_ms;

        let mut sibling = cell.clone();
        sibling.body.pos = cell.body.pos + dir * cell.body.radius * 2.0;
        sibling.dash = Some(dir * world.tuning.split_dash);
        sibling.created_at = now;
        siblings.push(sibling);
        count += 1;
    }

    let spawned = siblings.len();
    for mut sibling in siblings {
        sibling.body.id = world.next_entity_id();
        world.cells.push(sibling);
    }
    if spawned > 0 {
        log::debug!("Hero split: {} new cells ({} total)", spawned, count);
    }
    spawned
}

/// Eject a blob of mass from every eligible hero cell. Returns the number
/// of blobs.
pub fn eject_hero(world: &mut World, pointer: Vec2) -> usize {
    let dir = aim(pointer);
    let now = world.clock_ms;
    let mut blobs = Vec::new();

    for cell in world.cells.iter_mut() {
        if !cell.owner.is_hero() || cell.mass() < world.tuning.min_mass_eject {
            continue;
        }
        cell.body.set_mass(cell.mass() - world.tuning.eject_cost);
        let pos = cell.body.pos + dir * cell.body.radius;
        blobs.push((pos, cell.body.color));
    }

    let spawned = blobs.len();
    for (pos, color) in blobs {
        let id = world.next_entity_id();
        world.ejected.push(EjectedMass {
            body: Body::massive(id, pos, world.tuning.eject_mass, color),
            vel: dir * world.tuning.eject_speed,
            owner: Owner::Hero,
            created_at: now,
        });
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mass_to_radius;
    use crate::sim::testing::{add_cell, bare_world, place_hero};
    use proptest::prelude::*;

    #[test]
    fn test_split_halves_mass() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(1500.0), 100.0);
        world.clock_ms = 1000.0;

        assert_eq!(split_hero(&mut world, Vec2::new(10.0, 0.0)), 1);
        let hero: Vec<_> = world.hero_cells().collect();
        assert_eq!(hero.len(), 2);
        for cell in &hero {
            assert_eq!(cell.mass(), 50.0);
            assert_eq!(cell.merge_at, 16000.0);
        }
        let sibling = hero[1];
        let expected_x = 1500.0 + mass_to_radius(50.0) * 2.0;
        assert!((sibling.body.pos.x - expected_x).abs() < 1e-3);
        assert_eq!(sibling.dash, Some(Vec2::new(30.0, 0.0)));
        assert_ne!(hero[0].body.id, sibling.body.id);
    }

    #[test]
    fn test_split_below_threshold_is_noop() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(1500.0), 35.9);
        assert_eq!(split_hero(&mut world, Vec2::X), 0);
        assert_eq!(world.hero_cells().count(), 1);
        assert_eq!(world.hero_mass(), 35.9);
    }

    #[test]
    fn test_split_respects_cap() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(500.0), 100.0);
        for i in 0..15 {
            add_cell(&mut world, Owner::Hero, Vec2::new(600.0 + i as f32 * 100.0, 500.0), 100.0);
        }
        let before = world.hero_mass();
        assert_eq!(split_hero(&mut world, Vec2::X), 0);
        assert_eq!(world.hero_cells().count(), 16);
        assert_eq!(world.hero_mass(), before);
    }

    #[test]
    fn test_split_stops_at_cap() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(500.0), 100.0);
        for i in 0..13 {
            add_cell(&mut world, Owner::Hero, Vec2::new(600.0 + i as f32 * 100.0, 500.0), 100.0);
        }
        assert_eq!(split_hero(&mut world, Vec2::X), 2);
        assert_eq!(world.hero_cells().count(), 16);
    }

    #[test]
    fn test_eject_spawns_blob() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(1500.0), 50.0);
        assert_eq!(eject_hero(&mut world, Vec2::new(0.0, -5.0)), 1);

        assert_eq!(world.hero_mass(), 36.0);
        let blob = &world.ejected[0];
        assert_eq!(blob.body.mass, 12.0);
        assert_eq!(blob.vel, Vec2::new(0.0, -40.0));
        assert_eq!(blob.owner, Owner::Hero);
        assert!((blob.body.pos.y - (1500.0 - mass_to_radius(36.0))).abs() < 1e-3);
    }

    #[test]
    fn test_eject_below_threshold_is_noop() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(1500.0), 20.0);
        assert_eq!(eject_hero(&mut world, Vec2::X), 0);
        assert!(world.ejected.is_empty());
        assert_eq!(world.hero_mass(), 20.0);
    }

    #[test]
    fn test_bot_cells_never_split() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(100.0), 18.0);
        add_cell(&mut world, Owner::Bot(0), Vec2::splat(900.0), 200.0);
        assert_eq!(split_hero(&mut world, Vec2::X), 0);
        assert_eq!(eject_hero(&mut world, Vec2::X), 0);
        assert_eq!(world.cells.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_split_conserves_mass(
            masses in proptest::collection::vec(18.0f32..2000.0, 1..16),
            angle in 0.0f32..std::f32::consts::TAU,
        ) {
            let mut world = bare_world(5);
            place_hero(&mut world, Vec2::splat(200.0), masses[0]);
            for (i, &mass) in masses.iter().enumerate().skip(1) {
                add_cell(&mut world, Owner::Hero, Vec2::new(200.0 + i as f32 * 150.0, 1500.0), mass);
            }
            let before_mass = world.hero_mass();
            let before_count = world.hero_cells().count();

            let spawned = split_hero(&mut world, Vec2::from_angle(angle));
            let after_count = world.hero_cells().count();

            prop_assert_eq!(after_count, before_count + spawned);
            prop_assert!(after_count <= 16);
            prop_assert!((world.hero_mass() - before_mass).abs() <= before_mass * 1e-5);
        }
    }
}
