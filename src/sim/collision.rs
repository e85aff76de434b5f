//! Interaction resolution
//!
//! Circle contact tests and the per-frame scan in which cells reach the
//! portal, pop viruses, eat trash and ejected mass, and eat or merge with
//! other cells. Cells are visited in ascending mass order. Removals are
//! collected while scanning and applied afterwards, so every entity is
//! consumed at most once and a consumed cell stops consuming.

use glam::Vec2;

use super::entity::Cell;
use super::state::{GameEvent, World};

/// Fallback separation axis for exactly coincident cells
const COINCIDENT_AXIS: Vec2 = Vec2::X;

/// Result of the interaction scan
#[derive(Debug, Default)]
pub struct Interactions {
    pub events: Vec<GameEvent>,
    /// Set when a hero cell reached an open portal; the scan stops there
    pub cash_out: Option<u32>,
}

/// Whether two circles overlap
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Whether `predator` may eat `prey` at time `now`.
///
/// The prey's centre must lie inside the predator, the predator must
/// outweigh the prey by `margin`, and the prey must not be invincible.
pub fn can_eat(predator: &Cell, prey: &Cell, margin: f32, now: f64) -> bool {
    predator.body.contains(prey.body.pos)
        && predator.mass() > prey.mass() * margin
        && !prey.is_invincible(now)
}

/// Mutable access to two distinct elements
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = items.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = items.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// Push two overlapping sibling cells apart, each by `push` of the overlap
fn separate(a: &mut Cell, b: &mut Cell, push: f32) {
    let delta = a.body.pos - b.body.pos;
    let dist = delta.length();
    let overlap = a.body.radius + b.body.radius - dist;
    let axis = if dist > 0.0 { delta / dist } else { COINCIDENT_AXIS };
    a.body.pos += axis * overlap * push;
    b.body.pos -= axis * overlap * push;
}

/// Run the interaction scan and apply removals
pub fn resolve(world: &mut World) -> Interactions {
    world.normalize_order();

    let now = world.clock_ms;
    let tuning = &world.tuning;
    let cap = tuning.max_cell_mass;
    let mut out = Interactions::default();

    let mut cell_gone = vec![false; world.cells.len()];
    let mut trash_gone = vec![false; world.trash.len()];
    let mut ejected_gone = vec![false; world.ejected.len()];
    let mut virus_gone = vec![false; world.viruses.len()];

    'cells: for i in 0..world.cells.len() {
        if cell_gone[i] {
            continue;
        }

        if world.cells[i].owner.is_hero() {
            let pos = world.cells[i].body.pos;
            let reached = world
                .portals
                .iter()
                .filter(|p| p.is_open())
                .any(|p| pos.distance(p.body.pos) < p.body.radius * 0.5);
            if reached {
                let mass: f32 = world
                    .cells
                    .iter()
                    .zip(&cell_gone)
                    .filter(|(c, gone)| c.owner.is_hero() && !**gone)
                    .map(|(c, _)| c.mass())
                    .sum();
                out.cash_out = Some(mass.floor() as u32);
                break 'cells;
            }
        }

        let cell = &mut world.cells[i];

        for (v, virus) in world.viruses.iter().enumerate() {
            if virus_gone[v] {
                continue;
            }
            if cell.body.contains(virus.body.pos)
                && cell.mass() > virus.body.mass * tuning.virus_margin
            {
                virus_gone[v] = true;
                cell.body.set_mass(cell.mass() / 2.0);
                out.events.push(GameEvent::VirusHit {
                    owner: cell.owner,
                    pos: cell.body.pos,
                });
            }
        }

        for (t, item) in world.trash.iter().enumerate() {
            if trash_gone[t] || !cell.body.contains(item.body.pos) {
                continue;
            }
            trash_gone[t] = true;
            cell.gain(item.value, cap);
            out.events.push(GameEvent::TrashEaten {
                owner: cell.owner,
                pos: item.body.pos,
                kind: item.kind,
            });
        }

        for (e, blob) in world.ejected.iter().enumerate() {
            if ejected_gone[e] {
                continue;
            }
            if blob.owner == cell.owner && now - blob.created_at < tuning.eject_self_immunity_ms {
                continue;
            }
            if cell.body.contains(blob.body.pos) {
                ejected_gone[e] = true;
                cell.gain(blob.body.mass, cap);
                out.events.push(GameEvent::EjectedEaten {
                    owner: cell.owner,
                    pos: blob.body.pos,
                });
            }
        }

        for j in 0..world.cells.len() {
            if j == i || cell_gone[j] {
                continue;
            }
            let (a, b) = pair_mut(&mut world.cells, i, j);

            if a.owner == b.owner {
                if !circles_overlap(a.body.pos, a.body.radius, b.body.pos, b.body.radius) {
                    continue;
                }
                if a.can_merge(now) && b.can_merge(now) {
                    let (keeper, eaten, eaten_idx) = if b.mass() > a.mass() {
                        (b, a, i)
                    } else {
                        (a, b, j)
                    };
                    keeper.gain(eaten.mass(), cap);
                    cell_gone[eaten_idx] = true;
                    out.events.push(GameEvent::CellsMerged {
                        owner: keeper.owner,
                        pos: keeper.body.pos,
                        color: keeper.body.color,
                    });
                    if eaten_idx == i {
                        continue 'cells;
                    }
                } else {
                    separate(a, b, tuning.sibling_push);
                }
            } else if can_eat(a, b, tuning.predation_margin, now) {
                a.gain(b.mass(), cap);
                cell_gone[j] = true;
                out.events.push(GameEvent::CellEaten {
                    predator: a.owner,
                    prey: b.owner,
                    pos: b.body.pos,
                    color: b.body.color,
                });
            }
        }
    }

    if out.cash_out.is_some() {
        return out;
    }

    retain_flagged(&mut world.cells, &cell_gone);
    retain_flagged(&mut world.trash, &trash_gone);
    retain_flagged(&mut world.ejected, &ejected_gone);
    retain_flagged(&mut world.viruses, &virus_gone);
    out
}

/// Drop every element whose flag is set
fn retain_flagged<T>(items: &mut Vec<T>, gone: &[bool]) {
    let mut flags = gone.iter();
    items.retain(|_| !flags.next().copied().unwrap_or(false));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Owner, Portal, PortalState, TrashItem, TrashKind, Virus};
    use crate::sim::testing::{add_cell, bare_world, cell, place_hero};
    use proptest::prelude::*;

    fn predation_world(prey_mass: f32, predator_mass: f32) -> (World, u32, u32) {
        let mut world = bare_world(2);
        world.tuning.predation_margin = 1.25;
        place_hero(&mut world, Vec2::splat(200.0), 18.0);
        let prey = add_cell(&mut world, Owner::Bot(0), Vec2::splat(1500.0), prey_mass);
        let predator = add_cell(&mut world, Owner::Bot(1), Vec2::splat(1500.0), predator_mass);
        (world, prey, predator)
    }

    #[test]
    fn test_predation_exactly_at_margin_is_rejected() {
        let (mut world, prey, predator) = predation_world(100.0, 125.0);
        resolve(&mut world);
        assert!(cell(&world, prey).is_some());
        assert_eq!(cell(&world, predator).unwrap().mass(), 125.0);
    }

    #[test]
    fn test_predation_just_above_margin() {
        let (mut world, prey, predator) = predation_world(100.0, 125.01);
        let out = resolve(&mut world);
        assert!(cell(&world, prey).is_none());
        assert!((cell(&world, predator).unwrap().mass() - 225.01).abs() < 1e-3);
        assert!(out.events.iter().any(|e| matches!(e, GameEvent::CellEaten { .. })));
    }

    #[test]
    fn test_invincible_prey_survives() {
        let mut world = bare_world(2);
        place_hero(&mut world, Vec2::splat(1500.0), 18.0);
        world.cells[0].invincible_until = Some(3000.0);
        let bot = add_cell(&mut world, Owner::Bot(0), Vec2::splat(1500.0), 200.0);

        resolve(&mut world);
        assert_eq!(world.hero_cells().count(), 1);
        assert_eq!(cell(&world, bot).unwrap().mass(), 200.0);
    }

    #[test]
    fn test_siblings_push_apart_before_cooldown() {
        let mut world = bare_world(2);
        world.clock_ms = 1000.0;
        place_hero(&mut world, Vec2::new(1500.0, 1500.0), 50.0);
        world.cells[0].merge_at = 16000.0;
        let b = add_cell(&mut world, Owner::Hero, Vec2::new(1510.0, 1500.0), 50.0);
        world.cells[1].merge_at = 16000.0;

        resolve(&mut world);
        assert_eq!(world.hero_cells().count(), 2);
        let a_pos = world.cells.iter().find(|c| c.body.id != b).unwrap().body.pos;
        let b_pos = cell(&world, b).unwrap().body.pos;
        assert!(b_pos.distance(a_pos) > 10.0);
    }

    #[test]
    fn test_coincident_siblings_separate() {
        let mut world = bare_world(2);
        place_hero(&mut world, Vec2::splat(1500.0), 50.0);
        world.cells[0].merge_at = 1.0e9;
        add_cell(&mut world, Owner::Hero, Vec2::splat(1500.0), 50.0);
        world.cells[1].merge_at = 1.0e9;

        resolve(&mut world);
        let xs: Vec<f32> = world.cells.iter().map(|c| c.body.pos.x).collect();
        assert_ne!(xs[0], xs[1]);
        assert!(world.cells.iter().all(|c| c.body.pos.y == 1500.0));
    }

    #[test]
    fn test_siblings_merge_after_cooldown() {
        let mut world = bare_world(2);
        world.clock_ms = 20000.0;
        place_hero(&mut world, Vec2::new(1500.0, 1500.0), 40.0);
        world.cells[0].merge_at = 16000.0;
        let big = add_cell(&mut world, Owner::Hero, Vec2::new(1505.0, 1500.0), 60.0);
        world.cells[1].merge_at = 16000.0;

        let out = resolve(&mut world);
        assert_eq!(world.hero_cells().count(), 1);
        let survivor = world.hero_cells().next().unwrap();
        assert_eq!(survivor.body.id, big);
        assert_eq!(survivor.mass(), 100.0);
        assert!(matches!(out.events[0], GameEvent::CellsMerged { owner: Owner::Hero, .. }));
    }

    #[test]
    fn test_one_pending_cooldown_blocks_merge() {
        for (first, second) in [(16000.0, 30000.0), (30000.0, 16000.0)] {
            let mut world = bare_world(2);
            world.clock_ms = 20000.0;
            place_hero(&mut world, Vec2::new(1500.0, 1500.0), 40.0);
            world.cells[0].merge_at = first;
            add_cell(&mut world, Owner::Hero, Vec2::new(1505.0, 1500.0), 60.0);
            world.cells[1].merge_at = second;

            for _ in 0..20 {
                let out = resolve(&mut world);
                assert!(!out.events.iter().any(|e| matches!(e, GameEvent::CellsMerged { .. })));
                assert_eq!(world.hero_cells().count(), 2);
            }
            assert_eq!(world.hero_mass(), 100.0);
        }
    }

    #[test]
    fn test_trash_is_eaten_once() {
        let mut world = bare_world(2);
        place_hero(&mut world, Vec2::splat(1500.0), 18.0);
        add_cell(&mut world, Owner::Bot(0), Vec2::splat(1502.0), 19.0);
        world.trash.push(TrashItem::new(99, Vec2::splat(1501.0), TrashKind::Banana, 0.0, 0.0));

        resolve(&mut world);
        assert!(world.trash.is_empty());
        let total: f32 = world.cells.iter().map(|c| c.mass()).sum();
        assert_eq!(total, 18.0 + 19.0 + 5.0);
    }

    #[test]
    fn test_own_fresh_ejecta_is_ignored() {
        let mut world = bare_world(2);
        world.clock_ms = 1000.0;
        place_hero(&mut world, Vec2::splat(1500.0), 40.0);
        world.ejected.push(crate::sim::entity::EjectedMass {
            body: crate::sim::entity::Body::massive(99, Vec2::splat(1500.0), 12.0, crate::color::WHITE),
            vel: Vec2::ZERO,
            owner: Owner::Hero,
            created_at: 900.0,
        });

        resolve(&mut world);
        assert_eq!(world.ejected.len(), 1);

        world.clock_ms = 1300.0;
        resolve(&mut world);
        assert!(world.ejected.is_empty());
        assert_eq!(world.hero_mass(), 52.0);
    }

    #[test]
    fn test_virus_halves_large_cell() {
        let mut world = bare_world(2);
        place_hero(&mut world, Vec2::splat(1500.0), 200.0);
        world.viruses.push(Virus::new(99, Vec2::splat(1500.0), 100.0));

        let out = resolve(&mut world);
        assert!(world.viruses.is_empty());
        assert_eq!(world.hero_mass(), 100.0);
        assert!(matches!(out.events[0], GameEvent::VirusHit { owner: Owner::Hero, .. }));
    }

    #[test]
    fn test_small_cell_passes_virus() {
        let mut world = bare_world(2);
        place_hero(&mut world, Vec2::splat(1500.0), 110.0);
        world.viruses.push(Virus::new(99, Vec2::splat(1500.0), 100.0));
        resolve(&mut world);
        assert_eq!(world.viruses.len(), 1);
        assert_eq!(world.hero_mass(), 110.0);
    }

    #[test]
    fn test_open_portal_cashes_out_with_floor() {
        let mut world = bare_world(2);
        place_hero(&mut world, Vec2::splat(1500.0), 40.7);
        let mut portal = Portal::new(99, Vec2::splat(1520.0), 100.0, 5000.0);
        portal.state = PortalState::Open;
        world.portals.push(portal);

        let out = resolve(&mut world);
        assert_eq!(out.cash_out, Some(40));
    }

    #[test]
    fn test_closed_portal_states_do_not_cash_out() {
        for state in [PortalState::Spawning, PortalState::Closing] {
            let mut world = bare_world(2);
            place_hero(&mut world, Vec2::splat(1500.0), 40.7);
            let mut portal = Portal::new(99, Vec2::splat(1500.0), 100.0, 5000.0);
            portal.state = state;
            world.portals.push(portal);
            assert_eq!(resolve(&mut world).cash_out, None);
        }
    }

    #[test]
    fn test_portal_edge_needs_half_radius() {
        let mut world = bare_world(2);
        place_hero(&mut world, Vec2::new(1500.0, 1500.0), 40.0);
        let mut portal = Portal::new(99, Vec2::new(1560.0, 1500.0), 100.0, 5000.0);
        portal.state = PortalState::Open;
        world.portals.push(portal);
        assert_eq!(resolve(&mut world).cash_out, None);
    }

    proptest! {
        #[test]
        fn prop_mass_is_conserved_without_viruses(
            masses in proptest::collection::vec(5.0f32..500.0, 2..8),
            offsets in proptest::collection::vec(-40.0f32..40.0, 8),
        ) {
            let mut world = bare_world(4);
            place_hero(&mut world, Vec2::splat(200.0), 18.0);
            for (k, m) in masses.iter().enumerate() {
                add_cell(&mut world, Owner::Bot(k as u32), Vec2::new(1500.0 + offsets[k], 1500.0), *m);
            }
            let before: f32 = world.cells.iter().map(|c| c.mass()).sum();
            resolve(&mut world);
            let after: f32 = world.cells.iter().map(|c| c.mass()).sum();
            prop_assert!((before - after).abs() < before * 1e-4);
            prop_assert!(world.cells.iter().all(|c| c.mass() >= 0.0));
        }
    }
}
