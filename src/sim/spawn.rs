//! Spawning policy: initial population, trash/bot top-up and portals

use glam::Vec2;
use rand::Rng;

use super::entity::{Body, Cell, Owner, Particle, Portal, TrashItem, TrashKind, Virus};
use super::state::World;
use crate::color::{self, Rgba};
use crate::tuning::TrashWeight;

pub const BOT_NAMES: [&str; 12] = [
    "RugPuller69",
    "DiamondHands",
    "WAGMI_Warr",
    "PaperHands",
    "SatoshiSan",
    "GasFeeGhoul",
    "MoonBoy",
    "DumpIt",
    "TrashPanda",
    "BinJuice",
    "RecycleRex",
    "CompostKing",
];

pub const BOT_SKINS: [&str; 12] = [
    "🐀", "🦝", "🗑️", "🧟", "🦠", "🦴", "🐟", "🍌", "💩", "🤡", "🤖", "👽",
];

/// Keep spawns this far from the world edge
const SPAWN_MARGIN: f32 = 50.0;

/// Pick a trash kind: each kind in order gets its own draw against its
/// probability; if none succeeds the first kind is used.
pub fn pick_trash_kind<R: Rng>(rng: &mut R, weights: &[TrashWeight]) -> TrashKind {
    weights
        .iter()
        .find(|w| rng.random::<f32>() < w.probability)
        .or(weights.first())
        .map(|w| w.kind)
        .unwrap_or(TrashKind::Coin)
}

impl World {
    /// Uniform position inside the world, away from the edges
    pub fn random_pos(&mut self) -> Vec2 {
        let span = (self.tuning.world_size - 2.0 * SPAWN_MARGIN).max(1.0);
        Vec2::new(
            self.rng.random::<f32>() * span + SPAWN_MARGIN,
            self.rng.random::<f32>() * span + SPAWN_MARGIN,
        )
    }

    /// Spawn the hero's single starting cell with its invincibility window
    pub fn spawn_hero(&mut self) {
        let id = self.next_entity_id();
        let pos = self.random_pos();
        let body = Body::massive(id, pos, self.tuning.base_mass, self.hero.color);
        let mut cell = Cell::new(
            body,
            Owner::Hero,
            self.hero.name.clone(),
            self.hero.skin.clone(),
            self.clock_ms,
        );
        cell.invincible_until = Some(self.clock_ms + self.tuning.hero_invincibility_ms);
        log::debug!("Hero spawned at ({:.0}, {:.0})", pos.x, pos.y);
        self.cells.push(cell);
    }

    /// Spawn one bot owner with a single cell
    pub fn spawn_bot(&mut self) {
        let id = self.next_entity_id();
        let owner = self.next_bot_owner();
        let pos = self.random_pos();
        let mass = self.tuning.base_mass + self.rng.random::<f32>() * self.tuning.bot_extra_mass;
        let color: Rgba = color::hsl(self.rng.random::<f32>() * 360.0, 0.7, 0.5);
        let name = BOT_NAMES[self.rng.random_range(0..BOT_NAMES.len())];
        let skin = BOT_SKINS[self.rng.random_range(0..BOT_SKINS.len())];

        let mut body = Body::massive(id, pos, mass, color);
        body.rotation = self.rng.random::<f32>() * std::f32::consts::TAU;
        let cell = Cell::new(body, owner, name.to_string(), skin.to_string(), self.clock_ms);
        log::debug!("Bot {:?} ({}) spawned with mass {:.1}", owner, name, mass);
        self.cells.push(cell);
    }

    pub fn spawn_trash(&mut self) {
        let id = self.next_entity_id();
        let pos = self.random_pos();
        let kind = pick_trash_kind(&mut self.rng, &self.tuning.trash_weights);
        let rotation = self.rng.random::<f32>() * std::f32::consts::TAU;
        let pulse = self.rng.random::<f32>() * 10.0;
        self.trash.push(TrashItem::new(id, pos, kind, rotation, pulse));
    }

    pub fn spawn_virus(&mut self) {
        let id = self.next_entity_id();
        let pos = self.random_pos();
        self.viruses.push(Virus::new(id, pos, self.tuning.virus_mass));
    }

    /// Spawn a portal in the spawning state; no-op if one already exists
    pub fn spawn_portal(&mut self) -> bool {
        if !self.portals.is_empty() {
            return false;
        }
        let id = self.next_entity_id();
        let pos = self.random_pos();
        self.portals.push(Portal::new(
            id,
            pos,
            self.tuning.portal_radius,
            self.tuning.portal_spawning_ms,
        ));
        log::info!("Portal signal detected at ({:.0}, {:.0})", pos.x, pos.y);
        true
    }

    /// Refill trash to its target count and respawn a bot below the floor
    pub(crate) fn top_up_population(&mut self) {
        while self.trash.len() < self.tuning.trash_count {
            self.spawn_trash();
        }
        if self.bot_cell_count() < self.tuning.bot_floor() {
            self.spawn_bot();
        }
    }

    /// Emit `count` particles from `pos`, respecting `max_particles`
    pub fn burst(&mut self, pos: Vec2, color: Rgba, speed: f32, count: usize, max_particles: usize) {
        for _ in 0..count {
            if self.particles.len() >= max_particles {
                break;
            }
            let id = self.next_entity_id();
            let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
            let magnitude = speed * self.rng.random::<f32>();
            let radius = self.rng.random::<f32>() * 3.0 + 2.0;
            self.particles.push(Particle {
                body: Body {
                    id,
                    pos,
                    radius,
                    color,
                    rotation: 0.0,
                    mass: 0.0,
                },
                vel: Vec2::new(angle.cos(), angle.sin()) * magnitude,
                life: 1.0,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::testing::bare_world;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pick_falls_back_to_first_kind() {
        let weights = [
            TrashWeight { kind: TrashKind::Banana, probability: 0.0 },
            TrashWeight { kind: TrashKind::Diamond, probability: 0.0 },
        ];
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(pick_trash_kind(&mut rng, &weights), TrashKind::Banana);
        }
    }

    #[test]
    fn test_pick_distribution_favors_coins() {
        let weights = Tuning::default().trash_weights;
        let mut rng = Pcg32::seed_from_u64(99);
        let coins = (0..1000)
            .filter(|_| pick_trash_kind(&mut rng, &weights) == TrashKind::Coin)
            .count();
        assert!(coins > 700, "coins: {coins}");
    }

    #[test]
    fn test_random_pos_inside_world() {
        let mut world = bare_world(5);
        for _ in 0..200 {
            let p = world.random_pos();
            assert!(p.x >= 50.0 && p.x <= world.tuning.world_size - 50.0);
            assert!(p.y >= 50.0 && p.y <= world.tuning.world_size - 50.0);
        }
    }

    #[test]
    fn test_only_one_portal() {
        let mut world = bare_world(5);
        assert!(world.spawn_portal());
        assert!(!world.spawn_portal());
        assert_eq!(world.portals.len(), 1);
    }

    #[test]
    fn test_bot_floor_spawns_one_per_call() {
        let tuning = Tuning { bot_count: 8, ..crate::sim::testing::bare_tuning() };
        let mut world = World::new(&GameConfig::default(), tuning, 11);
        world.cells.retain(|c| c.owner.is_hero());
        world.top_up_population();
        assert_eq!(world.bot_cell_count(), 1);
    }

    #[test]
    fn test_burst_respects_cap() {
        let mut world = bare_world(5);
        world.burst(Vec2::ZERO, color::WHITE, 10.0, 30, 12);
        assert_eq!(world.particles.len(), 12);
    }
}
