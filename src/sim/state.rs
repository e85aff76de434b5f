//! World state
//!
//! Everything the frame loop mutates lives in [`World`]: entity collections,
//! camera, simulation clock and the seeded RNG. It is passed by exclusive
//! reference into `tick::step`; there is no global state.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::entity::{Cell, EjectedMass, Owner, Particle, Portal, TrashItem, TrashKind, Virus};
use crate::color::Rgba;
use crate::config::GameConfig;
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Simulation advancing
    Playing,
    /// Hero lost every cell
    GameOver,
    /// Hero reached an open portal
    CashedOut { score: u32 },
}

/// Something that happened during a step, for audio and visual feedback
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    TrashEaten { owner: Owner, pos: Vec2, kind: TrashKind },
    EjectedEaten { owner: Owner, pos: Vec2 },
    /// Cell `predator` swallowed a cell of `prey`
    CellEaten { predator: Owner, prey: Owner, pos: Vec2, color: Rgba },
    /// Two sibling cells recombined
    CellsMerged { owner: Owner, pos: Vec2, color: Rgba },
    VirusHit { owner: Owner, pos: Vec2 },
    HeroSplit { cells: usize },
    HeroEjected { blobs: usize },
    PortalSpawned { pos: Vec2 },
    PortalOpened { pos: Vec2 },
    PortalClosed,
    CashOut { score: u32 },
    GameOver,
}

/// Display data copied onto every hero cell (including split siblings)
#[derive(Debug, Clone)]
pub struct HeroProfile {
    pub name: String,
    pub skin: String,
    pub color: Rgba,
}

impl From<&GameConfig> for HeroProfile {
    fn from(config: &GameConfig) -> Self {
        Self {
            name: config.nickname.clone(),
            skin: config.avatar.clone(),
            color: config.rgba(),
        }
    }
}

/// One row of the HUD leaderboard (aggregated per owner)
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub owner: Owner,
    pub name: String,
    pub mass: f32,
}

#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Simulation time in milliseconds (advances by elapsed frames × 16.666)
    pub clock_ms: f64,
    pub frame: u64,
    pub phase: GamePhase,
    pub hero: HeroProfile,
    pub cells: Vec<Cell>,
    pub trash: Vec<TrashItem>,
    pub viruses: Vec<Virus>,
    pub ejected: Vec<EjectedMass>,
    pub portals: Vec<Portal>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub camera: Camera,
    /// Offset of the portal spawn window within its interval
    pub(crate) portal_phase_ms: f64,
    next_id: u32,
    next_bot: u32,
}

impl World {
    /// Create a populated world: hero, bots, trash and viruses per `tuning`
    pub fn new(config: &GameConfig, tuning: Tuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let portal_phase_ms = rng.random_range(0.0..tuning.portal_interval_ms.max(1.0));
        let center = Vec2::splat(tuning.world_size / 2.0);

        let mut world = Self {
            tuning,
            seed,
            rng,
            clock_ms: 0.0,
            frame: 0,
            phase: GamePhase::Playing,
            hero: HeroProfile::from(config),
            cells: Vec::new(),
            trash: Vec::new(),
            viruses: Vec::new(),
            ejected: Vec::new(),
            portals: Vec::new(),
            particles: Vec::new(),
            camera: Camera::new(center),
            portal_phase_ms,
            next_id: 1,
            next_bot: 0,
        };

        world.spawn_hero();
        for _ in 0..world.tuning.bot_count {
            world.spawn_bot();
        }
        for _ in 0..world.tuning.trash_count {
            world.spawn_trash();
        }
        for _ in 0..world.tuning.virus_count {
            world.spawn_virus();
        }

        log::info!(
            "World created (seed {}): {} bots, {} trash, {} viruses",
            seed,
            world.bot_cell_count(),
            world.trash.len(),
            world.viruses.len()
        );
        world
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Allocate a new bot owner
    pub(crate) fn next_bot_owner(&mut self) -> Owner {
        let owner = Owner::Bot(self.next_bot);
        self.next_bot += 1;
        owner
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase != GamePhase::Playing
    }

    pub fn hero_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.owner.is_hero())
    }

    pub fn owner_cell_count(&self, owner: Owner) -> usize {
        self.cells.iter().filter(|c| c.owner == owner).count()
    }

    pub fn bot_cell_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.owner.is_hero()).count()
    }

    /// Total mass across all hero cells
    pub fn hero_mass(&self) -> f32 {
        self.hero_cells().map(|c| c.mass()).sum()
    }

    /// Score as reported on cash-out: floor of total hero mass
    pub fn hero_score(&self) -> u32 {
        self.hero_mass().floor() as u32
    }

    /// Heaviest owners first, at most `limit` entries
    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = Vec::new();
        for cell in &self.cells {
            match entries.iter_mut().find(|e| e.owner == cell.owner) {
                Some(entry) => entry.mass += cell.mass(),
                None => entries.push(LeaderboardEntry {
                    owner: cell.owner,
                    name: cell.name.clone(),
                    mass: cell.mass(),
                }),
            }
        }
        entries.sort_by(|a, b| b.mass.total_cmp(&a.mass).then(a.owner.cmp(&b.owner)));
        entries.truncate(limit);
        entries
    }

    /// Sort cells by ascending mass (interaction order), ties by id
    pub fn normalize_order(&mut self) {
        self.cells
            .sort_by(|a, b| a.mass().total_cmp(&b.mass()).then(a.body.id.cmp(&b.body.id)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::testing::bare_tuning;

    #[test]
    fn test_new_world_population() {
        let tuning = Tuning::default();
        let world = World::new(&GameConfig::default(), tuning.clone(), 42);
        assert_eq!(world.hero_cells().count(), 1);
        assert_eq!(world.bot_cell_count(), tuning.bot_count);
        assert_eq!(world.trash.len(), tuning.trash_count);
        assert_eq!(world.viruses.len(), tuning.virus_count);
        assert!(world.portals.is_empty());
        assert_eq!(world.phase, GamePhase::Playing);
    }

    #[test]
    fn test_hero_uses_config() {
        let config = GameConfig {
            nickname: "Test".into(),
            color: "#4ade80".into(),
            avatar: "🦝".into(),
            wager: 10.0,
        };
        let world = World::new(&config, bare_tuning(), 1);
        let hero = world.hero_cells().next().unwrap();
        assert_eq!(hero.name, "Test");
        assert_eq!(hero.skin, "🦝");
        assert_eq!(hero.mass(), 18.0);
        assert!(hero.invincible_until.is_some());
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = World::new(&GameConfig::default(), Tuning::default(), 7);
        let b = World::new(&GameConfig::default(), Tuning::default(), 7);
        assert_eq!(a.cells.len(), b.cells.len());
        for (x, y) in a.cells.iter().zip(b.cells.iter()) {
            assert_eq!(x.body.pos, y.body.pos);
            assert_eq!(x.mass(), y.mass());
        }
        assert_eq!(a.trash[10].body.pos, b.trash[10].body.pos);
    }

    #[test]
    fn test_leaderboard_aggregates_owners() {
        let mut world = World::new(&GameConfig::default(), bare_tuning(), 3);
        let mut sibling = world.cells[0].clone();
        sibling.body.id = world.next_entity_id();
        world.cells.push(sibling);
        world.spawn_bot();

        let board = world.leaderboard(5);
        assert_eq!(board.len(), 2);
        let hero = board.iter().find(|e| e.owner == Owner::Hero).unwrap();
        assert_eq!(hero.mass, 36.0);
        assert!(board[0].mass >= board[1].mass);
        assert_eq!(world.leaderboard(1).len(), 1);
    }
}
