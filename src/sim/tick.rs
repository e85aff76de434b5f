//! Frame step
//!
//! Advances the world by a variable number of elapsed reference frames
//! (16.666 ms each, capped at 3). Rates that are "per frame" are scaled by
//! `dt` so the simulation speed does not depend on the display refresh rate.

use glam::Vec2;

use super::ai;
use super::collision;
use super::entity::PortalState;
use super::mechanics::{eject_hero, split_hero};
use super::state::{GameEvent, GamePhase, World};
use crate::consts::{FRAME_MS, MAX_FRAME_MULTIPLIER};

/// Particle life lost per frame
const PARTICLE_FADE: f32 = 0.02;
/// Cosmetic portal spin per frame
const PORTAL_SPIN: f32 = 0.05;
/// Dash vectors shorter than this are dropped
const DASH_CUTOFF: f32 = 0.1;

/// Commands for a single step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Pointer offset from the screen centre, in pixels
    pub pointer: Vec2,
    /// Split pressed this frame (edge-triggered)
    pub split: bool,
    /// Eject pressed this frame (edge-triggered)
    pub eject: bool,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Hero lost every cell (score is always 0)
    GameOver,
    CashOut(u32),
}

impl Termination {
    pub fn score(self) -> u32 {
        match self {
            Termination::GameOver => 0,
            Termination::CashOut(score) => score,
        }
    }
}

#[derive(Debug, Default)]
pub struct StepOutcome {
    pub events: Vec<GameEvent>,
    /// Set on the single step that ends the session
    pub termination: Option<Termination>,
}

/// Advance the world by `dt` elapsed frames.
///
/// Once the world has terminated this is a no-op.
pub fn step(world: &mut World, input: &TickInput, dt: f32) -> StepOutcome {
    let mut out = StepOutcome::default();
    if world.is_over() {
        return out;
    }

    let dt = dt.clamp(0.0, MAX_FRAME_MULTIPLIER);
    world.frame += 1;
    world.clock_ms += dt as f64 * FRAME_MS;

    apply_commands(world, input, &mut out.events);
    update_portals(world, dt, &mut out.events);
    move_cells(world, input.pointer, dt);
    move_ejected(world, dt);

    let interactions = collision::resolve(world);
    out.events.extend(interactions.events);
    if let Some(score) = interactions.cash_out {
        log::info!("Hero extracted with score {}", score);
        world.phase = GamePhase::CashedOut { score };
        out.events.push(GameEvent::CashOut { score });
        out.termination = Some(Termination::CashOut(score));
        return out;
    }

    world.top_up_population();

    if world.hero_cells().next().is_none() {
        log::info!("Hero eliminated at frame {}", world.frame);
        world.phase = GamePhase::GameOver;
        out.events.push(GameEvent::GameOver);
        out.termination = Some(Termination::GameOver);
    }

    let World { camera, cells, rng, .. } = &mut *world;
    camera.update(cells.iter().filter(|c| c.owner.is_hero()), dt, rng);

    update_particles(world, dt);
    out
}

fn apply_commands(world: &mut World, input: &TickInput, events: &mut Vec<GameEvent>) {
    if input.split {
        let cells = split_hero(world, input.pointer);
        if cells > 0 {
            events.push(GameEvent::HeroSplit { cells });
        }
    }
    if input.eject {
        let blobs = eject_hero(world, input.pointer);
        if blobs > 0 {
            events.push(GameEvent::HeroEjected { blobs });
        }
    }
}

/// Whether the clock sits inside the portal spawn window of its interval
fn portal_window_open(world: &World) -> bool {
    let interval = world.tuning.portal_interval_ms;
    interval > 0.0 && (world.clock_ms + world.portal_phase_ms) % interval < world.tuning.portal_window_ms
}

fn update_portals(world: &mut World, dt: f32, events: &mut Vec<GameEvent>) {
    if world.portals.is_empty() && portal_window_open(world) && world.spawn_portal() {
        if let Some(portal) = world.portals.last() {
            events.push(GameEvent::PortalSpawned { pos: portal.body.pos });
        }
    }

    let tuning = &world.tuning;
    world.portals.retain_mut(|portal| {
        portal.timer -= dt * tuning.portal_ms_per_frame;
        portal.body.rotation += PORTAL_SPIN * dt;
        if portal.timer > 0.0 {
            return true;
        }
        let (next, duration) = match portal.state {
            PortalState::Spawning => (PortalState::Open, tuning.portal_open_ms),
            PortalState::Open => (PortalState::Closing, tuning.portal_closing_ms),
            PortalState::Closing => {
                events.push(GameEvent::PortalClosed);
                return false;
            }
        };
        if next == PortalState::Open {
            events.push(GameEvent::PortalOpened { pos: portal.body.pos });
        }
        portal.state = next;
        portal.timer = duration;
        portal.max_timer = duration;
        true
    });
}

/// Decay, steering, inertia, dash and bounds for every cell
fn move_cells(world: &mut World, pointer: Vec2, dt: f32) {
    let World { cells, tuning, rng, .. } = world;
    let size = tuning.world_size;
    let blend = 1.0 - tuning.inertia.powf(dt);
    let dash_decay = tuning.dash_decay.powf(dt);

    for cell in cells.iter_mut() {
        if cell.mass() > tuning.base_mass {
            let decayed = cell.mass() * tuning.decay_rate.powf(dt);
            cell.body.set_mass(decayed.max(tuning.base_mass));
        }

        let heading = if cell.owner.is_hero() {
            pointer
        } else {
            ai::steer(cell, tuning, rng)
        };

        let dist = heading.length();
        if dist > 0.0 {
            let speed = cell.mass().powf(tuning.speed_exponent) * tuning.base_speed;
            let throttle = if cell.owner.is_hero() {
                (dist / tuning.hero_throttle_distance).min(1.0)
            } else {
                1.0
            };
            let target = heading / dist * speed * throttle;
            cell.vel += (target - cell.vel) * blend;
        }

        if let Some(dash) = cell.dash {
            cell.vel += dash;
            let dash = dash * dash_decay;
            cell.dash = (dash.length() >= DASH_CUTOFF).then_some(dash);
        }

        cell.body.pos += cell.vel * dt;
        cell.body.pos = clamp_to_world(cell.body.pos, cell.body.radius, size);
    }
}

fn move_ejected(world: &mut World, dt: f32) {
    let size = world.tuning.world_size;
    let friction = world.tuning.eject_friction.powf(dt);
    for blob in world.ejected.iter_mut() {
        blob.body.pos += blob.vel * dt;
        blob.vel *= friction;
        blob.body.pos = clamp_to_world(blob.body.pos, blob.body.radius, size);
    }
}

fn update_particles(world: &mut World, dt: f32) {
    world.particles.retain_mut(|p| {
        p.body.pos += p.vel * dt;
        p.life -= PARTICLE_FADE * dt;
        p.life > 0.0
    });
}

/// Keep a circle of `radius` inside the square world
#[inline]
fn clamp_to_world(pos: Vec2, radius: f32, size: f32) -> Vec2 {
    Vec2::new(
        pos.x.max(radius).min(size - radius),
        pos.y.max(radius).min(size - radius),
    )
}
