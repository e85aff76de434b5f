//! Scene assembly
//!
//! Turns a [`World`] into one triangle list, back to front: floor, grid,
//! border, trash, ejected mass, portals, viruses, cells (lightest first) and
//! particles. Names, skins and mass labels come from `labels`; the HUD is
//! drawn by the page.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::color::{self, with_alpha};
use crate::settings::Settings;
use crate::sim::{Camera, Cell, EjectedMass, Particle, Portal, TrashItem, Virus, World};

/// Grid spacing in world units
pub const GRID_STEP: f32 = 100.0;
const GRID_WIDTH: f32 = 1.0;
const BORDER_WIDTH: f32 = 10.0;
/// Virus spike length as a fraction of its radius
const SPIKE_FRACTION: f32 = 0.12;

/// Screen mapping for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: Vec2,
    /// World units to CSS pixels
    pub scale: f32,
    /// Viewport size in CSS pixels
    pub width: f32,
    pub height: f32,
}

impl View {
    pub fn from_camera(camera: &Camera, width: f32, height: f32) -> Self {
        Self {
            center: camera.view_pos(),
            scale: camera.scale,
            width,
            height,
        }
    }

    /// World position to normalized device coordinates (y up)
    pub fn world_to_ndc(&self, p: Vec2) -> Vec2 {
        let d = (p - self.center) * self.scale;
        Vec2::new(d.x / (self.width / 2.0), -d.y / (self.height / 2.0))
    }

    /// World position to CSS pixels from the top-left corner
    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        (p - self.center) * self.scale + Vec2::new(self.width, self.height) / 2.0
    }

    /// Visible world rectangle
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = Vec2::new(self.width, self.height) / (2.0 * self.scale);
        (self.center - half, self.center + half)
    }

    /// Whether a circle intersects the visible rectangle
    pub fn sees(&self, pos: Vec2, radius: f32) -> bool {
        let (min, max) = self.bounds();
        pos.x + radius >= min.x
            && pos.x - radius <= max.x
            && pos.y + radius >= min.y
            && pos.y - radius <= max.y
    }
}

/// Per-frame drawing parameters
#[derive(Debug, Clone, Copy)]
pub struct SceneContext {
    pub view: View,
    pub world_size: f32,
    /// Simulation clock, for pulses
    pub time_ms: f64,
    pub segments: u32,
    pub grid: bool,
    /// Disables pulsing
    pub reduced_motion: bool,
}

impl SceneContext {
    pub fn new(world: &World, view: View, settings: &Settings) -> Self {
        Self {
            view,
            world_size: world.tuning.world_size,
            time_ms: world.clock_ms,
            segments: settings.quality.circle_segments(),
            grid: settings.quality.grid_enabled(),
            reduced_motion: settings.reduced_motion,
        }
    }

    fn pulse(&self, period_ms: f64, phase: f32) -> f32 {
        if self.reduced_motion {
            0.0
        } else {
            ((self.time_ms / period_ms) as f32 + phase).sin()
        }
    }
}

/// Everything that can appear on screen
#[derive(Debug, Clone, Copy)]
pub enum Drawable<'a> {
    Floor,
    Grid,
    Border,
    Trash(&'a TrashItem),
    Ejected(&'a EjectedMass),
    Portal(&'a Portal),
    Virus(&'a Virus),
    Cell { cell: &'a Cell, invincible: bool },
    Particle(&'a Particle),
}

impl Drawable<'_> {
    /// Position and radius for culling; `None` for unbounded layers
    fn extent(&self) -> Option<(Vec2, f32)> {
        match self {
            Drawable::Floor | Drawable::Grid | Drawable::Border => None,
            Drawable::Trash(t) => Some((t.body.pos, t.body.radius * 1.2)),
            Drawable::Ejected(e) => Some((e.body.pos, e.body.radius)),
            Drawable::Portal(p) => Some((p.body.pos, p.body.radius)),
            Drawable::Virus(v) => Some((v.body.pos, v.body.radius * (1.0 + SPIKE_FRACTION))),
            Drawable::Cell { cell, .. } => Some((cell.body.pos, cell.body.radius + 10.0)),
            Drawable::Particle(p) => Some((p.body.pos, p.body.radius)),
        }
    }

    pub fn tessellate(&self, ctx: &SceneContext, out: &mut Vec<Vertex>) {
        let seg = ctx.segments;
        match *self {
            Drawable::Floor => {
                shapes::rect(out, Vec2::ZERO, Vec2::splat(ctx.world_size), colors::FLOOR);
            }
            Drawable::Grid => {
                let (min, max) = ctx.view.bounds();
                let lo = min.max(Vec2::ZERO);
                let hi = max.min(Vec2::splat(ctx.world_size));
                let mut x = (lo.x / GRID_STEP).ceil() * GRID_STEP;
                while x <= hi.x {
                    shapes::line(out, Vec2::new(x, lo.y), Vec2::new(x, hi.y), GRID_WIDTH, colors::GRID);
                    x += GRID_STEP;
                }
                let mut y = (lo.y / GRID_STEP).ceil() * GRID_STEP;
                while y <= hi.y {
                    shapes::line(out, Vec2::new(lo.x, y), Vec2::new(hi.x, y), GRID_WIDTH, colors::GRID);
                    y += GRID_STEP;
                }
            }
            Drawable::Border => {
                shapes::frame(out, Vec2::ZERO, Vec2::splat(ctx.world_size), BORDER_WIDTH, colors::BORDER);
            }
            Drawable::Trash(item) => {
                let r = item.body.radius * (1.0 + 0.1 * ctx.pulse(200.0, item.pulse_offset));
                shapes::circle(out, item.body.pos, r, item.body.color, (seg / 2).max(8));
            }
            Drawable::Ejected(blob) => {
                shapes::circle(out, blob.body.pos, blob.body.radius, blob.body.color, seg);
            }
            Drawable::Portal(portal) => {
                let alpha = portal.opacity();
                let pos = portal.body.pos;
                let r = portal.body.radius;
                shapes::circle(out, pos, r, with_alpha(portal.body.color, 0.2 * alpha), seg);
                shapes::ring(out, pos, r * 0.9, r, with_alpha(portal.body.color, alpha), seg * 2);
                for arm in 0..4 {
                    let angle = portal.body.rotation + arm as f32 * std::f32::consts::FRAC_PI_2;
                    let tip = pos + Vec2::from_angle(angle) * r * 0.8;
                    shapes::line(out, pos, tip, 6.0, with_alpha(color::WHITE, 0.6 * alpha));
                }
            }
            Drawable::Virus(virus) => {
                let r = virus.body.radius;
                shapes::spiky_circle(
                    out,
                    virus.body.pos,
                    r,
                    r * SPIKE_FRACTION,
                    virus.spikes,
                    virus.body.rotation,
                    colors::VIRUS_RIM,
                );
                shapes::circle(out, virus.body.pos, r * 0.92, virus.body.color, seg);
            }
            Drawable::Cell { cell, invincible } => {
                let pos = cell.body.pos;
                let r = cell.body.radius;
                shapes::circle(out, pos, r, color::darken(cell.body.color, 0.7), seg);
                shapes::circle(out, pos, (r - 4.0).max(r * 0.85), cell.body.color, seg);
                if invincible {
                    let alpha = 0.5 + 0.3 * ctx.pulse(100.0, 0.0);
                    shapes::ring(
                        out,
                        pos,
                        r + 4.0,
                        r + 8.0,
                        with_alpha(colors::INVINCIBLE_RING, alpha),
                        seg,
                    );
                }
            }
            Drawable::Particle(p) => {
                shapes::circle(out, p.body.pos, p.body.radius, with_alpha(p.body.color, p.life), 8);
            }
        }
    }
}

/// Drawables in paint order
pub fn drawables<'a>(world: &'a World, grid: bool) -> Vec<Drawable<'a>> {
    let now = world.clock_ms;
    let mut list = Vec::with_capacity(
        3 + world.trash.len()
            + world.ejected.len()
            + world.portals.len()
            + world.viruses.len()
            + world.cells.len()
            + world.particles.len(),
    );

    list.push(Drawable::Floor);
    if grid {
        list.push(Drawable::Grid);
    }
    list.push(Drawable::Border);
    list.extend(world.trash.iter().map(Drawable::Trash));
    list.extend(world.ejected.iter().map(Drawable::Ejected));
    list.extend(world.portals.iter().map(Drawable::Portal));
    list.extend(world.viruses.iter().map(Drawable::Virus));

    let mut cells: Vec<&Cell> = world.cells.iter().collect();
    cells.sort_by(|a, b| a.mass().total_cmp(&b.mass()).then(a.body.id.cmp(&b.body.id)));
    list.extend(cells.into_iter().map(|cell| Drawable::Cell {
        cell,
        invincible: cell.is_invincible(now),
    }));

    list.extend(world.particles.iter().map(Drawable::Particle));
    list
}

/// Build the frame's vertices in world coordinates, culled to the view
pub fn build(world: &World, ctx: &SceneContext) -> Vec<Vertex> {
    let mut out = Vec::new();
    for drawable in drawables(world, ctx.grid) {
        let visible = drawable
            .extent()
            .is_none_or(|(pos, radius)| ctx.view.sees(pos, radius));
        if visible {
            drawable.tessellate(ctx, &mut out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::testing::{add_cell, bare_world, place_hero};
    use crate::sim::{Owner, TrashKind};

    fn view_at(center: Vec2) -> View {
        View {
            center,
            scale: 1.0,
            width: 800.0,
            height: 600.0,
        }
    }

    #[test]
    fn test_world_to_ndc() {
        let view = View {
            center: Vec2::new(100.0, 100.0),
            scale: 2.0,
            width: 800.0,
            height: 600.0,
        };
        assert_eq!(view.world_to_ndc(Vec2::new(100.0, 100.0)), Vec2::ZERO);
        assert_eq!(view.world_to_ndc(Vec2::new(300.0, 100.0)), Vec2::new(1.0, 0.0));
        // screen y grows downward, NDC y grows upward
        assert_eq!(view.world_to_ndc(Vec2::new(100.0, 250.0)), Vec2::new(0.0, -1.0));
        assert_eq!(view.world_to_screen(Vec2::new(100.0, 250.0)), Vec2::new(400.0, 600.0));
    }

    #[test]
    fn test_cells_paint_lightest_first_after_viruses() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(500.0), 80.0);
        add_cell(&mut world, Owner::Bot(0), Vec2::splat(520.0), 20.0);
        world.viruses.push(Virus::new(90, Vec2::splat(600.0), 100.0));

        let list = drawables(&world, true);
        let kinds: Vec<&str> = list
            .iter()
            .map(|d| match d {
                Drawable::Virus(_) => "virus",
                Drawable::Cell { .. } => "cell",
                _ => "other",
            })
            .filter(|k| *k != "other")
            .collect();
        assert_eq!(kinds, ["virus", "cell", "cell"]);

        let masses: Vec<f32> = list
            .iter()
            .filter_map(|d| match d {
                Drawable::Cell { cell, .. } => Some(cell.mass()),
                _ => None,
            })
            .collect();
        assert_eq!(masses, [20.0, 80.0]);
    }

    #[test]
    fn test_offscreen_entities_are_culled() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(500.0), 18.0);
        let settings = Settings::default();

        let ctx = SceneContext::new(&world, view_at(Vec2::splat(500.0)), &settings);
        let base = build(&world, &ctx).len();

        world.trash.push(TrashItem::new(77, Vec2::splat(2500.0), TrashKind::Coin, 0.0, 0.0));
        assert_eq!(build(&world, &ctx).len(), base);

        world.trash.push(TrashItem::new(78, Vec2::splat(520.0), TrashKind::Coin, 0.0, 0.0));
        assert!(build(&world, &ctx).len() > base);
    }

    #[test]
    fn test_invincible_hero_gets_ring() {
        let world = bare_world(1);
        let list = drawables(&world, false);
        assert!(list
            .iter()
            .any(|d| matches!(d, Drawable::Cell { invincible: true, .. })));
    }

    #[test]
    fn test_grid_lines_stay_inside_world() {
        let world = bare_world(1);
        let settings = Settings::default();
        let ctx = SceneContext::new(&world, view_at(Vec2::ZERO), &settings);
        let mut out = Vec::new();
        Drawable::Grid.tessellate(&ctx, &mut out);
        assert!(!out.is_empty());
        for v in &out {
            assert!(v.position[0] >= -GRID_WIDTH && v.position[1] >= -GRID_WIDTH);
            assert!(v.position[0] <= 400.0 + GRID_WIDTH && v.position[1] <= 300.0 + GRID_WIDTH);
        }
    }
}
