//! Overlay labels: cell skins, names and mass, trash icons
//!
//! The GPU pass only draws shapes. Everything textual (and image skins) is
//! collected here as plain data in CSS pixels and painted by the page on a
//! 2D canvas stacked over the WebGPU one.

use glam::Vec2;

use super::scene::View;
use crate::config::is_image_ref;
use crate::sim::{Cell, World};

/// Trash smaller than this gets no icon (world units)
const MIN_ICON_RADIUS: f32 = 5.0;
/// Room above and below a cell for its name and mass
const LABEL_MARGIN: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Emoji skin centred on the cell
    Skin,
    /// Image skin; `text` is the source, `size` the cell radius
    Image,
    Name,
    Mass,
    /// Trash icon
    Icon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub kind: LabelKind,
    pub text: String,
    /// Anchor in CSS pixels
    pub pos: Vec2,
    /// Font size in CSS pixels (radius for images)
    pub size: f32,
}

/// Labels in paint order for everything the view can see
pub fn collect(world: &World, view: &View) -> Vec<Label> {
    let mut out = Vec::new();
    let px = |world_units: f32| world_units * view.scale;

    for item in &world.trash {
        let r = item.body.radius;
        if r <= MIN_ICON_RADIUS || !view.sees(item.body.pos, r) {
            continue;
        }
        out.push(Label {
            kind: LabelKind::Icon,
            text: item.kind.icon().to_string(),
            pos: view.world_to_screen(item.body.pos + Vec2::new(0.0, 2.0)),
            size: px(r * 1.5),
        });
    }

    let mut cells: Vec<&Cell> = world.cells.iter().collect();
    cells.sort_by(|a, b| a.mass().total_cmp(&b.mass()).then(a.body.id.cmp(&b.body.id)));

    for cell in cells {
        let pos = cell.body.pos;
        let r = cell.body.radius;
        if !view.sees(pos, r + LABEL_MARGIN) {
            continue;
        }

        if is_image_ref(&cell.skin) {
            out.push(Label {
                kind: LabelKind::Image,
                text: cell.skin.clone(),
                pos: view.world_to_screen(pos),
                size: px(r),
            });
        } else {
            out.push(Label {
                kind: LabelKind::Skin,
                text: cell.skin.clone(),
                pos: view.world_to_screen(pos),
                size: px((r * 0.4).max(12.0)),
            });
        }
        out.push(Label {
            kind: LabelKind::Name,
            text: cell.name.clone(),
            pos: view.world_to_screen(pos - Vec2::new(0.0, r + 10.0)),
            size: px((r * 0.3).max(10.0)),
        });
        out.push(Label {
            kind: LabelKind::Mass,
            text: (cell.mass().floor() as u32).to_string(),
            pos: view.world_to_screen(pos + Vec2::new(0.0, r + 15.0)),
            size: px((r * 0.2).max(8.0)),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::testing::{add_cell, bare_world, place_hero};
    use crate::sim::{Owner, TrashItem, TrashKind};

    fn view_at(center: Vec2) -> View {
        View {
            center,
            scale: 1.0,
            width: 800.0,
            height: 600.0,
        }
    }

    fn of_kind(labels: &[Label], kind: LabelKind) -> Vec<&Label> {
        labels.iter().filter(|l| l.kind == kind).collect()
    }

    #[test]
    fn test_hero_gets_skin_name_and_mass() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(500.0), 23.7);
        let labels = collect(&world, &view_at(Vec2::splat(500.0)));

        let r = world.cells[0].body.radius;
        let skin = of_kind(&labels, LabelKind::Skin);
        assert_eq!(skin.len(), 1);
        assert_eq!(skin[0].text, "🦝");
        assert_eq!(skin[0].pos, Vec2::new(400.0, 300.0));

        let name = of_kind(&labels, LabelKind::Name)[0];
        assert_eq!(name.text, "TrashPanda");
        assert!((name.pos.y - (300.0 - r - 10.0)).abs() < 1e-3);

        let mass = of_kind(&labels, LabelKind::Mass)[0];
        assert_eq!(mass.text, "23");
        assert!(mass.pos.y > skin[0].pos.y);
    }

    #[test]
    fn test_image_skin_replaces_emoji() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(500.0), 50.0);
        world.cells[0].skin = "https://example.com/me.png".into();
        let labels = collect(&world, &view_at(Vec2::splat(500.0)));

        assert!(of_kind(&labels, LabelKind::Skin).is_empty());
        let image = of_kind(&labels, LabelKind::Image)[0];
        assert_eq!(image.text, "https://example.com/me.png");
        assert_eq!(image.size, world.cells[0].body.radius);
    }

    #[test]
    fn test_fonts_scale_with_zoom_and_keep_a_floor() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(500.0), 18.0);
        let view = View { scale: 0.5, ..view_at(Vec2::splat(500.0)) };
        let labels = collect(&world, &view);
        // small cells use the 12-unit minimum before zoom
        assert_eq!(of_kind(&labels, LabelKind::Skin)[0].size, 6.0);
    }

    #[test]
    fn test_offscreen_cells_and_tiny_trash_are_skipped() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(500.0), 18.0);
        add_cell(&mut world, Owner::Bot(0), Vec2::splat(2500.0), 40.0);
        world.trash.push(TrashItem::new(70, Vec2::splat(520.0), TrashKind::Banana, 0.0, 0.0));
        world.trash.push(TrashItem::new(71, Vec2::splat(2600.0), TrashKind::Diamond, 0.0, 0.0));
        let mut tiny = TrashItem::new(72, Vec2::splat(540.0), TrashKind::Coin, 0.0, 0.0);
        tiny.body.radius = 4.0;
        world.trash.push(tiny);

        let labels = collect(&world, &view_at(Vec2::splat(500.0)));
        assert_eq!(of_kind(&labels, LabelKind::Name).len(), 1);
        let icons = of_kind(&labels, LabelKind::Icon);
        assert_eq!(icons.len(), 1);
        assert_eq!(icons[0].text, "🍌");
        assert_eq!(icons[0].size, 15.0);
    }

    #[test]
    fn test_cell_labels_follow_paint_order() {
        let mut world = bare_world(1);
        place_hero(&mut world, Vec2::splat(500.0), 80.0);
        let bot = add_cell(&mut world, Owner::Bot(0), Vec2::splat(560.0), 20.0);
        world.cells.iter_mut().find(|c| c.body.id == bot).unwrap().name = "Rat".into();

        let labels = collect(&world, &view_at(Vec2::splat(500.0)));
        let names: Vec<&str> = of_kind(&labels, LabelKind::Name)
            .iter()
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(names, ["Rat", "TrashPanda"]);
    }
}
