//! Shape generation for 2D primitives
//!
//! Everything is emitted as a flat triangle list in world coordinates.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;
use crate::color::Rgba;

#[inline]
fn push_tri(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: Rgba) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));
}

/// Filled circle as a triangle fan
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: Rgba, segments: u32) {
    let segments = segments.max(3);
    out.reserve((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
        push_tri(
            out,
            center,
            center + Vec2::from_angle(theta1) * radius,
            center + Vec2::from_angle(theta2) * radius,
            color,
        );
    }
}

/// Hollow circle between `inner_radius` and `outer_radius`
pub fn ring(
    out: &mut Vec<Vertex>,
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: Rgba,
    segments: u32,
) {
    let segments = segments.max(3);
    out.reserve((segments * 6) as usize);

    for i in 0..segments {
        let d1 = Vec2::from_angle((i as f32 / segments as f32) * TAU);
        let d2 = Vec2::from_angle(((i + 1) as f32 / segments as f32) * TAU);

        let inner1 = center + d1 * inner_radius;
        let outer1 = center + d1 * outer_radius;
        let inner2 = center + d2 * inner_radius;
        let outer2 = center + d2 * outer_radius;

        // Two triangles per segment
        push_tri(out, inner1, outer1, inner2, color);
        push_tri(out, inner2, outer1, outer2, color);
    }
}

/// Star outline: `spikes` points alternating between `radius` and
/// `radius + spike_len`, rotated by `rotation`
pub fn spiky_circle(
    out: &mut Vec<Vertex>,
    center: Vec2,
    radius: f32,
    spike_len: f32,
    spikes: u32,
    rotation: f32,
    color: Rgba,
) {
    let points = spikes.max(3) * 2;
    out.reserve((points * 3) as usize);

    let point = |k: u32| {
        let r = if k % 2 == 0 { radius + spike_len } else { radius };
        center + Vec2::from_angle(rotation + k as f32 / points as f32 * TAU) * r
    };
    for k in 0..points {
        push_tri(out, center, point(k), point(k + 1), color);
    }
}

/// Axis-aligned rectangle
pub fn rect(out: &mut Vec<Vertex>, min: Vec2, max: Vec2, color: Rgba) {
    let a = min;
    let b = Vec2::new(max.x, min.y);
    let c = max;
    let d = Vec2::new(min.x, max.y);
    push_tri(out, a, b, c, color);
    push_tri(out, a, c, d, color);
}

/// Line segment of `width` as a quad
pub fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: Rgba) {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    let perp = dir.perp() * (width / 2.0);
    push_tri(out, from + perp, from - perp, to + perp, color);
    push_tri(out, to + perp, from - perp, to - perp, color);
}

/// Rectangle outline of `width`, drawn outside `min`..`max`
pub fn frame(out: &mut Vec<Vertex>, min: Vec2, max: Vec2, width: f32, color: Rgba) {
    rect(out, Vec2::new(min.x - width, min.y - width), Vec2::new(max.x + width, min.y), color);
    rect(out, Vec2::new(min.x - width, max.y), Vec2::new(max.x + width, max.y + width), color);
    rect(out, Vec2::new(min.x - width, min.y), Vec2::new(min.x, max.y), color);
    rect(out, Vec2::new(max.x, min.y), Vec2::new(max.x + width, max.y), color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::WHITE;

    #[test]
    fn test_circle_vertex_count_and_extent() {
        let mut out = Vec::new();
        circle(&mut out, Vec2::new(10.0, 10.0), 5.0, WHITE, 16);
        assert_eq!(out.len(), 48);
        for v in &out {
            let p = Vec2::from(v.position);
            assert!(p.distance(Vec2::new(10.0, 10.0)) <= 5.0 + 1e-4);
        }
    }

    #[test]
    fn test_spiky_circle_reaches_spike_tips() {
        let mut out = Vec::new();
        spiky_circle(&mut out, Vec2::ZERO, 10.0, 2.0, 20, 0.0, WHITE);
        assert_eq!(out.len(), 40 * 3);
        let max = out
            .iter()
            .map(|v| Vec2::from(v.position).length())
            .fold(0.0, f32::max);
        assert!((max - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_line_is_skipped() {
        let mut out = Vec::new();
        line(&mut out, Vec2::ONE, Vec2::ONE, 2.0, WHITE);
        assert!(out.is_empty());
        line(&mut out, Vec2::ZERO, Vec2::X * 10.0, 2.0, WHITE);
        assert_eq!(out.len(), 6);
    }
}
