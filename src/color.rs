//! Linear RGBA colors and parsing from CSS-style strings

/// RGBA color with components in 0..=1 (matches the vertex color layout)
pub type Rgba = [f32; 4];

pub const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];
pub const VIRUS_GREEN: Rgba = [0.2, 1.0, 0.2, 1.0];
pub const PORTAL_PINK: Rgba = [0.925, 0.282, 0.6, 1.0];
pub const GOLD: Rgba = [1.0, 0.843, 0.0, 1.0];

/// Parse `#rrggbb` or `#rgb` into a color
pub fn parse_hex(s: &str) -> Option<Rgba> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |h: &str| u8::from_str_radix(h, 16).ok().map(|v| v as f32 / 255.0);

    match hex.len() {
        6 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            1.0,
        ]),
        3 => {
            let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17.0);
            Some([short(0)?, short(1)?, short(2)?, 1.0])
        }
        _ => None,
    }
}

/// HSL (hue in degrees, saturation/lightness in 0..=1) to RGBA
pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Rgba {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    [r + m, g + m, b + m, 1.0]
}

/// Same color with a different alpha
#[inline]
pub fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
}

/// Scale RGB toward black (`factor` 1 = unchanged)
#[inline]
pub fn darken(color: Rgba, factor: f32) -> Rgba {
    [color[0] * factor, color[1] * factor, color[2] * factor, color[3]]
}
