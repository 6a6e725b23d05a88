//! Display colors for terrain types

use serde::{Deserialize, Serialize};

use crate::numeric::clamp01;
use crate::terrain::TerrainType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn to_hex_string(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Scale every channel by `factor` (clamped to `[0, 1]`).
    pub fn shade(&self, factor: f64) -> Rgb {
        let f = clamp01(factor);
        Rgb::new(
            (self.r as f64 * f).floor() as u8,
            (self.g as f64 * f).floor() as u8,
            (self.b as f64 * f).floor() as u8,
        )
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(c: Rgb) -> Self {
        image::Rgb([c.r, c.g, c.b])
    }
}

/// Base palette color of a terrain type
pub fn terrain_color(terrain: TerrainType) -> Rgb {
    match terrain {
        TerrainType::Water => Rgb::new(0x3a, 0x86, 0xc8),
        TerrainType::Shore => Rgb::new(0xd9, 0xc8, 0x8f),
        TerrainType::Beach => Rgb::new(0xe8, 0xd6, 0xa0),
        TerrainType::Shrub => Rgb::new(0x9e, 0xa6, 0x67),
        TerrainType::Forest => Rgb::new(0x4f, 0x6b, 0x3a),
        TerrainType::Stone => Rgb::new(0x65, 0x65, 0x65),
        TerrainType::Snow => Rgb::new(0xf2, 0xf4, 0xf7),
    }
}

/// Display color of a tile.
///
/// Water darkens towards the deepest point: red and green are scaled by
/// `0.5 + depth * 0.5`, blue stays put. `water_depth` is ignored for land.
pub fn color_for(terrain: TerrainType, water_depth: f64) -> Rgb {
    let base = terrain_color(terrain);
    if !terrain.is_water() {
        return base;
    }
    let factor = 0.5 + clamp01(water_depth) * 0.5;
    Rgb::new(
        (base.r as f64 * factor).floor() as u8,
        (base.g as f64 * factor).floor() as u8,
        base.b,
    )
}
