//! File export for generated worlds: JSON tile dumps and PNG rasters

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{ImageBuffer, RgbImage};

use crate::error::{ConfigError, HexworldError};
use crate::hex::{self, SQRT3};
use crate::numeric::clamp01;
use crate::palette::{color_for, Rgb};
use crate::world::HexWorld;

/// Largest width or height of an exported raster
pub const MAX_PNG_DIMENSION: u32 = 16_384;

/// Raster export settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PngOptions {
    /// Image pixels per world unit
    pub pixels_per_unit: f64,
    /// Brighten land with height above the water surface
    pub elevation_shading: bool,
    /// Color of pixels outside the grid
    pub background: Rgb,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self {
            pixels_per_unit: 16.0,
            elevation_shading: true,
            background: Rgb::new(0x12, 0x16, 0x1c),
        }
    }
}

/// Write the world (seed, config, tiles) as pretty-printed JSON.
pub fn write_json(world: &HexWorld, path: &Path) -> Result<(), HexworldError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, world)?;
    log::info!("Wrote {} tiles to {}", world.tiles.len(), path.display());
    Ok(())
}

/// Half extents of the grid's bounding box in world units
fn half_extents(world: &HexWorld) -> (f64, f64) {
    let size = world.config.hex_size;
    let radius = world.radius() as f64;
    (size * (1.5 * radius + 1.0), size * SQRT3 * (radius + 0.5))
}

/// Land brightness factor from elevation above the water surface
fn elevation_shade(world: &HexWorld, elevation: f64) -> f64 {
    let surface = world.config.water_surface();
    let range = world.config.max_height() - surface;
    if range <= 0.0 {
        return 1.0;
    }
    0.75 + 0.25 * clamp01((elevation - surface) / range)
}

/// Rasterise with default options at the given scale.
pub fn render_png(world: &HexWorld, pixels_per_unit: f64) -> Result<RgbImage, HexworldError> {
    render_png_with(
        world,
        &PngOptions {
            pixels_per_unit,
            ..Default::default()
        },
    )
}

/// Rasterise the world: every pixel center is mapped back to the hex that
/// contains it and painted with that tile's display color.
pub fn render_png_with(world: &HexWorld, options: &PngOptions) -> Result<RgbImage, HexworldError> {
    let ppu = options.pixels_per_unit;
    if !ppu.is_finite() || ppu <= 0.0 {
        return Err(ConfigError::NotPositive {
            field: "pixelsPerUnit",
            value: ppu,
        }
        .into());
    }

    let (half_w, half_h) = half_extents(world);
    let width = (2.0 * half_w * ppu).ceil().max(1.0);
    let height = (2.0 * half_h * ppu).ceil().max(1.0);
    let largest = width.max(height);
    if largest > MAX_PNG_DIMENSION as f64 {
        return Err(ConfigError::OutOfRange {
            field: "imageDimension",
            value: largest,
            min: 1.0,
            max: MAX_PNG_DIMENSION as f64,
        }
        .into());
    }
    let (width, height) = (width as u32, height as u32);

    let mut img: RgbImage = ImageBuffer::new(width, height);
    for (px, py, pixel) in img.enumerate_pixels_mut() {
        let x = (px as f64 + 0.5) / ppu - half_w;
        let y = (py as f64 + 0.5) / ppu - half_h;
        let coord = hex::pixel_to_hex(x, y, world.config.hex_size);

        let color = match world.tile_at(coord) {
            Some(tile) => {
                let base = color_for(tile.terrain_type, tile.water_depth);
                if options.elevation_shading && !tile.terrain_type.is_water() {
                    base.shade(elevation_shade(world, tile.elevation))
                } else {
                    base
                }
            }
            None => options.background,
        };
        *pixel = color.into();
    }

    Ok(img)
}

/// Rasterise and save as PNG.
pub fn write_png(world: &HexWorld, path: &Path, pixels_per_unit: f64) -> Result<(), HexworldError> {
    let img = render_png(world, pixels_per_unit)?;
    img.save(path)?;
    log::info!(
        "Wrote {}x{} map image to {}",
        img.width(),
        img.height(),
        path.display()
    );
    Ok(())
}
