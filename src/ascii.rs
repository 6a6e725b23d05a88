//! ASCII rendering module for hex worlds
//!
//! Flat-top hexes are drawn in staggered columns: one column pair per `q`,
//! and every `r` step moves two lines down so odd columns sit half a row
//! lower than even ones.

use crate::terrain::TerrainType;
use crate::world::HexWorld;

/// Line and column of a tile in the rendered grid
fn cell_position(q: i32, r: i32, radius: i32) -> (usize, usize) {
    let line = 2 * r + q + 2 * radius;
    let column = 2 * (q + radius);
    (line as usize, column as usize)
}

/// Render the world as text, one symbol per tile.
pub fn render(world: &HexWorld) -> String {
    let radius = world.radius() as i32;
    let size = (4 * radius + 1) as usize;
    let mut grid = vec![vec![' '; size]; size];

    for tile in &world.tiles {
        let (line, column) = cell_position(tile.coord.q, tile.coord.r, radius);
        grid[line][column] = tile.terrain_type.symbol();
    }

    let mut result = String::with_capacity((size + 1) * size);
    for row in grid {
        let line: String = row.into_iter().collect();
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        result.push_str(trimmed);
        result.push('\n');
    }
    result
}

/// Generate legend for terrain symbols
pub fn legend() -> String {
    let mut legend = String::from("=== TERRAIN LEGEND ===\n");
    for terrain in TerrainType::ALL {
        legend.push_str(&format!("  {} {}\n", terrain.symbol(), terrain.name()));
    }
    legend
}

/// Seed, size, elevation range and terrain distribution of a world
pub fn summary(world: &HexWorld) -> String {
    let total = world.tiles.len().max(1);
    let (lo, hi) = world.elevation_range();

    let mut out = String::new();
    out.push_str("=== HEX WORLD ===\n");
    out.push_str(&format!("Seed: {}\n", world.seed));
    out.push_str(&format!("Radius: {} ({} tiles)\n", world.radius(), world.tiles.len()));
    out.push_str(&format!("Elevation: {:.3} to {:.3}\n", lo, hi));
    out.push_str(&format!("Water: {:.1}%\n", world.water_fraction() * 100.0));
    out.push_str("Terrain:\n");
    for (terrain, count) in world.terrain_counts() {
        out.push_str(&format!(
            "  {} {:<7} {:>6} ({:.1}%)\n",
            terrain.symbol(),
            terrain.name(),
            count,
            100.0 * count as f64 / total as f64
        ));
    }
    if world.anomalies.total() > 0 {
        out.push_str(&format!("Numeric anomalies: {}\n", world.anomalies.total()));
    }
    out
}
