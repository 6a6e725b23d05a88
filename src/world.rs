//! World data container module
//!
//! Runs a full generation pass and bundles the resulting tiles with the
//! inputs that produced them.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;
use crate::diagnostics::AnomalyCounts;
use crate::error::ConfigError;
use crate::heightmap::HeightField;
use crate::hex::{self, HexCoord};
use crate::hexmap::{index_in_radius, HexMap};
use crate::terrain::{TerrainClassifier, TerrainType};

/// One generated hex tile
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    /// Canonical `"q,r,s"` id
    pub id: String,
    pub coord: HexCoord,
    /// Display height; water tiles sit at the water surface
    pub elevation: f64,
    pub terrain_type: TerrainType,
    /// `[0, 1]` for water (0 = deepest), 0 for land
    pub water_depth: f64,
}

/// Generate one tile per input coordinate, in input order.
///
/// Heights are filled in parallel first, then every tile is classified in
/// parallel against the completed height cache.
pub fn generate_terrain(
    coords: &[HexCoord],
    config: &GenerationConfig,
    seed: f64,
) -> Result<Vec<Tile>, ConfigError> {
    let field = HeightField::new(config, seed)?;
    let tiles = classify_all(&field, coords);
    field.diagnostics().log_summary();
    Ok(tiles)
}

fn classify_all(field: &HeightField, coords: &[HexCoord]) -> Vec<Tile> {
    let classifier = TerrainClassifier::new(field.config());
    field.fill_parallel();

    coords
        .par_iter()
        .map(|&coord| {
            let result = classifier.classify_coord(field, coord);
            Tile {
                id: coord.id(),
                coord,
                elevation: result.elevation,
                terrain_type: result.terrain_type,
                water_depth: result.water_depth,
            }
        })
        .collect()
}

/// A fully generated hex map
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HexWorld {
    /// Seed actually used (a non-finite request is replaced)
    pub seed: f64,
    pub config: GenerationConfig,
    /// One tile per cell, ordered as `hexes_in_radius(config.radius)`
    pub tiles: Vec<Tile>,
    pub anomalies: AnomalyCounts,
}

impl HexWorld {
    /// Generate every tile within `config.radius`.
    pub fn generate(config: &GenerationConfig, seed: f64) -> Result<Self, ConfigError> {
        let field = HeightField::new(config, seed)?;
        let coords = hex::hexes_in_radius(config.radius);
        let tiles = classify_all(&field, &coords);

        let diagnostics = field.diagnostics();
        diagnostics.log_summary();
        log::info!(
            "Generated {} tiles (radius {}, seed {})",
            tiles.len(),
            config.radius,
            field.seed()
        );

        Ok(Self {
            seed: field.seed(),
            config: config.clone(),
            tiles,
            anomalies: diagnostics.counts(),
        })
    }

    /// Convenience accessor for the grid radius
    pub fn radius(&self) -> u32 {
        self.config.radius
    }

    pub fn tile_at(&self, coord: HexCoord) -> Option<&Tile> {
        let index = index_in_radius(self.config.radius, coord)?;
        self.tiles.get(index)
    }

    /// Tiles keyed by coordinate, for random access by renderers
    pub fn tile_map(&self) -> HexMap<Option<&Tile>> {
        let mut map = HexMap::new_with(self.config.radius, None);
        for tile in &self.tiles {
            map.set(tile.coord, Some(tile));
        }
        map
    }

    pub fn terrain_counts(&self) -> BTreeMap<TerrainType, usize> {
        let mut counts = BTreeMap::new();
        for tile in &self.tiles {
            *counts.entry(tile.terrain_type).or_insert(0) += 1;
        }
        counts
    }

    /// Lowest and highest display elevation
    pub fn elevation_range(&self) -> (f64, f64) {
        self.tiles.iter().fold((f64::MAX, f64::MIN), |(lo, hi), t| {
            (lo.min(t.elevation), hi.max(t.elevation))
        })
    }

    /// Share of tiles that are water, `[0, 1]`
    pub fn water_fraction(&self) -> f64 {
        if self.tiles.is_empty() {
            return 0.0;
        }
        let water = self.tiles.iter().filter(|t| t.terrain_type.is_water()).count();
        water as f64 / self.tiles.len() as f64
    }
}
