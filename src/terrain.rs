//! Terrain classification
//!
//! Turns a raw height plus its local neighborhood into one of seven terrain
//! types. Land bands are measured as a fraction of the land range (water
//! surface up to maximum height); cliff and plateau tests compare height
//! differences as fractions of `grid_height`.

use serde::{Deserialize, Serialize};

use crate::config::{ClassifierParams, GenerationConfig, TerrainBands};
use crate::heightmap::HeightField;
use crate::hex::{self, HexCoord, RING2_OFFSETS};
use crate::numeric::clamp01;

/// Discrete terrain classification, ordered from lowest to highest band
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainType {
    Water,
    Shore,
    Beach,
    Shrub,
    Forest,
    Stone,
    Snow,
}

impl TerrainType {
    pub const ALL: [TerrainType; 7] = [
        TerrainType::Water,
        TerrainType::Shore,
        TerrainType::Beach,
        TerrainType::Shrub,
        TerrainType::Forest,
        TerrainType::Stone,
        TerrainType::Snow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TerrainType::Water => "water",
            TerrainType::Shore => "shore",
            TerrainType::Beach => "beach",
            TerrainType::Shrub => "shrub",
            TerrainType::Forest => "forest",
            TerrainType::Stone => "stone",
            TerrainType::Snow => "snow",
        }
    }

    /// Single character used by the ASCII renderer
    pub fn symbol(&self) -> char {
        match self {
            TerrainType::Water => '~',
            TerrainType::Shore => ',',
            TerrainType::Beach => '.',
            TerrainType::Shrub => '"',
            TerrainType::Forest => 'T',
            TerrainType::Stone => '^',
            TerrainType::Snow => '*',
        }
    }

    /// Position in the band order, 0 for water up to 6 for snow
    pub fn band_rank(&self) -> u8 {
        *self as u8
    }

    pub fn is_water(&self) -> bool {
        matches!(self, TerrainType::Water)
    }

    /// The next band down, used to soften plateau interiors.
    pub fn one_band_down(&self) -> TerrainType {
        match self {
            TerrainType::Snow => TerrainType::Stone,
            TerrainType::Stone => TerrainType::Forest,
            TerrainType::Forest => TerrainType::Shrub,
            TerrainType::Shrub => TerrainType::Beach,
            TerrainType::Beach => TerrainType::Shore,
            TerrainType::Shore | TerrainType::Water => *self,
        }
    }
}

impl std::fmt::Display for TerrainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// NEIGHBORHOOD
// =============================================================================

/// In-grid neighbor heights around one tile plus its distance to water.
///
/// Ring 2 is only consulted when ring 1 holds no water, so `heights` holds
/// either the ring-1 cells or the ring-1 and ring-2 cells together.
#[derive(Clone, Debug, PartialEq)]
pub struct Neighborhood {
    pub heights: Vec<f64>,
    /// 1 = adjacent water, 0.5 = water two steps away, 0 = none nearby
    pub water_proximity: f64,
}

impl Neighborhood {
    /// Collect neighbor heights from a height field, skipping cells outside the grid.
    pub fn gather(field: &HeightField, coord: HexCoord) -> Self {
        let ring1: Vec<f64> = hex::neighbors(coord)
            .into_iter()
            .filter_map(|n| field.height_in_grid(n))
            .collect();
        let water_surface = field.config().water_surface();

        // Ring 2 is skipped when ring 1 already decided proximity
        let needs_ring2 = !ring1.is_empty() && !ring1.iter().any(|&h| h < water_surface);
        let ring2: Vec<f64> = if needs_ring2 {
            RING2_OFFSETS
                .iter()
                .filter_map(|&d| field.height_in_grid(coord.offset(d)))
                .collect()
        } else {
            Vec::new()
        };

        Self::from_rings(&ring1, &ring2, water_surface)
    }

    /// Build from explicit ring heights.
    pub fn from_rings(ring1: &[f64], ring2: &[f64], water_surface: f64) -> Self {
        let mut heights = ring1.to_vec();
        let mut water_proximity = 0.0;

        if ring1.iter().any(|&h| h < water_surface) {
            water_proximity = 1.0;
        } else if !ring1.is_empty() {
            heights.extend_from_slice(ring2);
            if ring2.iter().any(|&h| h < water_surface) {
                water_proximity = 0.5;
            }
        }

        Self {
            heights,
            water_proximity,
        }
    }

    /// No in-grid neighbors at all (single-tile grids).
    pub fn empty() -> Self {
        Self {
            heights: Vec::new(),
            water_proximity: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn near_water(&self) -> bool {
        self.water_proximity > 0.0
    }

    pub fn min_height(&self) -> Option<f64> {
        self.heights.iter().copied().reduce(f64::min)
    }
}

/// Result of comparing a tile against its neighbors' heights
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlateauCheck {
    /// Most neighbors sit at nearly the same height
    pub is_plateau: bool,
    /// A plateau tile with at least one steep drop next to it
    pub is_edge: bool,
}

impl PlateauCheck {
    /// Interior of a flat area: level with its neighbors and not on a drop.
    pub fn is_interior(&self) -> bool {
        self.is_plateau && !self.is_edge
    }
}

pub fn plateau_check(
    height: f64,
    neighbors: &[f64],
    grid_height: f64,
    params: &ClassifierParams,
) -> PlateauCheck {
    if neighbors.len() < params.plateau_min_neighbors {
        return PlateauCheck::default();
    }

    let diffs: Vec<f64> = neighbors
        .iter()
        .map(|&nh| (height - nh).abs() / grid_height)
        .collect();
    let similar = diffs.iter().filter(|&&d| d < params.plateau_similarity).count();
    let steep = diffs.iter().any(|&d| d > params.edge_threshold);

    let needed = (params.plateau_count_cap as f64).min(neighbors.len() as f64 * params.plateau_fraction);
    let is_plateau = similar as f64 >= needed;

    PlateauCheck {
        is_plateau,
        is_edge: is_plateau && steep,
    }
}

/// A near-water tile rising steeply above its lowest neighbor.
pub fn is_cliff(
    height: f64,
    neighborhood: &Neighborhood,
    grid_height: f64,
    params: &ClassifierParams,
) -> bool {
    if !neighborhood.near_water() {
        return false;
    }
    match neighborhood.min_height() {
        Some(lowest) => (height - lowest) / grid_height > params.cliff_threshold,
        None => false,
    }
}

// =============================================================================
// CLASSIFIER
// =============================================================================

/// Terrain decision for one tile
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub terrain_type: TerrainType,
    /// `[0, 1]` for water (0 = deepest), 0 for land
    pub water_depth: f64,
    /// Display height: raw height, raised to the water surface for water tiles
    pub elevation: f64,
}

/// Band thresholds and absolute levels derived from one config
#[derive(Clone, Debug)]
pub struct TerrainClassifier {
    bands: TerrainBands,
    params: ClassifierParams,
    base_height: f64,
    grid_height: f64,
    water_surface: f64,
    land_range: f64,
}

impl TerrainClassifier {
    pub fn new(config: &GenerationConfig) -> Self {
        let water_surface = config.water_surface();
        Self {
            bands: config.bands(),
            params: config.classifier,
            base_height: config.base_height,
            grid_height: config.grid_height,
            water_surface,
            land_range: config.max_height() - water_surface,
        }
    }

    pub fn water_surface(&self) -> f64 {
        self.water_surface
    }

    /// Fraction of the land range a height sits above the water surface.
    pub fn height_ratio(&self, height: f64) -> f64 {
        if self.land_range > 0.0 {
            (height - self.water_surface) / self.land_range
        } else {
            1.0
        }
    }

    /// Normalized water depth: 0 at the base height, approaching 1 at the surface.
    pub fn water_depth(&self, height: f64) -> f64 {
        let depth_range = self.water_surface - self.base_height;
        if depth_range > 0.0 {
            clamp01((height - self.base_height) / depth_range)
        } else {
            0.0
        }
    }

    /// Classify the tile at `coord` of a height field.
    pub fn classify_coord(&self, field: &HeightField, coord: HexCoord) -> Classification {
        let sample = field.sample(coord);
        if sample.height < self.water_surface {
            return self.classify(sample.height, &Neighborhood::empty(), sample.mountain_tendency);
        }
        let neighborhood = Neighborhood::gather(field, coord);
        self.classify(sample.height, &neighborhood, sample.mountain_tendency)
    }

    /// Classify a raw height given its neighborhood and regional mountain tendency.
    pub fn classify(
        &self,
        height: f64,
        neighborhood: &Neighborhood,
        mountain_tendency: f64,
    ) -> Classification {
        if height < self.water_surface {
            return Classification {
                terrain_type: TerrainType::Water,
                water_depth: self.water_depth(height),
                elevation: self.water_surface,
            };
        }

        Classification {
            terrain_type: self.land_type(height, neighborhood, mountain_tendency),
            water_depth: 0.0,
            elevation: height,
        }
    }

    fn land_type(&self, height: f64, neighborhood: &Neighborhood, mountain_tendency: f64) -> TerrainType {
        let bands = &self.bands;
        let params = &self.params;
        let ratio = self.height_ratio(height);
        let near_water = neighborhood.near_water();

        let cliff = params.cliffs && is_cliff(height, neighborhood, self.grid_height, params);
        let plateau = || {
            if params.plateaus {
                plateau_check(height, &neighborhood.heights, self.grid_height, params)
            } else {
                PlateauCheck::default()
            }
        };

        if ratio < bands.shore && near_water {
            return if cliff { TerrainType::Stone } else { TerrainType::Shore };
        }
        if ratio < bands.beach && near_water {
            return if cliff { TerrainType::Stone } else { TerrainType::Beach };
        }
        if ratio < bands.shrub {
            return TerrainType::Shrub;
        }
        if ratio < bands.forest {
            return TerrainType::Forest;
        }
        if ratio < bands.stone {
            return if plateau().is_interior() {
                TerrainType::Forest
            } else {
                TerrainType::Stone
            };
        }
        if ratio < bands.snow {
            // Without neighbors only height decides
            if neighborhood.is_empty() {
                return TerrainType::Stone;
            }
            let candidate = if self.snow_candidate(ratio, neighborhood, mountain_tendency) {
                TerrainType::Snow
            } else {
                TerrainType::Stone
            };
            return if plateau().is_interior() {
                candidate.one_band_down()
            } else {
                candidate
            };
        }

        if neighborhood.is_empty() || ratio > params.peak_snow {
            return TerrainType::Snow;
        }
        if plateau().is_interior() {
            TerrainType::Stone
        } else {
            TerrainType::Snow
        }
    }

    /// Snow below the snow band needs a mountainous region, an all-rock
    /// neighborhood, and either snowy neighbors or a height near the top.
    fn snow_candidate(&self, ratio: f64, neighborhood: &Neighborhood, mountain_tendency: f64) -> bool {
        let bands = &self.bands;
        let params = &self.params;

        if mountain_tendency <= params.snow_mountain_threshold {
            return false;
        }
        let all_stone = neighborhood
            .heights
            .iter()
            .all(|&nh| self.height_ratio(nh) > bands.stone);
        if !all_stone {
            return false;
        }
        let snowy_neighbor = neighborhood
            .heights
            .iter()
            .any(|&nh| self.height_ratio(nh) > bands.snow);
        snowy_neighbor || ratio > bands.snow - params.snow_margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // base 1.5, grid height 10, water 0.3: surface 4.5, land range 7.0
    fn example_config() -> GenerationConfig {
        GenerationConfig {
            radius: 5,
            grid_height: 10.0,
            water_level: 0.3,
            terrain_bands: Some(TerrainBands {
                shore: 0.1,
                beach: 0.2,
                shrub: 0.3,
                forest: 0.55,
                stone: 0.8,
                snow: 0.9,
            }),
            ..Default::default()
        }
    }

    fn at_ratio(ratio: f64) -> f64 {
        4.5 + 7.0 * ratio
    }

    fn classifier() -> TerrainClassifier {
        TerrainClassifier::new(&example_config())
    }

    fn bare_classifier() -> TerrainClassifier {
        let mut config = example_config();
        config.classifier.cliffs = false;
        config.classifier.plateaus = false;
        TerrainClassifier::new(&config)
    }

    #[test]
    fn test_water_depth_formula() {
        let c = classifier();
        let deep = c.classify(1.5, &Neighborhood::empty(), 0.0);
        assert_eq!(deep.terrain_type, TerrainType::Water);
        assert_eq!(deep.water_depth, 0.0);
        assert_eq!(deep.elevation, 4.5);

        let mid = c.classify(3.0, &Neighborhood::empty(), 0.0);
        assert!((mid.water_depth - 0.5).abs() < 1e-12);

        let shallow = c.classify(4.4, &Neighborhood::empty(), 0.0);
        assert!(shallow.water_depth > mid.water_depth);
        assert!(shallow.water_depth < 1.0);
    }

    #[test]
    fn test_land_keeps_raw_elevation() {
        let c = classifier();
        let result = c.classify(at_ratio(0.4), &Neighborhood::empty(), 0.0);
        assert_eq!(result.terrain_type, TerrainType::Forest);
        assert_eq!(result.water_depth, 0.0);
        assert_eq!(result.elevation, at_ratio(0.4));
    }

    #[test]
    fn test_water_proximity() {
        let dry = [at_ratio(0.2); 6];
        let wet = [at_ratio(0.2), 3.0, at_ratio(0.2)];

        let adjacent = Neighborhood::from_rings(&wet, &dry, 4.5);
        assert_eq!(adjacent.water_proximity, 1.0);
        assert_eq!(adjacent.heights.len(), 3);

        let two_away = Neighborhood::from_rings(&dry, &wet, 4.5);
        assert_eq!(two_away.water_proximity, 0.5);
        assert_eq!(two_away.heights.len(), 9);

        let none = Neighborhood::from_rings(&dry, &dry, 4.5);
        assert_eq!(none.water_proximity, 0.0);
        assert_eq!(none.heights.len(), 12);

        // Ring 2 is never consulted without ring-1 neighbors
        let orphan = Neighborhood::from_rings(&[], &wet, 4.5);
        assert_eq!(orphan.water_proximity, 0.0);
        assert!(orphan.is_empty());
    }

    #[test]
    fn test_shore_and_beach_need_water() {
        let c = classifier();
        let coast = Neighborhood::from_rings(&[4.0, at_ratio(0.05)], &[], 4.5);
        let inland = Neighborhood::from_rings(&[at_ratio(0.05); 6], &[at_ratio(0.05); 12], 4.5);

        assert_eq!(c.classify(at_ratio(0.05), &coast, 0.0).terrain_type, TerrainType::Shore);
        assert_eq!(c.classify(at_ratio(0.15), &coast, 0.0).terrain_type, TerrainType::Beach);
        assert_eq!(c.classify(at_ratio(0.05), &inland, 0.0).terrain_type, TerrainType::Shrub);
        assert_eq!(c.classify(at_ratio(0.15), &inland, 0.0).terrain_type, TerrainType::Shrub);
    }

    #[test]
    fn test_coastal_cliff_becomes_stone() {
        let c = classifier();
        // Lowest neighbor is 3.3 below: 0.33 of grid height
        let coast = Neighborhood::from_rings(&[at_ratio(0.15) - 3.3, at_ratio(0.15)], &[], 4.5);
        assert!(is_cliff(at_ratio(0.15), &coast, 10.0, &ClassifierParams::default()));
        assert_eq!(c.classify(at_ratio(0.15), &coast, 0.0).terrain_type, TerrainType::Stone);
        assert_eq!(bare_classifier().classify(at_ratio(0.15), &coast, 0.0).terrain_type, TerrainType::Beach);

        // A gentle slope stays a beach
        let gentle = Neighborhood::from_rings(&[4.3, at_ratio(0.15)], &[], 4.5);
        assert_eq!(c.classify(at_ratio(0.15), &gentle, 0.0).terrain_type, TerrainType::Beach);
    }

    #[test]
    fn test_plateau_check() {
        let params = ClassifierParams::default();
        let flat = [7.0, 7.1, 6.9, 7.05, 7.0, 6.95];
        let check = plateau_check(7.0, &flat, 10.0, &params);
        assert!(check.is_plateau);
        assert!(!check.is_edge);

        let drop = [7.0, 7.1, 6.9, 7.05, 7.0, 4.0];
        let check = plateau_check(7.0, &drop, 10.0, &params);
        assert!(check.is_plateau);
        assert!(check.is_edge);

        let rough = [5.0, 9.0, 6.0, 8.5, 7.0, 4.0];
        assert!(!plateau_check(7.0, &rough, 10.0, &params).is_plateau);

        // Too few neighbors never form a plateau
        assert_eq!(plateau_check(7.0, &[7.0, 7.0], 10.0, &params), PlateauCheck::default());
    }

    #[test]
    fn test_plateau_interior_softens_stone() {
        let c = classifier();
        let h = at_ratio(0.7);
        let flat = Neighborhood::from_rings(&[h; 6], &[h; 12], 4.5);
        assert_eq!(c.classify(h, &flat, 0.0).terrain_type, TerrainType::Forest);

        let mut ring1 = [h; 6];
        ring1[0] = h - 2.0;
        let edge = Neighborhood::from_rings(&ring1, &[h; 12], 4.5);
        assert_eq!(c.classify(h, &edge, 0.0).terrain_type, TerrainType::Stone);

        assert_eq!(bare_classifier().classify(h, &flat, 0.0).terrain_type, TerrainType::Stone);
    }

    #[test]
    fn test_snow_below_snow_band() {
        let c = bare_classifier();
        let h = at_ratio(0.85);
        let rocky = Neighborhood::from_rings(&[at_ratio(0.82); 6], &[at_ratio(0.95); 12], 4.5);

        // Needs a mountainous region
        assert_eq!(c.classify(h, &rocky, 0.3).terrain_type, TerrainType::Stone);
        assert_eq!(c.classify(h, &rocky, 0.9).terrain_type, TerrainType::Snow);

        // Needs every neighbor above the stone band
        let mixed = Neighborhood::from_rings(&[at_ratio(0.82), at_ratio(0.6)], &[at_ratio(0.95); 12], 4.5);
        assert_eq!(c.classify(h, &mixed, 0.9).terrain_type, TerrainType::Stone);

        // Without snowy neighbors, only tiles near the top qualify
        let bare_rock = Neighborhood::from_rings(&[at_ratio(0.82); 6], &[at_ratio(0.82); 12], 4.5);
        assert_eq!(c.classify(h, &bare_rock, 0.9).terrain_type, TerrainType::Stone);
        assert_eq!(c.classify(at_ratio(0.88), &bare_rock, 0.9).terrain_type, TerrainType::Snow);
    }

    #[test]
    fn test_peaks_are_always_snow() {
        let c = classifier();
        let h = at_ratio(0.97);
        let flat = Neighborhood::from_rings(&[h; 6], &[h; 12], 4.5);
        assert_eq!(c.classify(h, &flat, 0.0).terrain_type, TerrainType::Snow);

        // A flat interior just above the snow band softens to stone
        let h = at_ratio(0.92);
        let flat = Neighborhood::from_rings(&[h; 6], &[h; 12], 4.5);
        assert_eq!(c.classify(h, &flat, 0.0).terrain_type, TerrainType::Stone);
        assert_eq!(bare_classifier().classify(h, &flat, 0.0).terrain_type, TerrainType::Snow);
    }

    #[test]
    fn test_isolated_tile_uses_height_only() {
        let c = classifier();
        let alone = Neighborhood::empty();
        assert_eq!(c.classify(at_ratio(0.05), &alone, 1.0).terrain_type, TerrainType::Shrub);
        assert_eq!(c.classify(at_ratio(0.5), &alone, 1.0).terrain_type, TerrainType::Forest);
        assert_eq!(c.classify(at_ratio(0.7), &alone, 1.0).terrain_type, TerrainType::Stone);
        assert_eq!(c.classify(at_ratio(0.85), &alone, 1.0).terrain_type, TerrainType::Stone);
        assert_eq!(c.classify(at_ratio(0.91), &alone, 0.0).terrain_type, TerrainType::Snow);
    }

    #[test]
    fn test_band_monotonicity_without_overrides() {
        let c = bare_classifier();
        let neighborhoods = [
            Neighborhood::empty(),
            Neighborhood::from_rings(&[3.0, at_ratio(0.5)], &[], 4.5),
            Neighborhood::from_rings(&[at_ratio(0.5); 6], &[at_ratio(0.2); 12], 4.5),
            Neighborhood::from_rings(&[at_ratio(0.85); 6], &[at_ratio(0.95); 12], 4.5),
        ];
        for neighborhood in &neighborhoods {
            for mountain in [0.0, 0.7, 1.0] {
                let mut last = 0u8;
                for step in 0..=1000 {
                    let h = 1.5 + 10.0 * step as f64 / 1000.0;
                    let rank = c.classify(h, neighborhood, mountain).terrain_type.band_rank();
                    assert!(rank >= last, "band dropped at height {} ({:?})", h, neighborhood);
                    last = rank;
                }
            }
        }
    }

    #[test]
    fn test_classify_coord_matches_manual_gather() {
        let config = example_config();
        let field = HeightField::new(&config, 42.0).unwrap();
        let c = TerrainClassifier::new(&config);
        for coord in hex::hexes_in_radius(config.radius) {
            let sample = field.sample(coord);
            let expected = c.classify(sample.height, &Neighborhood::gather(&field, coord), sample.mountain_tendency);
            assert_eq!(c.classify_coord(&field, coord), expected);
        }
    }

    #[test]
    fn test_gather_skips_out_of_grid_neighbors() {
        let config = GenerationConfig {
            radius: 0,
            ..example_config()
        };
        let field = HeightField::new(&config, 42.0).unwrap();
        let neighborhood = Neighborhood::gather(&field, HexCoord::ORIGIN);
        assert!(neighborhood.is_empty());
        assert_eq!(neighborhood.water_proximity, 0.0);
    }

    #[test]
    fn test_terrain_type_order_and_names() {
        for pair in TerrainType::ALL.windows(2) {
            assert!(pair[0].band_rank() < pair[1].band_rank());
        }
        assert_eq!(TerrainType::Snow.one_band_down(), TerrainType::Stone);
        assert_eq!(TerrainType::Stone.one_band_down(), TerrainType::Forest);
        assert_eq!(serde_json::to_string(&TerrainType::Beach).unwrap(), "\"beach\"");
        assert_eq!(TerrainType::Forest.to_string(), "forest");
    }
}
