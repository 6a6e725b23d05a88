//! Generation configuration
//!
//! Everything a generation run needs besides the seed. Configs are plain data:
//! they can be built in code, read from JSON (camelCase keys, every field
//! optional), and are checked once by [`GenerationConfig::validate`] before any
//! sampling happens.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, HexworldError};

/// Largest supported grid radius (about 12.6 million tiles).
pub const MAX_RADIUS: u32 = 2048;

/// Parameters for a single terrain generation run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Number of rings around the center tile
    pub radius: u32,
    /// World-space size of one hex (sampling only, not topology)
    pub hex_size: f64,
    /// Vertical scale applied to normalized elevation
    pub grid_height: f64,
    /// Height of the lowest possible tile
    pub base_height: f64,
    /// Feature size; larger values give broader landmasses
    pub noise_scale: f64,
    /// Frequency multiplier of the medium-feature octave
    pub noise_detail: f64,
    /// Blend weight of the medium octave against the large one
    pub noise_fuzziness: f64,
    /// Fraction of `grid_height` above `base_height` that is submerged
    pub water_level: f64,
    /// Explicit band thresholds. Derived from `water_level` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain_bands: Option<TerrainBands>,
    pub shaping: ShapingParams,
    pub classifier: ClassifierParams,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            radius: 10,
            hex_size: 1.0,
            grid_height: 6.0,
            base_height: 1.5,
            noise_scale: 1.2,
            noise_detail: 0.5,
            noise_fuzziness: 0.5,
            water_level: 0.3,
            terrain_bands: None,
            shaping: ShapingParams::default(),
            classifier: ClassifierParams::default(),
        }
    }
}

impl GenerationConfig {
    /// Band thresholds in effect for this config.
    pub fn bands(&self) -> TerrainBands {
        self.terrain_bands
            .unwrap_or_else(|| TerrainBands::for_water_level(self.water_level))
    }

    /// Absolute height of the water surface.
    pub fn water_surface(&self) -> f64 {
        self.base_height + self.water_level * self.grid_height
    }

    /// Absolute height of the highest possible tile.
    pub fn max_height(&self) -> f64 {
        self.base_height + self.grid_height
    }

    /// Check every field once, before generation starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radius > MAX_RADIUS {
            return Err(ConfigError::RadiusTooLarge {
                radius: self.radius,
                max: MAX_RADIUS,
            });
        }
        positive("hexSize", self.hex_size)?;
        positive("gridHeight", self.grid_height)?;
        positive("noiseScale", self.noise_scale)?;
        finite("baseHeight", self.base_height)?;
        finite("noiseDetail", self.noise_detail)?;
        finite("noiseFuzziness", self.noise_fuzziness)?;
        in_range("waterLevel", self.water_level, 0.0, 1.0)?;
        self.bands().validate()?;
        self.shaping.validate()?;
        self.classifier.validate()?;
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, HexworldError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a config file. Missing fields take their defaults.
    pub fn load_json(path: &Path) -> Result<Self, HexworldError> {
        let text = fs::read_to_string(path).map_err(|source| HexworldError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

/// Upper bounds of each land band, as fractions of the land range (water
/// surface up to `base_height + grid_height`). Must be strictly ascending.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainBands {
    pub shore: f64,
    pub beach: f64,
    pub shrub: f64,
    pub forest: f64,
    pub stone: f64,
    pub snow: f64,
}

impl Default for TerrainBands {
    fn default() -> Self {
        Self::for_water_level(GenerationConfig::default().water_level)
    }
}

impl TerrainBands {
    /// Bands that widen the coast as the water level falls.
    ///
    /// Always ascending for any water level.
    pub fn for_water_level(water_level: f64) -> Self {
        let dryness = 1.0 - water_level.clamp(0.2, 0.8);
        Self {
            shore: 0.08,
            beach: 0.1 + 0.1 * dryness,
            shrub: 0.25 + 0.1 * dryness,
            forest: 0.55 + 0.1 * dryness,
            stone: 0.75,
            snow: 0.92,
        }
    }

    fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("shore", self.shore),
            ("beach", self.beach),
            ("shrub", self.shrub),
            ("forest", self.forest),
            ("stone", self.stone),
            ("snow", self.snow),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = self.named();
        for (field, value) in named {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        for pair in named.windows(2) {
            let (lower, lower_value) = pair[0];
            let (upper, upper_value) = pair[1];
            if upper_value <= lower_value {
                return Err(ConfigError::BandsNotAscending {
                    lower,
                    lower_value,
                    upper,
                    upper_value,
                });
            }
        }
        Ok(())
    }
}

/// Shape controls for the height field
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapingParams {
    /// Warp noise frequency as a multiple of `noise_scale` (clamped to [0.1, 2])
    pub warp_frequency: f64,
    /// Maximum warp displacement, in grid extents (radius * hex_size)
    pub warp_strength: f64,
    /// Frequency of the ocean/mountain tendency fields
    pub region_scale: f64,
    /// Exponent applied to ocean tendency before it pulls terrain down
    pub ocean_exponent: f64,
    /// Elevation gain where ocean tendency is zero
    pub ocean_gain: f64,
    /// Elevation removed at full ocean tendency
    pub ocean_pull: f64,
    /// Weight of the center falloff in the island profile
    pub island_blend: f64,
    /// Minimum local island weight, regardless of ocean tendency
    pub island_floor: f64,
    /// Elevation above which mountain shaping applies
    pub mountain_threshold: f64,
    /// Peak sharpening exponent (>= 1.5 gives pointed peaks)
    pub mountain_exponent: f64,
    /// Extra height gained by peaks in mountainous regions
    pub mountain_gain: f64,
    /// Bonus for the highest peaks in very mountainous regions
    pub peak_bonus: f64,
    /// Variety noise level above which spikes appear
    pub spike_threshold: f64,
    /// Largest single spike
    pub spike_max: f64,
}

impl Default for ShapingParams {
    fn default() -> Self {
        Self {
            warp_frequency: 0.5,
            warp_strength: 0.5,
            region_scale: 0.3,
            ocean_exponent: 1.5,
            ocean_gain: 1.6,
            ocean_pull: 0.3,
            island_blend: 0.3,
            island_floor: 0.3,
            mountain_threshold: 0.3,
            mountain_exponent: 1.5,
            mountain_gain: 0.8,
            peak_bonus: 0.5,
            spike_threshold: 0.8,
            spike_max: 0.4,
        }
    }
}

impl ShapingParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("shaping.warpFrequency", self.warp_frequency)?;
        finite("shaping.warpStrength", self.warp_strength)?;
        positive("shaping.regionScale", self.region_scale)?;
        positive("shaping.oceanExponent", self.ocean_exponent)?;
        finite("shaping.oceanGain", self.ocean_gain)?;
        finite("shaping.oceanPull", self.ocean_pull)?;
        in_range("shaping.islandBlend", self.island_blend, 0.0, 1.0)?;
        in_range("shaping.islandFloor", self.island_floor, 0.0, 1.0)?;
        in_range("shaping.mountainThreshold", self.mountain_threshold, 0.0, 0.99)?;
        in_range("shaping.mountainExponent", self.mountain_exponent, 1.0, 8.0)?;
        finite("shaping.mountainGain", self.mountain_gain)?;
        finite("shaping.peakBonus", self.peak_bonus)?;
        in_range("shaping.spikeThreshold", self.spike_threshold, 0.0, 1.0)?;
        in_range("shaping.spikeMax", self.spike_max, 0.0, 1.0)?;
        Ok(())
    }
}

/// Thresholds for cliff, plateau and snow decisions. Height differences are
/// fractions of `grid_height`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassifierParams {
    /// Turn steep near-water tiles into stone
    pub cliffs: bool,
    /// Soften flat interior tiles at the stone and snow bands
    pub plateaus: bool,
    /// Rise over the lowest neighbor that makes a coastal tile a cliff
    pub cliff_threshold: f64,
    /// Neighbors closer than this count as level with the tile
    pub plateau_similarity: f64,
    /// Any neighbor further than this marks a plateau edge
    pub edge_threshold: f64,
    /// Fewer valid neighbors than this never form a plateau
    pub plateau_min_neighbors: usize,
    /// Level neighbors needed, at most
    pub plateau_count_cap: usize,
    /// Level neighbors needed, as a fraction of valid neighbors
    pub plateau_fraction: f64,
    /// Mountain tendency required for snow below the snow band
    pub snow_mountain_threshold: f64,
    /// How close below the snow band counts as "near the top"
    pub snow_margin: f64,
    /// Height ratio above which a tile is always snow
    pub peak_snow: f64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            cliffs: true,
            plateaus: true,
            cliff_threshold: 0.25,
            plateau_similarity: 0.05,
            edge_threshold: 0.15,
            plateau_min_neighbors: 3,
            plateau_count_cap: 4,
            plateau_fraction: 0.75,
            snow_mountain_threshold: 0.6,
            snow_margin: 0.03,
            peak_snow: 0.95,
        }
    }
}

impl ClassifierParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        in_range("classifier.cliffThreshold", self.cliff_threshold, 0.0, 1.0)?;
        in_range("classifier.plateauSimilarity", self.plateau_similarity, 0.0, 1.0)?;
        in_range("classifier.edgeThreshold", self.edge_threshold, 0.0, 1.0)?;
        in_range("classifier.plateauFraction", self.plateau_fraction, 0.0, 1.0)?;
        in_range("classifier.snowMountainThreshold", self.snow_mountain_threshold, 0.0, 1.0)?;
        in_range("classifier.snowMargin", self.snow_margin, 0.0, 1.0)?;
        in_range("classifier.peakSnow", self.peak_snow, 0.0, 1.0)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_bands() -> TerrainBands {
        TerrainBands {
            shore: 0.1,
            beach: 0.2,
            shrub: 0.3,
            forest: 0.55,
            stone: 0.8,
            snow: 0.9,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(GenerationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_derived_bands_ascend_for_any_water_level() {
        for i in 0..=20 {
            let level = i as f64 / 20.0;
            let bands = TerrainBands::for_water_level(level);
            assert_eq!(bands.validate(), Ok(()), "water level {}", level);
        }
    }

    #[test]
    fn test_beach_grows_as_water_falls() {
        let low = TerrainBands::for_water_level(0.2);
        let high = TerrainBands::for_water_level(0.7);
        assert!(low.beach > high.beach);
    }

    #[test]
    fn test_explicit_bands_override_derived() {
        let config = GenerationConfig {
            terrain_bands: Some(example_bands()),
            ..Default::default()
        };
        assert_eq!(config.bands(), example_bands());
    }

    #[test]
    fn test_rejects_non_ascending_bands() {
        let mut bands = example_bands();
        bands.stone = 0.5;
        let config = GenerationConfig {
            terrain_bands: Some(bands),
            ..Default::default()
        };
        match config.validate() {
            Err(ConfigError::BandsNotAscending { lower, upper, .. }) => {
                assert_eq!(lower, "forest");
                assert_eq!(upper, "stone");
            }
            other => panic!("expected BandsNotAscending, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_scalars() {
        let bad = [
            GenerationConfig { hex_size: 0.0, ..Default::default() },
            GenerationConfig { grid_height: -1.0, ..Default::default() },
            GenerationConfig { noise_scale: f64::NAN, ..Default::default() },
            GenerationConfig { water_level: 1.5, ..Default::default() },
            GenerationConfig { noise_detail: f64::INFINITY, ..Default::default() },
            GenerationConfig { radius: MAX_RADIUS + 1, ..Default::default() },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn test_water_surface() {
        let config = GenerationConfig {
            grid_height: 10.0,
            water_level: 0.3,
            ..Default::default()
        };
        assert!((config.water_surface() - 4.5).abs() < 1e-12);
        assert!((config.max_height() - 11.5).abs() < 1e-12);
    }

    #[test]
    fn test_json_partial_config() {
        let json = r#"{
            "radius": 5,
            "gridHeight": 10,
            "terrainBands": { "shore": 0.1, "beach": 0.2, "shrub": 0.3, "forest": 0.55, "stone": 0.8, "snow": 0.9 },
            "classifier": { "cliffs": false }
        }"#;
        let config = GenerationConfig::from_json_str(json).unwrap();
        assert_eq!(config.radius, 5);
        assert_eq!(config.grid_height, 10.0);
        assert_eq!(config.hex_size, 1.0);
        assert_eq!(config.terrain_bands, Some(example_bands()));
        assert!(!config.classifier.cliffs);
        assert!(config.classifier.plateaus);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_json_rejects_negative_radius() {
        assert!(GenerationConfig::from_json_str(r#"{ "radius": -3 }"#).is_err());
    }

    #[test]
    fn test_json_round_trip_preserves_config() {
        let config = GenerationConfig {
            radius: 7,
            terrain_bands: Some(example_bands()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GenerationConfig::from_json_str(&json).unwrap(), config);
    }
}
