use std::sync::OnceLock;

use rayon::prelude::*;

use crate::config::{GenerationConfig, ShapingParams};
use crate::diagnostics::{Anomaly, Diagnostics};
use crate::error::ConfigError;
use crate::hex::{hex_to_pixel, HexCoord, SQRT3};
use crate::hexmap::HexMap;
use crate::noise_bundle::NoiseBundle;
use crate::numeric::{clamp01, finite_or, lerp, noise_to_unit};
use crate::seeds::resolve_seed;

// =============================================================================
// SHAPING CONSTANTS
// =============================================================================

/// Share of base elevation given up in fully mountainous regions
const MOUNTAIN_FLATTENING: f64 = 0.7;
/// Elevation above which peak bonuses apply
const PEAK_START: f64 = 0.75;
/// Mountain influence needed for peak bonuses
const PEAK_INFLUENCE: f64 = 0.8;
/// Minimum elevation for spikes
const SPIKE_MIN_ELEVATION: f64 = 0.5;

// =============================================================================
// HEIGHT FIELD
// =============================================================================

/// Memoized per-sample values
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightSample {
    /// Absolute height before any water clamping
    pub height: f64,
    /// Regional mountain tendency at the (warped) sample position, `[0, 1]`
    pub mountain_tendency: f64,
}

/// Continuous elevation over a bounded hex grid.
///
/// Samples are computed on first request and cached for the lifetime of the
/// field. The cache is write-once per cell, so concurrent lookups are safe and
/// always observe the same value.
pub struct HeightField {
    config: GenerationConfig,
    seed: f64,
    noise: NoiseBundle,
    diagnostics: Diagnostics,
    /// How strongly this seed's world leans towards an island profile
    island_factor: f64,
    /// World-space size of the grid (radius * hex_size, radius >= 1)
    extent: f64,
    cache: HexMap<OnceLock<HeightSample>>,
}

impl HeightField {
    /// Validate `config`, resolve `seed`, and build the noise sources.
    pub fn new(config: &GenerationConfig, seed: f64) -> Result<Self, ConfigError> {
        config.validate()?;
        let diagnostics = Diagnostics::new();
        let seed = resolve_seed(seed, &diagnostics);
        let noise = NoiseBundle::new(seed);
        Ok(Self::assemble(config, seed, noise, diagnostics))
    }

    /// Build a field over caller-supplied noise sources.
    pub fn with_noise(
        config: &GenerationConfig,
        seed: f64,
        noise: NoiseBundle,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let diagnostics = Diagnostics::new();
        let seed = resolve_seed(seed, &diagnostics);
        Ok(Self::assemble(config, seed, noise, diagnostics))
    }

    fn assemble(
        config: &GenerationConfig,
        seed: f64,
        noise: NoiseBundle,
        diagnostics: Diagnostics,
    ) -> Self {
        let probe = noise.variety_probe();
        let island_factor = if probe.is_finite() {
            clamp01(noise_to_unit(probe) * 2.0)
        } else {
            diagnostics.record(Anomaly::NonFiniteNoise);
            0.0
        };
        let extent = config.radius.max(1) as f64 * config.hex_size;
        log::debug!(
            "Height field: radius {}, seed {}, island factor {:.3}",
            config.radius,
            seed,
            island_factor
        );
        Self {
            config: config.clone(),
            seed,
            noise,
            diagnostics,
            island_factor,
            extent,
            cache: HexMap::from_fn(config.radius, |_| OnceLock::new()),
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// The seed actually used (after replacing a non-finite one).
    pub fn seed(&self) -> f64 {
        self.seed
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn island_factor(&self) -> f64 {
        self.island_factor
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.cache.contains(coord)
    }

    /// Height and regional context at `coord`.
    ///
    /// Outside the grid this is the base height, never sampled or cached.
    pub fn sample(&self, coord: HexCoord) -> HeightSample {
        match self.cache.get(coord) {
            Some(cell) => *cell.get_or_init(|| self.compute(coord)),
            None => HeightSample {
                height: self.config.base_height,
                mountain_tendency: 0.0,
            },
        }
    }

    /// Raw height at `coord`.
    pub fn height(&self, coord: HexCoord) -> f64 {
        self.sample(coord).height
    }

    /// Height at `coord`, or `None` when it lies outside the grid.
    pub fn height_in_grid(&self, coord: HexCoord) -> Option<f64> {
        self.contains(coord).then(|| self.height(coord))
    }

    /// Compute every in-grid sample using the rayon thread pool.
    pub fn fill_parallel(&self) {
        self.cache.coords().par_iter().for_each(|&coord| {
            self.sample(coord);
        });
    }

    /// Snapshot of all heights, filling any missing samples.
    pub fn heights(&self) -> HexMap<f64> {
        HexMap::from_fn(self.config.radius, |coord| self.height(coord))
    }

    // =========================================================================
    // PIPELINE
    // =========================================================================

    fn compute(&self, coord: HexCoord) -> HeightSample {
        let cfg = &self.config;
        let shaping = &cfg.shaping;

        let (x, y) = hex_to_pixel(coord, cfg.hex_size);
        if !x.is_finite() || !y.is_finite() {
            self.diagnostics.record(Anomaly::NonFinitePixel);
            return HeightSample {
                height: cfg.base_height,
                mountain_tendency: 0.0,
            };
        }

        let (wx, wy) = self.warped_position(x, y);

        // Regional tendencies vary slowly across the map
        let rx = wx / self.extent * shaping.region_scale;
        let ry = wy / self.extent * shaping.region_scale;
        let ocean = noise_to_unit(self.finite_noise(self.noise.ocean(rx, ry)));
        let mountain = noise_to_unit(self.finite_noise(self.noise.mountain(rx, ry)));

        // Two octaves: large features at half the base frequency, medium
        // features at the base frequency scaled by the detail setting
        let scale = cfg.noise_scale.max(0.1);
        let lx = wx / (self.extent * scale * 2.0);
        let ly = wy / (self.extent * scale * 2.0);
        let large = noise_to_unit(self.finite_noise(self.noise.large(lx, ly)));

        let detail = cfg.noise_detail.max(0.0);
        let mx = wx / (self.extent * scale) * detail;
        let my = wy / (self.extent * scale) * detail;
        let medium = noise_to_unit(self.finite_noise(self.noise.medium(mx, my)));

        let mut elevation = blend_octaves(large, medium, cfg.noise_fuzziness);
        elevation = apply_ocean_influence(elevation, ocean, shaping);
        elevation = apply_island_profile(
            elevation,
            center_falloff(x, y, cfg.hex_size, cfg.radius),
            self.island_factor,
            ocean,
            shaping,
        );
        elevation = apply_mountains(elevation, mountain, shaping);
        elevation = apply_spikes(
            elevation,
            clamp01(self.finite_noise(self.noise.variety(lx * 2.0, ly * 2.0))),
            mountain,
            shaping,
        );

        let height = scale_to_height(elevation, cfg.base_height, cfg.grid_height);
        if !height.is_finite() {
            self.diagnostics.record(Anomaly::NonFiniteHeight);
            return HeightSample {
                height: cfg.base_height,
                mountain_tendency: clamp01(mountain),
            };
        }

        HeightSample {
            height,
            mountain_tendency: mountain,
        }
    }

    /// Pass a raw noise sample through, replacing a non-finite one with the
    /// midpoint `0.0`.
    fn finite_noise(&self, sample: f64) -> f64 {
        if sample.is_finite() {
            return sample;
        }
        self.diagnostics.record(Anomaly::NonFiniteNoise);
        0.0
    }

    /// Displace a sample point by the warp noise.
    ///
    /// Falls back to the undisplaced point if anything along the way is not finite.
    fn warped_position(&self, x: f64, y: f64) -> (f64, f64) {
        let shaping = &self.config.shaping;
        let nx = x / self.extent;
        let ny = y / self.extent;
        if !nx.is_finite() || !ny.is_finite() {
            self.diagnostics.record(Anomaly::NonFiniteWarp);
            return (x, y);
        }

        let frequency = (self.config.noise_scale * shaping.warp_frequency).clamp(0.1, 2.0);
        let amplitude = shaping.warp_strength * self.extent;
        let (dx, dy) = self.noise.warp(nx * frequency, ny * frequency);
        let (dx, dy) = (dx * amplitude, dy * amplitude);
        if !dx.is_finite() || !dy.is_finite() {
            self.diagnostics.record(Anomaly::NonFiniteWarp);
            return (x, y);
        }

        (finite_or(x + dx, x), finite_or(y + dy, y))
    }
}

// =============================================================================
// PIPELINE STAGES
// =============================================================================

/// Interpolate between the large and medium octaves.
pub fn blend_octaves(large: f64, medium: f64, fuzziness: f64) -> f64 {
    clamp01(lerp(large, medium, clamp01(fuzziness)))
}

/// Lift land where ocean tendency is low, sink it where it is high.
pub fn apply_ocean_influence(elevation: f64, ocean_tendency: f64, shaping: &ShapingParams) -> f64 {
    let influence = ocean_tendency.powf(shaping.ocean_exponent);
    clamp01(elevation * (shaping.ocean_gain - influence) - shaping.ocean_pull * influence)
}

/// `1` at the center, falling linearly to `0` one ring beyond the edge.
///
/// Distance is measured in world space and expressed in hex steps, which
/// rounds the hexagonal grid into a roughly circular island.
pub fn center_falloff(x: f64, y: f64, hex_size: f64, radius: u32) -> f64 {
    let distance = (x * x + y * y).sqrt() / (SQRT3 * hex_size);
    clamp01(1.0 - distance / (radius as f64 + 1.0))
}

/// Pull elevation towards an island profile that is highest in the middle.
pub fn apply_island_profile(
    elevation: f64,
    falloff: f64,
    island_factor: f64,
    ocean_tendency: f64,
    shaping: &ShapingParams,
) -> f64 {
    if island_factor <= 0.0 {
        return elevation;
    }
    let local = clamp01(island_factor * ocean_tendency.max(shaping.island_floor));
    let island = lerp(elevation, falloff, shaping.island_blend);
    clamp01(lerp(elevation, island, local))
}

/// Sharpen peaks in mountainous regions.
pub fn apply_mountains(elevation: f64, mountain_tendency: f64, shaping: &ShapingParams) -> f64 {
    let threshold = shaping.mountain_threshold;
    if elevation <= threshold {
        return elevation;
    }

    let influence = mountain_tendency * mountain_tendency;
    let rise = ((elevation - threshold) / (1.0 - threshold)).powf(shaping.mountain_exponent);
    let effect = rise * influence;
    let mut shaped = clamp01(
        elevation * (1.0 - influence * MOUNTAIN_FLATTENING)
            + (elevation + effect * shaping.mountain_gain) * influence,
    );

    if influence > PEAK_INFLUENCE && shaped > PEAK_START {
        shaped = clamp01(shaped + (shaped - PEAK_START) * influence * shaping.peak_bonus);
    }
    shaped
}

/// Occasional sharp rises on already high ground.
pub fn apply_spikes(
    elevation: f64,
    spikiness: f64,
    mountain_tendency: f64,
    shaping: &ShapingParams,
) -> f64 {
    if spikiness <= shaping.spike_threshold || elevation <= SPIKE_MIN_ELEVATION {
        return elevation;
    }
    let intensity = ((spikiness - shaping.spike_threshold) * 2.0).min(shaping.spike_max);
    clamp01(elevation + intensity * mountain_tendency)
}

/// Map normalized elevation to an absolute height in `[base, base + grid_height]`.
pub fn scale_to_height(elevation: f64, base_height: f64, grid_height: f64) -> f64 {
    let height = base_height + clamp01(elevation) * grid_height;
    height.clamp(base_height, base_height + grid_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_bundle::NoiseSource;
    use noise::Constant;

    fn config(radius: u32) -> GenerationConfig {
        GenerationConfig {
            radius,
            grid_height: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_heights_are_deterministic() {
        let a = HeightField::new(&config(6), 42.0).unwrap();
        let b = HeightField::new(&config(6), 42.0).unwrap();
        b.fill_parallel();
        for coord in crate::hex::hexes_in_radius(6) {
            assert_eq!(a.height(coord).to_bits(), b.height(coord).to_bits());
        }
    }

    #[test]
    fn test_repeated_lookup_is_stable() {
        let field = HeightField::new(&config(4), 3.0).unwrap();
        let coord = HexCoord::new(2, -1);
        let first = field.height(coord);
        field.fill_parallel();
        assert_eq!(first.to_bits(), field.height(coord).to_bits());
    }

    #[test]
    fn test_heights_within_bounds() {
        for seed in [1.0, 42.0, 1234.5, -9.0] {
            let cfg = config(8);
            let field = HeightField::new(&cfg, seed).unwrap();
            field.fill_parallel();
            for (_, &h) in field.heights().iter() {
                assert!(h >= cfg.base_height && h <= cfg.max_height(), "height {} out of range", h);
            }
        }
    }

    #[test]
    fn test_outside_radius_is_base_height() {
        let cfg = config(3);
        let field = HeightField::new(&cfg, 42.0).unwrap();
        assert_eq!(field.height(HexCoord::new(4, 0)), cfg.base_height);
        assert_eq!(field.height_in_grid(HexCoord::new(4, 0)), None);
        assert!(field.height_in_grid(HexCoord::new(3, 0)).is_some());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = HeightField::new(&config(5), 42.0).unwrap();
        let b = HeightField::new(&config(5), 43.0).unwrap();
        let differs = crate::hex::hexes_in_radius(5)
            .into_iter()
            .any(|c| a.height(c) != b.height(c));
        assert!(differs);
    }

    #[test]
    fn test_non_finite_seed_is_replaced() {
        let field = HeightField::new(&config(2), f64::NAN).unwrap();
        assert!(field.seed().is_finite());
        assert_eq!(field.diagnostics().counts().non_finite_seed, 1);
        assert!(field.height(HexCoord::ORIGIN).is_finite());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = GenerationConfig {
            grid_height: 0.0,
            ..Default::default()
        };
        assert!(HeightField::new(&cfg, 1.0).is_err());
    }

    #[test]
    fn test_nan_warp_falls_back_to_unwarped() {
        let cfg = config(4);
        let nan_warp = NoiseBundle::new(5.0).with_source(NoiseSource::Warp, Constant::new(f64::NAN));
        let zero_warp = NoiseBundle::new(5.0).with_source(NoiseSource::Warp, Constant::new(0.0));
        let patched = HeightField::with_noise(&cfg, 5.0, nan_warp).unwrap();
        let clean = HeightField::with_noise(&cfg, 5.0, zero_warp).unwrap();

        for coord in crate::hex::hexes_in_radius(4) {
            assert_eq!(patched.height(coord).to_bits(), clean.height(coord).to_bits());
        }
        assert_eq!(
            patched.diagnostics().counts().non_finite_warp,
            crate::hex::hex_count(4) as u64
        );
        assert_eq!(clean.diagnostics().counts().total(), 0);
    }

    #[test]
    fn test_nan_octaves_never_produce_nan_heights() {
        let cfg = config(3);
        let noise = NoiseBundle::new(1.0)
            .with_source(NoiseSource::Large, Constant::new(f64::NAN))
            .with_source(NoiseSource::Medium, Constant::new(f64::NAN));
        let field = HeightField::with_noise(&cfg, 1.0, noise).unwrap();
        for (_, &h) in field.heights().iter() {
            assert!(h.is_finite());
            assert!(h >= cfg.base_height);
        }
        // Both octaves are replaced once per cell
        let counts = field.diagnostics().counts();
        assert_eq!(counts.non_finite_noise, 2 * crate::hex::hex_count(3) as u64);
        assert!(counts.total() > 0);
    }

    #[test]
    fn test_nan_regional_noise_is_counted() {
        let cfg = config(2);
        let noise = NoiseBundle::new(1.0)
            .with_source(NoiseSource::Ocean, Constant::new(f64::NAN))
            .with_source(NoiseSource::Mountain, Constant::new(f64::INFINITY))
            .with_source(NoiseSource::Variety, Constant::new(f64::NAN));
        let field = HeightField::with_noise(&cfg, 1.0, noise).unwrap();
        assert_eq!(field.island_factor(), 0.0);
        field.fill_parallel();
        assert!(field.heights().values().iter().all(|h| h.is_finite()));
        // Probe once, then ocean, mountain and variety per cell
        let expected = 1 + 3 * crate::hex::hex_count(2) as u64;
        assert_eq!(field.diagnostics().counts().non_finite_noise, expected);
    }

    #[test]
    fn test_radius_zero_field() {
        let cfg = config(0);
        let field = HeightField::new(&cfg, 42.0).unwrap();
        let h = field.height(HexCoord::ORIGIN);
        assert!(h >= cfg.base_height && h <= cfg.max_height());
        assert_eq!(field.heights().len(), 1);
    }

    #[test]
    fn test_blend_octaves() {
        assert!((blend_octaves(0.2, 0.8, 0.0) - 0.2).abs() < 1e-12);
        assert!((blend_octaves(0.2, 0.8, 1.0) - 0.8).abs() < 1e-12);
        assert!((blend_octaves(0.2, 0.8, 0.5) - 0.5).abs() < 1e-12);
        // Out-of-range fuzziness is clamped
        assert!((blend_octaves(0.2, 0.8, 3.0) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_center_falloff() {
        assert_eq!(center_falloff(0.0, 0.0, 1.0, 5), 1.0);
        let (x, y) = hex_to_pixel(HexCoord::new(5, 0), 1.0);
        let edge = center_falloff(x, y, 1.0, 5);
        assert!(edge > 0.0 && edge < 0.5);
        assert_eq!(center_falloff(100.0, 100.0, 1.0, 5), 0.0);
    }

    #[test]
    fn test_island_profile_lowers_edges() {
        let shaping = ShapingParams::default();
        let center = apply_island_profile(0.5, 1.0, 1.0, 1.0, &shaping);
        let edge = apply_island_profile(0.5, 0.0, 1.0, 1.0, &shaping);
        assert!(center > edge);
        assert_eq!(apply_island_profile(0.5, 0.0, 0.0, 1.0, &shaping), 0.5);
    }

    #[test]
    fn test_mountains_only_above_threshold() {
        let shaping = ShapingParams::default();
        assert_eq!(apply_mountains(0.2, 1.0, &shaping), 0.2);
        assert_eq!(apply_mountains(0.6, 0.0, &shaping), 0.6);
        assert!(apply_mountains(0.6, 1.0, &shaping) > 0.6);
        assert!(apply_mountains(0.9, 1.0, &shaping) <= 1.0);
    }

    #[test]
    fn test_ocean_influence() {
        let shaping = ShapingParams::default();
        // Full ocean tendency sinks terrain
        assert!(apply_ocean_influence(0.5, 1.0, &shaping) < 0.5);
        // No ocean tendency lifts it
        assert!(apply_ocean_influence(0.5, 0.0, &shaping) > 0.5);
        assert_eq!(apply_ocean_influence(0.9, 0.0, &shaping), 1.0);
    }

    #[test]
    fn test_spikes() {
        let shaping = ShapingParams::default();
        assert_eq!(apply_spikes(0.6, 0.5, 1.0, &shaping), 0.6);
        assert_eq!(apply_spikes(0.4, 0.95, 1.0, &shaping), 0.4);
        assert!((apply_spikes(0.6, 0.9, 1.0, &shaping) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_scale_to_height() {
        assert_eq!(scale_to_height(-0.5, 1.5, 10.0), 1.5);
        assert_eq!(scale_to_height(2.0, 1.5, 10.0), 11.5);
        assert!((scale_to_height(0.5, 1.5, 10.0) - 6.5).abs() < 1e-12);
    }
}
