//! Seeded noise sources for one generation run
//!
//! All sources are 2D Perlin noise returning roughly `[-1, 1]`. The bundle is
//! built once per run and shared read-only across worker threads.

use noise::{NoiseFn, Perlin};

use crate::numeric::noise_to_unit;
use crate::seeds::NoiseSeeds;

/// Offset between the x and y warp samples, so the two axes decorrelate
const WARP_AXIS_OFFSET: f64 = 31.416;
/// Offset of the mountain field from the ocean field's sample space
const MOUNTAIN_OFFSET: [f64; 2] = [31.416, -31.416];
/// Fixed off-lattice point probed once to pick the world's character
const VARIETY_PROBE: [f64; 2] = [17.31, -4.77];

type Source = Box<dyn NoiseFn<f64, 2> + Send + Sync>;

/// Identifies one source in a [`NoiseBundle`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoiseSource {
    Large,
    Medium,
    Warp,
    Variety,
    Ocean,
    Mountain,
}

pub struct NoiseBundle {
    large: Source,
    medium: Source,
    warp: Source,
    variety: Source,
    ocean: Source,
    mountain: Source,
}

impl NoiseBundle {
    pub fn new(master_seed: f64) -> Self {
        Self::from_seeds(&NoiseSeeds::from_master(master_seed))
    }

    pub fn from_seeds(seeds: &NoiseSeeds) -> Self {
        Self {
            large: Box::new(Perlin::new(seeds.elevation)),
            medium: Box::new(Perlin::new(seeds.detail)),
            warp: Box::new(Perlin::new(seeds.warp)),
            variety: Box::new(Perlin::new(seeds.variety)),
            ocean: Box::new(Perlin::new(seeds.ocean)),
            mountain: Box::new(Perlin::new(seeds.mountain)),
        }
    }

    /// Swap one source for any other 2D noise function.
    pub fn with_source<N>(mut self, source: NoiseSource, noise: N) -> Self
    where
        N: NoiseFn<f64, 2> + Send + Sync + 'static,
    {
        let slot = match source {
            NoiseSource::Large => &mut self.large,
            NoiseSource::Medium => &mut self.medium,
            NoiseSource::Warp => &mut self.warp,
            NoiseSource::Variety => &mut self.variety,
            NoiseSource::Ocean => &mut self.ocean,
            NoiseSource::Mountain => &mut self.mountain,
        };
        *slot = Box::new(noise);
        self
    }

    /// Large-feature octave, raw `[-1, 1]`
    pub fn large(&self, x: f64, y: f64) -> f64 {
        self.large.get([x, y])
    }

    /// Medium-feature octave, raw `[-1, 1]`
    pub fn medium(&self, x: f64, y: f64) -> f64 {
        self.medium.get([x, y])
    }

    /// Raw warp displacement for both axes
    pub fn warp(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.warp.get([x, y]),
            self.warp.get([x + WARP_AXIS_OFFSET, y + WARP_AXIS_OFFSET]),
        )
    }

    /// Raw variety noise, used for elevation spikes
    pub fn variety(&self, x: f64, y: f64) -> f64 {
        self.variety.get([x, y])
    }

    /// Raw ocean noise, `[-1, 1]`
    pub fn ocean(&self, x: f64, y: f64) -> f64 {
        self.ocean.get([x, y])
    }

    /// Raw mountain noise, `[-1, 1]`
    pub fn mountain(&self, x: f64, y: f64) -> f64 {
        self.mountain.get([x + MOUNTAIN_OFFSET[0], y + MOUNTAIN_OFFSET[1]])
    }

    /// Regional tendency towards open water, `[0, 1]`
    pub fn ocean_tendency(&self, x: f64, y: f64) -> f64 {
        noise_to_unit(self.ocean(x, y))
    }

    /// Regional tendency towards mountains, `[0, 1]`
    pub fn mountain_tendency(&self, x: f64, y: f64) -> f64 {
        noise_to_unit(self.mountain(x, y))
    }

    /// Raw variety noise at the world probe point
    pub fn variety_probe(&self) -> f64 {
        self.variety.get(VARIETY_PROBE)
    }

    /// Seed-wide character in `[0, 1]`; higher values give more island-like worlds.
    pub fn world_variety(&self) -> f64 {
        noise_to_unit(self.variety_probe())
    }
}
