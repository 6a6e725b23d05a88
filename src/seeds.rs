//! Seed management for terrain generation
//!
//! A generation run is driven by one master seed (any finite `f64`). Each noise
//! source gets its own `u32` seed derived from it, so the sources are
//! decorrelated but fully reproducible.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::diagnostics::{Anomaly, Diagnostics};

/// Seeds for every noise source used by the height field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoiseSeeds {
    /// Large-feature elevation octave
    pub elevation: u32,
    /// Medium-feature elevation octave
    pub detail: u32,
    /// Domain warp displacement
    pub warp: u32,
    /// World variety probe and elevation spikes
    pub variety: u32,
    /// Regional ocean tendency
    pub ocean: u32,
    /// Regional mountain tendency
    pub mountain: u32,
}

impl NoiseSeeds {
    /// Derive all source seeds from a master seed.
    pub fn from_master(master: f64) -> Self {
        Self {
            elevation: derive_seed(master, "elevation"),
            detail: derive_seed(master, "detail"),
            warp: derive_seed(master, "warp"),
            variety: derive_seed(master, "variety"),
            ocean: derive_seed(master, "ocean"),
            mountain: derive_seed(master, "mountain"),
        }
    }

    /// Create a builder for customizing individual seeds
    pub fn builder(master: f64) -> NoiseSeedsBuilder {
        NoiseSeedsBuilder::new(master)
    }
}

/// Builder for overriding individual source seeds while deriving the rest
pub struct NoiseSeedsBuilder {
    seeds: NoiseSeeds,
}

impl NoiseSeedsBuilder {
    pub fn new(master: f64) -> Self {
        Self {
            seeds: NoiseSeeds::from_master(master),
        }
    }

    pub fn elevation(mut self, seed: u32) -> Self {
        self.seeds.elevation = seed;
        self
    }

    pub fn detail(mut self, seed: u32) -> Self {
        self.seeds.detail = seed;
        self
    }

    pub fn warp(mut self, seed: u32) -> Self {
        self.seeds.warp = seed;
        self
    }

    pub fn variety(mut self, seed: u32) -> Self {
        self.seeds.variety = seed;
        self
    }

    pub fn ocean(mut self, seed: u32) -> Self {
        self.seeds.ocean = seed;
        self
    }

    pub fn mountain(mut self, seed: u32) -> Self {
        self.seeds.mountain = seed;
        self
    }

    pub fn build(self) -> NoiseSeeds {
        self.seeds
    }
}

/// Return `seed` if it is finite, otherwise a fresh random seed.
///
/// A non-finite seed is recorded as an anomaly rather than rejected.
pub fn resolve_seed(seed: f64, diagnostics: &Diagnostics) -> f64 {
    if seed.is_finite() {
        return seed;
    }
    let replacement = rand::random::<u32>() as f64;
    diagnostics.record(Anomaly::NonFiniteSeed);
    log::warn!("Seed {} is not finite, using random seed {}", seed, replacement);
    replacement
}

/// Derive a source seed from the master seed and a source name.
fn derive_seed(master: f64, source: &str) -> u32 {
    // -0.0 and 0.0 must derive the same seeds
    let bits = if master == 0.0 { 0u64 } else { master.to_bits() };
    let mut hasher = DefaultHasher::new();
    bits.hash(&mut hasher);
    source.hash(&mut hasher);
    let h = hasher.finish();
    (h ^ (h >> 32)) as u32
}

impl std::fmt::Display for NoiseSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NoiseSeeds {{ elevation: {}, detail: {}, warp: {}, variety: {}, ocean: {}, mountain: {} }}",
            self.elevation, self.detail, self.warp, self.variety, self.ocean, self.mountain,
        )
    }
}
