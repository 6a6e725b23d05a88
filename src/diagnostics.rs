//! Anomaly counters for the numeric pipeline
//!
//! Generation never aborts on a bad intermediate value. Each substitution is
//! counted here so callers can tell a clean run from a patched-up one.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Kinds of recovered numeric anomalies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anomaly {
    /// Seed was NaN or infinite and got replaced
    NonFiniteSeed,
    /// Projected sample position was not finite
    NonFinitePixel,
    /// Domain warp produced a non-finite offset
    NonFiniteWarp,
    /// A noise source returned a non-finite sample
    NonFiniteNoise,
    /// Final height was not finite and fell back to the base height
    NonFiniteHeight,
}

impl Anomaly {
    pub fn name(&self) -> &'static str {
        match self {
            Anomaly::NonFiniteSeed => "non-finite seed",
            Anomaly::NonFinitePixel => "non-finite pixel position",
            Anomaly::NonFiniteWarp => "non-finite warp offset",
            Anomaly::NonFiniteNoise => "non-finite noise sample",
            Anomaly::NonFiniteHeight => "non-finite height",
        }
    }
}

/// Thread-safe anomaly counters shared by one generation run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    non_finite_seed: AtomicU64,
    non_finite_pixel: AtomicU64,
    non_finite_warp: AtomicU64,
    non_finite_noise: AtomicU64,
    non_finite_height: AtomicU64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, anomaly: Anomaly) {
        let counter = match anomaly {
            Anomaly::NonFiniteSeed => &self.non_finite_seed,
            Anomaly::NonFinitePixel => &self.non_finite_pixel,
            Anomaly::NonFiniteWarp => &self.non_finite_warp,
            Anomaly::NonFiniteNoise => &self.non_finite_noise,
            Anomaly::NonFiniteHeight => &self.non_finite_height,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        log::debug!("Recovered from {}", anomaly.name());
    }

    pub fn counts(&self) -> AnomalyCounts {
        AnomalyCounts {
            non_finite_seed: self.non_finite_seed.load(Ordering::Relaxed),
            non_finite_pixel: self.non_finite_pixel.load(Ordering::Relaxed),
            non_finite_warp: self.non_finite_warp.load(Ordering::Relaxed),
            non_finite_noise: self.non_finite_noise.load(Ordering::Relaxed),
            non_finite_height: self.non_finite_height.load(Ordering::Relaxed),
        }
    }

    /// Emit a single warning if anything was recorded.
    pub fn log_summary(&self) {
        let counts = self.counts();
        if counts.total() > 0 {
            log::warn!(
                "Generation recovered from {} numeric anomalies (seed: {}, pixel: {}, warp: {}, noise: {}, height: {})",
                counts.total(),
                counts.non_finite_seed,
                counts.non_finite_pixel,
                counts.non_finite_warp,
                counts.non_finite_noise,
                counts.non_finite_height,
            );
        }
    }
}

/// Snapshot of [`Diagnostics`] counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyCounts {
    pub non_finite_seed: u64,
    pub non_finite_pixel: u64,
    pub non_finite_warp: u64,
    #[serde(default)]
    pub non_finite_noise: u64,
    pub non_finite_height: u64,
}

impl AnomalyCounts {
    pub fn total(&self) -> u64 {
        self.non_finite_seed
            + self.non_finite_pixel
            + self.non_finite_warp
            + self.non_finite_noise
            + self.non_finite_height
    }
}
