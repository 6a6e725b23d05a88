//! Named clamp/normalize steps for the height pipeline.

/// Clamp to `[0, 1]`. NaN maps to 0.
#[inline]
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Map a noise sample from `[-1, 1]` to `[0, 1]`, clamping overshoot.
#[inline]
pub fn noise_to_unit(sample: f64) -> f64 {
    clamp01((sample + 1.0) * 0.5)
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// `value` if finite, otherwise `fallback`.
#[inline]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
