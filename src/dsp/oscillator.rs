//! PolyBLEP anti-aliased sawtooth kernel.
//!
//! Phases live in [0, 1) and wrap; `dt` is the per-sample phase increment.
//! The naive sawtooth `2*phase - 1` has a discontinuity at every wrap,
//! which aliases badly. PolyBLEP subtracts a quadratic smoothing residual
//! within one increment's distance of the wrap boundary, suppressing the
//! aliased partials without oversampling.

/// PolyBLEP residual for a unit step discontinuity at phase 0/1.
///
/// Nonzero only within `dt` of the wrap boundary.
#[inline]
pub fn polyblep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

/// One sample of anti-aliased sawtooth at the given phase and increment.
#[inline]
pub fn saw(phase: f32, dt: f32) -> f32 {
    2.0 * phase - 1.0 - polyblep(phase, dt)
}

/// One sample of naive (aliasing) sawtooth. Kept for spectral comparison
/// in tests; not used by the voice pipeline.
#[inline]
pub fn naive_saw(phase: f32) -> f32 {
    2.0 * phase - 1.0
}
