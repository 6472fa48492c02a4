//! Pure conversions from normalized [0, 1] control values to physical units.
//!
//! All functions are stateless and assume the caller has already clamped
//! inputs to their declared range; out-of-range values are not rejected,
//! only the outputs are capped where a hard ceiling exists (cutoff).

/// Convert a normalized time parameter to seconds.
///
/// Exponential mapping covering roughly 1 ms to 10 s:
/// `0.001 * 10000^p`, floored at 1 ms.
#[inline]
pub fn time_seconds(p: f32) -> f32 {
    if p < 0.001 {
        0.001
    } else {
        0.001 * 10_000.0_f32.powf(p)
    }
}

/// Convert a normalized cutoff parameter to Hz.
///
/// Exponential mapping 20 Hz to 20 kHz: `20 * 1000^p`, capped at 20 kHz.
#[inline]
pub fn cutoff_hz(p: f32) -> f32 {
    (20.0 * 1_000.0_f32.powf(p)).min(20_000.0)
}

/// Convert a normalized resonance parameter to a filter Q of 0.5 to 20.
///
/// Q = 0.5 approximates a Butterworth response under the damping
/// convention used by [`crate::dsp::svf`] (k = 1/Q).
#[inline]
pub fn filter_q(p: f32) -> f32 {
    0.5 + p * 19.5
}

/// Piecewise-linear detune response: maps [0, 1] onto [0, 1].
///
/// Three segments give fine resolution at low settings and a steep ramp
/// into dramatic wide detuning:
///   [0.0, 0.1] -> [0.0, 0.02]   slope 0.2
///   [0.1, 0.5] -> [0.02, 0.25]  slope 0.575
///   [0.5, 1.0] -> [0.25, 1.0]   slope 1.5
#[inline]
pub fn detune_curve(x: f32) -> f32 {
    if x < 0.1 {
        x * 0.2
    } else if x < 0.5 {
        0.02 + (x - 0.1) * 0.575
    } else {
        0.25 + (x - 0.5) * 1.5
    }
}

/// Convert a MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69, 12-tone equal temperament.
#[inline]
pub fn note_to_freq(note: i32) -> f32 {
    440.0 * 2.0_f32.powf((note - 69) as f32 / 12.0)
}
