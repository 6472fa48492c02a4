//! Realtime-safe polyphonic supersaw synthesizer engine.
//!
//! The crate splits along the audio-thread boundary: [`synth`] and
//! [`dsp`] are the per-sample hot path (no allocation, no locks),
//! [`fx`] is the block-level stereo chain behind the voice sum, and
//! [`patch`], [`io`], and [`runtime`] are the host-facing control
//! surface. Most embedders only need [`Instrument`].

pub mod dsp;
pub mod fx; // Block-sequential post effects (chorus, ping-pong delay)
pub mod io;
pub mod patch; // Parameter table, presets, JSON state
pub mod runtime; // Instrument shell: engine + effects + parameter set
pub mod synth; // Voice management and polyphony

pub use runtime::Instrument;
pub use synth::engine::Engine;

/// Engine sample rate. All voice and effect constants are derived from
/// it; the engine does not resample.
pub const SAMPLE_RATE: f32 = 44_100.0;

/// Upper bound on frames per render call. Larger requests are truncated.
pub const MAX_BLOCK_SIZE: usize = 256;
