//! Low-level DSP primitives used by the voice pipeline.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They intentionally stay focused on the
//! signal-processing math so the engine can layer on voice management and
//! parameter handling.

/// Single-pole DC-blocking highpass.
pub mod dcblock;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// PolyBLEP anti-aliased sawtooth kernel.
pub mod oscillator;
/// Normalized-parameter to physical-unit conversions.
pub mod params;
/// Topology-preserving state-variable lowpass filter.
pub mod svf;

pub use envelope::EnvelopeStage;
