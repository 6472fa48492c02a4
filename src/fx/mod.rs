//! Block-sequential post effects applied after the voice sum.
//!
//! Order is fixed: chorus first, then delay, so the chorused signal is
//! what echoes. Both effects keep their state for the lifetime of the
//! instrument and allocate only at construction.

/// Juno-style dual-LFO chorus.
pub mod chorus;
/// Stereo ping-pong delay with tone filter and saturation guard.
pub mod delay;

pub use chorus::Chorus;
pub use delay::PingPongDelay;
