//! Voice management and polyphony.

/// Oscillator-bank configuration: detune spacing and pan tables.
pub mod bank;
/// The polyphonic engine: parameters, voice pool, allocator, render.
pub mod engine;
/// Control messages and the lock-free receiver abstraction.
pub mod message;
/// Per-voice state and lifecycle.
pub mod voice;

pub use engine::{Engine, EngineParams, MAX_VOICES};
pub use message::{MessageReceiver, SynthMessage};
