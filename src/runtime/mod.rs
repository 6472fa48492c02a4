//! The host-facing instrument: engine plus effects plus patch state.

pub mod instrument;

pub use instrument::Instrument;
