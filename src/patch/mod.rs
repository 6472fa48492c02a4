//! Parameter metadata, factory presets, and JSON state.
//!
//! Everything the engine exposes to a host lives behind the 24-entry
//! parameter table: stable string keys for automation and state files,
//! display names for UIs, and per-parameter ranges for clamping. The
//! audio path never sees this module; [`crate::runtime::Instrument`]
//! translates a [`ParamSet`] into engine values at block start.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of host-visible parameters.
pub const PARAM_COUNT: usize = 24;

/// Host-visible parameter identifiers, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamId {
    Cutoff,
    Resonance,
    Detune,
    Spread,
    FilterEnvAmount,
    Attack,
    Decay,
    Sustain,
    Release,
    FilterAttack,
    FilterDecay,
    FilterSustain,
    FilterRelease,
    Volume,
    VelocitySens,
    BendRange,
    SubLevel,
    SubOctave,
    ChorusMix,
    ChorusDepth,
    DelayTime,
    DelayFeedback,
    DelayMix,
    DelayTone,
}

/// Static description of one parameter.
pub struct ParamDef {
    pub id: ParamId,
    /// Stable key used in state files and host automation.
    pub key: &'static str,
    /// Human-readable display name.
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
}

/// The full table, indexed by [`ParamId::index`].
pub static PARAM_DEFS: [ParamDef; PARAM_COUNT] = [
    ParamDef { id: ParamId::Cutoff, key: "cutoff", name: "Cutoff", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::Resonance, key: "resonance", name: "Resonance", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::Detune, key: "detune", name: "Detune", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::Spread, key: "spread", name: "Spread", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::FilterEnvAmount, key: "f_amount", name: "Filt Env Amt", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::Attack, key: "attack", name: "Attack", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::Decay, key: "decay", name: "Decay", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::Sustain, key: "sustain", name: "Sustain", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::Release, key: "release", name: "Release", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::FilterAttack, key: "f_attack", name: "F Attack", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::FilterDecay, key: "f_decay", name: "F Decay", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::FilterSustain, key: "f_sustain", name: "F Sustain", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::FilterRelease, key: "f_release", name: "F Release", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::Volume, key: "volume", name: "Volume", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::VelocitySens, key: "vel_sens", name: "Vel Sens", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::BendRange, key: "bend_range", name: "Bend Range", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::SubLevel, key: "sub_level", name: "Sub", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::SubOctave, key: "sub_octave", name: "Sub Oct", min: -2.0, max: 0.0 },
    ParamDef { id: ParamId::ChorusMix, key: "chorus_mix", name: "Chorus", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::ChorusDepth, key: "chorus_depth", name: "Chr Depth", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::DelayTime, key: "delay_time", name: "Dly Time", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::DelayFeedback, key: "delay_fback", name: "Dly Fback", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::DelayMix, key: "delay_mix", name: "Delay", min: 0.0, max: 1.0 },
    ParamDef { id: ParamId::DelayTone, key: "delay_tone", name: "Dly Tone", min: 0.0, max: 1.0 },
];

impl ParamId {
    pub const ALL: [ParamId; PARAM_COUNT] = [
        ParamId::Cutoff,
        ParamId::Resonance,
        ParamId::Detune,
        ParamId::Spread,
        ParamId::FilterEnvAmount,
        ParamId::Attack,
        ParamId::Decay,
        ParamId::Sustain,
        ParamId::Release,
        ParamId::FilterAttack,
        ParamId::FilterDecay,
        ParamId::FilterSustain,
        ParamId::FilterRelease,
        ParamId::Volume,
        ParamId::VelocitySens,
        ParamId::BendRange,
        ParamId::SubLevel,
        ParamId::SubOctave,
        ParamId::ChorusMix,
        ParamId::ChorusDepth,
        ParamId::DelayTime,
        ParamId::DelayFeedback,
        ParamId::DelayMix,
        ParamId::DelayTone,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn def(self) -> &'static ParamDef {
        &PARAM_DEFS[self.index()]
    }

    pub fn key(self) -> &'static str {
        self.def().key
    }

    /// Look up a parameter by its stable string key.
    pub fn from_key(key: &str) -> Option<ParamId> {
        PARAM_DEFS.iter().find(|d| d.key == key).map(|d| d.id)
    }
}

/// One named factory program.
pub struct Preset {
    pub name: &'static str,
    /// Values in [`ParamId::ALL`] order.
    pub values: [f32; PARAM_COUNT],
}

/// The factory bank. Index 0 is the init patch.
pub static FACTORY_PRESETS: &[Preset] = &[
    Preset { name: "Init", values: [
        0.75, 0.00, 0.25, 0.60, 0.40,
        0.00, 0.55, 0.70, 0.55,
        0.00, 0.50, 0.30, 0.50,
        0.70, 0.50, 0.167, 0.00, -1.0,
        0.00, 0.50, 0.66, 0.35, 0.00, 0.55,
    ]},
    Preset { name: "Festival Lead", values: [
        0.80, 0.15, 0.60, 0.90, 0.55,
        0.00, 0.55, 0.70, 0.55,
        0.00, 0.50, 0.20, 0.50,
        0.75, 0.40, 0.167, 0.25, -1.0,
        0.00, 0.50, 0.70, 0.35, 0.18, 0.50,
    ]},
    Preset { name: "Sunrise Lead", values: [
        0.72, 0.10, 0.45, 0.85, 0.45,
        0.00, 0.55, 0.72, 0.55,
        0.00, 0.55, 0.30, 0.55,
        0.72, 0.35, 0.167, 0.30, -1.0,
        0.10, 0.40, 0.72, 0.40, 0.15, 0.45,
    ]},
    Preset { name: "Razor Lead", values: [
        0.85, 0.28, 0.65, 0.85, 0.40,
        0.00, 0.50, 0.65, 0.50,
        0.00, 0.45, 0.30, 0.45,
        0.78, 0.50, 0.167, 0.20, -1.0,
        0.00, 0.50, 0.60, 0.30, 0.12, 0.60,
    ]},
    Preset { name: "Dream Lead", values: [
        0.75, 0.05, 0.50, 0.92, 0.50,
        0.15, 0.60, 0.68, 0.60,
        0.10, 0.55, 0.35, 0.55,
        0.68, 0.30, 0.167, 0.20, -1.0,
        0.18, 0.45, 0.72, 0.42, 0.22, 0.40,
    ]},
    Preset { name: "Big Stab", values: [
        0.82, 0.18, 0.55, 0.92, 0.75,
        0.00, 0.50, 0.00, 0.45,
        0.00, 0.45, 0.00, 0.40,
        0.82, 0.55, 0.167, 0.20, -1.0,
        0.00, 0.50, 0.60, 0.42, 0.20, 0.50,
    ]},
    Preset { name: "Filtered Stab", values: [
        0.40, 0.20, 0.45, 0.85, 0.85,
        0.00, 0.55, 0.05, 0.50,
        0.00, 0.50, 0.00, 0.45,
        0.78, 0.50, 0.167, 0.25, -1.0,
        0.00, 0.50, 0.66, 0.45, 0.18, 0.45,
    ]},
    Preset { name: "Trance Lead", values: [
        0.78, 0.15, 0.30, 0.75, 0.55,
        0.00, 0.55, 0.65, 0.55,
        0.00, 0.50, 0.25, 0.50,
        0.75, 0.40, 0.167, 0.25, -1.0,
        0.00, 0.50, 0.66, 0.35, 0.18, 0.50,
    ]},
    Preset { name: "Anthem", values: [
        0.72, 0.10, 0.40, 0.90, 0.50,
        0.25, 0.60, 0.75, 0.60,
        0.20, 0.55, 0.35, 0.55,
        0.70, 0.30, 0.167, 0.35, -1.0,
        0.22, 0.50, 0.70, 0.30, 0.12, 0.45,
    ]},
    Preset { name: "Anthem Pad", values: [
        0.62, 0.08, 0.42, 0.95, 0.40,
        0.65, 0.60, 0.85, 0.70,
        0.60, 0.55, 0.50, 0.65,
        0.65, 0.20, 0.167, 0.30, -1.0,
        0.35, 0.55, 0.72, 0.35, 0.15, 0.40,
    ]},
    Preset { name: "Dark Pad", values: [
        0.48, 0.12, 0.50, 0.90, 0.30,
        0.75, 0.65, 0.88, 0.80,
        0.70, 0.60, 0.55, 0.75,
        0.60, 0.15, 0.167, 0.35, -1.0,
        0.30, 0.60, 0.75, 0.45, 0.20, 0.30,
    ]},
    Preset { name: "Glass Pad", values: [
        0.78, 0.05, 0.35, 0.88, 0.35,
        0.70, 0.55, 0.82, 0.75,
        0.65, 0.50, 0.55, 0.70,
        0.62, 0.20, 0.167, 0.10, 0.0,
        0.40, 0.65, 0.73, 0.40, 0.18, 0.55,
    ]},
    Preset { name: "Evolving Pad", values: [
        0.40, 0.15, 0.48, 0.93, 0.60,
        0.80, 0.70, 0.80, 0.85,
        0.75, 0.70, 0.40, 0.80,
        0.60, 0.15, 0.167, 0.25, -1.0,
        0.35, 0.55, 0.75, 0.50, 0.25, 0.35,
    ]},
    Preset { name: "Warm Strings", values: [
        0.63, 0.00, 0.18, 0.75, 0.25,
        0.65, 0.55, 0.88, 0.70,
        0.60, 0.50, 0.60, 0.65,
        0.65, 0.15, 0.167, 0.15, 0.0,
        0.45, 0.55, 0.70, 0.25, 0.08, 0.40,
    ]},
    Preset { name: "Bright Strings", values: [
        0.73, 0.05, 0.22, 0.78, 0.30,
        0.60, 0.55, 0.85, 0.68,
        0.55, 0.50, 0.55, 0.60,
        0.65, 0.20, 0.167, 0.10, 0.0,
        0.40, 0.50, 0.70, 0.25, 0.10, 0.50,
    ]},
    Preset { name: "Cinematic Strings", values: [
        0.55, 0.08, 0.25, 0.82, 0.20,
        0.75, 0.60, 0.90, 0.80,
        0.70, 0.55, 0.65, 0.75,
        0.62, 0.10, 0.167, 0.25, -1.0,
        0.38, 0.60, 0.75, 0.35, 0.15, 0.35,
    ]},
    Preset { name: "Trance Bass", values: [
        0.48, 0.18, 0.20, 0.60, 0.60,
        0.00, 0.50, 0.65, 0.45,
        0.00, 0.45, 0.05, 0.40,
        0.80, 0.55, 0.167, 0.45, -1.0,
        0.00, 0.50, 0.66, 0.35, 0.00, 0.55,
    ]},
    Preset { name: "Sub Bass", values: [
        0.35, 0.00, 0.05, 0.30, 0.20,
        0.00, 0.55, 0.80, 0.50,
        0.00, 0.50, 0.15, 0.45,
        0.80, 0.30, 0.167, 0.60, -2.0,
        0.00, 0.50, 0.66, 0.35, 0.00, 0.55,
    ]},
    Preset { name: "Growl Bass", values: [
        0.52, 0.30, 0.55, 0.88, 0.50,
        0.00, 0.50, 0.75, 0.50,
        0.00, 0.45, 0.10, 0.40,
        0.80, 0.45, 0.167, 0.40, -1.0,
        0.00, 0.50, 0.66, 0.35, 0.00, 0.55,
    ]},
    Preset { name: "Pluck Bass", values: [
        0.42, 0.15, 0.18, 0.55, 0.75,
        0.00, 0.45, 0.00, 0.42,
        0.00, 0.40, 0.00, 0.35,
        0.82, 0.60, 0.167, 0.40, -1.0,
        0.00, 0.50, 0.60, 0.40, 0.15, 0.55,
    ]},
    Preset { name: "Arp Pluck", values: [
        0.72, 0.08, 0.30, 0.70, 0.60,
        0.00, 0.45, 0.00, 0.40,
        0.00, 0.40, 0.00, 0.35,
        0.75, 0.55, 0.167, 0.10, -1.0,
        0.00, 0.50, 0.60, 0.50, 0.20, 0.55,
    ]},
    Preset { name: "Hardstyle", values: [
        0.82, 0.25, 0.60, 0.85, 0.30,
        0.00, 0.50, 0.70, 0.50,
        0.00, 0.45, 0.40, 0.45,
        0.80, 0.50, 0.167, 0.40, -1.0,
        0.00, 0.50, 0.60, 0.25, 0.10, 0.60,
    ]},
    Preset { name: "Solo Saw", values: [
        0.82, 0.00, 0.00, 0.00, 0.25,
        0.00, 0.55, 0.80, 0.55,
        0.00, 0.50, 0.50, 0.50,
        0.70, 0.50, 0.167, 0.00, -1.0,
        0.00, 0.50, 0.66, 0.35, 0.00, 0.55,
    ]},
    Preset { name: "Warm Lead", values: [
        0.70, 0.08, 0.08, 0.45, 0.40,
        0.00, 0.55, 0.65, 0.55,
        0.00, 0.50, 0.30, 0.50,
        0.70, 0.50, 0.25, 0.20, -1.0,
        0.15, 0.40, 0.66, 0.35, 0.15, 0.50,
    ]},
    Preset { name: "Acid", values: [
        0.40, 0.80, 0.00, 0.00, 0.85,
        0.00, 0.60, 0.50, 0.50,
        0.00, 0.55, 0.05, 0.45,
        0.75, 0.65, 0.167, 0.20, -1.0,
        0.00, 0.50, 0.66, 0.55, 0.18, 0.45,
    ]},
    Preset { name: "Hoover", values: [
        0.70, 0.25, 0.75, 1.00, 0.45,
        0.00, 0.55, 0.70, 0.55,
        0.00, 0.50, 0.30, 0.50,
        0.70, 0.40, 0.25, 0.30, -1.0,
        0.15, 0.50, 0.66, 0.35, 0.12, 0.50,
    ]},
    Preset { name: "Vapor", values: [
        0.55, 0.15, 0.50, 0.90, 0.35,
        0.80, 0.70, 0.90, 0.85,
        0.75, 0.65, 0.70, 0.80,
        0.60, 0.10, 0.167, 0.20, -1.0,
        0.30, 0.65, 0.78, 0.50, 0.30, 0.30,
    ]},
];

/// Live parameter values, one slot per table entry.
///
/// All writes clamp to the table range, so downstream code can trust
/// every slot without re-validating.
#[derive(Clone)]
pub struct ParamSet {
    values: [f32; PARAM_COUNT],
}

impl ParamSet {
    pub fn get(&self, id: ParamId) -> f32 {
        self.values[id.index()]
    }

    pub fn set(&mut self, id: ParamId, value: f32) {
        let def = id.def();
        self.values[id.index()] = value.clamp(def.min, def.max);
    }

    /// Set by string key; returns false if the key is unknown.
    pub fn set_by_key(&mut self, key: &str, value: f32) -> bool {
        match ParamId::from_key(key) {
            Some(id) => {
                self.set(id, value);
                true
            }
            None => false,
        }
    }

    pub fn apply_preset(&mut self, preset: &Preset) {
        for id in ParamId::ALL {
            self.set(id, preset.values[id.index()]);
        }
    }
}

impl Default for ParamSet {
    /// The init patch.
    fn default() -> Self {
        let mut set = ParamSet {
            values: [0.0; PARAM_COUNT],
        };
        set.apply_preset(&FACTORY_PRESETS[0]);
        set
    }
}

/// Serialized instrument state.
///
/// Parameter values flatten to top-level keys next to `preset` and
/// `octave_transpose`, so a state file reads as one flat JSON object.
#[derive(Serialize, Deserialize)]
pub struct PatchState {
    pub preset: usize,
    pub octave_transpose: i32,
    #[serde(flatten)]
    pub params: BTreeMap<String, f32>,
}

#[derive(Debug)]
pub enum PatchError {
    Json(serde_json::Error),
    UnknownPreset(usize),
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchError::Json(e) => write!(f, "state serialization failed: {e}"),
            PatchError::UnknownPreset(idx) => write!(f, "no preset at index {idx}"),
        }
    }
}

impl std::error::Error for PatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PatchError::Json(e) => Some(e),
            PatchError::UnknownPreset(_) => None,
        }
    }
}

impl From<serde_json::Error> for PatchError {
    fn from(e: serde_json::Error) -> Self {
        PatchError::Json(e)
    }
}
