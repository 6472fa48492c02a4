use rand::rngs::SmallRng;
use rand::Rng;

use crate::dsp::dcblock::DcBlocker;
use crate::dsp::envelope::{Envelope, EnvelopeStage};
use crate::dsp::svf::SvfState;
use crate::synth::bank::MAX_OSCILLATORS;

/// One polyphonic voice, owned exclusively by the engine and reused
/// across notes.
///
/// Phase and drift arrays are statically sized to the maximum supported
/// oscillator count so claiming a voice never allocates; only the first
/// `oscillator count` slots are touched during rendering.
///
/// Lifecycle: claimed at note-on (`start`), advances every sample while
/// either envelope is live, enters Release on note-off or steal, and is
/// reclaimable once the amplitude envelope reaches Off.
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    pub(crate) active: bool,
    pub(crate) note: u8,
    pub(crate) velocity: f32,
    pub(crate) freq: f32,
    pub(crate) age: u64,

    pub(crate) phase: [f32; MAX_OSCILLATORS],
    pub(crate) drift: [f32; MAX_OSCILLATORS],
    pub(crate) sub_phase: f32,

    pub(crate) dc_l: DcBlocker,
    pub(crate) dc_r: DcBlocker,
    pub(crate) svf_l: SvfState,
    pub(crate) svf_r: SvfState,

    pub(crate) amp_env: Envelope,
    pub(crate) filt_env: Envelope,
}

impl Voice {
    pub(crate) fn new() -> Self {
        Self {
            active: false,
            note: 0,
            velocity: 0.0,
            freq: 0.0,
            age: 0,
            phase: [0.0; MAX_OSCILLATORS],
            drift: [0.0; MAX_OSCILLATORS],
            sub_phase: 0.0,
            dc_l: DcBlocker::new(),
            dc_r: DcBlocker::new(),
            svf_l: SvfState::new(),
            svf_r: SvfState::new(),
            amp_env: Envelope::new(),
            filt_env: Envelope::new(),
        }
    }

    /// Claim this voice for a new note.
    ///
    /// Phases are randomized from the engine's seeded generator so
    /// unison attacks never phase-lock; drift and filter memory are
    /// zeroed; both envelopes retrigger from their current level.
    pub(crate) fn start(
        &mut self,
        note: u8,
        velocity: f32,
        freq: f32,
        age: u64,
        oscillators: usize,
        rng: &mut SmallRng,
    ) {
        self.active = true;
        self.note = note;
        self.velocity = velocity;
        self.freq = freq;
        self.age = age;

        for slot in 0..oscillators {
            self.phase[slot] = rng.random::<f32>();
            self.drift[slot] = 0.0;
        }
        // Sub oscillator starts at zero for a clean attack
        self.sub_phase = 0.0;

        self.dc_l.reset();
        self.dc_r.reset();
        self.svf_l.reset();
        self.svf_r.reset();

        self.amp_env.trigger_attack();
        self.filt_env.trigger_attack();
    }

    /// Note-off or steal: push both envelopes into Release.
    pub(crate) fn release(&mut self) {
        self.active = false;
        self.amp_env.trigger_release();
        self.filt_env.trigger_release();
    }

    /// Panic reset: envelopes Off at level zero, all filter memory cleared.
    pub(crate) fn hard_reset(&mut self) {
        self.active = false;
        self.amp_env.hard_reset();
        self.filt_env.hard_reset();
        self.dc_l.reset();
        self.dc_r.reset();
        self.svf_l.reset();
        self.svf_r.reset();
    }

    /// A voice is free once its amplitude envelope has fully decayed.
    pub fn is_free(&self) -> bool {
        !self.active && self.amp_env.is_off()
    }

    /// Quiescent means free with every stateful element zeroed, the
    /// post-`hard_reset` condition.
    pub fn is_quiescent(&self) -> bool {
        self.is_free()
            && self.amp_env.level() == 0.0
            && self.filt_env.level() == 0.0
            && self.dc_l.is_reset()
            && self.dc_r.is_reset()
            && self.svf_l.is_reset()
            && self.svf_r.is_reset()
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn amp_level(&self) -> f32 {
        self.amp_env.level()
    }

    pub fn amp_stage(&self) -> EnvelopeStage {
        self.amp_env.stage()
    }
}
