use std::f32::consts::{FRAC_1_SQRT_2, TAU};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::dsp::envelope::EnvelopeRates;
use crate::dsp::svf::SvfCoeffs;
use crate::dsp::{oscillator, params};
use crate::synth::bank::{self, BankConfig};
use crate::synth::voice::Voice;
use crate::{MAX_BLOCK_SIZE, SAMPLE_RATE};

/// Polyphony capacity. Stealing guarantees note-on always succeeds, so
/// this also bounds worst-case render cost regardless of input rate.
pub const MAX_VOICES: usize = 8;

/// Maximum fractional detune: the outermost pair reaches 10% of the
/// base frequency at full detune.
const DETUNE_K_MAX: f32 = 0.10;

/// One-pole smoothing coefficient, ~5 ms at 44.1 kHz:
/// `1 - exp(-1/(0.005 * 44100))`.
const SMOOTH_COEFF: f32 = 0.004_52;

/// Side-oscillator gain at full spread: the center stays ~1.5x louder
/// than any individual side voice.
const SIDE_GAIN_SCALE: f32 = 0.667;

/// Side-oscillator floor (~1.5%): detuned voices never vanish entirely,
/// keeping a faint thickening even at spread zero.
const SIDE_GAIN_FLOOR: f32 = 0.015;

/// Analog drift: ~0.35 cents of slow random pitch walk per oscillator.
/// The walk is white noise through a one-pole lowpass at ~8 Hz
/// (`2*pi*8/44100`).
const DRIFT_AMOUNT: f32 = 0.000_2;
const DRIFT_COEFF: f32 = 0.001_14;

/// Master headroom for 8-voice polyphony.
const MASTER_HEADROOM: f32 = 0.3;

/// Normalized engine parameters. All values live in [0, 1] unless
/// noted; they are clamped to their declared range at block start, so
/// hosts may write freely.
#[derive(Debug, Clone, Copy)]
pub struct EngineParams {
    pub cutoff: f32,
    pub resonance: f32,
    pub detune: f32,
    pub spread: f32,
    pub filter_env_amount: f32,

    pub amp_attack: f32,
    pub amp_decay: f32,
    pub amp_sustain: f32,
    pub amp_release: f32,

    pub filt_attack: f32,
    pub filt_decay: f32,
    pub filt_sustain: f32,
    pub filt_release: f32,

    pub volume: f32,
    pub velocity_sens: f32,
    pub bend_range: f32,
    pub sub_level: f32,
    /// Sub oscillator octave offset: -2, -1, or 0.
    pub sub_octave: i32,
    /// Keyboard transpose in octaves, -3..=3.
    pub octave_transpose: i32,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            cutoff: 0.7,
            resonance: 0.0,
            detune: 0.3,
            spread: 0.7,
            filter_env_amount: 0.5,
            amp_attack: 0.01,
            amp_decay: 0.3,
            amp_sustain: 0.7,
            amp_release: 0.2,
            filt_attack: 0.01,
            filt_decay: 0.3,
            filt_sustain: 0.3,
            filt_release: 0.2,
            volume: 0.7,
            velocity_sens: 0.5,
            bend_range: 0.167, // ~2 semitones
            sub_level: 0.0,
            sub_octave: -1,
            octave_transpose: 0,
        }
    }
}

impl EngineParams {
    /// Copy with every field clamped to its declared range.
    fn clamped(&self) -> Self {
        Self {
            cutoff: self.cutoff.clamp(0.0, 1.0),
            resonance: self.resonance.clamp(0.0, 1.0),
            detune: self.detune.clamp(0.0, 1.0),
            spread: self.spread.clamp(0.0, 1.0),
            filter_env_amount: self.filter_env_amount.clamp(0.0, 1.0),
            amp_attack: self.amp_attack.clamp(0.0, 1.0),
            amp_decay: self.amp_decay.clamp(0.0, 1.0),
            amp_sustain: self.amp_sustain.clamp(0.0, 1.0),
            amp_release: self.amp_release.clamp(0.0, 1.0),
            filt_attack: self.filt_attack.clamp(0.0, 1.0),
            filt_decay: self.filt_decay.clamp(0.0, 1.0),
            filt_sustain: self.filt_sustain.clamp(0.0, 1.0),
            filt_release: self.filt_release.clamp(0.0, 1.0),
            volume: self.volume.clamp(0.0, 1.0),
            velocity_sens: self.velocity_sens.clamp(0.0, 1.0),
            bend_range: self.bend_range.clamp(0.0, 1.0),
            sub_level: self.sub_level.clamp(0.0, 1.0),
            sub_octave: self.sub_octave.clamp(-2, 0),
            octave_transpose: self.octave_transpose.clamp(-3, 3),
        }
    }
}

/// The polyphonic supersaw engine.
///
/// Owns the voice pool, the oscillator-bank tables, the seeded random
/// generator used for phase init and drift, and the parameter smoothing
/// state. Event calls (`note_on` etc.) must arrive between `render`
/// calls; the render path never allocates.
pub struct Engine {
    sample_rate: f32,
    voices: [Voice; MAX_VOICES],
    voice_counter: u64,
    rng: SmallRng,
    params: EngineParams,
    bank: BankConfig,
    bend: f32,

    // One-pole smoother state for zipper-prone parameters
    smooth_detune: f32,
    smooth_spread: f32,
    smooth_cutoff: f32,

    // Per-block smoothed trajectories, precomputed before voice
    // iteration so every voice reads identical per-sample values and
    // the smoothers advance exactly once per sample
    detune_path: [f32; MAX_BLOCK_SIZE],
    spread_path: [f32; MAX_BLOCK_SIZE],
    cutoff_path: [f32; MAX_BLOCK_SIZE],
}

impl Engine {
    /// New engine with entropy-seeded drift/phase randomness.
    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_os_rng())
    }

    /// New engine with a fixed seed, for reproducible renders.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        let params = EngineParams::default();
        Self {
            sample_rate: SAMPLE_RATE,
            voices: std::array::from_fn(|_| Voice::new()),
            voice_counter: 0,
            rng,
            smooth_detune: params.detune,
            smooth_spread: params.spread,
            smooth_cutoff: params.cutoff,
            params,
            bank: BankConfig::new(7),
            bend: 0.0,
            detune_path: [0.0; MAX_BLOCK_SIZE],
            spread_path: [0.0; MAX_BLOCK_SIZE],
            cutoff_path: [0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut EngineParams {
        &mut self.params
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn oscillator_count(&self) -> usize {
        self.bank.count()
    }

    /// Reconfigure the per-voice oscillator count.
    ///
    /// The request is rounded to the nearest valid odd count in [3, 25]
    /// and the applied count is returned. All voices are hard reset:
    /// sounding notes are cut, because resizing their phase/drift
    /// arrays mid-note would leave stale oscillator state.
    pub fn set_oscillator_count(&mut self, requested: usize) -> usize {
        let count = bank::sanitize_count(requested);
        if count != self.bank.count() {
            self.bank = BankConfig::new(count);
            for voice in &mut self.voices {
                voice.hard_reset();
            }
            log::debug!("oscillator bank reconfigured to {count} voices");
        }
        count
    }

    /// Start a note. Always succeeds: a free voice is claimed, else the
    /// oldest releasing voice, else the oldest voice outright.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        let note = note.min(127);
        let velocity = velocity.clamp(0.0, 1.0);
        let transposed = note as i32 + self.params.octave_transpose.clamp(-3, 3) * 12;
        let freq = params::note_to_freq(transposed);
        let age = self.voice_counter;
        self.voice_counter += 1;

        let slot = self.select_voice();
        self.voices[slot].start(note, velocity, freq, age, self.bank.count(), &mut self.rng);
    }

    /// Release every active voice playing `note`. Unison voices on the
    /// same note all release together.
    pub fn note_off(&mut self, note: u8) {
        use crate::dsp::EnvelopeStage;
        for voice in &mut self.voices {
            if voice.active && voice.note == note && voice.amp_env.stage() != EnvelopeStage::Release
            {
                voice.release();
            }
        }
    }

    /// Store a normalized pitch bend in -1..1, applied at render time as
    /// a frequency ratio of `2^(bend * bend_range)` octaves-in-semitones.
    pub fn pitch_bend(&mut self, value: f32) {
        self.bend = value.clamp(-1.0, 1.0);
    }

    /// Transport-stop / panic: hard-reset every voice. Idempotent.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.hard_reset();
        }
    }

    /// Voice selection priority: any free voice, else the oldest
    /// releasing voice, else the oldest voice overall (hard steal).
    fn select_voice(&self) -> usize {
        use crate::dsp::EnvelopeStage;

        if let Some(slot) = self.voices.iter().position(|v| v.is_free()) {
            return slot;
        }

        let releasing = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.amp_env.stage() == EnvelopeStage::Release)
            .min_by_key(|(_, v)| v.age)
            .map(|(slot, _)| slot);
        if let Some(slot) = releasing {
            return slot;
        }

        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.age)
            .map(|(slot, _)| slot)
            .unwrap_or(0)
    }

    /// Render one stereo block, accumulating all live voices.
    ///
    /// Frames beyond [`MAX_BLOCK_SIZE`] (or the shorter channel) are not
    /// rendered. A zero-frame call has no side effects.
    pub fn render(&mut self, out_left: &mut [f32], out_right: &mut [f32]) {
        let frames = out_left.len().min(out_right.len()).min(MAX_BLOCK_SIZE);
        let out_left = &mut out_left[..frames];
        let out_right = &mut out_right[..frames];
        out_left.fill(0.0);
        out_right.fill(0.0);
        if frames == 0 {
            return;
        }

        let sr = self.sample_rate;
        let p = self.params.clamped();

        // Block-constant coefficients
        let amp_rates =
            EnvelopeRates::from_params(p.amp_attack, p.amp_decay, p.amp_sustain, p.amp_release, sr);
        let filt_rates = EnvelopeRates::from_params(
            p.filt_attack,
            p.filt_decay,
            p.filt_sustain,
            p.filt_release,
            sr,
        );
        let q = params::filter_q(p.resonance);
        let f_env_octaves = p.filter_env_amount * 8.0;
        let bend_ratio = (self.bend * p.bend_range * 12.0 / 12.0).exp2();
        let master = p.volume * MASTER_HEADROOM;
        let vel_sens = p.velocity_sens;
        let sub_mult = match p.sub_octave {
            -2 => 0.25,
            -1 => 0.5,
            _ => 1.0,
        };

        // Advance the parameter smoothers once per sample, ahead of the
        // voice loop, so every voice reads the same trajectory
        for n in 0..frames {
            self.smooth_detune += (p.detune - self.smooth_detune) * SMOOTH_COEFF;
            self.smooth_spread += (p.spread - self.smooth_spread) * SMOOTH_COEFF;
            self.smooth_cutoff += (p.cutoff - self.smooth_cutoff) * SMOOTH_COEFF;
            self.detune_path[n] = self.smooth_detune;
            self.spread_path[n] = self.smooth_spread;
            self.cutoff_path[n] = self.smooth_cutoff;
        }

        let bank = &self.bank;
        let oscillators = bank.count();
        let rng = &mut self.rng;

        for voice in &mut self.voices {
            if voice.amp_env.is_off() {
                continue;
            }

            let f0 = voice.freq * bend_ratio;
            let inc0 = f0 / sr;
            let vel_gain = 1.0 - vel_sens + vel_sens * voice.velocity;

            for n in 0..frames {
                let cur_detune = self.detune_path[n];
                let cur_spread = self.spread_path[n];

                // Detune spread in Hz for the outermost pair, expressed
                // as a phase-increment offset
                let d_inc = f0 * DETUNE_K_MAX * params::detune_curve(cur_detune) / sr;

                // spread^1.5, computed as x*sqrt(x) to avoid powf
                let gs =
                    (cur_spread * cur_spread.sqrt() * SIDE_GAIN_SCALE).max(SIDE_GAIN_FLOOR);
                // Equal-energy normalization: loudness stays constant as
                // spread changes (phase-incoherent source assumption)
                let norm = 1.0 / (1.0 + (oscillators - 1) as f32 * gs * gs).sqrt();

                let mut mix_l = 0.0;
                let mut mix_r = 0.0;

                for slot in 0..oscillators {
                    // Slow random pitch walk, independent per oscillator
                    let noise = rng.random::<f32>() * 2.0 - 1.0;
                    voice.drift[slot] += (noise - voice.drift[slot]) * DRIFT_COEFF;
                    let drift_mult = 1.0 + voice.drift[slot] * DRIFT_AMOUNT;

                    let inc =
                        ((inc0 + bank.detune_coeff(slot) * d_inc) * drift_mult).max(0.0);

                    voice.phase[slot] += inc;
                    if voice.phase[slot] >= 1.0 {
                        voice.phase[slot] -= 1.0;
                    }

                    let saw = oscillator::saw(voice.phase[slot], inc);
                    let gain = if slot == 0 { 1.0 } else { gs };
                    mix_l += saw * gain * bank.pan_l(slot);
                    mix_r += saw * gain * bank.pan_r(slot);
                }

                mix_l *= norm;
                mix_r *= norm;

                // Sine sub, center-panned, added after normalization
                if p.sub_level > 0.001 {
                    voice.sub_phase += inc0 * sub_mult;
                    if voice.sub_phase >= 1.0 {
                        voice.sub_phase -= 1.0;
                    }
                    let sub = (voice.sub_phase * TAU).sin() * p.sub_level;
                    mix_l += sub * FRAC_1_SQRT_2;
                    mix_r += sub * FRAC_1_SQRT_2;
                }

                let hp_l = voice.dc_l.next_sample(mix_l);
                let hp_r = voice.dc_r.next_sample(mix_r);

                let amp_level = voice.amp_env.next_sample(&amp_rates);
                let filt_level = voice.filt_env.next_sample(&filt_rates);

                // Envelope modulates cutoff in octaves above the base
                let base_cutoff = params::cutoff_hz(self.cutoff_path[n]);
                let fc = (base_cutoff * (filt_level * f_env_octaves).exp2())
                    .clamp(20.0, 20_000.0);
                let coeffs = SvfCoeffs::lowpass(fc, q, sr);
                let lp_l = voice.svf_l.next_lowpass(&coeffs, hp_l);
                let lp_r = voice.svf_r.next_lowpass(&coeffs, hp_r);

                let amp = amp_level * vel_gain * master;
                out_left[n] += lp_l * amp;
                out_right[n] += lp_r * amp;
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
