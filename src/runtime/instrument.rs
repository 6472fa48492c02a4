use crate::fx::{Chorus, PingPongDelay};
use crate::patch::{ParamId, ParamSet, PatchError, PatchState, FACTORY_PRESETS};
use crate::synth::{Engine, MessageReceiver, SynthMessage};
use crate::MAX_BLOCK_SIZE;

/// Samples below this pass the output stage untouched; above it they go
/// through tanh, keeping the final output strictly inside [-1, 1].
const SOFT_CLIP_THRESHOLD: f32 = 0.9;

/*
The instrument owns one engine, the stereo effects that follow it, and
the host-visible parameter set. Control flows in through typed setters
or a drained message queue; audio flows out through `render`, which
pushes the current `ParamSet` into the engine, sums the voices, and runs
the chorus-then-delay chain in place.

This is the type a host embeds: everything above it is wiring (MIDI
parsing, the ring buffer, an audio backend) and everything below it is
per-sample DSP that never sees a string key or a preset index.
*/

pub struct Instrument {
    engine: Engine,
    chorus: Chorus,
    delay: PingPongDelay,
    params: ParamSet,
    current_preset: usize,
    octave_transpose: i32,
}

impl Instrument {
    /// New instrument on the init patch, entropy-seeded.
    pub fn new() -> Self {
        Self::build(Engine::new())
    }

    /// New instrument with deterministic randomness, for offline renders
    /// and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(Engine::with_seed(seed))
    }

    fn build(engine: Engine) -> Self {
        log::info!(
            "instrument ready: {} presets, {} oscillators per voice",
            FACTORY_PRESETS.len(),
            engine.oscillator_count()
        );
        Self {
            engine,
            chorus: Chorus::new(),
            delay: PingPongDelay::new(),
            params: ParamSet::default(),
            current_preset: 0,
            octave_transpose: 0,
        }
    }

    pub fn param(&self, id: ParamId) -> f32 {
        self.params.get(id)
    }

    pub fn set_param(&mut self, id: ParamId, value: f32) {
        self.params.set(id, value);
    }

    /// Set by string key; returns false for unknown keys.
    pub fn set_param_by_key(&mut self, key: &str, value: f32) -> bool {
        self.params.set_by_key(key, value)
    }

    pub fn preset_count(&self) -> usize {
        FACTORY_PRESETS.len()
    }

    pub fn current_preset(&self) -> usize {
        self.current_preset
    }

    pub fn preset_name(&self, index: usize) -> Option<&'static str> {
        FACTORY_PRESETS.get(index).map(|p| p.name)
    }

    /// Load a factory preset, replacing the whole parameter set.
    pub fn load_preset(&mut self, index: usize) -> Result<(), PatchError> {
        let preset = FACTORY_PRESETS
            .get(index)
            .ok_or(PatchError::UnknownPreset(index))?;
        self.params.apply_preset(preset);
        self.current_preset = index;
        log::info!("loaded preset {index}: {}", preset.name);
        Ok(())
    }

    pub fn octave_transpose(&self) -> i32 {
        self.octave_transpose
    }

    /// Keyboard transpose in octaves, clamped to -3..=3. Takes effect on
    /// the next note-on; sounding notes keep their pitch.
    pub fn set_octave_transpose(&mut self, octaves: i32) {
        self.octave_transpose = octaves.clamp(-3, 3);
    }

    pub fn note_on(&mut self, note: u8, velocity: f32) {
        self.engine.note_on(note, velocity);
    }

    pub fn note_off(&mut self, note: u8) {
        self.engine.note_off(note);
    }

    pub fn pitch_bend(&mut self, value: f32) {
        self.engine.pitch_bend(value);
    }

    pub fn all_notes_off(&mut self) {
        self.engine.all_notes_off();
    }

    pub fn set_oscillator_count(&mut self, requested: usize) -> usize {
        self.engine.set_oscillator_count(requested)
    }

    pub fn oscillator_count(&self) -> usize {
        self.engine.oscillator_count()
    }

    /// Drain the control queue. Call once at block start, before
    /// `render`; returns the number of messages handled.
    pub fn pump_messages(&mut self, queue: &mut impl MessageReceiver) -> usize {
        let mut handled = 0;
        while let Some(message) = queue.pop() {
            match message {
                SynthMessage::NoteOn { note, velocity } => self.note_on(note, velocity),
                SynthMessage::NoteOff { note } => self.note_off(note),
                SynthMessage::PitchBend { value } => self.pitch_bend(value),
                SynthMessage::SetParam { id, value } => self.set_param(id, value),
                SynthMessage::AllNotesOff => self.all_notes_off(),
            }
            handled += 1;
        }
        handled
    }

    /// Render one stereo block: voices, then chorus, then delay, then a
    /// final soft clip. Frames beyond [`MAX_BLOCK_SIZE`] (or the shorter
    /// channel) are left untouched.
    ///
    /// Output is guaranteed within [-1, 1]: samples are transparent up
    /// to 0.9 and pass through tanh beyond it, on top of the engine's
    /// own headroom and the delay's feedback saturation guard.
    pub fn render(&mut self, out_left: &mut [f32], out_right: &mut [f32]) {
        self.push_params();
        let frames = out_left.len().min(out_right.len()).min(MAX_BLOCK_SIZE);
        let (left, right) = (&mut out_left[..frames], &mut out_right[..frames]);

        self.engine.render(left, right);
        self.chorus.process(
            left,
            right,
            self.params.get(ParamId::ChorusMix),
            self.params.get(ParamId::ChorusDepth),
        );
        self.delay.process(
            left,
            right,
            self.params.get(ParamId::DelayTime),
            self.params.get(ParamId::DelayFeedback),
            self.params.get(ParamId::DelayMix),
            self.params.get(ParamId::DelayTone),
        );

        for s in left.iter_mut().chain(right.iter_mut()) {
            if s.abs() > SOFT_CLIP_THRESHOLD {
                *s = s.tanh();
            }
        }
    }

    fn push_params(&mut self) {
        let p = &self.params;
        let engine = self.engine.params_mut();
        engine.cutoff = p.get(ParamId::Cutoff);
        engine.resonance = p.get(ParamId::Resonance);
        engine.detune = p.get(ParamId::Detune);
        engine.spread = p.get(ParamId::Spread);
        engine.filter_env_amount = p.get(ParamId::FilterEnvAmount);
        engine.amp_attack = p.get(ParamId::Attack);
        engine.amp_decay = p.get(ParamId::Decay);
        engine.amp_sustain = p.get(ParamId::Sustain);
        engine.amp_release = p.get(ParamId::Release);
        engine.filt_attack = p.get(ParamId::FilterAttack);
        engine.filt_decay = p.get(ParamId::FilterDecay);
        engine.filt_sustain = p.get(ParamId::FilterSustain);
        engine.filt_release = p.get(ParamId::FilterRelease);
        engine.volume = p.get(ParamId::Volume);
        engine.velocity_sens = p.get(ParamId::VelocitySens);
        engine.bend_range = p.get(ParamId::BendRange);
        engine.sub_level = p.get(ParamId::SubLevel);
        engine.sub_octave = p.get(ParamId::SubOctave).round() as i32;
        engine.octave_transpose = self.octave_transpose;
    }

    /// Serialize the full instrument state to a flat JSON object.
    pub fn state_json(&self) -> Result<String, PatchError> {
        let mut params = std::collections::BTreeMap::new();
        for id in ParamId::ALL {
            params.insert(id.key().to_string(), self.params.get(id));
        }
        let state = PatchState {
            preset: self.current_preset,
            octave_transpose: self.octave_transpose,
            params,
        };
        Ok(serde_json::to_string(&state)?)
    }

    /// Restore state written by [`Instrument::state_json`]. The preset
    /// is applied first, then individual parameter overrides on top, so
    /// edited patches survive the round trip.
    pub fn restore_state_json(&mut self, json: &str) -> Result<(), PatchError> {
        let state: PatchState = serde_json::from_str(json)?;
        self.load_preset(state.preset)?;
        for (key, value) in &state.params {
            if !self.params.set_by_key(key, *value) {
                log::warn!("ignoring unknown parameter key {key:?} in state");
            }
        }
        self.set_octave_transpose(state.octave_transpose);
        Ok(())
    }
}

impl Default for Instrument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_load_replaces_parameters() {
        let mut inst = Instrument::with_seed(7);
        // Preset 17 is the sub-heavy bass patch
        inst.load_preset(17).unwrap();
        assert_eq!(inst.current_preset(), 17);
        assert_eq!(inst.preset_name(17), Some("Sub Bass"));
        assert_eq!(inst.param(ParamId::SubOctave), -2.0);
        assert!(inst.param(ParamId::SubLevel) > 0.5);

        assert!(inst.load_preset(usize::MAX).is_err());
    }

    #[test]
    fn state_round_trip_preserves_edits() {
        let mut inst = Instrument::with_seed(7);
        inst.load_preset(2).unwrap();
        inst.set_param(ParamId::Cutoff, 0.31);
        inst.set_octave_transpose(-2);

        let json = inst.state_json().unwrap();

        let mut other = Instrument::with_seed(8);
        other.restore_state_json(&json).unwrap();
        assert_eq!(other.current_preset(), 2);
        assert_eq!(other.octave_transpose(), -2);
        assert!((other.param(ParamId::Cutoff) - 0.31).abs() < 1e-6);
    }

    #[test]
    fn restore_rejects_bad_json() {
        let mut inst = Instrument::with_seed(7);
        assert!(inst.restore_state_json("not json").is_err());
        assert!(inst
            .restore_state_json("{\"preset\":9999,\"octave_transpose\":0}")
            .is_err());
    }

    #[test]
    fn render_produces_sound_after_note_on() {
        let mut inst = Instrument::with_seed(7);
        inst.note_on(60, 1.0);
        let mut l = [0.0f32; 256];
        let mut r = [0.0f32; 256];
        inst.render(&mut l, &mut r);

        let peak = l.iter().chain(r.iter()).fold(0.0f32, |m, &s| m.max(s.abs()));
        assert!(peak > 1e-6, "expected audible output, peak {peak}");
        assert!(peak <= 1.0, "output clipped: {peak}");
    }

    #[test]
    fn render_never_touches_frames_beyond_the_block_limit() {
        let mut inst = Instrument::with_seed(7);
        inst.set_param(ParamId::ChorusMix, 0.5);
        inst.set_param(ParamId::DelayMix, 0.5);
        inst.set_param(ParamId::DelayFeedback, 0.5);
        inst.note_on(60, 1.0);

        // Oversized buffers carry a sentinel past the block limit
        let mut l = vec![7.0f32; MAX_BLOCK_SIZE + 64];
        let mut r = vec![7.0f32; MAX_BLOCK_SIZE + 64];
        inst.render(&mut l, &mut r);

        assert!(l[..MAX_BLOCK_SIZE].iter().all(|&s| s.abs() <= 1.0));
        assert!(l[MAX_BLOCK_SIZE..].iter().all(|&s| s == 7.0));
        assert!(r[MAX_BLOCK_SIZE..].iter().all(|&s| s == 7.0));
    }

    #[test]
    fn output_stays_within_full_scale_at_maximum_volume() {
        let mut inst = Instrument::with_seed(7);
        inst.set_param(ParamId::Volume, 1.0);
        inst.set_param(ParamId::ChorusMix, 0.6);
        inst.set_param(ParamId::DelayMix, 0.5);
        inst.set_param(ParamId::DelayFeedback, 0.9);
        for note in 0..8 {
            inst.note_on(48 + note * 3, 1.0);
        }

        let mut l = [0.0f32; MAX_BLOCK_SIZE];
        let mut r = [0.0f32; MAX_BLOCK_SIZE];
        let blocks = (3.0 * 44_100.0 / MAX_BLOCK_SIZE as f32) as usize;
        for _ in 0..blocks {
            inst.render(&mut l, &mut r);
            for s in l.iter().chain(r.iter()) {
                assert!(s.abs() <= 1.0, "output clipped past full scale: {s}");
            }
        }
    }

    #[test]
    fn message_pump_drains_and_applies() {
        struct Fifo(std::collections::VecDeque<SynthMessage>);
        impl MessageReceiver for Fifo {
            fn pop(&mut self) -> Option<SynthMessage> {
                self.0.pop_front()
            }
        }

        let mut inst = Instrument::with_seed(7);
        let mut queue = Fifo(
            [
                SynthMessage::NoteOn {
                    note: 60,
                    velocity: 0.9,
                },
                SynthMessage::SetParam {
                    id: ParamId::Detune,
                    value: 0.9,
                },
                SynthMessage::PitchBend { value: 0.5 },
            ]
            .into(),
        );
        assert_eq!(inst.pump_messages(&mut queue), 3);
        assert!((inst.param(ParamId::Detune) - 0.9).abs() < 1e-6);
        assert!(queue.0.is_empty());
    }
}
