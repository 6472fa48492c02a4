use crate::dsp::params;

/*
ADSR Envelope
=============

A five-stage state machine producing a per-sample amplitude multiplier:

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

Attack is a linear ramp; decay and release are multiplicative
(exponential) approaches, which matches how acoustic sounds settle.
The decay/release coefficients use `exp(-4 / (time * sample_rate))`:
the level reaches ~98% of its target within the nominal time, a
deliberate approximation that presets are authored against.

Transitions:
  Attack  -> Decay    when level reaches 1.0 (clamped)
  Decay   -> Sustain  when level settles within 1e-4 of the target
  Release -> Off      when level drops below 1e-4 (snapped to 0)
  Sustain pins the level to the live target every sample, so parameter
  changes track without a stage change.

Retrigger starts Attack from the CURRENT level rather than resetting to
zero. This keeps fast retriggers click-free. Note-off (or being stolen)
forces Release unconditionally; Off forces the level to exactly 0.
*/

/// Settle threshold for the Decay->Sustain and Release->Off transitions.
pub const SETTLE_THRESHOLD: f32 = 1e-4;

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Off,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Block-constant envelope coefficients, computed once per render call.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeRates {
    /// Linear per-sample increment during Attack.
    pub attack_rate: f32,
    /// Multiplicative approach coefficient during Decay.
    pub decay_coeff: f32,
    /// Target level held during Sustain.
    pub sustain: f32,
    /// Multiplicative decay coefficient during Release.
    pub release_coeff: f32,
}

impl EnvelopeRates {
    /// Derive rates from normalized ADSR parameters at a given sample rate.
    pub fn from_params(attack: f32, decay: f32, sustain: f32, release: f32, sample_rate: f32) -> Self {
        Self {
            attack_rate: 1.0 / (params::time_seconds(attack) * sample_rate),
            decay_coeff: (-4.0 / (params::time_seconds(decay) * sample_rate)).exp(),
            sustain: sustain.clamp(0.0, 1.0),
            release_coeff: (-4.0 / (params::time_seconds(release) * sample_rate)).exp(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    stage: EnvelopeStage,
    level: f32,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            stage: EnvelopeStage::Off,
            level: 0.0,
        }
    }

    /// Gate high: enter Attack from the current level (no hard reset).
    pub fn trigger_attack(&mut self) {
        self.stage = EnvelopeStage::Attack;
    }

    /// Gate low or voice stolen: enter Release unconditionally.
    pub fn trigger_release(&mut self) {
        self.stage = EnvelopeStage::Release;
    }

    /// Force Off with the level snapped to exactly zero.
    pub fn hard_reset(&mut self) {
        self.stage = EnvelopeStage::Off;
        self.level = 0.0;
    }

    /// Advance one sample and return the new level.
    pub fn next_sample(&mut self, rates: &EnvelopeRates) -> f32 {
        match self.stage {
            EnvelopeStage::Attack => {
                self.level += rates.attack_rate;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }
            EnvelopeStage::Decay => {
                self.level = rates.sustain + (self.level - rates.sustain) * rates.decay_coeff;
                if self.level <= rates.sustain + SETTLE_THRESHOLD {
                    self.level = rates.sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }
            EnvelopeStage::Sustain => {
                // Pinned to the live target so parameter changes track
                self.level = rates.sustain;
            }
            EnvelopeStage::Release => {
                self.level *= rates.release_coeff;
                if self.level < SETTLE_THRESHOLD {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Off;
                }
            }
            EnvelopeStage::Off => {
                self.level = 0.0;
            }
        }
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn is_off(&self) -> bool {
        self.stage == EnvelopeStage::Off
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(attack_rate: f32, decay_coeff: f32, sustain: f32, release_coeff: f32) -> EnvelopeRates {
        EnvelopeRates {
            attack_rate,
            decay_coeff,
            sustain,
            release_coeff,
        }
    }

    #[test]
    fn attack_reaches_one_in_exact_sample_count() {
        let r = rates(1.0 / 64.0, 0.99, 0.7, 0.99);
        let mut env = Envelope::new();
        env.trigger_attack();

        for _ in 0..63 {
            env.next_sample(&r);
            assert_eq!(env.stage(), EnvelopeStage::Attack);
        }
        let level = env.next_sample(&r);
        assert_eq!(level, 1.0, "attack should clamp to exactly 1.0");
        assert_eq!(env.stage(), EnvelopeStage::Decay);
    }

    #[test]
    fn decay_settles_onto_sustain_target() {
        let r = rates(1.0, 0.9, 0.5, 0.9);
        let mut env = Envelope::new();
        env.trigger_attack();
        for _ in 0..200 {
            env.next_sample(&r);
        }
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert_eq!(env.level(), 0.5);
    }

    #[test]
    fn sustain_tracks_live_parameter_changes() {
        let mut env = Envelope::new();
        env.trigger_attack();
        for _ in 0..200 {
            env.next_sample(&rates(1.0, 0.9, 0.5, 0.9));
        }
        assert_eq!(env.stage(), EnvelopeStage::Sustain);

        // Lower the sustain target; the held level must follow
        let level = env.next_sample(&rates(1.0, 0.9, 0.3, 0.9));
        assert_eq!(level, 0.3);
    }

    #[test]
    fn release_snaps_to_zero_below_threshold() {
        let r = rates(1.0, 0.9, 0.7, 0.5);
        let mut env = Envelope::new();
        env.trigger_attack();
        for _ in 0..50 {
            env.next_sample(&r);
        }
        env.trigger_release();
        for _ in 0..60 {
            env.next_sample(&r);
        }
        assert_eq!(env.stage(), EnvelopeStage::Off);
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn retrigger_resumes_from_current_level() {
        let r = rates(0.01, 0.9, 0.7, 0.99);
        let mut env = Envelope::new();
        env.trigger_attack();
        for _ in 0..30 {
            env.next_sample(&r);
        }
        let mid_level = env.level();
        assert!(mid_level > 0.0 && mid_level < 1.0);

        env.trigger_release();
        env.next_sample(&r);
        env.trigger_attack();
        let resumed = env.next_sample(&r);
        assert!(
            resumed > mid_level * 0.9,
            "retrigger should continue near the current level, got {resumed}"
        );
    }

    #[test]
    fn rates_from_params_settle_into_sustain() {
        let sr = 44_100.0;
        let r = EnvelopeRates::from_params(0.0, 0.3, 0.7, 0.2, sr);
        let mut env = Envelope::new();
        env.trigger_attack();
        while env.stage() == EnvelopeStage::Attack {
            env.next_sample(&r);
        }
        assert_eq!(env.stage(), EnvelopeStage::Decay);

        // Settling within 1e-4 of the 0.7 target takes ln(0.3/1e-4) ~ 8
        // time constants; the coefficient packs 4 into the nominal time,
        // so 3x the nominal decay leaves comfortable margin
        let decay_samples = (crate::dsp::params::time_seconds(0.3) * sr) as usize;
        for _ in 0..(decay_samples * 3) {
            env.next_sample(&r);
        }
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert_eq!(env.level(), 0.7);
    }
}
