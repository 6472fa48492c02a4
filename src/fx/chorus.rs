use crate::SAMPLE_RATE;

/*
Juno-style chorus
=================

Two free-running triangle LFOs at slightly different fixed rates drive
two modulated delay taps into one shared mono buffer fed from the
mono-summed dry input. The left tap is modulated by LFO1+LFO2 and the
right by -LFO1+LFO2 (the "mode I+II" blend), so a mono source comes out
wide without a second buffer. Dry and wet are crossfaded with an
equal-power sqrt law.

Depth scales the delay-time modulation range around the classic
1.66-5.35 ms window. At mix below 0.001 the effect is an exact no-op.
*/

const BUF_SIZE: usize = 512; // power of two, ~11.6 ms at 44.1 kHz
const BUF_MASK: usize = BUF_SIZE - 1;

const LFO1_RATE: f32 = 0.513;
const LFO2_RATE: f32 = 0.863;

const DELAY_MIN_MS: f32 = 1.66;
const DELAY_MAX_MS: f32 = 5.35;

pub struct Chorus {
    buf: [f32; BUF_SIZE],
    write_pos: usize,
    lfo1_phase: f32,
    lfo2_phase: f32,
}

impl Chorus {
    pub fn new() -> Self {
        Self {
            buf: [0.0; BUF_SIZE],
            write_pos: 0,
            lfo1_phase: 0.0,
            lfo2_phase: 0.0,
        }
    }

    /// Process one stereo block in place.
    ///
    /// `mix` and `depth` are normalized [0, 1]; mix below 0.001 leaves
    /// the buffers untouched (bit-identical bypass).
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32], mix: f32, depth: f32) {
        if mix < 0.001 {
            return;
        }
        let mix = mix.clamp(0.0, 1.0);
        let depth = depth.clamp(0.0, 1.0);

        let ms_to_samples = SAMPLE_RATE / 1000.0;
        let delay_center = (DELAY_MIN_MS + DELAY_MAX_MS) * 0.5 * ms_to_samples;
        let delay_range = (DELAY_MAX_MS - DELAY_MIN_MS) * 0.5 * ms_to_samples * depth;

        let lfo1_inc = LFO1_RATE / SAMPLE_RATE;
        let lfo2_inc = LFO2_RATE / SAMPLE_RATE;

        // Equal-power crossfade
        let dry_gain = (1.0 - mix).sqrt();
        let wet_gain = mix.sqrt();

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mono_in = (*l + *r) * 0.5;
            self.buf[self.write_pos] = mono_in;
            self.write_pos = (self.write_pos + 1) & BUF_MASK;

            // Triangle LFOs in -1..1
            let tri1 = 2.0 * (2.0 * self.lfo1_phase - 1.0).abs() - 1.0;
            let tri2 = 2.0 * (2.0 * self.lfo2_phase - 1.0).abs() - 1.0;
            self.lfo1_phase += lfo1_inc;
            if self.lfo1_phase >= 1.0 {
                self.lfo1_phase -= 1.0;
            }
            self.lfo2_phase += lfo2_inc;
            if self.lfo2_phase >= 1.0 {
                self.lfo2_phase -= 1.0;
            }

            // Inverted LFO1 on the right decorrelates the channels
            let mod_l = (tri1 + tri2) * 0.5;
            let mod_r = (-tri1 + tri2) * 0.5;

            let wet_l = self.read_tap(delay_center + mod_l * delay_range);
            let wet_r = self.read_tap(delay_center + mod_r * delay_range);

            *l = *l * dry_gain + wet_l * wet_gain;
            *r = *r * dry_gain + wet_r * wet_gain;
        }
    }

    /// Linear-interpolated read at `delay` samples behind the cursor.
    #[inline]
    fn read_tap(&self, delay: f32) -> f32 {
        let mut read_pos = self.write_pos as f32 - delay;
        if read_pos < 0.0 {
            read_pos += BUF_SIZE as f32;
        }
        let idx = read_pos as usize;
        let frac = read_pos - idx as f32;
        let a = self.buf[idx & BUF_MASK];
        let b = self.buf[(idx + 1) & BUF_MASK];
        a + frac * (b - a)
    }
}

impl Default for Chorus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_mix_is_an_exact_bypass() {
        let mut chorus = Chorus::new();
        let mut left: Vec<f32> = (0..256).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut right = left.clone();
        let left_before = left.clone();
        let right_before = right.clone();

        chorus.process(&mut left, &mut right, 0.0, 0.5);

        // Bit-identical, not merely close
        assert_eq!(left, left_before);
        assert_eq!(right, right_before);
    }

    #[test]
    fn wet_output_diverges_between_channels() {
        let mut chorus = Chorus::new();
        let mut left: Vec<f32> = (0..4_096).map(|i| (i as f32 * 0.07).sin()).collect();
        let mut right = left.clone();

        chorus.process(&mut left, &mut right, 0.6, 1.0);

        let diff: f32 = left
            .iter()
            .zip(&right)
            .map(|(l, r)| (l - r).abs())
            .sum();
        assert!(diff > 0.1, "stereo taps should decorrelate, diff {diff}");
    }

    #[test]
    fn output_stays_bounded() {
        let mut chorus = Chorus::new();
        let mut left = vec![1.0f32; 8_192];
        let mut right = vec![1.0f32; 8_192];
        chorus.process(&mut left, &mut right, 1.0, 1.0);
        for s in left.iter().chain(right.iter()) {
            assert!(s.abs() <= 1.5, "chorus sample out of range: {s}");
        }
    }
}
