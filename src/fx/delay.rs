use std::f32::consts::TAU;

use crate::SAMPLE_RATE;

/*
Stereo ping-pong delay
======================

Each channel's feedback path feeds the OPPOSITE channel's buffer, so
echoes alternate sides. Delay time maps exponentially (20 ms * 50^p,
capped at 1000 ms) into independent 1-second circular buffers read with
linear interpolation.

Two guards keep the feedback loop civilized: feedback is capped at 0.95,
and any fed-back sample beyond +/-1.0 goes through tanh before it is
written, so even sustained full-scale input at maximum feedback cannot
run away. A one-pole lowpass ("tone", 500 Hz * 24^p capped at 12 kHz)
darkens the wet tap like tape repeats.

The effect bypasses entirely when both mix and feedback are below
0.001.
*/

/// 1 second of delay memory per channel at the engine rate.
pub const MAX_DELAY_SAMPLES: usize = 44_100;

/// Hard feedback ceiling.
const FEEDBACK_MAX: f32 = 0.95;

pub struct PingPongDelay {
    buf_l: Vec<f32>,
    buf_r: Vec<f32>,
    write_pos: usize,
    tone_z1_l: f32,
    tone_z1_r: f32,
}

impl PingPongDelay {
    /// Allocates both channel buffers; nothing allocates after this.
    pub fn new() -> Self {
        Self {
            buf_l: vec![0.0; MAX_DELAY_SAMPLES],
            buf_r: vec![0.0; MAX_DELAY_SAMPLES],
            write_pos: 0,
            tone_z1_l: 0.0,
            tone_z1_r: 0.0,
        }
    }

    /// Process one stereo block in place. All parameters normalized [0, 1].
    pub fn process(
        &mut self,
        left: &mut [f32],
        right: &mut [f32],
        time: f32,
        feedback: f32,
        mix: f32,
        tone: f32,
    ) {
        if mix < 0.001 && feedback < 0.001 {
            return;
        }

        let delay_ms = (20.0 * 50.0_f32.powf(time.clamp(0.0, 1.0))).min(1000.0);
        let delay_samples =
            (delay_ms * SAMPLE_RATE / 1000.0).min((MAX_DELAY_SAMPLES - 2) as f32);

        let feedback = feedback.clamp(0.0, FEEDBACK_MAX);
        let mix = mix.clamp(0.0, 1.0);

        let tone_hz = (500.0 * 24.0_f32.powf(tone.clamp(0.0, 1.0))).min(12_000.0);
        let tone_coeff = 1.0 - (-TAU * tone_hz / SAMPLE_RATE).exp();

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mut read_pos = self.write_pos as f32 - delay_samples;
            if read_pos < 0.0 {
                read_pos += MAX_DELAY_SAMPLES as f32;
            }
            let idx = read_pos as usize % MAX_DELAY_SAMPLES;
            let frac = read_pos - read_pos.floor();
            let next = (idx + 1) % MAX_DELAY_SAMPLES;

            let mut tap_l = self.buf_l[idx] + frac * (self.buf_l[next] - self.buf_l[idx]);
            let mut tap_r = self.buf_r[idx] + frac * (self.buf_r[next] - self.buf_r[idx]);

            // Tone filter darkens the repeats
            self.tone_z1_l += tone_coeff * (tap_l - self.tone_z1_l);
            self.tone_z1_r += tone_coeff * (tap_r - self.tone_z1_r);
            tap_l = self.tone_z1_l;
            tap_r = self.tone_z1_r;

            // Cross-channel feedback: L feeds R's buffer and vice versa
            let mut fb_l = *l + tap_r * feedback;
            let mut fb_r = *r + tap_l * feedback;

            // Soft-saturate only overrange feedback
            if fb_l.abs() > 1.0 {
                fb_l = fb_l.tanh();
            }
            if fb_r.abs() > 1.0 {
                fb_r = fb_r.tanh();
            }

            self.buf_l[self.write_pos] = fb_l;
            self.buf_r[self.write_pos] = fb_r;
            self.write_pos = (self.write_pos + 1) % MAX_DELAY_SAMPLES;

            *l = *l * (1.0 - mix) + tap_l * mix;
            *r = *r * (1.0 - mix) + tap_r * mix;
        }
    }
}

impl Default for PingPongDelay {
    fn default() -> Self {
        Self::new()
    }
}
