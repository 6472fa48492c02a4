//! Single-pole DC-blocking highpass.
//!
//! `y[n] = x[n] - x[n-1] + R * y[n-1]` with R = 0.99715, a ~20 Hz corner
//! at 44.1 kHz (`R = 1 - 2*pi*20/44100`). Asymmetric detuned mixing can
//! leave a small DC bias on the oscillator sum; the resonant filter
//! downstream is DC-sensitive at high resonance, so the bias is removed
//! here, per channel.

const R: f32 = 0.997_15;

#[derive(Debug, Clone, Copy, Default)]
pub struct DcBlocker {
    x_prev: f32,
    y_prev: f32,
}

impl DcBlocker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn next_sample(&mut self, x: f32) -> f32 {
        let y = x - self.x_prev + R * self.y_prev;
        self.x_prev = x;
        self.y_prev = y;
        y
    }

    pub fn reset(&mut self) {
        self.x_prev = 0.0;
        self.y_prev = 0.0;
    }

    pub fn is_reset(&self) -> bool {
        self.x_prev == 0.0 && self.y_prev == 0.0
    }
}
