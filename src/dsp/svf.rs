use std::f32::consts::PI;

/*
TPT/SVF resonant lowpass
========================

Topology-preserving-transform state-variable filter (Zavalishin's
"The Art of VA Filter Design" structure). Coefficients depend only on
cutoff and Q, so a stereo pair shares one [`SvfCoeffs`] while each
channel keeps its own two integrator states. The structure stays stable
under per-sample coefficient modulation, which is exactly how the
filter envelope drives it - at the cost of a `tan` per coefficient
update.
*/

/// Per-sample filter coefficients, shared across channels.
#[derive(Debug, Clone, Copy)]
pub struct SvfCoeffs {
    a1: f32,
    a2: f32,
    a3: f32,
}

impl SvfCoeffs {
    /// Lowpass coefficients for a cutoff in Hz and a Q (damping k = 1/Q).
    #[inline]
    pub fn lowpass(cutoff_hz: f32, q: f32, sample_rate: f32) -> Self {
        let g = (PI * cutoff_hz / sample_rate).tan();
        let k = 1.0 / q;
        let a1 = 1.0 / (1.0 + g * (g + k));
        let a2 = g * a1;
        let a3 = g * a2;
        Self { a1, a2, a3 }
    }
}

/// One channel's integrator memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvfState {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory
}

impl SvfState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one sample and return the lowpass output.
    #[inline]
    pub fn next_lowpass(&mut self, c: &SvfCoeffs, x: f32) -> f32 {
        let v3 = x - self.ic2eq;
        let v1 = c.a1 * self.ic1eq + c.a2 * v3;
        let v2 = self.ic2eq + c.a2 * self.ic1eq + c.a3 * v3;
        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;
        v2
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn is_reset(&self) -> bool {
        self.ic1eq == 0.0 && self.ic2eq == 0.0
    }
}
