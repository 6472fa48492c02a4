use std::f32::consts::FRAC_PI_2;

/*
Oscillator-bank configuration
=============================

A bank is one center sawtooth plus M symmetric detuned pairs, for an
odd total of 2M+1 oscillators (3..=25). The tables below are recomputed
only when the count changes, never per sample.

Detune spacing uses triangular numbers T(m) = m(m+1)/2, normalized so
the outermost pair sits at 1.0. For M = 3 this gives 1/6, 3/6, 6/6 -
the classic 1:3:6 supersaw spacing (inner pair beats subtly, outer pair
adds width) - and extends the same progression to any pair count.

Pan positions place pair m at +/- 0.55 * m / M and convert to gains via
the constant-power law: theta = (1 + pan)/2 * pi/2, L = cos(theta),
R = sin(theta), so L^2 + R^2 = 1 for every slot.

Slot layout: [center, +1, -1, +2, -2, ...], center always at index 0
with zero detune and center pan.
*/

pub const MIN_OSCILLATORS: usize = 3;
pub const MAX_OSCILLATORS: usize = 25;

/// Outermost pair pan position (center = 0.0).
const PAN_MAX: f32 = 0.55;

/// Round a requested oscillator count to the nearest valid odd count
/// in [3, 25]. Never rejects: out-of-range requests clamp first.
pub fn sanitize_count(requested: usize) -> usize {
    requested.clamp(MIN_OSCILLATORS, MAX_OSCILLATORS) | 1
}

fn triangular(m: usize) -> f32 {
    (m * (m + 1) / 2) as f32
}

#[derive(Debug, Clone, Copy)]
pub struct BankConfig {
    count: usize,
    detune_coeff: [f32; MAX_OSCILLATORS],
    pan_l: [f32; MAX_OSCILLATORS],
    pan_r: [f32; MAX_OSCILLATORS],
}

impl BankConfig {
    pub fn new(count: usize) -> Self {
        let count = sanitize_count(count);
        let pairs = (count - 1) / 2;
        let outer = triangular(pairs);

        let mut detune_coeff = [0.0; MAX_OSCILLATORS];
        let mut pan_l = [0.0; MAX_OSCILLATORS];
        let mut pan_r = [0.0; MAX_OSCILLATORS];

        // Slot 0: center voice, zero detune, center pan
        let center = pan_gains(0.0);
        pan_l[0] = center.0;
        pan_r[0] = center.1;

        for m in 1..=pairs {
            let spacing = triangular(m) / outer;
            let pan = PAN_MAX * m as f32 / pairs as f32;

            let pos = 2 * m - 1;
            let neg = 2 * m;

            detune_coeff[pos] = spacing;
            detune_coeff[neg] = -spacing;

            let (l, r) = pan_gains(pan);
            pan_l[pos] = l;
            pan_r[pos] = r;
            // Mirrored pair swaps channels
            pan_l[neg] = r;
            pan_r[neg] = l;
        }

        Self {
            count,
            detune_coeff,
            pan_l,
            pan_r,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn detune_coeff(&self, slot: usize) -> f32 {
        self.detune_coeff[slot]
    }

    #[inline]
    pub fn pan_l(&self, slot: usize) -> f32 {
        self.pan_l[slot]
    }

    #[inline]
    pub fn pan_r(&self, slot: usize) -> f32 {
        self.pan_r[slot]
    }
}

/// Constant-power pan gains for a position in [-1, 1].
fn pan_gains(pan: f32) -> (f32, f32) {
    let theta = (1.0 + pan) * 0.5 * FRAC_PI_2;
    (theta.cos(), theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_rounds_to_valid_odd_counts() {
        assert_eq!(sanitize_count(0), 3);
        assert_eq!(sanitize_count(3), 3);
        assert_eq!(sanitize_count(4), 5);
        assert_eq!(sanitize_count(7), 7);
        assert_eq!(sanitize_count(24), 25);
        assert_eq!(sanitize_count(99), 25);
    }

    #[test]
    fn constant_power_identity_for_all_counts() {
        let mut count = MIN_OSCILLATORS;
        while count <= MAX_OSCILLATORS {
            let bank = BankConfig::new(count);
            for slot in 0..bank.count() {
                let l = bank.pan_l(slot);
                let r = bank.pan_r(slot);
                let power = l * l + r * r;
                assert!(
                    (power - 1.0).abs() < 1e-5,
                    "count {count} slot {slot}: L^2+R^2 = {power}"
                );
            }
            count += 2;
        }
    }

    #[test]
    fn center_slot_has_zero_detune_and_center_pan() {
        for count in [3, 7, 25] {
            let bank = BankConfig::new(count);
            assert_eq!(bank.detune_coeff(0), 0.0);
            assert!((bank.pan_l(0) - bank.pan_r(0)).abs() < 1e-6);
        }
    }

    #[test]
    fn pairs_are_symmetric_with_increasing_spacing() {
        let bank = BankConfig::new(25);
        let pairs = (bank.count() - 1) / 2;
        let mut prev = 0.0;
        for m in 1..=pairs {
            let pos = bank.detune_coeff(2 * m - 1);
            let neg = bank.detune_coeff(2 * m);
            assert_eq!(pos, -neg, "pair {m} must be symmetric");
            assert!(pos > prev, "pair spacing must increase outward");
            prev = pos;
        }
        assert_eq!(prev, 1.0, "outermost pair is normalized to 1.0");
    }

    #[test]
    fn seven_voice_bank_matches_classic_spacing() {
        let bank = BankConfig::new(7);
        let expected = [0.0, 1.0 / 6.0, -1.0 / 6.0, 0.5, -0.5, 1.0, -1.0];
        for (slot, want) in expected.iter().enumerate() {
            assert!(
                (bank.detune_coeff(slot) - want).abs() < 1e-6,
                "slot {slot}: got {}, want {want}",
                bank.detune_coeff(slot)
            );
        }
    }
}
