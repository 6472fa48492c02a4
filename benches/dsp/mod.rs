//! Per-sample primitive benchmarks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sawbank::dsp::envelope::{Envelope, EnvelopeRates};
use sawbank::dsp::svf::{SvfCoeffs, SvfState};
use sawbank::SAMPLE_RATE;

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let rates = EnvelopeRates::from_params(0.3, 0.4, 0.7, 0.5, SAMPLE_RATE);

    for &size in BLOCK_SIZES {
        // Attack phase (ramping up)
        let mut env = Envelope::new();
        env.trigger_attack();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, &size| {
            b.iter(|| {
                let mut acc = 0.0f32;
                for _ in 0..size {
                    acc += env.next_sample(black_box(&rates));
                }
                acc
            })
        });

        // Release phase (multiplicative decay)
        let mut env = Envelope::new();
        env.trigger_attack();
        for _ in 0..1_000 {
            env.next_sample(&rates);
        }
        env.trigger_release();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, &size| {
            b.iter(|| {
                let mut acc = 0.0f32;
                for _ in 0..size {
                    acc += env.next_sample(black_box(&rates));
                }
                acc
            })
        });
    }

    group.finish();
}

pub fn bench_svf(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/svf");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.13).sin()).collect();

        // Static coefficients, the effects-chain case
        let coeffs = SvfCoeffs::lowpass(2_000.0, 4.0, SAMPLE_RATE);
        let mut state = SvfState::new();
        group.bench_with_input(BenchmarkId::new("static", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0f32;
                for &x in &input {
                    acc += state.next_lowpass(black_box(&coeffs), x);
                }
                acc
            })
        });

        // Per-sample coefficient recompute, the voice case (the cutoff
        // envelope moves every sample)
        let mut state = SvfState::new();
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0f32;
                for (i, &x) in input.iter().enumerate() {
                    let fc = 500.0 + i as f32 * 10.0;
                    let coeffs = SvfCoeffs::lowpass(black_box(fc), 4.0, SAMPLE_RATE);
                    acc += state.next_lowpass(&coeffs, x);
                }
                acc
            })
        });
    }

    group.finish();
}
