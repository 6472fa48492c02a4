//! Full render-path benchmarks: the numbers that matter for the
//! real-time deadline.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sawbank::fx::{Chorus, PingPongDelay};
use sawbank::Engine;

use crate::BLOCK_SIZES;

/// Worst case: all 8 voices held, default 7-oscillator bank.
pub fn bench_polyphony(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/polyphony");

    for &size in BLOCK_SIZES {
        let mut engine = Engine::with_seed(1);
        for note in 0..8 {
            engine.note_on(48 + note * 3, 0.9);
        }
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("8_voices", size), &size, |b, _| {
            b.iter(|| {
                engine.render(black_box(&mut left), black_box(&mut right));
            })
        });
    }

    // The expensive end of the oscillator range
    let mut engine = Engine::with_seed(1);
    engine.set_oscillator_count(25);
    for note in 0..8 {
        engine.note_on(48 + note * 3, 0.9);
    }
    let mut left = vec![0.0f32; 256];
    let mut right = vec![0.0f32; 256];
    group.bench_function("8_voices_25_osc/256", |b| {
        b.iter(|| {
            engine.render(black_box(&mut left), black_box(&mut right));
        })
    });

    group.finish();
}

pub fn bench_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/effects");

    for &size in BLOCK_SIZES {
        let mut chorus = Chorus::new();
        let mut delay = PingPongDelay::new();
        let mut left: Vec<f32> = (0..size).map(|i| (i as f32 * 0.07).sin()).collect();
        let mut right = left.clone();

        group.bench_with_input(BenchmarkId::new("chain", size), &size, |b, _| {
            b.iter(|| {
                chorus.process(black_box(&mut left), black_box(&mut right), 0.4, 0.6);
                delay.process(
                    black_box(&mut left),
                    black_box(&mut right),
                    0.6,
                    0.4,
                    0.3,
                    0.5,
                );
            })
        });
    }

    group.finish();
}
