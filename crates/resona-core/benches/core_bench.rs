//! Criterion benchmarks for resona-core DSP primitives
//!
//! Run with: cargo bench -p resona-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use resona_core::{Delay, FoldShaper, Svf, SvfKind, White};

const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    let mut rng = White::new(1);
    (0..size).map(|_| rng.process() * 0.5).collect()
}

fn bench_svf(c: &mut Criterion) {
    let mut group = c.benchmark_group("Svf");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::new("lowpass", block_size),
            &block_size,
            |b, _| {
                let mut filter = Svf::new(SvfKind::Lowpass);
                b.iter(|| {
                    for &sample in &input {
                        black_box(filter.process(black_box(sample), 0.1, 0.707, 1.0));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("Delay");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::new("fractional", block_size),
            &block_size,
            |b, _| {
                let mut delay = Delay::default();
                delay.setup(4800);
                b.iter(|| {
                    for &sample in &input {
                        black_box(delay.process(black_box(sample), 1234.5));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_fold_shaper(c: &mut Criterion) {
    let mut group = c.benchmark_group("FoldShaper");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::new("process_16x", block_size),
            &block_size,
            |b, _| {
                let mut shaper = FoldShaper::default();
                shaper.gain = 4.0;
                b.iter(|| {
                    for &sample in &input {
                        black_box(shaper.process_16x(black_box(sample)));
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_svf, bench_delay, bench_fold_shaper);
criterion_main!(benches);
