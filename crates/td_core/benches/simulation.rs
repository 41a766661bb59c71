//! Simulation benchmarks for td_core.
//!
//! Run with: `cargo bench -p td_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use td_core::math::{Fixed, Vec2Fixed};
use td_core::path::PathModel;
use td_test_utils::fixtures::{battle_world, frame};

/// Ticks a defended world through the busy middle of wave 1.
pub fn simulation_benchmark(c: &mut Criterion) {
    c.bench_function("tick_battle_600", |b| {
        b.iter_batched(
            || battle_world(42, 1000, 6),
            |mut world| {
                for _ in 0..600 {
                    black_box(world.tick(frame()));
                }
                world.state_hash()
            },
            BatchSize::SmallInput,
        )
    });

    let path = PathModel::new(
        (0..64)
            .map(|i| Vec2Fixed::from_ints(i * 20, if i % 2 == 0 { 0 } else { 300 }))
            .collect(),
    )
    .expect("valid path");
    c.bench_function("path_position_at_64_segments", |b| {
        b.iter(|| {
            let mut acc = Fixed::ZERO;
            for step in 0..=100 {
                let p = path.position_at(Fixed::from_num(step) / Fixed::from_num(100));
                acc += p.x;
            }
            black_box(acc)
        })
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
