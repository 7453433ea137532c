use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use dinorun_core::prelude::*;

/// Jumps once the nearest obstacle is within `reach`
struct Reach(f32);

impl Policy for Reach {
    fn evaluate(&self, inputs: &[f32]) -> Vec<f32> {
        vec![if inputs[2] - inputs[0] < self.0 { 1.0 } else { 0.0 }]
    }
}

fn population(size: usize) -> Vec<Reach> {
    (0..size).map(|i| Reach(40.0 + (i % 200) as f32 * 2.0)).collect()
}

fn bench_step(c: &mut Criterion) {
    let policies = population(1000);
    c.bench_function("step_1000_agents", |b| {
        b.iter_batched(
            || {
                let mut config = ArenaConfig::default();
                config.obstacles.lane_y = -1000.0;
                let mut arena = Arena::new(config).unwrap();
                arena.populate(policies.len());
                arena
            },
            |mut arena| {
                for _ in 0..100 {
                    black_box(arena.step(&policies));
                }
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_generation(c: &mut Criterion) {
    let policies = population(150);
    let mut config = ArenaConfig::default();
    config.max_ticks = Some(2000);
    let mut arena = Arena::new(config).unwrap();
    c.bench_function("generation_150_agents", |b| {
        b.iter(|| black_box(arena.run_generation(&policies)))
    });
}

criterion_group!(benches, bench_step, bench_generation);
criterion_main!(benches);
