//! Benchmark for the prognostic update loop.
//!
//! Measures one full forward-Euler step over a single large partition
//! with a deterministic random thickness field.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use firn_comm::LocalComm;
use firn_core::{PartitionId, StepConfig, TimeLevel};
use firn_engine::ForwardEulerStep;
use firn_mesh::{Domain, HaloMap, Mesh, Partition};
use firn_test_utils::{NoopDiagnostics, UniformThinning};

const CELLS: usize = 10_000;
const LEVELS: usize = 10;

fn build_domain(seed: u64) -> Domain {
    let mesh = Mesh::uniform(CELLS, 0, LEVELS).expect("bench mesh is valid");
    let mut partition = Partition::new(PartitionId(0), mesh, HaloMap::isolated());

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let old = partition.state.level_mut(TimeLevel::Old);
    for cell in 0..CELLS {
        let mut total = 0.0;
        for k in 0..LEVELS {
            let v = rng.random::<f64>() * 100.0;
            old.layer_thickness[cell * LEVELS + k] = v;
            total += v;
        }
        old.thickness[cell] = total;
    }
    Domain::new(vec![partition], Box::new(LocalComm::new()))
}

fn bench_euler_step(c: &mut Criterion) {
    c.bench_function("euler_step_10k_cells_10_layers", |b| {
        b.iter_batched(
            || {
                let domain = build_domain(42);
                let driver = ForwardEulerStep::new(
                    Box::new(UniformThinning::new(-0.5)),
                    Box::new(NoopDiagnostics),
                    StepConfig::new(1.0),
                )
                .expect("bench config is valid");
                (domain, driver)
            },
            |(mut domain, mut driver)| driver.step(&mut domain, 1.0),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_euler_step);
criterion_main!(benches);
