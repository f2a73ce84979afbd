use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rsmo::{FeatureVector, Kernel, KernelFunction, SmoTrainer, SvmParams, TrainerConfig};

/// Two overlapping blobs with deterministic jitter
fn blobs(n: usize, dims: usize) -> (Vec<FeatureVector>, Vec<FeatureVector>) {
    let mut state: u64 = 42;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
    };
    let mut make = |center: f64| -> Vec<FeatureVector> {
        (0..n)
            .map(|_| (0..dims).map(|_| center + 1.5 * next()).collect())
            .collect()
    };
    let pos = make(0.5);
    let neg = make(-0.5);
    (pos, neg)
}

fn kernel_bench(c: &mut Criterion) {
    let (pos, _) = blobs(2, 256);
    let kernels = [
        KernelFunction::linear(),
        KernelFunction::polynomial(0.5, 1.0, 3.0),
        KernelFunction::rbf(0.1),
        KernelFunction::sigmoid(0.01, 0.0),
    ];

    let mut group = c.benchmark_group("kernel");
    for kernel in kernels {
        group.bench_with_input(
            BenchmarkId::from_parameter(kernel.kernel_type()),
            &kernel,
            |b, k| b.iter(|| black_box(k.compute(&pos[0], &pos[1]))),
        );
    }
    group.finish();
}

fn training_bench(c: &mut Criterion) {
    let params = SvmParams::new(1.0, 1e-3, "rbf", 0.5, 0.0, 1.0).expect("valid params");

    let mut group = c.benchmark_group("smo_train");
    group.sample_size(10);
    for n in [50, 100, 200] {
        let data = blobs(n, 8);
        for threads in [1, 4] {
            let trainer = SmoTrainer::new(TrainerConfig {
                threads: Some(threads),
                ..TrainerConfig::new(params)
            })
            .expect("valid configuration");

            group.bench_with_input(
                BenchmarkId::new(format!("{threads}_threads"), n),
                &data,
                |b, (pos, neg)| b.iter(|| black_box(trainer.train(pos, neg))),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, kernel_bench, training_bench);
criterion_main!(benches);
