//! Masked Apply Benchmarks
//!
//! Compares the cost of masked addition across mask representations:
//! - Sparse position lists
//! - Dense per-position flags
//! - Byte-packed masks evaluated a batch at a time
//! - The unmasked baseline
//!
//! Every group sweeps selectivity at 1024 positions for 8, 32 and 64-bit
//! elements. Mask conversions and batch iteration are measured separately.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use selmask::{BatchWidth, Config, DenseMask, LaneKernel, MaskWorkload, SimdTier, WorkloadConfig};

const POSITIONS: usize = 1024;
const SELECTIVITIES: [f64; 5] = [0.0, 0.01, 0.1, 0.5, 1.0];

fn workload(selectivity: f64) -> MaskWorkload {
    let config = WorkloadConfig::builder()
        .positions(POSITIONS)
        .selectivity(selectivity)
        .seed(0x5e1)
        .build()
        .expect("valid benchmark configuration");
    MaskWorkload::generate(&config).expect("workload generation")
}

macro_rules! bench_width {
    ($fn_name:ident, $group:literal, $sparse:ident, $dense:ident, $vectorized:ident, $all:ident) => {
        fn $fn_name(c: &mut Criterion) {
            let mut group = c.benchmark_group($group);

            for &selectivity in &SELECTIVITIES {
                let mut w = workload(selectivity);

                group.bench_with_input(BenchmarkId::new("sparse", selectivity), &selectivity, |b, _| {
                    b.iter(|| black_box(w.$sparse().map(|r| r.byte_len())))
                });
                group.bench_with_input(BenchmarkId::new("dense", selectivity), &selectivity, |b, _| {
                    b.iter(|| black_box(w.$dense().map(|r| r.byte_len())))
                });
                group.bench_with_input(
                    BenchmarkId::new("dense_vectorized", selectivity),
                    &selectivity,
                    |b, _| b.iter(|| black_box(w.$vectorized().map(|r| r.byte_len()))),
                );
                group.bench_with_input(BenchmarkId::new("unmasked", selectivity), &selectivity, |b, _| {
                    b.iter(|| black_box(w.$all().map(|r| r.byte_len())))
                });
            }

            group.finish();
        }
    };
}

bench_width!(bench_bytes, "sum_bytes", sum_bytes_sparse, sum_bytes_dense, sum_bytes_vectorized, sum_bytes_all);
bench_width!(bench_ints, "sum_ints", sum_ints_sparse, sum_ints_dense, sum_ints_vectorized, sum_ints_all);
bench_width!(bench_longs, "sum_longs", sum_longs_sparse, sum_longs_dense, sum_longs_vectorized, sum_longs_all);

fn bench_conversions(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_conversion");

    for &selectivity in &SELECTIVITIES {
        let dense = DenseMask::random(POSITIONS, selectivity).expect("valid selectivity");

        group.bench_with_input(BenchmarkId::new("to_sparse", selectivity), &dense, |b, dense| {
            b.iter(|| black_box(dense.to_sparse().map(|s| s.count())))
        });
        group.bench_with_input(BenchmarkId::new("to_vectorized", selectivity), &dense, |b, dense| {
            b.iter(|| black_box(dense.to_vectorized().map(|v| v.len())))
        });
    }

    group.finish();
}

fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_iteration");
    let widths = [BatchWidth::Lanes(8), BatchWidth::Lanes(16), BatchWidth::Lanes(32), BatchWidth::Native];

    for &selectivity in &SELECTIVITIES {
        let dense = DenseMask::random(POSITIONS, selectivity).expect("valid selectivity");
        let vectorized = dense.to_vectorized().expect("vectorized mask");
        let sparse = dense.to_sparse().expect("sparse mask");

        group.bench_with_input(BenchmarkId::new("dense", selectivity), &dense, |b, mask| {
            b.iter(|| {
                let mut sum = 0usize;
                mask.for_each(|p| sum += p);
                black_box(sum)
            })
        });
        group.bench_with_input(BenchmarkId::new("sparse", selectivity), &sparse, |b, mask| {
            b.iter(|| {
                let mut sum = 0usize;
                mask.for_each(|p| sum += p);
                black_box(sum)
            })
        });
        for width in widths {
            let id = BenchmarkId::new(format!("vectorized_{}", width), selectivity);
            group.bench_with_input(id, &vectorized, |b, mask| {
                b.iter(|| {
                    let mut sum = 0usize;
                    let _ = mask.for_each_with_width(width, |p| sum += p);
                    black_box(sum)
                })
            });
        }
    }

    group.finish();
}

fn bench_lane_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("lane_kernels");
    let batch: Vec<u8> = (0..64).map(|i| (i % 5 == 0) as u8).collect();

    for tier in SimdTier::ALL.iter().copied().filter(|t| t.is_supported()) {
        let kernel = LaneKernel::for_width(tier.lanes()).expect("non-zero lane count");
        let lanes = &batch[..tier.lanes()];
        group.bench_function(tier.name(), |b| b.iter(|| black_box(kernel.eq_one_mask(black_box(lanes)))));
    }

    let portable = LaneKernel::for_width(24).expect("non-zero lane count");
    group.bench_function("portable_24", |b| {
        b.iter(|| black_box(portable.eq_one_mask(black_box(&batch[..24]))))
    });

    group.finish();
}

fn bench_workload_generation(c: &mut Criterion) {
    let config = WorkloadConfig::performance_preset();
    c.bench_function("workload_generation", |b| {
        b.iter(|| black_box(MaskWorkload::generate(&config).map(|w| w.len())))
    });
}

criterion_group!(
    name = masked_apply_benches;
    config = Criterion::default()
        .sample_size(100)
        .measurement_time(std::time::Duration::from_secs(5))
        .warm_up_time(std::time::Duration::from_secs(2));
    targets =
        bench_bytes,
        bench_ints,
        bench_longs,
        bench_conversions,
        bench_iteration,
        bench_lane_kernels,
        bench_workload_generation
);

criterion_main!(masked_apply_benches);
