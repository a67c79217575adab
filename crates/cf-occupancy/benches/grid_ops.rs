//! Benchmarks for occupancy grid operations.
//!
//! Run with: cargo bench -p cf-occupancy
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p cf-occupancy -- --save-baseline main
//! 2. After changes: cargo bench -p cf-occupancy -- --baseline main

#![allow(missing_docs, clippy::unwrap_used, clippy::cast_sign_loss)]

use cf_occupancy::{Aabb, HeightMapConfig, VoxelCoord, VoxelGrid};
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use nalgebra::Point3;

// =============================================================================
// Test Grid Generation
// =============================================================================

/// A solid slab `n × n × 4` with a pillar every fourth column.
fn create_slab(n: i32) -> VoxelGrid<()> {
    let mut grid = VoxelGrid::with_cell_size(0.05).unwrap();
    for i in 0..n {
        for j in 0..n {
            for k in 0..4 {
                grid.set_occupied(VoxelCoord::new(i, j, k));
            }
            if i % 4 == 0 && j % 4 == 0 {
                for k in 4..12 {
                    grid.set_occupied(VoxelCoord::new(i, j, k));
                }
            }
        }
    }
    grid
}

// =============================================================================
// Mutation Benchmarks
// =============================================================================

fn bench_mutation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Mutation");

    let n = 64;
    group.throughput(Throughput::Elements((n * n * 4) as u64));
    group.bench_function("set_occupied_64x64x4", |b| {
        b.iter(|| create_slab(black_box(n)));
    });

    let slab = create_slab(n);
    group.bench_function("set_free_all", |b| {
        b.iter(|| {
            let mut grid = slab.clone();
            for v in slab.occupied_center_voxels() {
                grid.set_free(*v);
            }
            grid
        });
    });

    let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 0.5));
    group.bench_function("add_aabb_40x40x10", |b| {
        b.iter(|| {
            let mut grid: VoxelGrid<()> = VoxelGrid::with_cell_size(0.05).unwrap();
            grid.add_aabb(black_box(&aabb)).unwrap()
        });
    });

    group.finish();
}

// =============================================================================
// Query Benchmarks
// =============================================================================

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("Queries");
    let grid = create_slab(64);
    group.throughput(Throughput::Elements(grid.len() as u64));

    let window = Aabb::new(Point3::new(0.5, 0.5, 0.0), Point3::new(1.5, 1.5, 1.0));
    group.bench_function("occupied_voxels_from_aabb", |b| {
        b.iter(|| grid.occupied_voxels_from_aabb(black_box(&window)));
    });

    group.bench_function("clusters", |b| {
        b.iter(|| grid.clusters());
    });

    group.bench_function("create_intervals", |b| {
        b.iter(|| grid.create_intervals());
    });

    let config = HeightMapConfig::default();
    let center = Point3::new(1.6, 1.6, 0.0);
    group.bench_function("create_height_map", |b| {
        b.iter(|| grid.create_height_map(black_box(&center), 4.0, &config).unwrap());
    });

    let start = VoxelCoord::new(1, 1, 20);
    let goal = Point3::new(3.1, 2.9, 1.9);
    group.bench_function("ray_trace", |b| {
        b.iter(|| grid.ray_trace(black_box(start), black_box(&goal)).unwrap());
    });

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_mutation, bench_queries);
criterion_main!(benches);
