use criterion::{criterion_group, criterion_main, Criterion, black_box};

use chunkmap::core::{CollectorConfig, DemoConfig};
use chunkmap::sampling::{ColumnEncoder, SamplingScheduler, SnapshotExporter};
use chunkmap::world::{DemoWorld, Dimension, SpatialUnit, UnitPos, WorldHost};

fn bench_encode_surface(c: &mut Criterion) {
    let world = DemoWorld::new(DemoConfig::default());
    let terrain = world.terrain("minecraft:overworld").unwrap();
    let encoder = ColumnEncoder::new(&CollectorConfig::surface());
    let unit = SpatialUnit::new(UnitPos::new(3, 4), Dimension::Overworld);

    c.bench_function("encode_surface", |b| {
        b.iter(|| encoder.encode(black_box(&unit), terrain));
    });
}

fn bench_encode_voxels(c: &mut Criterion) {
    let world = DemoWorld::new(DemoConfig::default());
    let terrain = world.terrain("minecraft:overworld").unwrap();
    let encoder = ColumnEncoder::new(&CollectorConfig::voxels());
    let unit = SpatialUnit::new(UnitPos::new(3, 4), Dimension::Overworld);

    c.bench_function("encode_voxels", |b| {
        b.iter(|| encoder.encode(black_box(&unit), terrain));
    });
}

fn bench_full_pass(c: &mut Criterion) {
    let world = DemoWorld::new(DemoConfig {
        load_radius: 5,
        ..Default::default()
    });

    // Fresh scheduler each iteration so every pass encodes the whole neighborhood
    c.bench_function("full_pass_radius_5", |b| {
        b.iter(|| {
            let mut scheduler = SamplingScheduler::new(&CollectorConfig::surface());
            scheduler.run_pass(black_box(&world))
        });
    });
}

fn bench_export(c: &mut Criterion) {
    let world = DemoWorld::new(DemoConfig {
        load_radius: 5,
        ..Default::default()
    });
    let mut scheduler = SamplingScheduler::new(&CollectorConfig::voxels());
    scheduler.run_pass(&world);
    let exporter = SnapshotExporter::new(scheduler.store().clone(), scheduler.dedup().clone());

    c.bench_function("export_voxel_document", |b| {
        b.iter(|| exporter.to_json().unwrap());
    });
}

criterion_group!(
    benches,
    bench_encode_surface,
    bench_encode_voxels,
    bench_full_pass,
    bench_export,
);
criterion_main!(benches);
