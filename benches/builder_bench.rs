//! Criterion benchmark untuk Builder dan View
//!
//! Run dengan: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rift::{BufferBuilder, BufferView, Vec3};

/// Object: header | u64 id | Vec3 position | table[2] | name | samples
fn build_object(builder: &mut BufferBuilder, id: u64, samples: &[f32]) {
    let start = builder.begin_object().unwrap();
    builder.write_value(id).unwrap();
    builder.write_value(Vec3::new(1.0, 2.0, 3.0)).unwrap();
    let name = builder.reserve_offset_table_entry().unwrap();
    let values = builder.reserve_offset_table_entry().unwrap();
    builder.add_variable(start, name, "benchmark-object").unwrap();
    builder.add_variable(start, values, samples).unwrap();
    builder.end_object(start, 0xBE4C).unwrap();
}

const TABLE: usize = 36;

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder");
    group.throughput(Throughput::Elements(1));
    let samples: Vec<f32> = (0..64).map(|i| i as f32).collect();

    // Builder di-reset tiap iterasi: tanpa realokasi
    group.bench_function("build_reused", |b| {
        let mut builder = BufferBuilder::with_capacity(4096);
        let mut id = 0u64;
        b.iter(|| {
            builder.reset();
            build_object(&mut builder, black_box(id), &samples);
            id = id.wrapping_add(1);
            black_box(builder.len());
        });
    });

    // Mulai dari kapasitas kecil: termasuk biaya growth
    group.bench_function("build_fresh", |b| {
        b.iter(|| {
            let mut builder = BufferBuilder::with_capacity(16);
            build_object(&mut builder, black_box(7), &samples);
            black_box(builder.finish());
        });
    });

    group.finish();
}

fn bench_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("view");
    group.throughput(Throughput::Elements(1));

    let samples: Vec<f32> = (0..64).map(|i| i as f32).collect();
    let mut builder = BufferBuilder::new();
    build_object(&mut builder, 42, &samples);
    let buffer = builder.finish();

    group.bench_function("validate", |b| {
        b.iter(|| black_box(BufferView::new(black_box(&buffer)).unwrap()));
    });

    group.bench_function("read_fixed", |b| {
        let view = BufferView::new(&buffer).unwrap();
        b.iter(|| black_box(view.read_fixed::<u64>(black_box(16)).unwrap()));
    });

    group.bench_function("string_field", |b| {
        let view = BufferView::new(&buffer).unwrap();
        b.iter(|| black_box(view.string_field(TABLE, 0, 2).unwrap().len()));
    });

    group.finish();
}

fn bench_array_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_scan");

    for count in [64usize, 1024, 16384].iter() {
        let samples: Vec<f32> = (0..*count).map(|i| i as f32).collect();
        let mut builder = BufferBuilder::new();
        build_object(&mut builder, 1, &samples);
        let buffer = builder.finish();

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_function(format!("sum_{}", count), |b| {
            let view = BufferView::new(&buffer).unwrap();
            b.iter(|| {
                let array = view.array_field::<f32>(TABLE, 1, 2).unwrap();
                let sum: f32 = array.iter().map(|v| v.unwrap_or(0.0)).sum();
                black_box(sum)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_view, bench_array_scan);
criterion_main!(benches);
