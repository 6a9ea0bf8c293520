//! Benchmarks for the grading pipeline.
//!
//! Run with: cargo bench -p filmgrade-core

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use filmgrade_core::lut::cube;
use filmgrade_core::{AdjustmentParams, Lut, Pipeline, PixelBuffer};

fn test_image(width: u32, height: u32) -> PixelBuffer {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 255 / width) as u8);
            data.push((y * 255 / height) as u8);
            data.push(((x ^ y) & 0xff) as u8);
            data.push(255);
        }
    }
    PixelBuffer::from_data(width, height, data).unwrap()
}

fn identity_cube_text(size: usize) -> String {
    let max = (size - 1) as f32;
    let mut text = format!("LUT_3D_SIZE {size}\n");
    for b in 0..size {
        for g in 0..size {
            for r in 0..size {
                text.push_str(&format!(
                    "{:.6} {:.6} {:.6}\n",
                    r as f32 / max,
                    g as f32 / max,
                    b as f32 / max
                ));
            }
        }
    }
    text
}

fn bench_cube_parse(c: &mut Criterion) {
    let text = identity_cube_text(33);
    c.bench_function("cube_parse_33", |b| {
        b.iter(|| cube::parse(black_box(&text)).unwrap());
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let lut = Lut::fallback();
    let params = AdjustmentParams {
        exposure: 10.0,
        white_balance: -15.0,
        highlights: 20.0,
        shadows: 30.0,
        grain: 12.0,
    };

    for size in [256u32, 1024, 2048] {
        group.throughput(Throughput::Elements(size as u64 * size as u64));
        let input = test_image(size, size);

        group.bench_with_input(
            BenchmarkId::new("process_cpu", format!("{size}x{size}")),
            &input,
            |b, input| {
                let pipeline = Pipeline::with_seed(1);
                b.iter(|| pipeline.process_cpu(input.clone(), black_box(&lut), black_box(&params)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("process_parallel", format!("{size}x{size}")),
            &input,
            |b, input| {
                let pipeline = Pipeline::with_seed(1);
                b.iter(|| {
                    pipeline.process_parallel(input.clone(), black_box(&lut), black_box(&params))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_cube_parse, bench_pipeline);
criterion_main!(benches);
