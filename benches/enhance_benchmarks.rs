//! Performance benchmarks for the enhancement strategies
//!
//! Run with: cargo bench --bench enhance_benchmarks

use anyhow::Result;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array4;

use lowlight_enhance_core::{enhance_classical, enhance_learned, ColorImage, EnhancementModel};

struct Identity;

impl EnhancementModel for Identity {
    fn infer(&self, input: &Array4<f32>) -> Result<Array4<f32>> {
        Ok(input.clone())
    }

    fn name(&self) -> &str {
        "identity"
    }
}

fn frame(size: usize) -> ColorImage {
    let bytes: Vec<u8> = (0..size * size * 3).map(|i| ((i * 3) % 211) as u8).collect();
    ColorImage::from_rgb8(&bytes, size, size)
}

/// Benchmark CLAHE across typical frame sizes
fn bench_classical(c: &mut Criterion) {
    let mut group = c.benchmark_group("classical");
    for size in [256usize, 512] {
        let image = frame(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &image, |b, image| {
            b.iter(|| enhance_classical(black_box(image.clone()), 3.0, (8, 8)).unwrap());
        });
    }
    group.finish();
}

/// Benchmark the learned-path pre/postprocessing around a no-op model
fn bench_learned_scaffolding(c: &mut Criterion) {
    let image = frame(512);
    let model = Identity;

    c.bench_function("learned_resize_normalize_512_to_256", |b| {
        b.iter(|| enhance_learned(black_box(image.clone()), &model, (256, 256)).unwrap());
    });
}

criterion_group!(benches, bench_classical, bench_learned_scaffolding);
criterion_main!(benches);
