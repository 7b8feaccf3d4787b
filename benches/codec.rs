#[path = "../util/util.rs"]
mod util;

use util::bench_images;

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kmeg::{codec, Container, KmeansOptions, KmegPipeline, PaletteSize};

fn containers() -> Vec<(String, Container)> {
    bench_images()
        .iter()
        .map(|(name, image)| {
            let container = KmegPipeline::try_from(image)
                .unwrap()
                .palette_size(PaletteSize::from(32))
                .kmeans_options(KmeansOptions::new().max_iterations(10))
                .container()
                .unwrap();
            (name.clone(), container)
        })
        .collect()
}

fn encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    group.sample_size(30).warm_up_time(Duration::from_millis(500));

    for (name, container) in containers() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &container, |b, container| {
            b.iter(|| codec::to_vec(container).unwrap());
        });
    }
}

fn decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.sample_size(30).warm_up_time(Duration::from_millis(500));

    for (name, container) in containers() {
        let bytes = codec::to_vec(&container).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &bytes, |b, bytes| {
            b.iter(|| codec::from_slice(bytes).unwrap());
        });
    }
}

fn expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand");
    group.sample_size(30).warm_up_time(Duration::from_millis(500));

    for (name, container) in containers() {
        group.bench_with_input(BenchmarkId::new("single", &name), &container, |b, container| {
            b.iter(|| container.expand().unwrap());
        });
        group.bench_with_input(BenchmarkId::new("par", &name), &container, |b, container| {
            b.iter(|| container.expand_par().unwrap());
        });
    }
}

criterion_group!(benches, encode, decode, expand);
criterion_main!(benches);
