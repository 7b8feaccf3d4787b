#[path = "../util/util.rs"]
mod util;

use util::bench_images;

use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};
use kmeg::{training_set, Container, KmeansOptions, KmegPipeline, PaletteSize};
use palette::{cast::ComponentsAs, Srgb};

fn bench(
    c: &mut Criterion,
    group: &str,
    mut f: impl FnMut(&mut Bencher<WallTime>, &(PaletteSize, &[Srgb<u8>], u32)),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(10)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_millis(500));

    for (k, secs) in [(64.into(), 8), (16.into(), 4), (4.into(), 2)] {
        group.measurement_time(Duration::from_secs(secs));
        for (name, image) in bench_images() {
            let colors: &[Srgb<u8>] = image.as_raw().components_as();
            group.bench_with_input(
                BenchmarkId::new(k.to_string(), name),
                &(k, colors, image.width()),
                &mut f,
            );
        }
    }
}

fn kmeans_cluster(c: &mut Criterion) {
    bench(c, "kmeans_cluster", |b, &(k, colors, _)| {
        let samples = training_set(colors);
        let options = KmeansOptions::new().max_iterations(20);
        b.iter(|| {
            let mut kmeans = options.kmeans(k, &samples).unwrap();
            kmeans.cluster()
        });
    });
}

fn kmeans_container(c: &mut Criterion) {
    bench(c, "kmeans_container", |b, &(k, colors, width)| {
        let options = KmeansOptions::new().max_iterations(20);
        b.iter(|| {
            let samples = training_set(colors);
            let mut kmeans = options.kmeans(k, &samples).unwrap();
            kmeans.cluster();
            Container::from_kmeans(kmeans, width).unwrap()
        });
    });
}

fn pipeline_par(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_par");
    group.sample_size(10).warm_up_time(Duration::from_millis(500));

    let pipelines = bench_images()
        .iter()
        .map(|(_, image)| {
            let mut pipeline = KmegPipeline::try_from(image).unwrap();
            pipeline
                .palette_size(PaletteSize::from(16))
                .kmeans_options(KmeansOptions::new().max_iterations(20));
            pipeline
        })
        .collect::<Vec<_>>();

    group.bench_function("all_images", |b| {
        b.iter(|| KmegPipeline::containers_par(&pipelines));
    });
}

criterion_group!(benches, kmeans_cluster, kmeans_container, pipeline_par);
criterion_main!(benches);
