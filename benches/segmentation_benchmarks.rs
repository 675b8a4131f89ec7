use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};
use remove_bg::{
    segmentation::{estimate_background_color, DistanceMap},
    FallbackSegmenter, SegmenterConfig,
};

/// Square scene with a centred object covering a quarter of the area
fn scene(size: u32) -> RgbaImage {
    let start = size / 4;
    let end = size - size / 4;
    RgbaImage::from_fn(size, size, |x, y| {
        if (start..end).contains(&x) && (start..end).contains(&y) {
            Rgba([200, 40, 40, 255])
        } else {
            // Slightly noisy background
            let noise = ((x * 7 + y * 13) % 9) as u8;
            Rgba([240 + noise, 240 + noise, 240, 255])
        }
    })
}

fn benchmark_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("fallback_segmentation");
    group.sample_size(10);

    let segmenter = FallbackSegmenter::new(SegmenterConfig::default()).unwrap();
    for size in [256u32, 512, 1024] {
        let image = DynamicImage::ImageRgba8(scene(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &image, |b, image| {
            b.iter(|| segmenter.segment(black_box(image)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation_stages");
    group.sample_size(10);

    let image = scene(1024);
    let background = estimate_background_color(&image, 10).unwrap();
    let distances = DistanceMap::compute(&image, background);

    group.bench_function("background_estimate", |b| {
        b.iter(|| estimate_background_color(black_box(&image), 10).unwrap());
    });
    group.bench_function("distance_map", |b| {
        b.iter(|| DistanceMap::compute(black_box(&image), background));
    });
    group.bench_function("percentile", |b| {
        b.iter(|| distances.percentile(black_box(10.0)).unwrap());
    });

    group.finish();
}

criterion_group!(segmentation_benches, benchmark_segmentation, benchmark_stages);
criterion_main!(segmentation_benches);
