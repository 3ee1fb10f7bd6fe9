use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use point_scene::config::SceneConfig;
use point_scene::core::RecordingDevice;
use point_scene::geometry::sphere;
use point_scene::loaders::{DataStats, Point};
use point_scene::pipeline::compute_transforms;
use point_scene::registry::ModelRegistry;
use point_scene::scene::SceneController;
use glam::Mat4;

/// Points spread over a 20x20x20 box
fn generate_points(count: usize) -> Vec<Point> {
    (0..count)
        .map(|i| {
            let x = ((i as f32 * 0.1) % 20.0) - 10.0;
            let y = ((i as f32 * 0.2) % 20.0) - 10.0;
            let z = ((i as f32 * 0.3) % 20.0) - 10.0;
            vec![x, y, z]
        })
        .collect()
}

fn bench_render_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_cycle");

    for count in [100, 1000, 10000].iter() {
        let points = generate_points(*count);
        let stats = DataStats::from_points(&points).unwrap_or(DataStats {
            max_range: 1.0,
            mean: glam::Vec3::ZERO,
        });
        let mut scene = SceneController::new(RecordingDevice::new(), &SceneConfig::default());
        scene.on_data_loaded(&points, &stats).ok();

        group.bench_with_input(BenchmarkId::new("models", count), count, |b, _| {
            b.iter(|| black_box(scene.render().ok()));
        });
    }

    group.finish();
}

fn bench_transform_pipeline(c: &mut Criterion) {
    let points = generate_points(10000);
    let stats = DataStats::from_points(&points).unwrap_or(DataStats {
        max_range: 1.0,
        mean: glam::Vec3::ZERO,
    });
    let mut registry = ModelRegistry::new();
    registry.rebuild_from(&points, &stats);
    let view = Mat4::from_rotation_y(0.3) * Mat4::from_translation(-stats.mean);

    c.bench_function("transform_pipeline_10000", |b| {
        b.iter(|| {
            for model in registry.iter() {
                black_box(compute_transforms(model, &view));
            }
        });
    });
}

fn bench_sphere_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sphere_generation");

    for resolution in [8u32, 16, 64].iter() {
        group.bench_with_input(
            BenchmarkId::new("resolution", resolution),
            resolution,
            |b, &resolution| b.iter(|| black_box(sphere::generate(resolution))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render_cycle,
    bench_transform_pipeline,
    bench_sphere_generation
);
criterion_main!(benches);
