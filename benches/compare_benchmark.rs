use criterion::{Criterion, black_box, criterion_group, criterion_main};
use shortcode_vision::snapshot::{MockFramebuffer, compare_screenshots};

fn benchmark_compare(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let baseline = dir.path().join("baseline").join("bench.png");
    let current = dir.path().join("current").join("bench_1.png");
    let resized = dir.path().join("current").join("bench_2.png");

    let mut fb = MockFramebuffer::with_color(1920, 1080, [245, 245, 247]);
    std::fs::create_dir_all(baseline.parent().unwrap()).unwrap();
    std::fs::create_dir_all(current.parent().unwrap()).unwrap();
    std::fs::write(&baseline, fb.to_png().unwrap()).unwrap();

    fb.draw_rect(100, 100, 400, 300, [51, 42, 134]);
    std::fs::write(&current, fb.to_png().unwrap()).unwrap();

    let small = MockFramebuffer::with_color(1280, 720, [245, 245, 247]);
    std::fs::write(&resized, small.to_png().unwrap()).unwrap();

    c.bench_function("compare_1080p", |b| {
        b.iter(|| compare_screenshots(black_box(&baseline), black_box(&current), None))
    });

    c.bench_function("compare_1080p_resized", |b| {
        b.iter(|| compare_screenshots(black_box(&baseline), black_box(&resized), None))
    });
}

criterion_group!(benches, benchmark_compare);
criterion_main!(benches);
