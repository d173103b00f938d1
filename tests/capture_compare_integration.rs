//! Integration tests for the capture and comparison process

use std::fs;

use shortcode_vision::snapshot::{
    BASELINE_CREATED, ComparisonDetail, MockFramebuffer, ScreenshotRole, SnapshotConfig, capture_with_backend,
    compare_screenshots,
};

#[test]
fn test_capture_then_bootstrap_then_compare() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = SnapshotConfig::new(dir.path());
    config.ensure_dirs().expect("Failed to create role dirs");

    let mut backend = MockFramebuffer::with_color(320, 200, [245, 245, 247]);
    backend.draw_rect(20, 20, 280, 40, [51, 42, 134]);

    let first = capture_with_backend(&mut backend, &config, "takeaways_default").expect("Capture failed");
    assert!(first.image_path.starts_with(config.dir(ScreenshotRole::Current)));

    // First run bootstraps the baseline from the capture
    let baseline = config.baseline_path("takeaways_default");
    let result = compare_screenshots(&baseline, &first.image_path, None);
    assert!(result.is_similar);
    assert_eq!(result.similarity, 1.0);
    assert_eq!(result.detail.to_string(), BASELINE_CREATED);
    assert_eq!(fs::read(&baseline).unwrap(), fs::read(&first.image_path).unwrap());

    // Unchanged rendering compares identical and writes a diff image
    let result = compare_screenshots(&baseline, &first.image_path, None);
    assert!(result.is_similar);
    assert_eq!(result.similarity, 1.0);
    let diff = result.diff_path().expect("diff path").to_path_buf();
    assert!(diff.starts_with(config.dir(ScreenshotRole::Diff)));
    assert!(diff.exists());
}

#[test]
fn test_regression_is_detected() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = SnapshotConfig::new(dir.path());

    let mut backend = MockFramebuffer::with_color(100, 100, [255, 255, 255]);
    let baseline = config.baseline_path("faq_accordion");
    let first = capture_with_backend(&mut backend, &config, "faq_accordion").unwrap();
    compare_screenshots(&baseline, &first.image_path, None);

    // Recolour the top half: every channel of half the pixels changes
    backend.draw_rect(0, 0, 100, 50, [0, 0, 0]);
    let current = dir.path().join("current").join("faq_accordion_changed.png");
    fs::write(&current, backend.to_png().unwrap()).unwrap();

    let result = compare_screenshots(&baseline, &current, Some(0.1));
    assert!(!result.is_similar);
    assert!((result.similarity - 0.5).abs() < 1e-9);
    assert!(matches!(result.detail, ComparisonDetail::DiffImage(_)));

    let lenient = compare_screenshots(&baseline, &current, Some(0.5));
    assert!(lenient.is_similar);
}

#[test]
fn test_mock_framebuffer_png_roundtrip_keeps_pixels() {
    let mut fb = MockFramebuffer::new(40, 30);
    fb.fill([128, 128, 128]);
    fb.draw_rect(10, 10, 5, 5, [255, 0, 0]);

    let png = fb.to_png().expect("Failed to create PNG");
    let fb2 = MockFramebuffer::from_png_bytes(&png).expect("Failed to load PNG");
    assert_eq!((fb2.width(), fb2.height()), (40, 30));
    assert_eq!(fb2.get_pixel(12, 12), [255, 0, 0]);
    assert_eq!(fb2.get_pixel(0, 0), [128, 128, 128]);
}
