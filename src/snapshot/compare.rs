//! Screenshot comparison against baselines.
//!
//! The comparator never returns an error: decode and I/O failures are folded
//! into a non-similar result with a zero score so callers can assert on the
//! boolean and score alone.

use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::types::{SnapshotError, SnapshotResult};
use super::utils::diff_path_for;

/// Default tolerated fraction of differing channel bytes
pub const DEFAULT_THRESHOLD: f64 = crate::config::DEFAULT_THRESHOLD;

/// Message reported when a missing baseline is bootstrapped from the current image
pub const BASELINE_CREATED: &str = "Baseline created";

/// What a comparison produced besides the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ComparisonDetail {
    /// The baseline did not exist and was created from the current image
    BaselineCreated,
    /// Path of the written difference image
    DiffImage(PathBuf),
    /// Why no meaningful score could be produced
    Error(String),
}

impl std::fmt::Display for ComparisonDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonDetail::BaselineCreated => f.write_str(BASELINE_CREATED),
            ComparisonDetail::DiffImage(path) => write!(f, "{}", path.display()),
            ComparisonDetail::Error(msg) => f.write_str(msg),
        }
    }
}

/// Outcome of comparing a current screenshot against its baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Whether the similarity reached `1 - threshold`
    pub is_similar: bool,
    /// Fraction of agreeing channel bytes, in [0, 1]
    pub similarity: f64,
    /// Diff path, bootstrap marker or diagnostic
    pub detail: ComparisonDetail,
}

impl ComparisonResult {
    fn failure(message: String) -> Self {
        Self {
            is_similar: false,
            similarity: 0.0,
            detail: ComparisonDetail::Error(message),
        }
    }

    /// Diff image path, when one was written
    pub fn diff_path(&self) -> Option<&Path> {
        match &self.detail {
            ComparisonDetail::DiffImage(path) => Some(path),
            _ => None,
        }
    }
}

/// Whether a similarity score passes the given threshold
pub fn is_similar(similarity: f64, threshold: f64) -> bool {
    similarity >= 1.0 - threshold
}

/// Compare `current` against `baseline`, bootstrapping the baseline when missing.
///
/// `threshold` defaults to [`DEFAULT_THRESHOLD`].
pub fn compare_screenshots(baseline: &Path, current: &Path, threshold: Option<f64>) -> ComparisonResult {
    let threshold = threshold.unwrap_or(DEFAULT_THRESHOLD);

    if !baseline.exists() {
        return match create_baseline(baseline, current) {
            Ok(()) => {
                info!(baseline = %baseline.display(), "baseline created");
                ComparisonResult {
                    is_similar: true,
                    similarity: 1.0,
                    detail: ComparisonDetail::BaselineCreated,
                }
            }
            Err(e) => ComparisonResult::failure(format!("Comparison error: {}", e)),
        };
    }

    let (baseline_img, current_img) = match (load_rgb(baseline), load_rgb(current)) {
        (Ok(b), Ok(c)) => (b, c),
        (Err(e), _) | (_, Err(e)) => {
            warn!(baseline = %baseline.display(), current = %current.display(), "could not load images: {}", e);
            return ComparisonResult::failure(format!("Could not load images: {}", e));
        }
    };

    match diff_images(&baseline_img, current_img, current) {
        Ok((similarity, diff_path)) => {
            let similar = is_similar(similarity, threshold);
            debug!(similarity, threshold, similar, "compared {}", current.display());
            if !similar {
                warn!(
                    "visual difference in {}: similarity {:.4} below {:.4}",
                    current.display(),
                    similarity,
                    1.0 - threshold
                );
            }
            ComparisonResult {
                is_similar: similar,
                similarity,
                detail: ComparisonDetail::DiffImage(diff_path),
            }
        }
        Err(e) => ComparisonResult::failure(format!("Comparison error: {}", e)),
    }
}

/// Fraction of equal channel bytes between two equally sized buffers
pub fn similarity_score(diff: &[u8]) -> Option<f64> {
    if diff.is_empty() {
        return None;
    }
    let differing = diff.iter().filter(|&&b| b != 0).count();
    Some(1.0 - differing as f64 / diff.len() as f64)
}

fn create_baseline(baseline: &Path, current: &Path) -> SnapshotResult<()> {
    if let Some(parent) = baseline.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(current, baseline)?;
    Ok(())
}

fn load_rgb(path: &Path) -> SnapshotResult<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// Absolute per-channel difference of `current` against `baseline`, after
/// resizing `current` to the baseline's dimensions. Writes the difference image
/// and returns the similarity with its path.
fn diff_images(baseline: &RgbImage, current: RgbImage, current_path: &Path) -> SnapshotResult<(f64, PathBuf)> {
    let (width, height) = baseline.dimensions();
    let current = if current.dimensions() != (width, height) {
        debug!(from = ?current.dimensions(), to = ?(width, height), "resizing current screenshot");
        imageops::resize(&current, width, height, FilterType::Nearest)
    } else {
        current
    };

    let diff_bytes: Vec<u8> = baseline
        .as_raw()
        .iter()
        .zip(current.as_raw().iter())
        .map(|(a, b)| a.abs_diff(*b))
        .collect();

    let similarity = similarity_score(&diff_bytes)
        .ok_or_else(|| SnapshotError::Capture("Baseline image is empty".to_string()))?;

    let diff_image = RgbImage::from_raw(width, height, diff_bytes)
        .ok_or_else(|| SnapshotError::Capture("Difference buffer does not match dimensions".to_string()))?;

    let diff_path = diff_path_for(current_path);
    if let Some(parent) = diff_path.parent() {
        fs::create_dir_all(parent)?;
    }
    diff_image.save(&diff_path)?;

    Ok((similarity, diff_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::backend::MockFramebuffer;
    use pretty_assertions::assert_eq;

    fn write_png(path: &Path, fb: &MockFramebuffer) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, fb.to_png().unwrap()).unwrap();
    }

    #[test]
    fn test_identical_images_are_similar() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = dir.path().join("baseline/faq.png");
        let current = dir.path().join("current/faq_1.png");
        let fb = MockFramebuffer::with_color(40, 30, [51, 42, 134]);
        write_png(&baseline, &fb);
        write_png(&current, &fb);

        let result = compare_screenshots(&baseline, &current, None);

        assert!(result.is_similar);
        assert_eq!(result.similarity, 1.0);
        assert_eq!(result.diff_path(), Some(dir.path().join("diff/faq_1.png").as_path()));
        assert!(dir.path().join("diff/faq_1.png").exists());
    }

    #[test]
    fn test_missing_baseline_is_bootstrapped() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = dir.path().join("baseline/nested/toc.png");
        let current = dir.path().join("current/toc_1.png");
        write_png(&current, &MockFramebuffer::with_color(10, 10, [1, 2, 3]));

        let result = compare_screenshots(&baseline, &current, None);

        assert_eq!(
            result,
            ComparisonResult {
                is_similar: true,
                similarity: 1.0,
                detail: ComparisonDetail::BaselineCreated,
            }
        );
        assert_eq!(result.detail.to_string(), "Baseline created");
        assert_eq!(fs::read(&baseline).unwrap(), fs::read(&current).unwrap());
    }

    #[test]
    fn test_different_dimensions_are_resized() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = dir.path().join("baseline/audio.png");
        let current = dir.path().join("current/audio_1.png");
        write_png(&baseline, &MockFramebuffer::with_color(64, 48, [200, 200, 200]));
        write_png(&current, &MockFramebuffer::with_color(32, 24, [200, 200, 200]));

        let result = compare_screenshots(&baseline, &current, None);

        assert!((0.0..=1.0).contains(&result.similarity));
        assert!(result.is_similar);
        let diff = image::open(result.diff_path().unwrap()).unwrap();
        assert_eq!((diff.width(), diff.height()), (64, 48));
    }

    #[test]
    fn test_undecodable_image_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = dir.path().join("baseline/broken.png");
        let current = dir.path().join("current/broken_1.png");
        write_png(&baseline, &MockFramebuffer::new(4, 4));
        fs::create_dir_all(current.parent().unwrap()).unwrap();
        fs::write(&current, b"definitely not a png").unwrap();

        let result = compare_screenshots(&baseline, &current, None);

        assert!(!result.is_similar);
        assert_eq!(result.similarity, 0.0);
        match result.detail {
            ComparisonDetail::Error(msg) => assert!(msg.starts_with("Could not load images")),
            other => panic!("expected error detail, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_current_with_missing_baseline_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let result = compare_screenshots(
            &dir.path().join("baseline/x.png"),
            &dir.path().join("current/x.png"),
            None,
        );
        assert!(!result.is_similar);
        assert_eq!(result.similarity, 0.0);
    }

    #[test]
    fn test_score_counts_channel_bytes() {
        // 10x10 RGB = 300 bytes; one pixel differing in a single channel
        let dir = tempfile::tempdir().unwrap();
        let baseline = dir.path().join("baseline/px.png");
        let current = dir.path().join("current/px_1.png");
        let base = MockFramebuffer::with_color(10, 10, [0, 0, 0]);
        let mut changed = base.clone();
        changed.set_pixel(3, 3, [9, 0, 0]);
        write_png(&baseline, &base);
        write_png(&current, &changed);

        let result = compare_screenshots(&baseline, &current, None);

        assert_eq!(result.similarity, 1.0 - 1.0 / 300.0);
    }

    #[test]
    fn test_score_is_monotonic_in_differing_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = dir.path().join("baseline/mono.png");
        let base = MockFramebuffer::with_color(10, 10, [50, 50, 50]);
        write_png(&baseline, &base);

        let mut last = 1.0;
        for rows in 0..=10u32 {
            let mut fb = base.clone();
            fb.draw_rect(0, 0, 10, rows, [60, 50, 50]);
            let current = dir.path().join(format!("current/mono_{}.png", rows));
            write_png(&current, &fb);

            let score = compare_screenshots(&baseline, &current, None).similarity;
            assert!(score <= last, "score {} rose above {}", score, last);
            last = score;
        }
        assert!(last < 1.0);
    }

    #[test]
    fn test_threshold_boundary() {
        assert!(is_similar(0.90, DEFAULT_THRESHOLD));
        assert!(!is_similar(0.8999, DEFAULT_THRESHOLD));
        assert!(is_similar(1.0, 0.0));
        assert!(!is_similar(0.9999, 0.0));
    }

    #[test]
    fn test_exact_threshold_through_comparator() {
        // 30 of 300 channel bytes differ -> similarity exactly 0.9
        let dir = tempfile::tempdir().unwrap();
        let baseline = dir.path().join("baseline/edge.png");
        let current = dir.path().join("current/edge_1.png");
        let base = MockFramebuffer::with_color(10, 10, [0, 0, 0]);
        let mut changed = base.clone();
        changed.draw_rect(0, 0, 10, 1, [255, 255, 255]);
        write_png(&baseline, &base);
        write_png(&current, &changed);

        let result = compare_screenshots(&baseline, &current, Some(0.1));
        assert_eq!(result.similarity, 0.9);
        assert!(result.is_similar);

        let strict = compare_screenshots(&baseline, &current, Some(0.05));
        assert!(!strict.is_similar);
    }

    #[test]
    fn test_similarity_score_empty() {
        assert_eq!(similarity_score(&[]), None);
        assert_eq!(similarity_score(&[0, 0, 3, 0]), Some(0.75));
    }
}
