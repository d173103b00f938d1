use chrono::Utc;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::snapshot::types::{ScreenshotRole, Snapshot, SnapshotConfig, SnapshotResult};

/// Generate a second-resolution unix timestamp
pub fn generate_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Generate a filename for screenshot images: `<name>_<timestamp>.png`
pub fn generate_filename(name: &str, timestamp: i64) -> String {
    format!("{}_{}.png", sanitize_name(name), timestamp)
}

/// Sanitize a name for use in filenames
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

/// Derive the diff image path for a current-role screenshot.
///
/// Every path segment equal to the current-role directory name is replaced by
/// the diff-role name. A path with no such segment gets a `_diff` suffix on its
/// file stem instead, so the current image is never overwritten.
pub fn diff_path_for(current_path: &Path) -> PathBuf {
    let current = OsStr::new(ScreenshotRole::Current.dir_name());
    let diff = OsStr::new(ScreenshotRole::Diff.dir_name());

    let mut substituted = false;
    let derived: PathBuf = current_path
        .components()
        .map(|component| match component {
            Component::Normal(segment) if segment == current => {
                substituted = true;
                Component::Normal(diff)
            }
            other => other,
        })
        .collect();

    if substituted {
        return derived;
    }

    let stem = current_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "screenshot".to_string());
    current_path.with_file_name(format!("{}_diff.png", stem))
}

/// Write the JSON manifest for a snapshot if configured
pub fn write_manifest(snapshot: &Snapshot, config: &SnapshotConfig) -> SnapshotResult<()> {
    if config.include_manifest {
        let manifest_path = snapshot.image_path.with_extension("json");
        fs::write(manifest_path, serde_json::to_string_pretty(snapshot)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_filename() {
        assert_eq!(generate_filename("faq_accordion_initial", 1700000000), "faq_accordion_initial_1700000000.png");
        assert_eq!(generate_filename("mobile view", 5), "mobile_view_5.png");
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("hello world"), "hello_world");
        assert_eq!(sanitize_name("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_name("toc-numbered_1"), "toc-numbered_1");
    }

    #[test]
    fn test_diff_path_substitutes_role_segment() {
        let current = Path::new("tests/screenshots/current/faq_1.png");
        assert_eq!(diff_path_for(current), PathBuf::from("tests/screenshots/diff/faq_1.png"));
    }

    #[test]
    fn test_diff_path_leaves_file_name_alone() {
        // only whole segments are substituted
        let current = Path::new("shots/current/current_view_1.png");
        assert_eq!(diff_path_for(current), PathBuf::from("shots/diff/current_view_1.png"));
    }

    #[test]
    fn test_diff_path_without_role_segment() {
        let current = Path::new("/tmp/elsewhere/shot.png");
        assert_eq!(diff_path_for(current), PathBuf::from("/tmp/elsewhere/shot_diff.png"));
    }

    #[test]
    fn test_timestamp_is_unix_seconds() {
        let ts = generate_timestamp();
        // after 2020-01-01 and well below millisecond magnitude
        assert!(ts > 1_577_836_800);
        assert!(ts < 100_000_000_000);
    }
}
