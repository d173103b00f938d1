// Core types for screenshot capture and comparison

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Role-tagged screenshot directory under the screenshot root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotRole {
    /// Reference screenshots new captures are compared against
    Baseline,
    /// Screenshots from the latest run
    Current,
    /// Difference images produced by the comparator
    Diff,
}

impl ScreenshotRole {
    pub const ALL: [ScreenshotRole; 3] = [Self::Baseline, Self::Current, Self::Diff];

    /// Directory name for this role; also the path segment substituted when
    /// deriving diff paths from current paths
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Current => "current",
            Self::Diff => "diff",
        }
    }
}

/// Configuration for snapshot capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Root directory holding the baseline/current/diff directories
    pub root: PathBuf,

    /// Whether to write a JSON manifest next to each capture
    pub include_manifest: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(crate::config::DEFAULT_SCREENSHOT_DIR),
            include_manifest: false,
        }
    }
}

impl SnapshotConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn with_manifest(mut self, include: bool) -> Self {
        self.include_manifest = include;
        self
    }

    /// Directory for a given role
    pub fn dir(&self, role: ScreenshotRole) -> PathBuf {
        self.root.join(role.dir_name())
    }

    /// Shared baseline path for a named test (no timestamp)
    pub fn baseline_path(&self, name: &str) -> PathBuf {
        self.dir(ScreenshotRole::Baseline)
            .join(format!("{}.png", crate::snapshot::utils::sanitize_name(name)))
    }

    /// Create all role directories
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for role in ScreenshotRole::ALL {
            std::fs::create_dir_all(self.dir(role))?;
        }
        Ok(())
    }
}

/// Represents a captured screenshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Test name the capture was taken for
    pub name: String,

    /// Path to the image file
    pub image_path: PathBuf,

    /// Source type (e.g., "webdriver", "mock")
    pub source: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Timestamp when the snapshot was created
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Error types for snapshot operations
#[derive(Debug)]
pub enum SnapshotError {
    /// Error during capture process
    Capture(String),

    /// Image encode/decode error
    Image(image::ImageError),

    /// I/O error
    Io(std::io::Error),

    /// Serialization error
    Serialization(serde_json::Error),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Capture(msg) => write!(f, "Capture error: {}", msg),
            SnapshotError::Image(err) => write!(f, "Image error: {}", err),
            SnapshotError::Io(err) => write!(f, "I/O error: {}", err),
            SnapshotError::Serialization(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Capture(_) => None,
            SnapshotError::Image(err) => Some(err),
            SnapshotError::Io(err) => Some(err),
            SnapshotError::Serialization(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self {
        SnapshotError::Io(err)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Serialization(err)
    }
}

impl From<image::ImageError> for SnapshotError {
    fn from(err: image::ImageError) -> Self {
        SnapshotError::Image(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_dirs() {
        let config = SnapshotConfig::new("shots");
        assert_eq!(config.dir(ScreenshotRole::Baseline), PathBuf::from("shots/baseline"));
        assert_eq!(config.dir(ScreenshotRole::Current), PathBuf::from("shots/current"));
        assert_eq!(config.dir(ScreenshotRole::Diff), PathBuf::from("shots/diff"));
    }

    #[test]
    fn test_baseline_path_has_no_timestamp() {
        let config = SnapshotConfig::new("shots");
        assert_eq!(
            config.baseline_path("faq accordion"),
            PathBuf::from("shots/baseline/faq_accordion.png")
        );
    }
}
