pub mod backend;
pub mod compare;
pub mod types;
pub mod utils;

pub use backend::{CaptureBackend, CaptureResult, MockFramebuffer, capture_with_backend};
pub use compare::{
    BASELINE_CREATED, ComparisonDetail, ComparisonResult, DEFAULT_THRESHOLD, compare_screenshots, is_similar,
    similarity_score,
};
pub use types::{ScreenshotRole, Snapshot, SnapshotConfig, SnapshotError, SnapshotResult};
pub use utils::{diff_path_for, generate_filename, generate_timestamp, sanitize_name, write_manifest};
