//! Shortcode Vision - visual regression testing for WordPress shortcode widgets.
//!
//! This crate provides:
//! - A blocking WebDriver session for driving a remote browser
//! - Screenshot capture behind a `CaptureBackend` trait, with a
//!   `MockFramebuffer` for tests
//! - A screenshot comparator that bootstraps missing baselines and writes
//!   difference images
//! - Test cases for every takeaways, FAQ, table-of-contents and audio player style
//! - Preflight checks, run sessions and HTML/JSON reports
//!
//! # Example
//!
//! ```rust,no_run
//! use shortcode_vision::snapshot::compare_screenshots;
//! use std::path::Path;
//!
//! let result = compare_screenshots(
//!     Path::new("tests/screenshots/baseline/faq_accordion.png"),
//!     Path::new("tests/screenshots/current/faq_accordion_1700000000.png"),
//!     None,
//! );
//! println!("similar: {} ({:.4})", result.is_similar, result.similarity);
//! ```

pub mod brand;
pub mod browser;
pub mod config;
pub mod fixture;
pub mod harness;
pub mod preflight;
pub mod report;
pub mod runner;
pub mod session;
pub mod snapshot;
pub mod widgets;
pub mod wordpress;

// Re-export runner types
pub use runner::{CaseResult, RunResult, ScreenshotRecord};

// Re-export harness types
pub use harness::{CaseGroup, HarnessConfig, HarnessError, HarnessResult, TestCase, run_harness, select_cases};

// Re-export browser types
pub use browser::{BrowserError, BrowserOptions, BrowserResult, BrowserSession, By};

// Re-export snapshot types and backends
pub use snapshot::{
    CaptureBackend, CaptureResult, ComparisonDetail, ComparisonResult, MockFramebuffer, ScreenshotRole, Snapshot,
    SnapshotConfig, SnapshotError, SnapshotResult, capture_with_backend, compare_screenshots,
};

// Re-export session management
pub use session::{Session, SessionInfo};

// Re-export preflight checks
pub use preflight::{PreflightError, PreflightResult, check_environment};

pub use widgets::WidgetKind;
pub use wordpress::{PageSource, TestPage, WordPressHelper};
