use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::browser::{BrowserError, BrowserOptions};

/// Grouping of widget test cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseGroup {
    /// Environment sanity checks
    Setup,
    Takeaways,
    Faq,
    Toc,
    Audio,
    /// Viewport, accessibility, print, theme and performance checks
    CrossCutting,
    /// Palette, typography and button styling rules
    Brand,
}

impl CaseGroup {
    pub fn name(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Takeaways => "takeaways",
            Self::Faq => "faq",
            Self::Toc => "toc",
            Self::Audio => "audio",
            Self::CrossCutting => "cross_cutting",
            Self::Brand => "brand",
        }
    }
}

impl std::fmt::Display for CaseGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for the harness execution
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Browser session options
    pub browser: BrowserOptions,

    /// Root of the baseline/current/diff directories
    pub screenshot_dir: PathBuf,

    /// Directory for reports and the generated fixture
    pub report_dir: PathBuf,

    /// Case name or group filter (case-insensitive substring)
    pub filter: Option<String>,

    /// Compare every capture against its named baseline
    pub compare: bool,

    /// Comparator threshold
    pub threshold: f64,

    /// Pause after scrolling a widget into view
    pub settle: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        let cfg = crate::config::get();
        Self {
            browser: BrowserOptions::default(),
            screenshot_dir: cfg.paths.screenshot_dir.clone(),
            report_dir: cfg.paths.report_dir.clone(),
            filter: None,
            compare: false,
            threshold: cfg.compare.threshold,
            settle: Duration::from_millis(500),
        }
    }
}

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Error types for harness operations
#[derive(Debug)]
pub enum HarnessError {
    /// Browser command or wait failed
    Browser(BrowserError),

    /// Snapshot capture error
    Snapshot(crate::snapshot::SnapshotError),

    /// I/O error
    Io(std::io::Error),

    /// A widget did not behave as expected
    Assertion(String),
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarnessError::Browser(err) => write!(f, "Browser error: {}", err),
            HarnessError::Snapshot(err) => write!(f, "Snapshot error: {}", err),
            HarnessError::Io(err) => write!(f, "I/O error: {}", err),
            HarnessError::Assertion(msg) => write!(f, "Assertion failed: {}", msg),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HarnessError::Browser(err) => Some(err),
            HarnessError::Snapshot(err) => Some(err),
            HarnessError::Io(err) => Some(err),
            HarnessError::Assertion(_) => None,
        }
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        HarnessError::Io(err)
    }
}

impl From<crate::snapshot::SnapshotError> for HarnessError {
    fn from(err: crate::snapshot::SnapshotError) -> Self {
        HarnessError::Snapshot(err)
    }
}

impl From<BrowserError> for HarnessError {
    fn from(err: BrowserError) -> Self {
        HarnessError::Browser(err)
    }
}

/// Fail with an assertion error unless `condition` holds
pub fn ensure(condition: bool, message: impl Into<String>) -> HarnessResult<()> {
    if condition {
        Ok(())
    } else {
        Err(HarnessError::Assertion(message.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure() {
        assert!(ensure(true, "unused").is_ok());
        let err = ensure(false, "expected at least 3 items, found 2").unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: expected at least 3 items, found 2");
    }

    #[test]
    fn test_browser_error_passthrough() {
        let err: HarnessError = BrowserError::Closed.into();
        assert_eq!(err.to_string(), "Browser error: Browser session is closed");
    }
}
