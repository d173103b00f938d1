//! Types for test run results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::snapshot::ComparisonResult;

/// A screenshot captured during a case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotRecord {
    /// Test name the capture was taken for
    pub name: String,

    /// Path to the screenshot
    pub path: PathBuf,

    /// Comparison against the named baseline (if comparing)
    pub comparison: Option<ComparisonResult>,
}

/// Result of a single test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub name: String,

    /// Group the case is registered under
    pub group: String,

    pub passed: bool,

    /// Error message if failed
    pub error: Option<String>,

    pub duration_ms: u64,

    /// Screenshots in capture order
    pub screenshots: Vec<ScreenshotRecord>,
}

/// Result of a complete test run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Whether every case passed
    pub success: bool,

    /// Error message if the run could not complete
    pub error: Option<String>,

    /// Page the cases ran against
    pub page_url: Option<String>,

    /// Per-case results in execution order
    pub cases: Vec<CaseResult>,
}

impl RunResult {
    /// A run that failed before any case executed
    pub fn aborted(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            page_url: None,
            cases: Vec::new(),
        }
    }

    /// Aggregate case results
    pub fn from_cases(page_url: String, cases: Vec<CaseResult>) -> Self {
        Self {
            success: cases.iter().all(|c| c.passed),
            error: None,
            page_url: Some(page_url),
            cases,
        }
    }

    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn case(name: &str, passed: bool) -> CaseResult {
        CaseResult {
            name: name.to_string(),
            group: "faq".to_string(),
            passed,
            error: (!passed).then(|| "boom".to_string()),
            duration_ms: 12,
            screenshots: vec![],
        }
    }

    #[test]
    fn test_aggregate() {
        let run = RunResult::from_cases("file:///tmp/x.html".into(), vec![case("a", true), case("b", false)]);
        assert!(!run.success);
        assert_eq!((run.passed(), run.failed()), (1, 1));

        let run = RunResult::from_cases("u".into(), vec![case("a", true)]);
        assert!(run.success);
    }

    #[test]
    fn test_serializes_to_json() {
        let run = RunResult::from_cases("u".into(), vec![case("faq_accordion", false)]);
        let json: serde_json::Value = serde_json::to_value(&run).unwrap();
        assert_eq!(json["cases"][0]["name"], "faq_accordion");
        assert_eq!(json["cases"][0]["error"], "boom");
        assert_eq!(json["success"], false);

        let aborted = RunResult::aborted("no browser");
        assert_eq!(aborted.cases.len(), 0);
        assert_eq!(aborted.error.as_deref(), Some("no browser"));
    }
}
