use std::time::Instant;
use tracing::{error, info, warn};

use crate::browser::{BrowserOptions, BrowserResult, BrowserSession};
use crate::harness::cases::{TestCase, select_cases};
use crate::harness::context::CaseContext;
use crate::harness::types::{HarnessConfig, HarnessError, HarnessResult};
use crate::runner::{CaseResult, RunResult};
use crate::snapshot::SnapshotConfig;
use crate::wordpress::{TestPage, WordPressHelper};

/// Browser state restored before every case
pub trait CaseReset {
    fn clear_cookies(&self) -> BrowserResult<()>;
    fn resize_window(&self, width: u32, height: u32) -> BrowserResult<()>;
}

impl CaseReset for BrowserSession {
    fn clear_cookies(&self) -> BrowserResult<()> {
        self.delete_all_cookies()
    }

    fn resize_window(&self, width: u32, height: u32) -> BrowserResult<()> {
        self.set_window_size(width, height)
    }
}

/// Log out whatever an earlier case logged in and restore the configured window.
///
/// Cookies are cleared for the document the previous case left open, which is
/// the WordPress site after an admin login.
pub fn reset_for_case<R: CaseReset + ?Sized>(session: &R, options: &BrowserOptions) -> BrowserResult<()> {
    if let Err(e) = session.clear_cookies() {
        warn!("failed to clear cookies: {}", e);
    }
    session.resize_window(options.window_width, options.window_height)
}

/// Runs the selected cases sequentially in one browser session.
///
/// Every case starts logged out at the configured window size.
/// Returns `Err` only when the run cannot start (directories, browser session);
/// case failures are recorded in the returned [`RunResult`].
pub fn run_harness(config: &HarnessConfig) -> HarnessResult<RunResult> {
    SnapshotConfig::new(&config.screenshot_dir).ensure_dirs()?;
    std::fs::create_dir_all(&config.report_dir)?;

    let cases = select_cases(config.filter.as_deref());
    if cases.is_empty() {
        warn!(filter = ?config.filter, "no test cases match the filter");
    }

    let mut browser = BrowserSession::connect(&config.browser)?;
    let wordpress = WordPressHelper::from_config();
    let page = wordpress.resolve_test_page(&browser, &config.report_dir)?;
    info!(url = %page.url, fixture = page.is_fixture(), "resolved test page");

    let mut results = Vec::with_capacity(cases.len());
    for case in cases {
        results.push(run_case(case, &mut browser, &page, &wordpress, config));
    }

    if let Err(e) = browser.close() {
        warn!("failed to close browser session: {}", e);
    }

    Ok(RunResult::from_cases(page.url, results))
}

fn run_case(
    case: &TestCase,
    browser: &mut BrowserSession,
    page: &TestPage,
    wordpress: &WordPressHelper,
    config: &HarnessConfig,
) -> CaseResult {
    info!(case = case.name, group = %case.group, "running case");
    let start = Instant::now();

    let reset = reset_for_case(&*browser, &config.browser);
    let mut ctx = CaseContext::new(browser, page, wordpress, config);
    let outcome = match reset {
        Ok(()) => (case.run)(&mut ctx),
        Err(e) => Err(HarnessError::from(e)),
    };
    let outcome = outcome.and_then(|()| {
        let regressions = ctx.regressions();
        if regressions.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::Assertion(format!(
                "{} screenshot(s) differ from baseline (lowest similarity {:.4})",
                regressions.len(),
                regressions.iter().map(|r| r.similarity).fold(1.0, f64::min)
            )))
        }
    });

    let duration_ms = start.elapsed().as_millis() as u64;
    let error = match &outcome {
        Ok(()) => {
            info!(case = case.name, duration_ms, "passed");
            None
        }
        Err(e) => {
            error!(case = case.name, duration_ms, "failed: {}", e);
            Some(e.to_string())
        }
    };

    CaseResult {
        name: case.name.to_string(),
        group: case.group.to_string(),
        passed: outcome.is_ok(),
        error,
        duration_ms,
        screenshots: ctx.into_screenshots(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserError;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSession {
        calls: RefCell<Vec<String>>,
        cookies_fail: bool,
        resize_fails: bool,
    }

    impl CaseReset for RecordingSession {
        fn clear_cookies(&self) -> BrowserResult<()> {
            self.calls.borrow_mut().push("clear_cookies".to_string());
            if self.cookies_fail {
                return Err(BrowserError::Closed);
            }
            Ok(())
        }

        fn resize_window(&self, width: u32, height: u32) -> BrowserResult<()> {
            self.calls.borrow_mut().push(format!("resize {}x{}", width, height));
            if self.resize_fails {
                return Err(BrowserError::Closed);
            }
            Ok(())
        }
    }

    fn options() -> BrowserOptions {
        BrowserOptions::new("http://localhost:4444/wd/hub").window_size(1280, 720)
    }

    #[test]
    fn test_reset_logs_out_then_restores_window() {
        let session = RecordingSession::default();
        reset_for_case(&session, &options()).unwrap();
        reset_for_case(&session, &options()).unwrap();

        assert_eq!(
            *session.calls.borrow(),
            vec!["clear_cookies", "resize 1280x720", "clear_cookies", "resize 1280x720"]
        );
    }

    #[test]
    fn test_cookie_failure_still_resizes() {
        let session = RecordingSession {
            cookies_fail: true,
            ..Default::default()
        };
        reset_for_case(&session, &options()).unwrap();
        assert_eq!(*session.calls.borrow(), vec!["clear_cookies", "resize 1280x720"]);
    }

    #[test]
    fn test_resize_failure_fails_the_case() {
        let session = RecordingSession {
            resize_fails: true,
            ..Default::default()
        };
        let err = reset_for_case(&session, &options()).unwrap_err();
        assert!(matches!(err, BrowserError::Closed));
    }
}
