//! Per-case view of the browser, page and screenshot directories.

use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::browser::{BrowserSession, By, Element};
use crate::harness::types::{HarnessConfig, HarnessResult};
use crate::runner::ScreenshotRecord;
use crate::snapshot::{ComparisonResult, SnapshotConfig, capture_with_backend, compare_screenshots};
use crate::wordpress::{TestPage, WordPressHelper};

/// Everything a test case can touch
pub struct CaseContext<'a> {
    browser: &'a mut BrowserSession,
    page: &'a TestPage,
    wordpress: &'a WordPressHelper,
    snapshots: SnapshotConfig,
    compare: Option<f64>,
    settle: Duration,
    window: (u32, u32),
    screenshots: Vec<ScreenshotRecord>,
}

impl<'a> CaseContext<'a> {
    pub fn new(
        browser: &'a mut BrowserSession,
        page: &'a TestPage,
        wordpress: &'a WordPressHelper,
        config: &HarnessConfig,
    ) -> Self {
        Self {
            browser,
            page,
            wordpress,
            snapshots: SnapshotConfig::new(&config.screenshot_dir),
            compare: config.compare.then_some(config.threshold),
            settle: config.settle,
            window: (config.browser.window_width, config.browser.window_height),
            screenshots: Vec::new(),
        }
    }

    pub fn browser(&self) -> &BrowserSession {
        &*self.browser
    }

    pub fn page(&self) -> &TestPage {
        self.page
    }

    pub fn wordpress(&self) -> &WordPressHelper {
        self.wordpress
    }

    /// Configured window size cases restore after resizing
    pub fn default_window(&self) -> (u32, u32) {
        self.window
    }

    /// Load the page under test
    pub fn open_page(&self) -> HarnessResult<()> {
        self.browser.goto(&self.page.url)?;
        Ok(())
    }

    /// Load the page, wait for `selector`, scroll it into view and let it settle
    pub fn open_widget(&self, selector: &str) -> HarnessResult<Element> {
        self.open_page()?;
        self.focus_widget(selector)
    }

    /// Wait for `selector` on the current page and scroll it into view
    pub fn focus_widget(&self, selector: &str) -> HarnessResult<Element> {
        let element = self.browser.wait_for(&By::css(selector))?;
        self.browser.scroll_into_view(&element)?;
        self.pause();
        Ok(element)
    }

    /// Let transitions finish before capturing
    pub fn pause(&self) {
        std::thread::sleep(self.settle);
    }

    /// Capture the viewport as `name`, comparing against its baseline when enabled
    pub fn screenshot(&mut self, name: &str) -> HarnessResult<PathBuf> {
        let snapshot = capture_with_backend(&mut *self.browser, &self.snapshots, name)?;
        let comparison = self.compare.map(|threshold| {
            compare_screenshots(&self.snapshots.baseline_path(name), &snapshot.image_path, Some(threshold))
        });
        if let Some(result) = &comparison {
            debug!(name, similarity = result.similarity, similar = result.is_similar, "compared capture");
        }

        let path = snapshot.image_path.clone();
        self.screenshots.push(ScreenshotRecord {
            name: name.to_string(),
            path: path.clone(),
            comparison,
        });
        Ok(path)
    }

    /// Comparisons recorded so far that fell below the threshold
    pub fn regressions(&self) -> Vec<&ComparisonResult> {
        self.screenshots
            .iter()
            .filter_map(|s| s.comparison.as_ref())
            .filter(|c| !c.is_similar)
            .collect()
    }

    /// Consume the context, yielding its screenshots
    pub fn into_screenshots(self) -> Vec<ScreenshotRecord> {
        self.screenshots
    }
}
