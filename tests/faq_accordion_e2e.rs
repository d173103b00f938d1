//! End-to-end checks against a live WebDriver endpoint.
//!
//! Run with `cargo test -- --ignored` while a Chrome WebDriver listens at
//! `SELENIUM_HUB`. The browser must be able to read the local fixture file.

use shortcode_vision::browser::{BrowserOptions, BrowserSession, By};
use shortcode_vision::fixture;
use shortcode_vision::snapshot::{MockFramebuffer, SnapshotConfig, capture_with_backend};

fn open_fixture(dir: &std::path::Path) -> BrowserSession {
    let path = fixture::write_fixture(dir).expect("Failed to write fixture");
    let url = fixture::file_url(&path).expect("Failed to build fixture URL");
    let browser = BrowserSession::connect(&BrowserOptions::default()).expect("Failed to start browser");
    browser.goto(&url).expect("Failed to open fixture");
    browser
}

#[test]
#[ignore = "needs a running WebDriver endpoint"]
fn test_accordion_toggles_on_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let browser = open_fixture(dir.path());

    let root = browser
        .wait_for(&By::css(".hmg-ai-faq.hmg-ai-faq-accordion"))
        .expect("accordion not rendered");
    let toggles = browser.find_all_in(&root, &By::css("[data-hmg-faq-toggle]")).unwrap();
    assert!(toggles.len() >= 3);

    let first_panel = browser.find(&By::id("hmg-faq-fixture-answer-0")).unwrap();
    assert_eq!(browser.attr(&toggles[0], "aria-expanded").unwrap().as_deref(), Some("true"));
    assert!(browser.attr(&first_panel, "class").unwrap().unwrap().contains("hmg-ai-active"));

    browser.click(&toggles[0]).unwrap();
    assert_eq!(browser.attr(&toggles[0], "aria-expanded").unwrap().as_deref(), Some("false"));
    assert!(!browser.attr(&first_panel, "class").unwrap().unwrap().contains("hmg-ai-active"));

    browser.click(&toggles[1]).unwrap();
    assert_eq!(browser.attr(&toggles[1], "aria-expanded").unwrap().as_deref(), Some("true"));
}

#[test]
#[ignore = "needs a running WebDriver endpoint"]
fn test_browser_capture_matches_viewport() {
    let dir = tempfile::tempdir().unwrap();
    let mut browser = open_fixture(dir.path());
    browser.set_window_size(1280, 800).unwrap();

    let config = SnapshotConfig::new(dir.path().join("screenshots"));
    let snapshot = capture_with_backend(&mut browser, &config, "fixture_overview").expect("Capture failed");
    assert_eq!(snapshot.source, "webdriver");

    let png = std::fs::read(&snapshot.image_path).unwrap();
    let fb = MockFramebuffer::from_png_bytes(&png).unwrap();
    assert_eq!((fb.width(), fb.height()), (snapshot.width, snapshot.height));
}
