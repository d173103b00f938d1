//! WordPress session helpers: admin login and test page resolution.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::browser::{BrowserResult, BrowserSession, By};
use crate::config::WordPressSettings;
use crate::fixture;
use crate::harness::HarnessResult;
use crate::widgets;

/// Where the page under test came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    /// A page on the WordPress site rendering the shortcodes
    Site,
    /// The generated standalone fixture at this path
    Fixture(PathBuf),
}

/// Page the widget cases run against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPage {
    pub url: String,
    pub source: PageSource,
}

impl TestPage {
    pub fn is_fixture(&self) -> bool {
        matches!(self.source, PageSource::Fixture(_))
    }
}

/// Helper bound to one WordPress site
#[derive(Debug, Clone)]
pub struct WordPressHelper {
    settings: WordPressSettings,
}

impl WordPressHelper {
    pub fn new(settings: WordPressSettings) -> Self {
        Self { settings }
    }

    /// Helper for the process-wide configured site
    pub fn from_config() -> Self {
        Self::new(crate::config::get().wordpress.clone())
    }

    pub fn settings(&self) -> &WordPressSettings {
        &self.settings
    }

    /// Log into wp-admin through the standard login form
    pub fn login_to_admin(&self, browser: &BrowserSession) -> BrowserResult<()> {
        info!(user = %self.settings.admin_user, "logging into WordPress admin");
        browser.goto(&self.settings.admin_url())?;

        let username = browser.wait_for(&By::id("user_login"))?;
        browser.send_keys(&username, &self.settings.admin_user)?;

        let password = browser.find(&By::id("user_pass"))?;
        browser.send_keys(&password, &self.settings.admin_pass)?;

        let submit = browser.find(&By::id("wp-submit"))?;
        browser.click(&submit)?;

        browser.wait_for(&By::id("wpadminbar"))?;
        Ok(())
    }

    /// Find a page rendering the widgets, falling back to the static fixture
    /// written into `fixture_dir`
    pub fn resolve_test_page(&self, browser: &BrowserSession, fixture_dir: &Path) -> HarnessResult<TestPage> {
        let url = self.settings.test_page_url();
        match browser.goto(&url).and_then(|_| page_has_widgets(browser)) {
            Ok(true) => {
                info!(url = %url, "using site page with shortcode widgets");
                return Ok(TestPage {
                    url,
                    source: PageSource::Site,
                });
            }
            Ok(false) => info!(url = %url, "no shortcode widgets found, using fixture"),
            Err(e) => warn!(url = %url, "could not probe test page ({}), using fixture", e),
        }

        fixture_page(fixture_dir)
    }
}

/// Write the fixture and describe it as a test page
pub fn fixture_page(dir: &Path) -> HarnessResult<TestPage> {
    let path = fixture::write_fixture(dir)?;
    let url = fixture::file_url(&path)?;
    Ok(TestPage {
        url,
        source: PageSource::Fixture(path),
    })
}

/// Whether any widget root is present on the loaded page
pub fn page_has_widgets(browser: &BrowserSession) -> BrowserResult<bool> {
    for selector in widgets::root_selectors() {
        if !browser.find_all(&By::css(selector))?.is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_fixture_page_points_at_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let page = fixture_page(dir.path()).unwrap();

        assert!(page.is_fixture());
        assert!(page.url.starts_with("file://"));
        match &page.source {
            PageSource::Fixture(path) => assert!(path.exists()),
            PageSource::Site => panic!("expected fixture source"),
        }
    }

    #[test]
    fn test_helper_uses_configured_site() {
        let config = Config::from_lookup(|key| match key {
            "WORDPRESS_URL" => Some("http://wp.test/".to_string()),
            _ => None,
        });
        let helper = WordPressHelper::new(config.wordpress);
        assert_eq!(helper.settings().admin_url(), "http://wp.test/wp-admin");
        assert_eq!(helper.settings().test_page_url(), "http://wp.test/?p=1");
    }
}
