//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for shortcode-vision, supporting:
//! - Environment variables for all configurable values
//! - Defaults matching the docker-compose test environment
//! - Builder-style overrides for programmatic configuration
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `WORDPRESS_URL` | Target WordPress site | `http://host.docker.internal:8085` |
//! | `WP_ADMIN_USER` | Admin username | `admin` |
//! | `WP_ADMIN_PASS` | Admin password | `admin123` |
//! | `SELENIUM_HUB` | WebDriver endpoint URL | `http://localhost:4444/wd/hub` |
//! | `SHORTCODE_VISION_SCREENSHOT_DIR` | Screenshot root (baseline/current/diff) | `tests/screenshots` |
//! | `SHORTCODE_VISION_REPORT_DIR` | Report output directory | `tests/reports` |
//! | `SHORTCODE_VISION_TEST_PAGE` | Path probed for the widget test page | `/?p=1` |
//! | `SHORTCODE_VISION_THRESHOLD` | Comparator difference threshold | `0.1` |
//! | `SHORTCODE_VISION_WAIT_TIMEOUT` | Element wait timeout in seconds | `10` |
//! | `SHORTCODE_VISION_WINDOW_SIZE` | Browser window size | `1920x1080` |
//!
//! # Example
//!
//! ```bash
//! # Point the suite at a local WordPress and a standalone chromedriver
//! export WORDPRESS_URL="http://localhost:8085"
//! export SELENIUM_HUB="http://localhost:9515"
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

// ============================================================================
// Default Values
// ============================================================================

/// Default WordPress site URL (reachable from inside the Selenium container)
pub const DEFAULT_WORDPRESS_URL: &str = "http://host.docker.internal:8085";

/// Default admin username
pub const DEFAULT_ADMIN_USER: &str = "admin";

/// Default admin password
pub const DEFAULT_ADMIN_PASS: &str = "admin123";

/// Default WebDriver endpoint
pub const DEFAULT_SELENIUM_HUB: &str = "http://localhost:4444/wd/hub";

/// Default screenshot root directory
pub const DEFAULT_SCREENSHOT_DIR: &str = "tests/screenshots";

/// Default report directory
pub const DEFAULT_REPORT_DIR: &str = "tests/reports";

/// Default path of the page expected to contain the widgets
pub const DEFAULT_TEST_PAGE: &str = "/?p=1";

/// Default comparator threshold (fraction of differing channel bytes tolerated)
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Default element wait timeout (seconds)
pub const DEFAULT_WAIT_TIMEOUT: u64 = 10;

/// Default browser window width
pub const DEFAULT_WINDOW_WIDTH: u32 = 1920;

/// Default browser window height
pub const DEFAULT_WINDOW_HEIGHT: u32 = 1080;

// ============================================================================
// Environment Variable Names
// ============================================================================

pub const ENV_WORDPRESS_URL: &str = "WORDPRESS_URL";
pub const ENV_ADMIN_USER: &str = "WP_ADMIN_USER";
pub const ENV_ADMIN_PASS: &str = "WP_ADMIN_PASS";
pub const ENV_SELENIUM_HUB: &str = "SELENIUM_HUB";
pub const ENV_SCREENSHOT_DIR: &str = "SHORTCODE_VISION_SCREENSHOT_DIR";
pub const ENV_REPORT_DIR: &str = "SHORTCODE_VISION_REPORT_DIR";
pub const ENV_TEST_PAGE: &str = "SHORTCODE_VISION_TEST_PAGE";
pub const ENV_THRESHOLD: &str = "SHORTCODE_VISION_THRESHOLD";
pub const ENV_WAIT_TIMEOUT: &str = "SHORTCODE_VISION_WAIT_TIMEOUT";
pub const ENV_WINDOW_SIZE: &str = "SHORTCODE_VISION_WINDOW_SIZE";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized configuration for a test session
#[derive(Debug, Clone)]
pub struct Config {
    /// Target WordPress site
    pub wordpress: WordPressSettings,
    /// WebDriver settings
    pub browser: BrowserSettings,
    /// Artifact locations
    pub paths: PathSettings,
    /// Comparator settings
    pub compare: CompareSettings,
}

/// WordPress-related settings
#[derive(Debug, Clone)]
pub struct WordPressSettings {
    /// Site base URL, without trailing slash
    pub url: String,
    /// Admin username
    pub admin_user: String,
    /// Admin password
    pub admin_pass: String,
    /// Path probed for a page containing the widgets
    pub test_page: String,
}

/// WebDriver-related settings
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// WebDriver endpoint URL
    pub hub_url: String,
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
    /// Element wait timeout (seconds)
    pub wait_timeout: u64,
}

/// Artifact directories
#[derive(Debug, Clone)]
pub struct PathSettings {
    /// Screenshot root holding baseline/current/diff
    pub screenshot_dir: PathBuf,
    /// Report directory
    pub report_dir: PathBuf,
}

/// Comparator settings
#[derive(Debug, Clone)]
pub struct CompareSettings {
    /// Fraction of differing channel bytes tolerated
    pub threshold: f64,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self::from_lookup(|_| None)
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let window = lookup(ENV_WINDOW_SIZE)
            .and_then(|s| parse_window_size(&s))
            .unwrap_or((DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT));

        Self {
            wordpress: WordPressSettings {
                url: lookup(ENV_WORDPRESS_URL)
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_WORDPRESS_URL.to_string()),
                admin_user: lookup(ENV_ADMIN_USER).unwrap_or_else(|| DEFAULT_ADMIN_USER.to_string()),
                admin_pass: lookup(ENV_ADMIN_PASS).unwrap_or_else(|| DEFAULT_ADMIN_PASS.to_string()),
                test_page: lookup(ENV_TEST_PAGE).unwrap_or_else(|| DEFAULT_TEST_PAGE.to_string()),
            },
            browser: BrowserSettings {
                hub_url: lookup(ENV_SELENIUM_HUB).unwrap_or_else(|| DEFAULT_SELENIUM_HUB.to_string()),
                window_width: window.0,
                window_height: window.1,
                wait_timeout: lookup(ENV_WAIT_TIMEOUT)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_WAIT_TIMEOUT),
            },
            paths: PathSettings {
                screenshot_dir: lookup(ENV_SCREENSHOT_DIR)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SCREENSHOT_DIR)),
                report_dir: lookup(ENV_REPORT_DIR)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR)),
            },
            compare: CompareSettings {
                threshold: lookup(ENV_THRESHOLD)
                    .and_then(|s| parse_threshold(&s).ok())
                    .unwrap_or(DEFAULT_THRESHOLD),
            },
        }
    }

    /// Element wait timeout as a `Duration`
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.browser.wait_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl WordPressSettings {
    /// Absolute URL of the admin dashboard
    pub fn admin_url(&self) -> String {
        format!("{}/wp-admin", self.url)
    }

    /// Absolute URL of the page probed for widgets
    pub fn test_page_url(&self) -> String {
        if self.test_page.starts_with("http://") || self.test_page.starts_with("https://") {
            return self.test_page.clone();
        }
        let path = self.test_page.trim_start_matches('/');
        format!("{}/{}", self.url, path)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a window size string "WxH" into (width, height)
pub fn parse_window_size(size: &str) -> Option<(u32, u32)> {
    let lower = size.trim().to_lowercase();
    let (w, h) = lower.split_once('x')?;
    let w: u32 = w.parse().ok()?;
    let h: u32 = h.parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}

/// Parse a comparator threshold, the tolerated fraction of differing bytes in [0, 1]
pub fn parse_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(format!("threshold must be between 0 and 1, got {}", threshold))
    }
}

/// Get WordPress URL (convenience function)
pub fn wordpress_url() -> String {
    get().wordpress.url.clone()
}

/// Get WebDriver endpoint (convenience function)
pub fn selenium_hub() -> String {
    get().browser.hub_url.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_window_size() {
        assert_eq!(parse_window_size("1920x1080"), Some((1920, 1080)));
        assert_eq!(parse_window_size("375X667"), Some((375, 667)));
        assert_eq!(parse_window_size("0x10"), None);
        assert_eq!(parse_window_size("wide"), None);
        assert_eq!(parse_window_size("100"), None);
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("0.05"), Ok(0.05));
        assert_eq!(parse_threshold(" 1 "), Ok(1.0));
        assert_eq!(parse_threshold("0"), Ok(0.0));
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("-0.1").is_err());
        // NaN parses as a float but is outside every range
        assert!(parse_threshold("NaN").is_err());
        assert!(parse_threshold("tight").is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::defaults();
        assert_eq!(config.wordpress.url, DEFAULT_WORDPRESS_URL);
        assert_eq!(config.wordpress.admin_user, DEFAULT_ADMIN_USER);
        assert_eq!(config.wordpress.admin_pass, DEFAULT_ADMIN_PASS);
        assert_eq!(config.browser.hub_url, DEFAULT_SELENIUM_HUB);
        assert_eq!(config.paths.screenshot_dir, PathBuf::from(DEFAULT_SCREENSHOT_DIR));
        assert_eq!(config.compare.threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.wait_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_config_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_WORDPRESS_URL, "http://localhost:8085/"),
            (ENV_SELENIUM_HUB, "http://localhost:9515"),
            (ENV_WINDOW_SIZE, "1280x720"),
            (ENV_THRESHOLD, "0.05"),
            (ENV_WAIT_TIMEOUT, "3"),
        ]);
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.wordpress.url, "http://localhost:8085");
        assert_eq!(config.browser.hub_url, "http://localhost:9515");
        assert_eq!((config.browser.window_width, config.browser.window_height), (1280, 720));
        assert_eq!(config.compare.threshold, 0.05);
        assert_eq!(config.browser.wait_timeout, 3);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(|k| match k {
            ENV_THRESHOLD => Some("1.5".to_string()),
            ENV_WAIT_TIMEOUT => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config.compare.threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.browser.wait_timeout, DEFAULT_WAIT_TIMEOUT);
    }

    #[test]
    fn test_wordpress_urls() {
        let config = Config::defaults();
        assert_eq!(config.wordpress.admin_url(), "http://host.docker.internal:8085/wp-admin");
        assert_eq!(config.wordpress.test_page_url(), "http://host.docker.internal:8085/?p=1");

        let mut wp = config.wordpress.clone();
        wp.test_page = "https://example.org/shortcodes/".to_string();
        assert_eq!(wp.test_page_url(), "https://example.org/shortcodes/");
    }
}
