//! Blocking WebDriver session.
//!
//! Wraps a `fantoccini` client with a current-thread tokio runtime so every
//! browser command blocks the caller until the endpoint answers. Element waits
//! are bounded polls that surface as [`BrowserError::Timeout`].

use fantoccini::error::{CmdError, NewSessionError};
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::snapshot::{CaptureBackend, CaptureResult, SnapshotError, SnapshotResult};

pub use fantoccini::elements::Element;

/// WebDriver code point for the TAB key
pub const KEY_TAB: &str = "\u{e004}";

/// Interval between polls in [`BrowserSession::wait_until`]
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Result type for browser operations
pub type BrowserResult<T> = Result<T, BrowserError>;

/// Errors raised while driving the browser
#[derive(Debug)]
pub enum BrowserError {
    /// The WebDriver endpoint refused or failed session creation
    Connect { endpoint: String, reason: String },
    /// A WebDriver command failed
    Command(CmdError),
    /// An expected DOM state never appeared
    Timeout { locator: String, timeout: Duration },
    /// Script arguments or results could not be converted
    Script(String),
    /// The async runtime could not be started
    Runtime(std::io::Error),
    /// The session was already closed
    Closed,
}

impl std::fmt::Display for BrowserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserError::Connect { endpoint, reason } => {
                write!(f, "Could not start a browser session at {}: {}", endpoint, reason)
            }
            BrowserError::Command(err) => write!(f, "WebDriver command failed: {}", err),
            BrowserError::Timeout { locator, timeout } => {
                write!(f, "Element {} not found within {} seconds", locator, timeout.as_secs_f32())
            }
            BrowserError::Script(msg) => write!(f, "Script error: {}", msg),
            BrowserError::Runtime(err) => write!(f, "Runtime error: {}", err),
            BrowserError::Closed => write!(f, "Browser session is closed"),
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::Command(err) => Some(err),
            BrowserError::Runtime(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CmdError> for BrowserError {
    fn from(err: CmdError) -> Self {
        BrowserError::Command(err)
    }
}

impl From<serde_json::Error> for BrowserError {
    fn from(err: serde_json::Error) -> Self {
        BrowserError::Script(err.to_string())
    }
}

/// How to locate an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum By {
    Css(String),
    Id(String),
}

impl By {
    pub fn css(selector: impl Into<String>) -> Self {
        By::Css(selector.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        By::Id(id.into())
    }

    fn locator(&self) -> Locator<'_> {
        match self {
            By::Css(selector) => Locator::Css(selector),
            By::Id(id) => Locator::Id(id),
        }
    }
}

impl std::fmt::Display for By {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            By::Css(selector) => write!(f, "(css selector, '{}')", selector),
            By::Id(id) => write!(f, "(id, '{}')", id),
        }
    }
}

/// Options for starting a session
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// WebDriver endpoint URL
    pub endpoint: String,
    /// Initial window width
    pub window_width: u32,
    /// Initial window height
    pub window_height: u32,
    /// Run Chrome headless
    pub headless: bool,
    /// Default timeout for element waits
    pub wait_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        let cfg = crate::config::get();
        Self {
            endpoint: cfg.browser.hub_url.clone(),
            window_width: cfg.browser.window_width,
            window_height: cfg.browser.window_height,
            headless: true,
            wait_timeout: cfg.wait_timeout(),
        }
    }
}

impl BrowserOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Session timeouts: element lookups block up to `wait_timeout`
    pub fn timeouts(&self) -> TimeoutConfiguration {
        TimeoutConfiguration::new(None, None, Some(self.wait_timeout))
    }

    /// W3C capabilities requesting Chrome with the configured arguments
    pub fn capabilities(&self) -> serde_json::Map<String, Value> {
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            format!("--window-size={},{}", self.window_width, self.window_height),
        ];
        if self.headless {
            args.insert(0, "--headless".to_string());
        }

        let mut caps = serde_json::Map::new();
        caps.insert("browserName".to_string(), Value::String("chrome".to_string()));
        caps.insert("goog:chromeOptions".to_string(), serde_json::json!({ "args": args }));
        caps
    }
}

/// A blocking browser session against a remote WebDriver endpoint
pub struct BrowserSession {
    runtime: Runtime,
    client: Option<Client>,
    wait_timeout: Duration,
}

impl BrowserSession {
    /// Create a session at the configured endpoint
    pub fn connect(options: &BrowserOptions) -> BrowserResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BrowserError::Runtime)?;

        info!(endpoint = %options.endpoint, "starting browser session");
        let client = runtime
            .block_on(
                ClientBuilder::native()
                    .capabilities(options.capabilities())
                    .connect(&options.endpoint),
            )
            .map_err(|e: NewSessionError| BrowserError::Connect {
                endpoint: options.endpoint.clone(),
                reason: e.to_string(),
            })?;

        let session = Self {
            runtime,
            client: Some(client),
            wait_timeout: options.wait_timeout,
        };
        session.set_window_size(options.window_width, options.window_height)?;
        session.update_timeouts(options.timeouts())?;
        Ok(session)
    }

    fn client(&self) -> BrowserResult<&Client> {
        self.client.as_ref().ok_or(BrowserError::Closed)
    }

    /// Default element wait timeout
    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    /// Navigate to a URL
    pub fn goto(&self, url: &str) -> BrowserResult<()> {
        debug!(url, "navigating");
        let client = self.client()?;
        Ok(self.runtime.block_on(client.goto(url))?)
    }

    pub fn current_url(&self) -> BrowserResult<String> {
        let client = self.client()?;
        Ok(self.runtime.block_on(client.current_url())?.to_string())
    }

    pub fn title(&self) -> BrowserResult<String> {
        let client = self.client()?;
        Ok(self.runtime.block_on(client.title())?)
    }

    pub fn page_source(&self) -> BrowserResult<String> {
        let client = self.client()?;
        Ok(self.runtime.block_on(client.source())?)
    }

    pub fn set_window_size(&self, width: u32, height: u32) -> BrowserResult<()> {
        debug!(width, height, "resizing window");
        let client = self.client()?;
        Ok(self.runtime.block_on(client.set_window_size(width, height))?)
    }

    pub fn update_timeouts(&self, timeouts: TimeoutConfiguration) -> BrowserResult<()> {
        debug!(implicit = ?timeouts.implicit(), "updating session timeouts");
        let client = self.client()?;
        Ok(self.runtime.block_on(client.update_timeouts(timeouts))?)
    }

    /// Delete every cookie visible to the current document
    pub fn delete_all_cookies(&self) -> BrowserResult<()> {
        debug!("deleting cookies");
        let client = self.client()?;
        Ok(self.runtime.block_on(client.delete_all_cookies())?)
    }

    /// Find the first element matching the locator
    pub fn find(&self, by: &By) -> BrowserResult<Element> {
        let client = self.client()?;
        Ok(self.runtime.block_on(client.find(by.locator()))?)
    }

    /// Find all elements matching the locator (possibly none)
    pub fn find_all(&self, by: &By) -> BrowserResult<Vec<Element>> {
        let client = self.client()?;
        Ok(self.runtime.block_on(client.find_all(by.locator()))?)
    }

    /// Find the first descendant of `parent` matching the locator
    pub fn find_in(&self, parent: &Element, by: &By) -> BrowserResult<Element> {
        Ok(self.runtime.block_on(parent.find(by.locator()))?)
    }

    /// Find all descendants of `parent` matching the locator
    pub fn find_all_in(&self, parent: &Element, by: &By) -> BrowserResult<Vec<Element>> {
        Ok(self.runtime.block_on(parent.find_all(by.locator()))?)
    }

    /// Wait for an element with the default timeout
    pub fn wait_for(&self, by: &By) -> BrowserResult<Element> {
        self.wait_for_element(by, self.wait_timeout)
    }

    /// Poll until an element matching the locator is present
    pub fn wait_for_element(&self, by: &By, timeout: Duration) -> BrowserResult<Element> {
        let client = self.client()?;
        self.runtime
            .block_on(client.wait().at_most(timeout).for_element(by.locator()))
            .map_err(|e| match e {
                CmdError::WaitTimeout => BrowserError::Timeout {
                    locator: by.to_string(),
                    timeout,
                },
                other => BrowserError::Command(other),
            })
    }

    /// Poll `condition` until it holds or `timeout` elapses
    pub fn wait_until<F>(&self, description: &str, timeout: Duration, mut condition: F) -> BrowserResult<()>
    where
        F: FnMut(&Self) -> BrowserResult<bool>,
    {
        let start = Instant::now();
        loop {
            if condition(self)? {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(BrowserError::Timeout {
                    locator: description.to_string(),
                    timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Execute a script with the given arguments and return its result
    pub fn execute(&self, script: &str, args: Vec<Value>) -> BrowserResult<Value> {
        let client = self.client()?;
        Ok(self.runtime.block_on(client.execute(script, args))?)
    }

    /// Execute a script receiving `element` as `arguments[0]`
    pub fn execute_on(&self, script: &str, element: &Element) -> BrowserResult<Value> {
        self.execute(script, vec![serde_json::to_value(element)?])
    }

    pub fn scroll_into_view(&self, element: &Element) -> BrowserResult<()> {
        self.execute_on("arguments[0].scrollIntoView(true);", element)?;
        Ok(())
    }

    /// Dispatch pointer-over events on an element
    pub fn hover(&self, element: &Element) -> BrowserResult<()> {
        self.execute_on(
            "var el = arguments[0];\
             ['mouseover', 'mouseenter', 'mousemove'].forEach(function (type) {\
                 el.dispatchEvent(new MouseEvent(type, { bubbles: true, view: window }));\
             });",
            element,
        )?;
        Ok(())
    }

    /// Append a `<style>` element with the given CSS to the document head
    pub fn inject_style(&self, css: &str) -> BrowserResult<()> {
        self.execute(
            "var style = document.createElement('style');\
             style.innerHTML = arguments[0];\
             document.head.appendChild(style);",
            vec![Value::String(css.to_string())],
        )?;
        Ok(())
    }

    pub fn click(&self, element: &Element) -> BrowserResult<()> {
        Ok(self.runtime.block_on(element.click())?)
    }

    pub fn send_keys(&self, element: &Element, keys: &str) -> BrowserResult<()> {
        Ok(self.runtime.block_on(element.send_keys(keys))?)
    }

    pub fn attr(&self, element: &Element, name: &str) -> BrowserResult<Option<String>> {
        Ok(self.runtime.block_on(element.attr(name))?)
    }

    pub fn text(&self, element: &Element) -> BrowserResult<String> {
        Ok(self.runtime.block_on(element.text())?)
    }

    pub fn is_displayed(&self, element: &Element) -> BrowserResult<bool> {
        Ok(self.runtime.block_on(element.is_displayed())?)
    }

    pub fn css_value(&self, element: &Element, property: &str) -> BrowserResult<String> {
        Ok(self.runtime.block_on(element.css_value(property))?)
    }

    /// Capture the viewport as PNG bytes
    pub fn screenshot(&self) -> BrowserResult<Vec<u8>> {
        let client = self.client()?;
        Ok(self.runtime.block_on(client.screenshot())?)
    }

    /// End the WebDriver session
    pub fn close(&mut self) -> BrowserResult<()> {
        if let Some(client) = self.client.take() {
            info!("closing browser session");
            self.runtime.block_on(client.close())?;
        }
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("failed to close browser session: {}", e);
        }
    }
}

impl CaptureBackend for BrowserSession {
    fn capture(&mut self) -> SnapshotResult<CaptureResult> {
        let png = self.screenshot().map_err(|e| SnapshotError::Capture(e.to_string()))?;
        CaptureResult::from_png(png)
    }

    fn source_type(&self) -> &str {
        "webdriver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_locator_display() {
        assert_eq!(By::css(".hmg-ai-faq").to_string(), "(css selector, '.hmg-ai-faq')");
        assert_eq!(By::id("wpadminbar").to_string(), "(id, 'wpadminbar')");
    }

    #[test]
    fn test_timeout_message_names_locator() {
        let err = BrowserError::Timeout {
            locator: By::id("user_login").to_string(),
            timeout: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "Element (id, 'user_login') not found within 10 seconds");
    }

    #[test]
    fn test_capabilities_headless_chrome() {
        let options = BrowserOptions::new("http://localhost:4444/wd/hub").window_size(1280, 720);
        let caps = options.capabilities();

        assert_eq!(caps["browserName"], "chrome");
        let args: Vec<&str> = caps["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(
            args,
            vec!["--headless", "--no-sandbox", "--disable-dev-shm-usage", "--window-size=1280,720"]
        );

        let headed = options.headless(false).capabilities();
        assert!(!headed["goog:chromeOptions"]["args"].to_string().contains("--headless"));
    }

    #[test]
    fn test_lookups_wait_for_the_element_timeout() {
        let options = BrowserOptions::new("http://localhost:4444/wd/hub").wait_timeout(Duration::from_secs(7));
        let timeouts = options.timeouts();

        assert_eq!(timeouts.implicit(), Some(Duration::from_secs(7)));
        assert_eq!(timeouts.script(), None);
        assert_eq!(timeouts.page_load(), None);
    }
}
