//! Environment checks run before any browser session is opened.
//!
//! Both the WebDriver hub and the WordPress site are probed over plain HTTP.
//! A failure is fatal for the run and carries remediation instructions:
//! - `SELENIUM_HUB`: the hub's `/status` endpoint must answer 2xx
//! - `WORDPRESS_URL`: the site root must answer 2xx

use std::time::Duration;
use tracing::{debug, info};

use crate::config;

/// Timeout for the WebDriver hub status probe
pub const HUB_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for the WordPress probe
pub const WORDPRESS_TIMEOUT: Duration = Duration::from_secs(10);

/// Result type for preflight checks
pub type PreflightResult<T> = Result<T, PreflightError>;

/// Which dependency a check probes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    SeleniumHub,
    WordPress,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::SeleniumHub => f.write_str("Selenium Grid"),
            Service::WordPress => f.write_str("WordPress"),
        }
    }
}

/// Errors raised by preflight checks
#[derive(Debug)]
pub enum PreflightError {
    /// Nothing answered at the URL
    Unreachable { service: Service, url: String, reason: String },
    /// The service answered with a non-success status
    Status { service: Service, url: String, status: u16 },
    /// The HTTP client could not be built
    Client(reqwest::Error),
}

impl PreflightError {
    pub fn service(&self) -> Option<Service> {
        match self {
            PreflightError::Unreachable { service, .. } | PreflightError::Status { service, .. } => Some(*service),
            PreflightError::Client(_) => None,
        }
    }

    /// Commands that usually bring the missing service up
    pub fn remediation(&self) -> &'static str {
        match self.service() {
            Some(Service::SeleniumHub) => {
                "Start Selenium Grid:\n  docker run -d -p 4444:4444 --shm-size=2g selenium/standalone-chrome:latest\n\
                 or point SELENIUM_HUB at a running WebDriver endpoint."
            }
            Some(Service::WordPress) => {
                "Start WordPress:\n  docker-compose up -d wordpress\n\
                 or point WORDPRESS_URL at a running site."
            }
            None => "Check the local TLS and proxy configuration.",
        }
    }
}

impl std::fmt::Display for PreflightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreflightError::Unreachable { service, url, reason } => {
                write!(f, "{} is not accessible at {}: {}", service, url, reason)
            }
            PreflightError::Status { service, url, status } => {
                write!(f, "{} at {} returned status {}", service, url, status)
            }
            PreflightError::Client(err) => write!(f, "HTTP client error: {}", err),
        }
    }
}

impl std::error::Error for PreflightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PreflightError::Client(err) => Some(err),
            _ => None,
        }
    }
}

/// Status endpoint for a WebDriver hub URL.
///
/// `http://localhost:4444/wd/hub` becomes `http://localhost:4444/status`.
pub fn hub_status_url(hub: &str) -> String {
    let base = hub.trim_end_matches('/');
    let base = base.strip_suffix("/wd/hub").unwrap_or(base);
    format!("{}/status", base)
}

/// GET `url`, requiring a 2xx answer within `timeout`
pub fn probe(service: Service, url: &str, timeout: Duration) -> PreflightResult<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(PreflightError::Client)?;

    debug!(%service, url, "probing");
    let response = client.get(url).send().map_err(|e| PreflightError::Unreachable {
        service,
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let status = response.status();
    if status.is_success() {
        info!(%service, url, "reachable");
        Ok(())
    } else {
        Err(PreflightError::Status {
            service,
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Check the WebDriver hub
pub fn check_selenium(hub: &str) -> PreflightResult<()> {
    probe(Service::SeleniumHub, &hub_status_url(hub), HUB_TIMEOUT)
}

/// Check the WordPress site
pub fn check_wordpress(url: &str) -> PreflightResult<()> {
    probe(Service::WordPress, url, WORDPRESS_TIMEOUT)
}

/// Run both checks against the configured endpoints, hub first
pub fn check_environment() -> PreflightResult<()> {
    check_selenium(&config::selenium_hub())?;
    check_wordpress(&config::wordpress_url())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_hub_status_url() {
        assert_eq!(hub_status_url("http://localhost:4444/wd/hub"), "http://localhost:4444/status");
        assert_eq!(hub_status_url("http://localhost:4444/wd/hub/"), "http://localhost:4444/status");
        assert_eq!(hub_status_url("http://grid:4444"), "http://grid:4444/status");
    }

    #[test]
    fn test_selenium_ready() {
        let server = MockServer::start();
        let status = server.mock(|when, then| {
            when.method(GET).path("/status");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"value":{"ready":true}}"#);
        });

        check_selenium(&server.url("/wd/hub")).unwrap();
        status.assert();
    }

    #[test]
    fn test_wordpress_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(503);
        });

        let err = check_wordpress(&server.url("/")).unwrap_err();
        match &err {
            PreflightError::Status { service, status, .. } => {
                assert_eq!(*service, Service::WordPress);
                assert_eq!(*status, 503);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.remediation().contains("docker-compose up -d"));
    }

    #[test]
    fn test_unreachable_hub() {
        // nothing listens on the discard port
        let err = probe(Service::SeleniumHub, "http://127.0.0.1:9/status", Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, PreflightError::Unreachable { .. }));
        assert!(err.to_string().starts_with("Selenium Grid is not accessible"));
        assert!(err.remediation().contains("selenium/standalone-chrome"));
    }
}
